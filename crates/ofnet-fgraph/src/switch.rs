//! The switch-connection collaborator boundary.

use crate::FgraphResult;
use ofnet_msg::OfpMessage;

/// The connection-side capabilities the forwarding graph consumes.
///
/// The graph compiles messages and hands them to `send`; everything about
/// connection establishment, framing, and retry lives behind this trait.
/// `send` may block (e.g. on a network write or a bounded queue); the graph
/// never holds a table lock across it.
pub trait SwitchConn: Send + Sync {
    /// Transmits one compiled message. Failures are propagated to the graph
    /// caller unchanged.
    fn send(&self, msg: OfpMessage) -> FgraphResult<()>;

    /// Removes a group id from the connection's local group cache.
    fn delete_group(&self, group_id: u32) -> FgraphResult<()>;

    /// The table used as the evaluation context for bucket-action
    /// compilation.
    fn default_table_id(&self) -> u8;
}

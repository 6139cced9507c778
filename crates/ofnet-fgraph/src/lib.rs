//! The forwarding-graph layer of an OpenFlow switch-control library.
//!
//! A switch's pipeline is modeled as a directed graph of elements: [`Table`]s
//! own [`Flow`] entries, [`Group`]s own buckets, and a flow's "next element"
//! edge routes packets onward (to another table, a group, or an output port).
//! Mutating the graph compiles the affected node into an OpenFlow message
//! ([`ofnet_msg::FlowMod`] / [`ofnet_msg::GroupMod`]) and hands it to the
//! connected switch through the [`SwitchConn`] collaborator.
//!
//! The library guarantees:
//!
//! - flow entries within one table are uniquely keyed by their match,
//! - installed state is mirrored in memory so re-installation uses MODIFY
//!   rather than ADD,
//! - bucket action lists are derived only from apply-actions instructions,
//!   never from table-routing directives.
//!
//! # Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use ofnet_fgraph::{Bucket, Group, GroupType, SwitchConn};
//! # fn demo(switch: Arc<dyn SwitchConn>) -> Result<(), ofnet_fgraph::FgraphError> {
//! let group = Group::new(10, GroupType::Select, switch);
//! let mut bucket = Bucket::new(1);
//! bucket.set_output(2);
//! bucket.set_tunnel_dst_ip("10.0.0.2");
//! group.add_bucket(bucket)?;
//! group.install()?;
//! # Ok(())
//! # }
//! ```

mod bucket;
mod bundle;
mod cookie;
mod element;
mod error;
mod flow;
mod group;
mod switch;
mod table;

pub use bucket::Bucket;
pub use bundle::{BundleMessage, GroupBundleMessage};
pub use cookie::CookieAllocator;
pub use element::{FgraphElem, Output};
pub use error::{FgraphError, FgraphResult};
pub use flow::{Flow, FlowAction, FlowMatch, IpField};
pub use group::{Group, GroupHashField, GroupType};
pub use switch::SwitchConn;
pub use table::Table;

#[cfg(test)]
pub(crate) mod test_util {
    use crate::{FgraphError, FgraphResult, SwitchConn};
    use ofnet_msg::OfpMessage;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// A `SwitchConn` that records every message and supports failure
    /// injection on the send path.
    pub struct RecordingSwitch {
        pub sent: Mutex<Vec<OfpMessage>>,
        pub deleted_groups: Mutex<Vec<u32>>,
        pub fail_sends: AtomicBool,
        pub default_table: u8,
    }

    impl RecordingSwitch {
        pub fn new() -> Self {
            RecordingSwitch {
                sent: Mutex::new(Vec::new()),
                deleted_groups: Mutex::new(Vec::new()),
                fail_sends: AtomicBool::new(false),
                default_table: 0,
            }
        }

        pub fn sent_messages(&self) -> Vec<OfpMessage> {
            self.sent.lock().unwrap().clone()
        }

        pub fn set_fail_sends(&self, fail: bool) {
            self.fail_sends.store(fail, Ordering::SeqCst);
        }
    }

    impl SwitchConn for RecordingSwitch {
        fn send(&self, msg: OfpMessage) -> FgraphResult<()> {
            if self.fail_sends.load(Ordering::SeqCst) {
                return Err(FgraphError::Transport {
                    reason: "injected send failure".to_string(),
                });
            }
            self.sent.lock().unwrap().push(msg);
            Ok(())
        }

        fn delete_group(&self, group_id: u32) -> FgraphResult<()> {
            self.deleted_groups.lock().unwrap().push(group_id);
            Ok(())
        }

        fn default_table_id(&self) -> u8 {
            self.default_table
        }
    }
}

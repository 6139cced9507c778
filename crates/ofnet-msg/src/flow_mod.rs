//! FlowMod message structure.

use crate::{Instruction, MatchField};
use serde::{Deserialize, Serialize};

/// FlowMod command values (OFPFC_* in OpenFlow 1.5).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowModCommand {
    Add = 0,
    Modify = 1,
    ModifyStrict = 2,
    Delete = 3,
    DeleteStrict = 4,
}

/// A flow table modification message.
///
/// Carries the match, priority, and instruction list for one flow entry in
/// one table. Wire encoding is out of scope; this is the typed form the
/// forwarding graph compiles into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMod {
    pub xid: u32,
    pub table_id: u8,
    pub command: FlowModCommand,
    pub priority: u16,
    pub cookie: u64,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub match_fields: Vec<MatchField>,
    pub instructions: Vec<Instruction>,
}

impl FlowMod {
    /// Creates an empty FlowMod for the given table and command.
    pub fn new(table_id: u8, command: FlowModCommand) -> Self {
        FlowMod {
            xid: 0,
            table_id,
            command,
            priority: 0,
            cookie: 0,
            idle_timeout: 0,
            hard_timeout: 0,
            match_fields: Vec::new(),
            instructions: Vec::new(),
        }
    }
}

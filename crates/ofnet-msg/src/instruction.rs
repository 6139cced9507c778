//! Pipeline instructions.

use crate::Action;
use serde::{Deserialize, Serialize};

/// A pipeline-level directive attached to a flow entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Continue matching in another table.
    GotoTable(u8),
    /// Apply the actions immediately, in order.
    ApplyActions(Vec<Action>),
    /// Merge the actions into the packet's action set.
    WriteActions(Vec<Action>),
    WriteMetadata { metadata: u64, mask: u64 },
    Meter(u32),
}

impl Instruction {
    /// Returns the instruction kind name, as used in diagnostics and
    /// validation errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Instruction::GotoTable(_) => "goto_table",
            Instruction::ApplyActions(_) => "apply_actions",
            Instruction::WriteActions(_) => "write_actions",
            Instruction::WriteMetadata { .. } => "write_metadata",
            Instruction::Meter(_) => "meter",
        }
    }
}

//! Top-level message sum type.

use crate::{FlowMod, GroupMod};
use serde::{Deserialize, Serialize};

/// A compiled OpenFlow message ready for transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfpMessage {
    FlowMod(FlowMod),
    GroupMod(GroupMod),
}

impl OfpMessage {
    /// Returns the transaction id.
    pub fn xid(&self) -> u32 {
        match self {
            OfpMessage::FlowMod(m) => m.xid,
            OfpMessage::GroupMod(m) => m.xid,
        }
    }

    /// Overwrites the transaction id.
    pub fn set_xid(&mut self, xid: u32) {
        match self {
            OfpMessage::FlowMod(m) => m.xid = xid,
            OfpMessage::GroupMod(m) => m.xid = xid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlowModCommand, GroupModCommand, GroupModType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_xid_roundtrip() {
        let mut msg = OfpMessage::FlowMod(FlowMod::new(0, FlowModCommand::Add));
        assert_eq!(msg.xid(), 0);
        msg.set_xid(42);
        assert_eq!(msg.xid(), 42);

        let mut msg = OfpMessage::GroupMod(GroupMod::new(
            1,
            GroupModCommand::Add,
            GroupModType::All,
        ));
        msg.set_xid(7);
        assert_eq!(msg.xid(), 7);
    }
}

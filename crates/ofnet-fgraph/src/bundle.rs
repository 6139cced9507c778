//! Bundle-message wrapping for atomic multi-message transactions.

use ofnet_msg::{GroupMod, OfpMessage};

/// A compiled modification message whose transaction id the bundle
/// coordinator may reassign before transmission.
pub trait BundleMessage {
    /// Overwrites the transaction id and returns the message to enqueue.
    /// This is the coordinator's entry point; nothing else mutates the
    /// compiled message.
    fn reset_xid(&mut self, xid: u32) -> OfpMessage;

    /// The current transaction id.
    fn xid(&self) -> u32;
}

/// A group modification captured for inclusion in one bundle transaction.
///
/// Created on demand from a [`crate::Group`]'s current state via
/// [`crate::Group::get_bundle_message`]; not retained by the group.
#[derive(Debug, Clone)]
pub struct GroupBundleMessage {
    message: GroupMod,
}

impl GroupBundleMessage {
    pub(crate) fn new(message: GroupMod) -> Self {
        GroupBundleMessage { message }
    }

    /// The compiled GroupMod payload.
    pub fn message(&self) -> &GroupMod {
        &self.message
    }
}

impl BundleMessage for GroupBundleMessage {
    fn reset_xid(&mut self, xid: u32) -> OfpMessage {
        self.message.xid = xid;
        OfpMessage::GroupMod(self.message.clone())
    }

    fn xid(&self) -> u32 {
        self.message.xid
    }
}

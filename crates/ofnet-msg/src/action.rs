//! Forwarding actions.

use crate::MatchField;
use serde::{Deserialize, Serialize};

/// Reserved output port: send the packet out the port it arrived on.
pub const OFPP_IN_PORT: u32 = 0xfffffff8;
/// Reserved output port: process through the traditional L2 pipeline.
pub const OFPP_NORMAL: u32 = 0xfffffffa;
/// Reserved output port: flood within the spanning tree.
pub const OFPP_FLOOD: u32 = 0xfffffffb;
/// Reserved output port: all ports except the input port.
pub const OFPP_ALL: u32 = 0xfffffffc;
/// Reserved output port: send to the controller as a packet-in.
pub const OFPP_CONTROLLER: u32 = 0xfffffffd;

/// Controller output max-len requesting the full, unbuffered packet.
pub const OFPCML_NO_BUFFER: u16 = 0xffff;

/// A single forwarding operation inside an instruction or bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Forward out a port. `max_len` is only meaningful for
    /// [`OFPP_CONTROLLER`] output.
    Output { port: u32, max_len: u16 },
    /// Apply the action buckets of a group.
    Group(u32),
    /// Rewrite a header field to the given match field's value.
    SetField(MatchField),
    PushVlan(u16),
    PopVlan,
}

impl Action {
    /// Output to a port with no packet-in buffering.
    pub fn output(port: u32) -> Self {
        Action::Output { port, max_len: 0 }
    }

    /// Output to the controller, truncating to `max_len` bytes.
    pub fn controller(max_len: u16) -> Self {
        Action::Output {
            port: OFPP_CONTROLLER,
            max_len,
        }
    }

    /// Returns the action name, as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Output { .. } => "output",
            Action::Group(_) => "group",
            Action::SetField(_) => "set_field",
            Action::PushVlan(_) => "push_vlan",
            Action::PopVlan => "pop_vlan",
        }
    }
}

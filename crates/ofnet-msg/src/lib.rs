//! Typed OpenFlow 1.5 message structures.
//!
//! This crate models the protocol substructures the forwarding graph compiles
//! into, without any wire encoding:
//!
//! - [`FlowMod`]: add/modify/delete a flow entry in a table
//! - [`GroupMod`]: add/modify/delete a group and its buckets
//! - [`Bucket`]: one weighted/selectable action set inside a group
//! - [`Action`] / [`Instruction`]: forwarding operations and pipeline
//!   directives
//! - [`MatchField`]: typed OXM match fields
//!
//! Encoding these structures onto an OpenFlow connection is the concern of a
//! wire codec, not of this crate.

mod action;
mod flow_mod;
mod group_mod;
mod instruction;
mod mac;
mod match_field;
mod message;

pub use action::{
    Action, OFPCML_NO_BUFFER, OFPP_ALL, OFPP_CONTROLLER, OFPP_FLOOD, OFPP_IN_PORT, OFPP_NORMAL,
};
pub use flow_mod::{FlowMod, FlowModCommand};
pub use group_mod::{
    Bucket, BucketProperty, GroupMod, GroupModCommand, GroupModType, GroupProperty,
    OFPG_BUCKET_ALL, OFPG_BUCKET_FIRST, OFPG_BUCKET_LAST,
};
pub use instruction::Instruction;
pub use mac::MacAddr;
pub use match_field::MatchField;
pub use message::OfpMessage;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddr(String),
}

//! GroupMod message structure: commands, group types, buckets, properties.

use crate::{Action, MatchField};
use serde::{Deserialize, Serialize};

/// Last bucket of the group, for INSERT_BUCKET/REMOVE_BUCKET positioning.
pub const OFPG_BUCKET_LAST: u32 = 0xfffffffe;
/// First bucket of the group.
pub const OFPG_BUCKET_FIRST: u32 = 0xfffffffd;
/// All buckets of the group.
pub const OFPG_BUCKET_ALL: u32 = 0xffffffff;

/// GroupMod command values (OFPGC_* in OpenFlow 1.5).
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupModCommand {
    Add = 0,
    Modify = 1,
    Delete = 2,
    InsertBucket = 3,
    RemoveBucket = 4,
}

/// Group type values (OFPGT_* in OpenFlow 1.5).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupModType {
    All = 0,
    Select = 1,
    Indirect = 2,
    Ff = 3,
}

/// A per-bucket property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketProperty {
    /// Relative share of traffic for SELECT groups.
    Weight(u16),
    /// Port whose liveness gates this bucket (fast-failover groups).
    WatchPort(u32),
    /// Group whose liveness gates this bucket (fast-failover groups).
    WatchGroup(u32),
}

/// One weighted/selectable action-set alternative inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub bucket_id: u32,
    pub properties: Vec<BucketProperty>,
    pub actions: Vec<Action>,
}

impl Bucket {
    /// Creates an empty bucket with the given id.
    pub fn new(bucket_id: u32) -> Self {
        Bucket {
            bucket_id,
            properties: Vec::new(),
            actions: Vec::new(),
        }
    }
}

/// A group-level property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupProperty {
    /// The NTR experimenter selection-method property for SELECT groups.
    /// `fields` lists the match fields the switch hashes on; each is fully
    /// wildcarded (a sentinel meaning "hash on this field's whole value").
    SelectionMethod {
        method: String,
        param: u64,
        fields: Vec<MatchField>,
    },
}

/// A group table modification message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMod {
    pub xid: u32,
    pub group_id: u32,
    pub command: GroupModCommand,
    pub group_type: GroupModType,
    /// Bucket position for INSERT_BUCKET/REMOVE_BUCKET; 0 otherwise.
    pub command_bucket_id: u32,
    pub buckets: Vec<Bucket>,
    pub properties: Vec<GroupProperty>,
}

impl GroupMod {
    /// Creates a bodyless GroupMod for the given group, command, and type.
    pub fn new(group_id: u32, command: GroupModCommand, group_type: GroupModType) -> Self {
        GroupMod {
            xid: 0,
            group_id,
            command,
            group_type,
            command_bucket_id: 0,
            buckets: Vec::new(),
            properties: Vec::new(),
        }
    }
}

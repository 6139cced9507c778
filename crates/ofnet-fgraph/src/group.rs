//! The group graph element: buckets, properties, install/modify/delete.

use crate::bucket::Bucket;
use crate::bundle::GroupBundleMessage;
use crate::element::FgraphElem;
use crate::error::FgraphResult;
use crate::switch::SwitchConn;
use ofnet_msg::{
    Action, GroupMod, GroupModCommand, GroupModType, GroupProperty, Instruction, MatchField,
    OfpMessage, OFPG_BUCKET_LAST,
};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

/// Group forwarding semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    /// Execute every bucket (multicast/broadcast).
    All,
    /// Execute one bucket chosen by the switch's selection method.
    Select,
    /// Execute the single bucket.
    Indirect,
    /// Execute the first live bucket.
    FastFailover,
}

impl GroupType {
    fn mod_type(self) -> GroupModType {
        match self {
            GroupType::All => GroupModType::All,
            GroupType::Select => GroupModType::Select,
            GroupType::Indirect => GroupModType::Indirect,
            GroupType::FastFailover => GroupModType::Ff,
        }
    }
}

/// Symbolic hash-input fields for [`Group::set_selection_method`].
///
/// Each maps to a fully-wildcarded match of the corresponding protocol
/// field, a sentinel telling the switch to hash on that field's whole value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupHashField {
    SrcIp,
    DstIp,
    SrcPort,
    DstPort,
    Protocol,
}

impl GroupHashField {
    fn match_field(self) -> MatchField {
        match self {
            GroupHashField::SrcIp => MatchField::ipv4_src(Ipv4Addr::BROADCAST, None),
            GroupHashField::DstIp => MatchField::ipv4_dst(Ipv4Addr::BROADCAST, None),
            GroupHashField::SrcPort => MatchField::tcp_src(0xffff),
            GroupHashField::DstPort => MatchField::tcp_dst(0xffff),
            GroupHashField::Protocol => MatchField::ip_proto(0xff),
        }
    }
}

#[derive(Debug, Default)]
struct GroupState {
    buckets: Vec<ofnet_msg::Bucket>,
    properties: Vec<GroupProperty>,
    is_installed: bool,
}

/// A group entry: an ordered bucket list, group-level properties, and the
/// installed/uninstalled state machine.
///
/// The group type is immutable after creation. Mutations on an installed
/// group re-synchronize switch-side state immediately (MODIFY semantics), so
/// callers never call [`Group::install`] again after the first success. The
/// internal lock serializes mutate-and-reinstall sequences; a single logical
/// owner sees its mutations applied to the switch in issue order because
/// every mutation sends synchronously before returning.
pub struct Group {
    switch: Arc<dyn SwitchConn>,
    pub id: u32,
    pub group_type: GroupType,
    state: Mutex<GroupState>,
}

impl Group {
    /// Creates a detached (not yet installed) group.
    pub fn new(id: u32, group_type: GroupType, switch: Arc<dyn SwitchConn>) -> Self {
        Group {
            switch,
            id,
            group_type,
            state: Mutex::new(GroupState::default()),
        }
    }

    /// Appends protocol bucket records to the bucket list, re-installing if
    /// the group is live.
    pub fn add_buckets(
        &self,
        buckets: impl IntoIterator<Item = ofnet_msg::Bucket>,
    ) -> FgraphResult<()> {
        let mut state = self.state.lock().unwrap();
        state.buckets.extend(buckets);
        self.reinstall_if_live(&mut state)
    }

    /// Replaces the bucket list wholesale, re-installing if the group is
    /// live.
    pub fn reset_buckets(
        &self,
        buckets: impl IntoIterator<Item = ofnet_msg::Bucket>,
    ) -> FgraphResult<()> {
        let mut state = self.state.lock().unwrap();
        state.buckets.clear();
        state.buckets.extend(buckets);
        self.reinstall_if_live(&mut state)
    }

    /// Appends a group-level property, re-installing if the group is live.
    pub fn add_property(&self, prop: GroupProperty) -> FgraphResult<()> {
        let mut state = self.state.lock().unwrap();
        state.properties.push(prop);
        self.reinstall_if_live(&mut state)
    }

    /// Attaches the NTR selection-method property built from symbolic
    /// hash-input fields, in the order given.
    pub fn set_selection_method(
        &self,
        method: &str,
        param: u64,
        fields: &[GroupHashField],
    ) -> FgraphResult<()> {
        let matches = fields.iter().map(|f| f.match_field()).collect();
        self.add_property(GroupProperty::SelectionMethod {
            method: method.to_string(),
            param,
            fields: matches,
        })
    }

    /// Translates a [`Bucket`]'s embedded flow into bucket actions and
    /// appends the resulting record.
    ///
    /// The flow is compiled against the switch's default table (bucket
    /// actions are evaluated independently of any real table). Every
    /// compiled instruction must be apply-actions; anything else fails with
    /// [`crate::FgraphError::InvalidBucketInstruction`] and leaves the group
    /// unchanged.
    pub fn add_bucket(&self, bucket: Bucket) -> FgraphResult<()> {
        let record = bucket.into_record(self.switch.default_table_id())?;
        self.add_buckets([record])
    }

    /// Sends the group to the switch: ADD on first install, MODIFY
    /// afterwards.
    ///
    /// The installed flag only flips on a successful send, so a retry after
    /// a transport failure still uses ADD.
    pub fn install(&self) -> FgraphResult<()> {
        let mut state = self.state.lock().unwrap();
        self.install_locked(&mut state)
    }

    /// Uninstalls the group from the switch and purges it from the
    /// connection's group cache.
    ///
    /// A never-installed group sends no DELETE but is still purged from the
    /// cache. If the DELETE send fails the error is returned and the cache
    /// keeps the entry: the cache must never forget a group the switch still
    /// has.
    pub fn delete(&self) -> FgraphResult<()> {
        let mut state = self.state.lock().unwrap();

        if state.is_installed {
            let group_mod = GroupMod::new(self.id, GroupModCommand::Delete, self.group_type.mod_type());
            self.switch.send(OfpMessage::GroupMod(group_mod))?;
            state.is_installed = false;
            log::debug!("deleted group {} from switch", self.id);
        }

        self.switch.delete_group(self.id)
    }

    /// Builds the GroupMod this group would send for the given command,
    /// without mutating installed state or sending.
    ///
    /// Used by a bundle/transaction coordinator batching multiple mods
    /// atomically.
    pub fn get_bundle_message(&self, command: GroupModCommand) -> GroupBundleMessage {
        let state = self.state.lock().unwrap();
        GroupBundleMessage::new(self.group_mod_locked(&state, command))
    }

    pub fn is_installed(&self) -> bool {
        self.state.lock().unwrap().is_installed
    }

    pub fn bucket_count(&self) -> usize {
        self.state.lock().unwrap().buckets.len()
    }

    fn reinstall_if_live(&self, state: &mut GroupState) -> FgraphResult<()> {
        if state.is_installed {
            self.install_locked(state)
        } else {
            Ok(())
        }
    }

    fn install_locked(&self, state: &mut GroupState) -> FgraphResult<()> {
        let command = if state.is_installed {
            GroupModCommand::Modify
        } else {
            GroupModCommand::Add
        };
        let group_mod = self.group_mod_locked(state, command);

        log::debug!(
            "installing group {} ({:?}, {} buckets)",
            self.id,
            command,
            group_mod.buckets.len()
        );
        self.switch.send(OfpMessage::GroupMod(group_mod))?;
        state.is_installed = true;

        Ok(())
    }

    fn group_mod_locked(&self, state: &GroupState, command: GroupModCommand) -> GroupMod {
        let mut group_mod = GroupMod::new(self.id, command, self.group_type.mod_type());

        // DELETE carries no body.
        if command == GroupModCommand::Delete {
            return group_mod;
        }

        if command == GroupModCommand::Add || command == GroupModCommand::Modify {
            group_mod.properties = state.properties.clone();
        }

        group_mod.buckets = state.buckets.clone();

        if command == GroupModCommand::InsertBucket {
            group_mod.command_bucket_id = OFPG_BUCKET_LAST;
        }

        group_mod
    }
}

impl FgraphElem for Group {
    fn elem_type(&self) -> &'static str {
        "group"
    }

    fn flow_instruction(&self) -> Instruction {
        Instruction::ApplyActions(vec![Action::Group(self.id)])
    }
}

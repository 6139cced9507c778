//! Flow entries: match, actions, next-element edge, FlowMod compilation.

use crate::element::FgraphElem;
use crate::error::{FgraphError, FgraphResult};
use crate::switch::SwitchConn;
use ofnet_msg::{Action, FlowMod, FlowModCommand, Instruction, MacAddr, MatchField, OfpMessage};
use std::net::Ipv4Addr;
use std::sync::Arc;

/// The match specification of one flow entry.
///
/// Unset fields are wildcards. The identity key of a flow is a deterministic
/// rendering of the populated fields, so two matches that render identically
/// are the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowMatch {
    pub priority: u16,
    pub in_port: Option<u32>,
    pub eth_src: Option<MacAddr>,
    pub eth_dst: Option<MacAddr>,
    pub ethertype: Option<u16>,
    pub vlan_id: Option<u16>,
    pub ip_proto: Option<u8>,
    pub ipv4_src: Option<Ipv4Addr>,
    pub ipv4_src_mask: Option<Ipv4Addr>,
    pub ipv4_dst: Option<Ipv4Addr>,
    pub ipv4_dst_mask: Option<Ipv4Addr>,
    pub tcp_src: Option<u16>,
    pub tcp_dst: Option<u16>,
    pub tunnel_id: Option<u64>,
}

impl FlowMatch {
    /// Computes the flow identity key.
    ///
    /// The key is a function of the match alone; cookies, actions, and the
    /// next-element edge do not participate.
    pub fn flow_key(&self) -> String {
        let mut parts = vec![format!("priority={}", self.priority)];
        if let Some(p) = self.in_port {
            parts.push(format!("in_port={p}"));
        }
        if let Some(mac) = self.eth_src {
            parts.push(format!("eth_src={mac}"));
        }
        if let Some(mac) = self.eth_dst {
            parts.push(format!("eth_dst={mac}"));
        }
        if let Some(et) = self.ethertype {
            parts.push(format!("eth_type=0x{et:04x}"));
        }
        if let Some(vid) = self.vlan_id {
            parts.push(format!("vlan_vid={vid}"));
        }
        if let Some(proto) = self.ip_proto {
            parts.push(format!("ip_proto={proto}"));
        }
        if let Some(ip) = self.ipv4_src {
            match self.ipv4_src_mask {
                Some(mask) => parts.push(format!("ipv4_src={ip}/{mask}")),
                None => parts.push(format!("ipv4_src={ip}")),
            }
        }
        if let Some(ip) = self.ipv4_dst {
            match self.ipv4_dst_mask {
                Some(mask) => parts.push(format!("ipv4_dst={ip}/{mask}")),
                None => parts.push(format!("ipv4_dst={ip}")),
            }
        }
        if let Some(p) = self.tcp_src {
            parts.push(format!("tcp_src={p}"));
        }
        if let Some(p) = self.tcp_dst {
            parts.push(format!("tcp_dst={p}"));
        }
        if let Some(id) = self.tunnel_id {
            parts.push(format!("tunnel_id={id}"));
        }
        parts.join(",")
    }

    fn to_fields(&self) -> Vec<MatchField> {
        let mut fields = Vec::new();
        if let Some(p) = self.in_port {
            fields.push(MatchField::InPort(p));
        }
        if let Some(mac) = self.eth_src {
            fields.push(MatchField::EthSrc(mac));
        }
        if let Some(mac) = self.eth_dst {
            fields.push(MatchField::EthDst(mac));
        }
        if let Some(et) = self.ethertype {
            fields.push(MatchField::EthType(et));
        }
        if let Some(vid) = self.vlan_id {
            fields.push(MatchField::VlanId(vid));
        }
        if let Some(proto) = self.ip_proto {
            fields.push(MatchField::ip_proto(proto));
        }
        if let Some(ip) = self.ipv4_src {
            fields.push(MatchField::ipv4_src(ip, self.ipv4_src_mask));
        }
        if let Some(ip) = self.ipv4_dst {
            fields.push(MatchField::ipv4_dst(ip, self.ipv4_dst_mask));
        }
        if let Some(p) = self.tcp_src {
            fields.push(MatchField::tcp_src(p));
        }
        if let Some(p) = self.tcp_dst {
            fields.push(MatchField::tcp_dst(p));
        }
        if let Some(id) = self.tunnel_id {
            fields.push(MatchField::tunnel_id(id, None));
        }
        fields
    }
}

/// An action carried on a flow, translated to a protocol [`Action`] during
/// compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowAction {
    SetField(MatchField),
    PushVlan(u16),
    PopVlan,
}

impl FlowAction {
    fn to_action(&self) -> Action {
        match self {
            FlowAction::SetField(field) => Action::SetField(field.clone()),
            FlowAction::PushVlan(et) => Action::PushVlan(*et),
            FlowAction::PopVlan => Action::PopVlan,
        }
    }
}

/// IP header fields settable through [`Flow::set_ip_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpField {
    TunnelSrc,
    TunnelDst,
    Ipv4Src,
    Ipv4Dst,
}

/// One flow entry: a match, an ordered action list, and an edge to the next
/// graph element.
///
/// Flows created through [`crate::Table::new_flow`] are bound to that table's
/// switch and can be installed; the flow embedded in a [`crate::Bucket`] is
/// detached and only ever compiled, never sent.
#[derive(Clone)]
pub struct Flow {
    switch: Option<Arc<dyn SwitchConn>>,
    pub(crate) table_id: u8,
    match_spec: FlowMatch,
    actions: Vec<FlowAction>,
    next_elem_type: Option<&'static str>,
    next_instr: Option<Instruction>,
    cookie: u64,
    is_installed: bool,
}

impl std::fmt::Debug for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow")
            .field("table_id", &self.table_id)
            .field("key", &self.flow_key())
            .field("cookie", &self.cookie)
            .field("next_elem", &self.next_elem_type)
            .field("is_installed", &self.is_installed)
            .finish()
    }
}

impl Flow {
    pub(crate) fn attached(
        switch: Arc<dyn SwitchConn>,
        table_id: u8,
        match_spec: FlowMatch,
        cookie: u64,
    ) -> Self {
        Flow {
            switch: Some(switch),
            table_id,
            match_spec,
            actions: Vec::new(),
            next_elem_type: None,
            next_instr: None,
            cookie,
            is_installed: false,
        }
    }

    pub(crate) fn detached(match_spec: FlowMatch) -> Self {
        Flow {
            switch: None,
            table_id: 0,
            match_spec,
            actions: Vec::new(),
            next_elem_type: None,
            next_instr: None,
            cookie: 0,
            is_installed: false,
        }
    }

    /// The flow's identity key within its table.
    pub fn flow_key(&self) -> String {
        self.match_spec.flow_key()
    }

    pub fn match_spec(&self) -> &FlowMatch {
        &self.match_spec
    }

    pub fn cookie(&self) -> u64 {
        self.cookie
    }

    pub fn is_installed(&self) -> bool {
        self.is_installed
    }

    /// The kind tag of the next graph element, if one is set.
    pub fn next_elem_type(&self) -> Option<&'static str> {
        self.next_elem_type
    }

    /// Appends an action to the flow's ordered action list.
    pub fn add_action(&mut self, action: FlowAction) {
        self.actions.push(action);
    }

    /// Appends a set-field action rewriting the given IP header field.
    pub fn set_ip_field(&mut self, addr: Ipv4Addr, field: IpField) {
        let mf = match field {
            IpField::TunnelSrc => MatchField::tunnel_src(addr),
            IpField::TunnelDst => MatchField::tunnel_dst(addr),
            IpField::Ipv4Src => MatchField::ipv4_src(addr, None),
            IpField::Ipv4Dst => MatchField::ipv4_dst(addr, None),
        };
        log::debug!("flow {}: set {} to {addr}", self.flow_key(), mf.name());
        self.actions.push(FlowAction::SetField(mf));
    }

    /// Points the flow at its next graph element.
    ///
    /// This is an in-memory edit; call [`Flow::install`] to push the entry to
    /// the switch.
    pub fn set_next(&mut self, elem: &dyn FgraphElem) {
        self.next_elem_type = Some(elem.elem_type());
        self.next_instr = Some(elem.flow_instruction());
    }

    /// Compiles the flow into a FlowMod for the given command.
    ///
    /// The flow's own actions fold into the next element's apply-actions
    /// instruction when that is what the next element yields; otherwise they
    /// form their own apply-actions instruction ahead of the next element's
    /// (e.g. goto-table). A flow with neither actions nor a next element has
    /// nothing to say and fails with [`FgraphError::NextElemMissing`].
    pub fn to_flow_mod(&self, command: FlowModCommand) -> FgraphResult<FlowMod> {
        let mut flow_mod = FlowMod::new(self.table_id, command);
        flow_mod.priority = self.match_spec.priority;
        flow_mod.cookie = self.cookie;
        flow_mod.match_fields = self.match_spec.to_fields();

        let own: Vec<Action> = self.actions.iter().map(FlowAction::to_action).collect();
        match &self.next_instr {
            Some(Instruction::ApplyActions(next_actions)) => {
                let mut actions = own;
                actions.extend(next_actions.iter().cloned());
                flow_mod.instructions.push(Instruction::ApplyActions(actions));
            }
            Some(instr) => {
                if !own.is_empty() {
                    flow_mod.instructions.push(Instruction::ApplyActions(own));
                }
                flow_mod.instructions.push(instr.clone());
            }
            None => {
                if own.is_empty() {
                    return Err(FgraphError::NextElemMissing);
                }
                flow_mod.instructions.push(Instruction::ApplyActions(own));
            }
        }

        Ok(flow_mod)
    }

    /// Compiles and sends the flow: ADD on first install, MODIFY afterwards.
    ///
    /// The installed flag is only flipped on a successful send, so a retry
    /// after a transport failure still uses ADD.
    pub fn install(&mut self) -> FgraphResult<()> {
        let switch = self.switch.clone().ok_or(FgraphError::FlowNotBound)?;

        let command = if self.is_installed {
            FlowModCommand::Modify
        } else {
            FlowModCommand::Add
        };
        let flow_mod = self.to_flow_mod(command)?;

        log::debug!(
            "installing flow {} in table {} ({:?})",
            self.flow_key(),
            self.table_id,
            command
        );
        switch.send(OfpMessage::FlowMod(flow_mod))?;
        self.is_installed = true;

        Ok(())
    }
}

impl FgraphElem for Flow {
    fn elem_type(&self) -> &'static str {
        "flow"
    }

    /// Routing to a flow means re-entering the table that owns it.
    fn flow_instruction(&self) -> Instruction {
        Instruction::GotoTable(self.table_id)
    }
}

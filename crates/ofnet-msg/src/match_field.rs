//! Typed OXM match fields.

use crate::MacAddr;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// One OXM match field, with an optional mask where the protocol allows one.
///
/// Constructors mirror the field helpers of the OpenFlow 1.5 specification;
/// a `None` mask means the field matches on its full value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchField {
    InPort(u32),
    EthSrc(MacAddr),
    EthDst(MacAddr),
    EthType(u16),
    VlanId(u16),
    IpProto(u8),
    Ipv4Src { addr: Ipv4Addr, mask: Option<Ipv4Addr> },
    Ipv4Dst { addr: Ipv4Addr, mask: Option<Ipv4Addr> },
    TcpSrc(u16),
    TcpDst(u16),
    TunnelId { id: u64, mask: Option<u64> },
    TunnelSrc(Ipv4Addr),
    TunnelDst(Ipv4Addr),
}

impl MatchField {
    pub fn ipv4_src(addr: Ipv4Addr, mask: Option<Ipv4Addr>) -> Self {
        MatchField::Ipv4Src { addr, mask }
    }

    pub fn ipv4_dst(addr: Ipv4Addr, mask: Option<Ipv4Addr>) -> Self {
        MatchField::Ipv4Dst { addr, mask }
    }

    pub fn tcp_src(port: u16) -> Self {
        MatchField::TcpSrc(port)
    }

    pub fn tcp_dst(port: u16) -> Self {
        MatchField::TcpDst(port)
    }

    pub fn ip_proto(proto: u8) -> Self {
        MatchField::IpProto(proto)
    }

    pub fn tunnel_id(id: u64, mask: Option<u64>) -> Self {
        MatchField::TunnelId { id, mask }
    }

    pub fn tunnel_src(addr: Ipv4Addr) -> Self {
        MatchField::TunnelSrc(addr)
    }

    pub fn tunnel_dst(addr: Ipv4Addr) -> Self {
        MatchField::TunnelDst(addr)
    }

    /// Returns the OXM field name, as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            MatchField::InPort(_) => "in_port",
            MatchField::EthSrc(_) => "eth_src",
            MatchField::EthDst(_) => "eth_dst",
            MatchField::EthType(_) => "eth_type",
            MatchField::VlanId(_) => "vlan_vid",
            MatchField::IpProto(_) => "ip_proto",
            MatchField::Ipv4Src { .. } => "ipv4_src",
            MatchField::Ipv4Dst { .. } => "ipv4_dst",
            MatchField::TcpSrc(_) => "tcp_src",
            MatchField::TcpDst(_) => "tcp_dst",
            MatchField::TunnelId { .. } => "tunnel_id",
            MatchField::TunnelSrc(_) => "tun_src",
            MatchField::TunnelDst(_) => "tun_dst",
        }
    }
}

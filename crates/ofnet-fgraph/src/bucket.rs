//! Group buckets: a flow specialized to live inside a group.

use crate::element::Output;
use crate::error::{FgraphError, FgraphResult};
use crate::flow::{Flow, FlowMatch, IpField};
use ofnet_msg::{BucketProperty, FlowModCommand, Instruction};
use std::net::IpAddr;

/// One action-set alternative inside a group.
///
/// A bucket embeds a protocol bucket record and a detached [`Flow`], borrowed
/// only for its match/action-compilation machinery. The record's action list
/// is derived exclusively from the flow's apply-actions instructions when the
/// bucket is attached to a group; any other instruction kind is a contract
/// violation.
#[derive(Clone)]
pub struct Bucket {
    record: ofnet_msg::Bucket,
    flow: Flow,
}

impl Bucket {
    /// Creates an empty bucket with the given id.
    pub fn new(bucket_id: u32) -> Self {
        Bucket {
            record: ofnet_msg::Bucket::new(bucket_id),
            flow: Flow::detached(FlowMatch::default()),
        }
    }

    pub fn bucket_id(&self) -> u32 {
        self.record.bucket_id
    }

    /// The embedded flow, for composing actions beyond the setters below.
    pub fn flow_mut(&mut self) -> &mut Flow {
        &mut self.flow
    }

    /// Sets the bucket's forwarding action to "output to port".
    pub fn set_output(&mut self, port: u32) {
        self.flow.set_next(&Output::Port(port));
    }

    /// Sets the tunnel source endpoint from a textual address.
    ///
    /// The unspecified and loopback addresses mean "no tunnel endpoint
    /// configured" and leave the bucket untouched; they are not errors.
    pub fn set_tunnel_src_ip(&mut self, src_ip: &str) {
        self.set_tunnel_ip(src_ip, IpField::TunnelSrc);
    }

    /// Sets the tunnel destination endpoint from a textual address.
    ///
    /// Same unspecified/loopback no-op semantics as
    /// [`Bucket::set_tunnel_src_ip`].
    pub fn set_tunnel_dst_ip(&mut self, dst_ip: &str) {
        self.set_tunnel_ip(dst_ip, IpField::TunnelDst);
    }

    fn set_tunnel_ip(&mut self, addr: &str, field: IpField) {
        match addr.parse::<IpAddr>() {
            Ok(ip) if ip.is_unspecified() || ip.is_loopback() => {
                // No tunnel endpoint configured.
            }
            Ok(IpAddr::V4(v4)) => self.flow.set_ip_field(v4, field),
            Ok(IpAddr::V6(_)) => {
                log::warn!("ignoring IPv6 tunnel endpoint {addr}: only IPv4 is supported");
            }
            Err(_) => {
                log::warn!("ignoring unparseable tunnel endpoint {addr:?}");
            }
        }
    }

    /// Attaches a weight property (SELECT groups).
    pub fn set_weight(&mut self, weight: u16) {
        self.record.properties.push(BucketProperty::Weight(weight));
    }

    /// Attaches a watch-port property (fast-failover groups).
    pub fn set_watch_port(&mut self, port: u32) {
        self.record.properties.push(BucketProperty::WatchPort(port));
    }

    /// Attaches a watch-group property (fast-failover groups).
    pub fn set_watch_group(&mut self, group_id: u32) {
        self.record.properties.push(BucketProperty::WatchGroup(group_id));
    }

    /// Compiles the embedded flow against `table_id` and folds every
    /// resulting apply-actions instruction into the bucket record.
    ///
    /// Fails with [`FgraphError::InvalidBucketInstruction`] on any other
    /// instruction kind; the record is consumed either way, never partially
    /// attached.
    pub(crate) fn into_record(mut self, table_id: u8) -> FgraphResult<ofnet_msg::Bucket> {
        self.flow.table_id = table_id;
        let flow_mod = self.flow.to_flow_mod(FlowModCommand::Add)?;

        for instr in flow_mod.instructions {
            match instr {
                Instruction::ApplyActions(actions) => {
                    log::debug!(
                        "bucket {}: actions [{}]",
                        self.record.bucket_id,
                        actions.iter().map(|a| a.name()).collect::<Vec<_>>().join(", ")
                    );
                    self.record.actions.extend(actions);
                }
                other => {
                    return Err(FgraphError::InvalidBucketInstruction { kind: other.kind() });
                }
            }
        }

        Ok(self.record)
    }
}

//! End-to-end forwarding-graph scenarios against a recording switch
//! connection.

use ofnet_fgraph::{
    Bucket, CookieAllocator, FgraphError, FgraphResult, Flow, FlowMatch, Group, GroupType,
    SwitchConn, Table,
};
use ofnet_msg::{
    Action, FlowModCommand, GroupModCommand, Instruction, MatchField, OfpMessage,
};
use pretty_assertions::assert_eq;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct FakeSwitch {
    sent: Mutex<Vec<OfpMessage>>,
    deleted_groups: Mutex<Vec<u32>>,
    fail_sends: AtomicBool,
}

impl FakeSwitch {
    fn new() -> Self {
        FakeSwitch {
            sent: Mutex::new(Vec::new()),
            deleted_groups: Mutex::new(Vec::new()),
            fail_sends: AtomicBool::new(false),
        }
    }

    fn sent(&self) -> Vec<OfpMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl SwitchConn for FakeSwitch {
    fn send(&self, msg: OfpMessage) -> FgraphResult<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(FgraphError::Transport {
                reason: "connection reset".to_string(),
            });
        }
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }

    fn delete_group(&self, group_id: u32) -> FgraphResult<()> {
        self.deleted_groups.lock().unwrap().push(group_id);
        Ok(())
    }

    fn default_table_id(&self) -> u8 {
        0
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn tunnel_bucket(id: u32, port: u32, dst: &str) -> Bucket {
    let mut bucket = Bucket::new(id);
    bucket.set_tunnel_dst_ip(dst);
    bucket.set_output(port);
    bucket
}

#[test]
fn select_group_lifecycle_add_modify_delete() {
    init_logging();
    let switch = Arc::new(FakeSwitch::new());
    let group = Group::new(100, GroupType::Select, switch.clone());

    group.add_bucket(tunnel_bucket(1, 10, "192.168.1.1")).unwrap();
    group.install().unwrap();

    // Mutating a live group re-installs with MODIFY; no second install call.
    group.add_bucket(tunnel_bucket(2, 11, "192.168.1.2")).unwrap();

    group.delete().unwrap();

    let sent = switch.sent();
    assert_eq!(sent.len(), 3);
    let commands: Vec<GroupModCommand> = sent
        .iter()
        .map(|m| match m {
            OfpMessage::GroupMod(gm) => gm.command,
            other => panic!("unexpected message: {other:?}"),
        })
        .collect();
    assert_eq!(
        commands,
        vec![
            GroupModCommand::Add,
            GroupModCommand::Modify,
            GroupModCommand::Delete,
        ]
    );

    // The MODIFY carried both buckets, in attach order, each with its
    // tunnel set-field ahead of the output.
    match &sent[1] {
        OfpMessage::GroupMod(gm) => {
            let ids: Vec<u32> = gm.buckets.iter().map(|b| b.bucket_id).collect();
            assert_eq!(ids, vec![1, 2]);
            assert_eq!(
                gm.buckets[0].actions,
                vec![
                    Action::SetField(MatchField::tunnel_dst(Ipv4Addr::new(192, 168, 1, 1))),
                    Action::output(10),
                ]
            );
        }
        other => panic!("unexpected message: {other:?}"),
    }

    assert_eq!(*switch.deleted_groups.lock().unwrap(), vec![100]);
}

#[test]
fn flow_routes_to_group_through_tables() {
    init_logging();
    let switch = Arc::new(FakeSwitch::new());
    let cookies = Arc::new(CookieAllocator::new());
    let table0 = Table::new(0, switch.clone(), cookies.clone());
    let table1 = Table::new(1, switch.clone(), cookies);

    let group = Group::new(7, GroupType::All, switch.clone());
    group.add_bucket(tunnel_bucket(1, 3, "10.1.0.1")).unwrap();
    group.install().unwrap();

    // table0: in_port=1 -> goto table1
    let classifier = table0
        .new_flow(FlowMatch {
            priority: 10,
            in_port: Some(1),
            ..Default::default()
        })
        .unwrap();
    {
        let mut flow = classifier.lock().unwrap();
        flow.set_next(&table1);
        flow.install().unwrap();
    }

    // table1: dst 10.0.0.0/24 -> group 7
    let forwarder = table1
        .new_flow(FlowMatch {
            priority: 20,
            ipv4_dst: Some(Ipv4Addr::new(10, 0, 0, 0)),
            ipv4_dst_mask: Some(Ipv4Addr::new(255, 255, 255, 0)),
            ..Default::default()
        })
        .unwrap();
    {
        let mut flow = forwarder.lock().unwrap();
        flow.set_next(&group);
        flow.install().unwrap();
    }

    let sent = switch.sent();
    assert_eq!(sent.len(), 3);

    match &sent[1] {
        OfpMessage::FlowMod(fm) => {
            assert_eq!(fm.table_id, 0);
            assert_eq!(fm.command, FlowModCommand::Add);
            assert_eq!(fm.instructions, vec![Instruction::GotoTable(1)]);
        }
        other => panic!("unexpected message: {other:?}"),
    }

    match &sent[2] {
        OfpMessage::FlowMod(fm) => {
            assert_eq!(fm.table_id, 1);
            assert_eq!(
                fm.instructions,
                vec![Instruction::ApplyActions(vec![Action::Group(7)])]
            );
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn transport_failure_leaves_graph_state_consistent() {
    init_logging();
    let switch = Arc::new(FakeSwitch::new());
    let group = Group::new(200, GroupType::FastFailover, switch.clone());

    let mut bucket = Bucket::new(1);
    bucket.set_watch_port(4);
    bucket.set_output(4);
    group.add_bucket(bucket).unwrap();
    group.install().unwrap();

    switch.fail_sends.store(true, Ordering::SeqCst);

    // A failed DELETE must not purge the switch's group cache.
    let err = group.delete().unwrap_err();
    assert!(matches!(err, FgraphError::Transport { .. }));
    assert!(group.is_installed());
    assert!(switch.deleted_groups.lock().unwrap().is_empty());

    // Once the connection recovers, delete proceeds normally.
    switch.fail_sends.store(false, Ordering::SeqCst);
    group.delete().unwrap();
    assert!(!group.is_installed());
    assert_eq!(*switch.deleted_groups.lock().unwrap(), vec![200]);
}

#[test]
fn duplicate_flow_detection_across_handles() {
    init_logging();
    let switch = Arc::new(FakeSwitch::new());
    let table = Table::new(0, switch, Arc::new(CookieAllocator::new()));

    let spec = FlowMatch {
        priority: 5,
        ethertype: Some(0x0800),
        ip_proto: Some(6),
        tcp_dst: Some(443),
        ..Default::default()
    };

    let flow: Arc<Mutex<Flow>> = table.new_flow(spec.clone()).unwrap();
    assert_eq!(
        table.new_flow(spec).unwrap_err(),
        FgraphError::DuplicateFlow {
            key: flow.lock().unwrap().flow_key()
        }
    );

    table.delete_flow(&flow.lock().unwrap().flow_key());
    assert_eq!(table.flow_count(), 0);
}

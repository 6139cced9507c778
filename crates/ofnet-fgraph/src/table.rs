//! The table graph element: one pipeline stage and its flow entries.

use crate::cookie::CookieAllocator;
use crate::element::FgraphElem;
use crate::error::{FgraphError, FgraphResult};
use crate::flow::{Flow, FlowMatch};
use crate::switch::SwitchConn;
use ofnet_msg::Instruction;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One pipeline stage owning a set of flow entries.
///
/// Entries are keyed by their match-derived identity key; no two live flows
/// in the same table share a key. The lock guards the flow database only;
/// it is never held across message transmission, so duplicate detection is
/// race-free but install ordering is the caller's concern.
pub struct Table {
    switch: Arc<dyn SwitchConn>,
    pub table_id: u8,
    flow_db: Mutex<HashMap<String, Arc<Mutex<Flow>>>>,
    cookies: Arc<CookieAllocator>,
}

impl Table {
    pub fn new(table_id: u8, switch: Arc<dyn SwitchConn>, cookies: Arc<CookieAllocator>) -> Self {
        Table {
            switch,
            table_id,
            flow_db: Mutex::new(HashMap::new()),
            cookies,
        }
    }

    /// Creates a new, uninstalled flow for the given match.
    ///
    /// The entry becomes visible to later lookups immediately, before it is
    /// ever sent to the switch, so callers can build its action chain
    /// incrementally without racing concurrent creation of the same match.
    /// Fails with [`FgraphError::DuplicateFlow`] if a live entry with the
    /// same identity key exists.
    pub fn new_flow(&self, match_spec: FlowMatch) -> FgraphResult<Arc<Mutex<Flow>>> {
        let mut flow_db = self.flow_db.lock().unwrap();

        log::debug!("creating new flow for match: {match_spec:?}");

        let flow_key = match_spec.flow_key();
        if flow_db.contains_key(&flow_key) {
            log::error!("flow {flow_key} already exists in table {}", self.table_id);
            return Err(FgraphError::DuplicateFlow { key: flow_key });
        }

        let cookie = self.cookies.allocate();
        let flow = Arc::new(Mutex::new(Flow::attached(
            self.switch.clone(),
            self.table_id,
            match_spec,
            cookie,
        )));

        log::debug!("added flow: {flow_key}");

        // Stored before install: the flow is not sent until its next graph
        // element is set.
        flow_db.insert(flow_key, flow.clone());

        Ok(flow)
    }

    /// Removes the entry with the given identity key; no-op if absent.
    ///
    /// Does not emit a switch-side delete; uninstalling is the flow's own
    /// responsibility before this is called.
    pub fn delete_flow(&self, flow_key: &str) {
        let mut flow_db = self.flow_db.lock().unwrap();
        flow_db.remove(flow_key);
        log::debug!("deleted flow: {flow_key}");
    }

    /// Looks up a live flow by its identity key.
    pub fn get_flow(&self, flow_key: &str) -> Option<Arc<Mutex<Flow>>> {
        self.flow_db.lock().unwrap().get(flow_key).cloned()
    }

    /// The number of live entries.
    pub fn flow_count(&self) -> usize {
        self.flow_db.lock().unwrap().len()
    }

    /// Deletes the table.
    ///
    /// Entry deletion is not cascaded; callers uninstall flows themselves.
    // TODO: cascade switch-side deletion of remaining entries
    pub fn delete(&self) -> FgraphResult<()> {
        Ok(())
    }
}

impl FgraphElem for Table {
    fn elem_type(&self) -> &'static str {
        "table"
    }

    fn flow_instruction(&self) -> Instruction {
        Instruction::GotoTable(self.table_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::RecordingSwitch;
    use pretty_assertions::assert_eq;

    fn test_table(table_id: u8) -> Table {
        Table::new(
            table_id,
            Arc::new(RecordingSwitch::new()),
            Arc::new(CookieAllocator::new()),
        )
    }

    fn match_on_port(port: u32) -> FlowMatch {
        FlowMatch {
            priority: 100,
            in_port: Some(port),
            ..Default::default()
        }
    }

    #[test]
    fn test_distinct_matches_coexist() {
        let table = test_table(1);
        table.new_flow(match_on_port(1)).unwrap();
        table.new_flow(match_on_port(2)).unwrap();
        assert_eq!(table.flow_count(), 2);
    }

    #[test]
    fn test_duplicate_match_is_rejected() {
        let table = test_table(1);
        table.new_flow(match_on_port(1)).unwrap();

        let err = table.new_flow(match_on_port(1)).unwrap_err();
        assert_eq!(
            err,
            FgraphError::DuplicateFlow {
                key: "priority=100,in_port=1".to_string()
            }
        );
        assert_eq!(table.flow_count(), 1);
    }

    #[test]
    fn test_key_is_reusable_after_delete() {
        let table = test_table(1);
        let flow = table.new_flow(match_on_port(1)).unwrap();
        let key = flow.lock().unwrap().flow_key();

        table.delete_flow(&key);
        assert_eq!(table.flow_count(), 0);

        table.new_flow(match_on_port(1)).unwrap();
        assert_eq!(table.flow_count(), 1);
    }

    #[test]
    fn test_delete_absent_key_is_noop() {
        let table = test_table(1);
        table.delete_flow("priority=0");
        assert_eq!(table.flow_count(), 0);
    }

    #[test]
    fn test_cookies_are_unique_per_flow() {
        let table = test_table(1);
        let f1 = table.new_flow(match_on_port(1)).unwrap();
        let f2 = table.new_flow(match_on_port(2)).unwrap();
        let c1 = f1.lock().unwrap().cookie();
        let c2 = f2.lock().unwrap().cookie();
        assert_eq!(c1, 1);
        assert_eq!(c2, 2);
    }

    #[test]
    fn test_table_flow_instruction() {
        let table = test_table(9);
        assert_eq!(table.elem_type(), "table");
        assert_eq!(table.flow_instruction(), Instruction::GotoTable(9));
    }
}

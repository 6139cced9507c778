//! The graph-element contract and the output leaf element.

use ofnet_msg::{Action, Instruction, OFPCML_NO_BUFFER, OFPP_FLOOD, OFPP_IN_PORT, OFPP_NORMAL};

/// A node in the forwarding graph.
///
/// Every element can name its kind and produce the instruction that routes a
/// packet to it: a table yields goto-table, a group yields apply-actions with
/// a group action, an output yields apply-actions with an output action.
pub trait FgraphElem {
    /// The element kind tag ("table", "group", "output").
    fn elem_type(&self) -> &'static str;

    /// The instruction a flow uses to route to this element.
    fn flow_instruction(&self) -> Instruction;
}

/// A leaf graph element that forwards out of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// A concrete switch port.
    Port(u32),
    /// The reserved NORMAL port (traditional L2 processing).
    Normal,
    /// The reserved FLOOD port.
    Flood,
    /// The port the packet arrived on.
    InPort,
    /// Punt to the controller, truncating the packet-in to `max_len`.
    Controller { max_len: u16 },
}

impl Output {
    /// Punt to the controller with the full, unbuffered packet.
    pub fn controller() -> Self {
        Output::Controller {
            max_len: OFPCML_NO_BUFFER,
        }
    }

    pub(crate) fn action(&self) -> Action {
        match *self {
            Output::Port(port) => Action::output(port),
            Output::Normal => Action::output(OFPP_NORMAL),
            Output::Flood => Action::output(OFPP_FLOOD),
            Output::InPort => Action::output(OFPP_IN_PORT),
            Output::Controller { max_len } => Action::controller(max_len),
        }
    }
}

impl FgraphElem for Output {
    fn elem_type(&self) -> &'static str {
        "output"
    }

    fn flow_instruction(&self) -> Instruction {
        Instruction::ApplyActions(vec![self.action()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofnet_msg::OFPP_CONTROLLER;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_instruction() {
        let out = Output::Port(3);
        assert_eq!(out.elem_type(), "output");
        assert_eq!(
            out.flow_instruction(),
            Instruction::ApplyActions(vec![Action::output(3)])
        );
    }

    #[test]
    fn test_reserved_ports() {
        assert_eq!(Output::Normal.action(), Action::output(OFPP_NORMAL));
        assert_eq!(
            Output::controller().action(),
            Action::Output {
                port: OFPP_CONTROLLER,
                max_len: OFPCML_NO_BUFFER
            }
        );
    }
}

//! Ports and port handles.
//!
//! A [`Port`] is a mutable value cell owned by exactly one node. Wires never
//! hold ports directly: they hold [`PortHandle`]s, indices into the graph's
//! node arena plus a position within that node's inputs or outputs.

use std::fmt;

use runic_core::{ElementSpec, PortDirection, PortSpec, QiValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub name: &'static str,
    pub direction: PortDirection,
    pub element: ElementSpec,
    pub value: QiValue,
}

impl Port {
    pub fn from_spec(spec: &PortSpec) -> Self {
        Port {
            name: spec.name,
            direction: spec.direction,
            element: spec.element,
            value: QiValue::EMPTY,
        }
    }

    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    pub fn reset(&mut self) {
        self.value = QiValue::EMPTY;
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} = {}", self.direction, self.name, self.value)
    }
}

/// Address of a port inside a [`crate::RuneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortHandle {
    /// Index into the graph's node list.
    pub node: usize,
    pub direction: PortDirection,
    /// Index among the node's ports of the same direction.
    pub index: usize,
}

impl PortHandle {
    pub fn input(node: usize, index: usize) -> Self {
        PortHandle {
            node,
            direction: PortDirection::Input,
            index,
        }
    }

    pub fn output(node: usize, index: usize) -> Self {
        PortHandle {
            node,
            direction: PortDirection::Output,
            index,
        }
    }
}

//! The node capability and the arena slot that owns a node's ports.
//!
//! A [`Node`] implementation holds only its private parameters and state.
//! Ports live in the surrounding [`RuneNode`], built from the registry
//! signature of the node's type, so port layout can never drift from what
//! the validator checked. During Process a node sees its ports through a
//! [`NodeIo`]: inputs are read-only, outputs writable, log lines collected
//! in order.

use std::fmt;

use runic_core::registry::{self, NodeSignature};
use runic_core::{PortDirection, QiValue};
use smallvec::SmallVec;

use crate::error::SimError;
use crate::port::Port;

/// Ports of one direction. Few nodes have more than two.
pub type PortList = SmallVec<[Port; 2]>;

/// One node behaviour from the node library.
pub trait Node: fmt::Debug {
    /// Registry type name this node was built for.
    fn type_name(&self) -> &'static str;

    /// Reads inputs, writes outputs, logs what happened.
    fn process(&mut self, io: &mut NodeIo<'_>);

    /// Replaces the externally supplied value of a source. Returns `false`
    /// for nodes that take no external input.
    fn inject(&mut self, _value: QiValue) -> bool {
        false
    }

    /// Internal charge, level or last received value, for nodes that keep
    /// one.
    fn stored(&self) -> Option<QiValue> {
        None
    }

    /// Every non-empty value received, for recording sinks.
    fn history(&self) -> &[QiValue] {
        &[]
    }
}

static EMPTY: QiValue = QiValue::EMPTY;

/// A node's view of its own ports during Process.
pub struct NodeIo<'a> {
    id: &'a str,
    inputs: &'a [Port],
    outputs: &'a mut [Port],
    logs: &'a mut Vec<String>,
}

impl<'a> NodeIo<'a> {
    pub fn new(
        id: &'a str,
        inputs: &'a [Port],
        outputs: &'a mut [Port],
        logs: &'a mut Vec<String>,
    ) -> Self {
        NodeIo {
            id,
            inputs,
            outputs,
            logs,
        }
    }

    pub fn id(&self) -> &str {
        self.id
    }

    /// Value of input `index`; empty when the index is out of range.
    pub fn input(&self, index: usize) -> &QiValue {
        self.inputs.get(index).map_or(&EMPTY, |p| &p.value)
    }

    pub fn output(&self, index: usize) -> &QiValue {
        self.outputs.get(index).map_or(&EMPTY, |p| &p.value)
    }

    pub fn write(&mut self, index: usize, value: QiValue) {
        if let Some(port) = self.outputs.get_mut(index) {
            port.value = value;
        }
    }

    pub fn clear(&mut self, index: usize) {
        self.write(index, QiValue::EMPTY);
    }

    /// Appends `"<id>: <message>"` to the tick log.
    pub fn log(&mut self, message: impl fmt::Display) {
        self.logs.push(format!("{}: {}", self.id, message));
    }
}

/// Arena slot: a node behaviour plus the ports it owns.
#[derive(Debug)]
pub struct RuneNode {
    id: String,
    signature: &'static NodeSignature,
    inputs: PortList,
    outputs: PortList,
    behavior: Box<dyn Node>,
}

impl RuneNode {
    /// Builds the slot and its ports from the registry entry for the
    /// behaviour's type.
    pub fn new(id: impl Into<String>, behavior: Box<dyn Node>) -> Result<Self, SimError> {
        let signature =
            registry::lookup(behavior.type_name()).ok_or_else(|| SimError::UnregisteredType {
                type_name: behavior.type_name().to_string(),
            })?;

        Ok(RuneNode {
            id: id.into(),
            signature,
            inputs: signature.inputs().map(Port::from_spec).collect(),
            outputs: signature.outputs().map(Port::from_spec).collect(),
            behavior,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn signature(&self) -> &'static NodeSignature {
        self.signature
    }

    pub fn type_name(&self) -> &'static str {
        self.signature.type_name
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Finds a port by name in either direction.
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .find(|p| p.name == name)
    }

    pub fn ports(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    pub(crate) fn port_mut(&mut self, direction: PortDirection, index: usize) -> Option<&mut Port> {
        match direction {
            PortDirection::Input => self.inputs.get_mut(index),
            PortDirection::Output => self.outputs.get_mut(index),
        }
    }

    pub fn stored(&self) -> Option<QiValue> {
        self.behavior.stored()
    }

    pub fn history(&self) -> &[QiValue] {
        self.behavior.history()
    }

    pub(crate) fn inject(&mut self, value: QiValue) -> bool {
        self.behavior.inject(value)
    }

    pub(crate) fn reset_inputs(&mut self) {
        for port in &mut self.inputs {
            port.reset();
        }
    }

    /// Runs the behaviour once, appending its log lines to `logs`.
    pub(crate) fn process(&mut self, logs: &mut Vec<String>) {
        let RuneNode {
            id,
            inputs,
            outputs,
            behavior,
            ..
        } = self;
        let mut io = NodeIo::new(id.as_str(), inputs.as_slice(), outputs.as_mut_slice(), logs);
        behavior.process(&mut io);
    }
}

//! Tick scheduler over an arena of nodes.
//!
//! # Tick phases
//!
//! Every [`RuneGraph::tick`] runs, in order:
//! 1. **Reset**: all input ports are emptied. Outputs persist.
//! 2. **Transfer**: each wire, in insertion order, reads its source output
//!    (written during the previous tick), decays it one step and merges it
//!    into the target input with the combination function. Fan-in is a left
//!    fold in wire order.
//! 3. **Process**: each node, in insertion order, reads its inputs and
//!    writes its outputs.
//! 4. **Dissipation check**: every non-empty output that no wire drains is
//!    reported as uncontained energy.
//!
//! Nodes and wires are addressed by index; the graph never hands out
//! references into the arena while a tick is running.

use indexmap::IndexMap;
use runic_core::interaction::{combine_detailed, process_decay};
use runic_core::{PortDirection, QiValue};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::SimError;
use crate::node::{Node, RuneNode};
use crate::port::PortHandle;

/// Configuration for a [`RuneGraph`].
#[derive(Debug, Clone, Default)]
pub struct GraphConfig {
    /// Keep a [`TickTrace`] for every tick.
    pub trace_enabled: bool,
}

/// Log lines produced by one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickTrace {
    pub tick: u64,
    pub logs: Vec<String>,
}

/// A directed connection from an output port to an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wire {
    pub source: PortHandle,
    pub target: PortHandle,
}

#[derive(Debug, Default)]
pub struct RuneGraph {
    nodes: Vec<RuneNode>,
    index: IndexMap<String, usize>,
    wires: Vec<Wire>,
    tick_count: u64,
    config: GraphConfig,
    traces: Vec<TickTrace>,
}

impl RuneGraph {
    pub fn new() -> Self {
        RuneGraph::default()
    }

    pub fn with_config(config: GraphConfig) -> Self {
        RuneGraph {
            config,
            ..RuneGraph::default()
        }
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Adds a node. Ids are unique within a graph.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        node: impl Node + 'static,
    ) -> Result<usize, SimError> {
        self.add_boxed(id, Box::new(node))
    }

    pub fn add_boxed(
        &mut self,
        id: impl Into<String>,
        node: Box<dyn Node>,
    ) -> Result<usize, SimError> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(SimError::DuplicateNode { id });
        }
        let slot = RuneNode::new(id.clone(), node)?;
        let position = self.nodes.len();
        self.nodes.push(slot);
        self.index.insert(id, position);
        Ok(position)
    }

    /// Resolves a port by node id and port name. Without a name, the
    /// signature's default port for `direction` is used.
    pub fn port(
        &self,
        node: &str,
        port: Option<&str>,
        direction: PortDirection,
    ) -> Result<PortHandle, SimError> {
        let position = self.position(node)?;
        let signature = self.nodes[position].signature();

        let index = match port {
            Some(name) => {
                signature
                    .port_index(direction, name)
                    .ok_or_else(|| SimError::UnknownPort {
                        node: node.to_string(),
                        port: name.to_string(),
                        direction,
                    })?
            }
            None => signature
                .default_port(direction)
                .ok_or_else(|| SimError::NoDefaultPort {
                    node: node.to_string(),
                    direction,
                })?,
        };

        Ok(PortHandle {
            node: position,
            direction,
            index,
        })
    }

    pub fn output(&self, node: &str, port: &str) -> Result<PortHandle, SimError> {
        self.port(node, Some(port), PortDirection::Output)
    }

    pub fn input(&self, node: &str, port: &str) -> Result<PortHandle, SimError> {
        self.port(node, Some(port), PortDirection::Input)
    }

    /// Adds a wire. The source must be an output and the target an input.
    pub fn connect(&mut self, source: PortHandle, target: PortHandle) -> Result<(), SimError> {
        for handle in [source, target] {
            if self.port_value(handle).is_none() {
                return Err(SimError::UnknownNode {
                    id: format!("#{}", handle.node),
                });
            }
        }
        if source.direction != PortDirection::Output || target.direction != PortDirection::Input {
            return Err(SimError::InvalidWire {
                from: self.describe(source),
                to: self.describe(target),
            });
        }
        self.wires.push(Wire { source, target });
        Ok(())
    }

    /// Sets the external value of an injectable source.
    pub fn inject(&mut self, node: &str, value: QiValue) -> Result<(), SimError> {
        let position = self.position(node)?;
        if self.nodes[position].inject(value) {
            Ok(())
        } else {
            Err(SimError::NotInjectable {
                id: node.to_string(),
            })
        }
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Runs one reset / transfer / process / dissipation cycle and returns
    /// its log lines in order.
    pub fn tick(&mut self) -> Vec<String> {
        self.tick_count += 1;
        let mut logs = Vec::new();

        for node in &mut self.nodes {
            node.reset_inputs();
        }

        for wire in &self.wires {
            let Some(sent) = port_value(&self.nodes, wire.source) else {
                continue;
            };
            let sent = process_decay(sent);
            let Some(received) = port_value(&self.nodes, wire.target) else {
                continue;
            };

            let merged = combine_detailed(received, &sent);
            if merged.is_loss() {
                let line = format!(
                    "[Qi Deviation] {} + {} collapsed at {}",
                    received,
                    sent,
                    describe(&self.nodes, wire.target)
                );
                warn!(tick = self.tick_count, "{line}");
                logs.push(line);
            }
            if let Some(port) =
                self.nodes[wire.target.node].port_mut(PortDirection::Input, wire.target.index)
            {
                port.value = merged.value();
            }
        }

        for node in &mut self.nodes {
            node.process(&mut logs);
        }

        for (position, node) in self.nodes.iter().enumerate() {
            for (index, port) in node.outputs().iter().enumerate() {
                let handle = PortHandle::output(position, index);
                if !port.value.is_empty() && !self.is_drained(handle) {
                    let line = format!(
                        "[Qi Deviation] UNCONTAINED ENERGY! {} at {}.{} has no route! Node taking damage.",
                        port.value,
                        node.id(),
                        port.name
                    );
                    warn!(tick = self.tick_count, node = node.id(), port = port.name, "uncontained energy");
                    logs.push(line);
                }
            }
        }

        debug!(tick = self.tick_count, lines = logs.len(), "tick complete");
        if self.config.trace_enabled {
            self.traces.push(TickTrace {
                tick: self.tick_count,
                logs: logs.clone(),
            });
        }
        logs
    }

    /// Runs `ticks` ticks.
    pub fn run(&mut self, ticks: u64) -> Vec<TickTrace> {
        (0..ticks)
            .map(|_| {
                let logs = self.tick();
                TickTrace {
                    tick: self.tick_count,
                    logs,
                }
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn node(&self, id: &str) -> Option<&RuneNode> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &RuneNode> {
        self.nodes.iter()
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current value of a named port, either direction.
    pub fn value(&self, node: &str, port: &str) -> Option<&QiValue> {
        self.node(node)?.port(port).map(|p| &p.value)
    }

    pub fn port_value(&self, handle: PortHandle) -> Option<&QiValue> {
        port_value(&self.nodes, handle)
    }

    /// Internal charge or last received value of a node.
    pub fn stored(&self, node: &str) -> Option<QiValue> {
        self.node(node)?.stored()
    }

    pub fn history(&self, node: &str) -> &[QiValue] {
        self.node(node).map_or(&[], RuneNode::history)
    }

    /// Recorded ticks; empty unless tracing is enabled.
    pub fn traces(&self) -> &[TickTrace] {
        &self.traces
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    fn position(&self, id: &str) -> Result<usize, SimError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| SimError::UnknownNode { id: id.to_string() })
    }

    fn is_drained(&self, output: PortHandle) -> bool {
        self.wires.iter().any(|wire| wire.source == output)
    }

    fn describe(&self, handle: PortHandle) -> String {
        describe(&self.nodes, handle)
    }
}

fn port_value(nodes: &[RuneNode], handle: PortHandle) -> Option<&QiValue> {
    nodes
        .get(handle.node)?
        .ports(handle.direction)
        .get(handle.index)
        .map(|p| &p.value)
}

/// `node.port` for a handle.
fn describe(nodes: &[RuneNode], handle: PortHandle) -> String {
    match nodes.get(handle.node) {
        Some(node) => match node.ports(handle.direction).get(handle.index) {
            Some(port) => format!("{}.{}", node.id(), port.name),
            None => format!("{}.#{}", node.id(), handle.index),
        },
        None => format!("#{}", handle.node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::*;
    use runic_core::ElementType::{Earth, Fire, Water};

    fn socket(element: runic_core::ElementType, magnitude: u32) -> SpiritStoneSocket {
        SpiritStoneSocket::new(QiValue::new(element, magnitude))
    }

    fn wire(graph: &mut RuneGraph, from: (&str, &str), to: (&str, &str)) {
        let source = graph.output(from.0, from.1).unwrap();
        let target = graph.input(to.0, to.1).unwrap();
        graph.connect(source, target).unwrap();
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut graph = RuneGraph::new();
        graph.add_node("a", SpiritVessel).unwrap();
        assert_eq!(
            graph.add_node("a", Splitter),
            Err(SimError::DuplicateNode { id: "a".into() })
        );
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn wires_must_run_output_to_input() {
        let mut graph = RuneGraph::new();
        graph.add_node("a", SpiritVessel).unwrap();
        graph.add_node("b", SpiritVessel).unwrap();

        let a_in = graph.input("a", "in").unwrap();
        let b_out = graph.output("b", "out").unwrap();
        assert_eq!(
            graph.connect(a_in, b_out),
            Err(SimError::InvalidWire {
                from: "a.in".into(),
                to: "b.out".into()
            })
        );
        assert!(graph.wires().is_empty());
    }

    #[test]
    fn ports_resolve_by_name_and_default() {
        let mut graph = RuneGraph::new();
        graph.add_node("cap", QiCapacitor::new(5)).unwrap();
        graph.add_node("amp", Amplifier).unwrap();

        assert_eq!(
            graph.port("cap", None, PortDirection::Output).unwrap(),
            PortHandle::output(0, 0)
        );
        assert_eq!(graph.output("cap", "full").unwrap(), PortHandle::output(0, 1));
        // No `in` port: the first input is the default.
        assert_eq!(
            graph.port("amp", None, PortDirection::Input).unwrap(),
            PortHandle::input(1, 0)
        );
        assert!(matches!(
            graph.output("cap", "in"),
            Err(SimError::UnknownPort { .. })
        ));
        assert!(matches!(
            graph.output("ghost", "out"),
            Err(SimError::UnknownNode { .. })
        ));
    }

    #[test]
    fn only_sources_accept_injection() {
        let mut graph = RuneGraph::new();
        graph.add_node("link", CultivatorLink::default()).unwrap();
        graph.add_node("vessel", SpiritVessel).unwrap();

        graph.inject("link", QiValue::new(Fire, 3)).unwrap();
        assert_eq!(graph.stored("link"), Some(QiValue::new(Fire, 3)));
        assert_eq!(
            graph.inject("vessel", QiValue::new(Fire, 3)),
            Err(SimError::NotInjectable {
                id: "vessel".into()
            })
        );
    }

    // -----------------------------------------------------------------------
    // Tick semantics
    // -----------------------------------------------------------------------

    #[test]
    fn wires_add_one_tick_of_latency() {
        let mut graph = RuneGraph::new();
        graph.add_node("src", socket(Fire, 2)).unwrap();
        graph.add_node("v1", SpiritVessel).unwrap();
        graph.add_node("v2", SpiritVessel).unwrap();
        graph.add_node("sink", StableEmitter::new()).unwrap();
        wire(&mut graph, ("src", "out"), ("v1", "in"));
        wire(&mut graph, ("v1", "out"), ("v2", "in"));
        wire(&mut graph, ("v2", "out"), ("sink", "in"));

        graph.tick();
        assert!(graph.value("v1", "out").unwrap().is_empty());
        graph.tick();
        assert_eq!(graph.value("v1", "out"), Some(&QiValue::new(Fire, 2)));
        assert!(graph.value("v2", "out").unwrap().is_empty());
        graph.tick();
        assert_eq!(graph.value("v2", "out"), Some(&QiValue::new(Fire, 2)));
        assert!(graph.history("sink").is_empty());
        graph.tick();
        assert_eq!(graph.history("sink"), &[QiValue::new(Fire, 2)]);
        assert_eq!(graph.tick_count(), 4);
    }

    #[test]
    fn inputs_are_reset_every_tick() {
        let mut graph = RuneGraph::new();
        graph.add_node("link", CultivatorLink::new(QiValue::new(Water, 1))).unwrap();
        graph.add_node("sink", StableEmitter::new()).unwrap();
        wire(&mut graph, ("link", "out"), ("sink", "in"));

        graph.run(3);
        assert_eq!(graph.stored("sink"), Some(QiValue::new(Water, 1)));
        assert_eq!(graph.value("sink", "in"), Some(&QiValue::new(Water, 1)));
    }

    #[test]
    fn fan_in_merges_additively() {
        let mut graph = RuneGraph::new();
        graph.add_node("a", socket(Fire, 2)).unwrap();
        graph.add_node("b", socket(Fire, 3)).unwrap();
        graph.add_node("sink", StableEmitter::new()).unwrap();
        wire(&mut graph, ("a", "out"), ("sink", "in"));
        wire(&mut graph, ("b", "out"), ("sink", "in"));

        graph.run(2);
        assert_eq!(graph.stored("sink"), Some(QiValue::new(Fire, 5)));
    }

    #[test]
    fn transfer_reports_collapsed_merges() {
        let mut graph = RuneGraph::new();
        graph.add_node("fire", socket(Fire, 2)).unwrap();
        graph.add_node("water", socket(Water, 3)).unwrap();
        graph.add_node("sink", StableEmitter::new()).unwrap();
        wire(&mut graph, ("fire", "out"), ("sink", "in"));
        wire(&mut graph, ("water", "out"), ("sink", "in"));

        assert!(graph.tick().is_empty());
        let logs = graph.tick();
        assert_eq!(
            logs,
            vec!["[Qi Deviation] Fire(2) + Water(3) collapsed at sink.in"]
        );
        assert!(graph.history("sink").is_empty());
    }

    #[test]
    fn wires_decay_unstable_values() {
        let mut graph = RuneGraph::new();
        graph
            .add_node("src", SpiritStoneSocket::new(QiValue::with_ttl(
                runic_core::ElementType::Steam,
                10,
                1,
            )))
            .unwrap();
        graph.add_node("sink", StableEmitter::new()).unwrap();
        wire(&mut graph, ("src", "out"), ("sink", "in"));

        graph.run(2);
        assert_eq!(graph.stored("sink"), Some(QiValue::new(Water, 8)));
    }

    #[test]
    fn amplifier_in_a_graph() {
        let mut graph = RuneGraph::new();
        graph.add_node("fire", socket(Fire, 5)).unwrap();
        graph.add_node("earth", socket(Earth, 2)).unwrap();
        graph.add_node("amp", Amplifier).unwrap();
        graph.add_node("sink", StableEmitter::new()).unwrap();
        wire(&mut graph, ("fire", "out"), ("amp", "primary"));
        wire(&mut graph, ("earth", "out"), ("amp", "catalyst"));
        wire(&mut graph, ("amp", "out"), ("sink", "in"));

        graph.run(3);
        assert_eq!(graph.stored("sink"), Some(QiValue::new(Earth, 10)));
    }

    #[test]
    fn traces_are_opt_in() {
        let mut quiet = RuneGraph::new();
        quiet.add_node("link", CultivatorLink::new(QiValue::new(Fire, 1))).unwrap();
        quiet.run(2);
        assert!(quiet.traces().is_empty());

        let mut traced = RuneGraph::with_config(GraphConfig {
            trace_enabled: true,
        });
        traced.add_node("link", CultivatorLink::new(QiValue::new(Fire, 1))).unwrap();
        let returned = traced.run(2);
        assert_eq!(traced.traces(), returned.as_slice());
        assert_eq!(traced.traces()[1].tick, 2);
    }
}

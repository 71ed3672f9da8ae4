//! Graph IR loading.
//!
//! A [`GraphDefinition`] is a build artifact: the compiler already checked
//! it. Anything that still does not fit (malformed JSON, unknown node types,
//! badly shaped parameters, dangling endpoints) means the artifact is
//! corrupt, and loading fails with a [`LoadError`] instead of producing a
//! partial graph.
//!
//! Node construction goes through [`FACTORIES`], one entry per registry
//! type. Each factory reads its parameters with a [`ParamReader`]; a factory
//! may decline to build a node (an empty spirit stone socket), in which case
//! every edge touching that node id is dropped as well.

use std::collections::HashSet;

use runic_core::{ElementSpec, ElementType, Endpoint, GraphDefinition, PortDirection, QiValue};
use tracing::debug;

use crate::error::{LoadError, SimError};
use crate::graph::{GraphConfig, RuneGraph};
use crate::node::Node;
use crate::nodes::*;
use crate::params::ParamReader;

type Built = Result<Option<Box<dyn Node>>, LoadError>;

/// Builds the node for one registry type from its IR parameters.
pub struct NodeFactory {
    pub type_name: &'static str,
    /// Parameters the factory reads. Anything else is ignored.
    pub params: &'static [&'static str],
    build: fn(&ParamReader<'_>) -> Built,
}

impl NodeFactory {
    /// `Ok(None)` means the node is intentionally absent from the graph.
    pub fn build(&self, params: &ParamReader<'_>) -> Built {
        (self.build)(params)
    }
}

fn built(node: impl Node + 'static) -> Built {
    Ok(Some(Box::new(node)))
}

/// One factory per built-in registry entry, in registry order.
pub static FACTORIES: &[NodeFactory] = &[
    // Sources
    NodeFactory {
        type_name: "SpiritStoneSocket",
        params: &["element", "grade", "magnitude", "amplitude", "cycles"],
        build: spirit_stone_socket,
    },
    NodeFactory {
        type_name: "StoneArray",
        params: &["stones"],
        build: stone_array,
    },
    NodeFactory {
        type_name: "CultivatorLink",
        params: &["element", "magnitude"],
        build: cultivator_link,
    },
    // Operations
    NodeFactory {
        type_name: "TunedResonator",
        params: &["efficiency"],
        build: |p| {
            built(TunedResonator::new(
                p.float_or("efficiency", TunedResonator::DEFAULT_EFFICIENCY)?,
            ))
        },
    },
    NodeFactory {
        type_name: "AmplitudeRegulator",
        params: &["target", "max_input"],
        build: |p| {
            built(AmplitudeRegulator::new(
                p.u32_or("target", AmplitudeRegulator::DEFAULT_TARGET)?,
                p.u32_or("max_input", AmplitudeRegulator::DEFAULT_MAX_INPUT)?,
            ))
        },
    },
    NodeFactory {
        type_name: "Transmuter",
        params: &["to", "from"],
        build: |p| built(Transmuter::new(p.element("to")?, p.element("from")?)),
    },
    NodeFactory {
        type_name: "Amplifier",
        params: &[],
        build: |_| built(Amplifier),
    },
    NodeFactory {
        type_name: "Dampener",
        params: &[],
        build: |_| built(Dampener),
    },
    NodeFactory {
        type_name: "Attenuator",
        params: &["factor"],
        build: |p| built(Attenuator::new(p.float_or("factor", Attenuator::DEFAULT_FACTOR)?)),
    },
    NodeFactory {
        type_name: "Splitter",
        params: &[],
        build: |_| built(Splitter),
    },
    NodeFactory {
        type_name: "Combiner",
        params: &[],
        build: |_| built(Combiner),
    },
    // Containers
    NodeFactory {
        type_name: "QiCapacitor",
        params: &["capacity"],
        build: |p| built(QiCapacitor::new(p.u32_or("capacity", 0)?)),
    },
    NodeFactory {
        type_name: "SpiritVessel",
        params: &[],
        build: |_| built(SpiritVessel),
    },
    NodeFactory {
        type_name: "DualVessel",
        params: &[],
        build: |_| built(DualVessel),
    },
    NodeFactory {
        type_name: "ElementalPool",
        params: &["capacity"],
        build: |p| {
            built(ElementalPool::new(
                p.u32_or("capacity", ElementalPool::DEFAULT_CAPACITY)?,
            ))
        },
    },
    // Control
    NodeFactory {
        type_name: "BurstTrigger",
        params: &[],
        build: |_| built(BurstTrigger),
    },
    NodeFactory {
        type_name: "YinYangGate",
        params: &[],
        build: |_| built(YinYangGate),
    },
    NodeFactory {
        type_name: "ThresholdGate",
        params: &["threshold"],
        build: |p| built(ThresholdGate::new(p.u32_or("threshold", 0)?)),
    },
    NodeFactory {
        type_name: "ElementFilter",
        params: &["element"],
        build: |p| {
            let element = p.require("element", p.element("element")?)?;
            built(ElementFilter::new(element))
        },
    },
    // Modifiers
    NodeFactory {
        type_name: "Stabilizer",
        params: &["bonus"],
        build: |p| built(Stabilizer::new(p.u32_or("bonus", Stabilizer::DEFAULT_BONUS)?)),
    },
    NodeFactory {
        type_name: "Catalyst",
        params: &["reduction"],
        build: |p| {
            built(Catalyst::new(
                p.u32_or("reduction", Catalyst::DEFAULT_REDUCTION)?,
            ))
        },
    },
    NodeFactory {
        type_name: "CoolingChamber",
        params: &[],
        build: |_| built(Chamber::cooling()),
    },
    NodeFactory {
        type_name: "HeatingChamber",
        params: &[],
        build: |_| built(Chamber::heating()),
    },
    // Sinks
    NodeFactory {
        type_name: "QiReceptacle",
        params: &["expected_element", "expected_magnitude"],
        build: |p| {
            built(QiReceptacle::new(
                p.element("expected_element")?,
                p.u32("expected_magnitude")?,
            ))
        },
    },
    NodeFactory {
        type_name: "VoidDrain",
        params: &["bandwidth"],
        build: |p| {
            built(VoidDrain::new(
                p.u32_or("bandwidth", VoidDrain::DEFAULT_BANDWIDTH)?,
            ))
        },
    },
    NodeFactory {
        type_name: "HeatSink",
        params: &[],
        build: |_| built(HeatSink),
    },
    NodeFactory {
        type_name: "GroundingRod",
        params: &[],
        build: |_| built(GroundingRod),
    },
    NodeFactory {
        type_name: "UnstableVent",
        params: &["bandwidth"],
        build: |p| {
            built(UnstableVent::new(
                p.u32_or("bandwidth", UnstableVent::DEFAULT_BANDWIDTH)?,
            ))
        },
    },
    NodeFactory {
        type_name: "BacklashNode",
        params: &["safe_limit"],
        build: |p| {
            built(BacklashNode::new(
                p.u32_or("safe_limit", BacklashNode::DEFAULT_SAFE_LIMIT)?,
            ))
        },
    },
    NodeFactory {
        type_name: "CorruptionSeep",
        params: &[],
        build: |_| built(CorruptionSeep::default()),
    },
    // Interfaces
    NodeFactory {
        type_name: "EffectEmitter",
        params: &["type"],
        build: |p| built(EffectEmitter::new(p.string("type")?.map(str::to_string))),
    },
    NodeFactory {
        type_name: "StableEmitter",
        params: &[],
        build: |_| built(StableEmitter::new()),
    },
    NodeFactory {
        type_name: "OverrunEmitter",
        params: &["threshold"],
        build: |p| {
            built(OverrunEmitter::new(
                p.u32_or("threshold", OverrunEmitter::DEFAULT_THRESHOLD)?,
            ))
        },
    },
    NodeFactory {
        type_name: "FizzleEmitter",
        params: &[],
        build: |_| built(FizzleEmitter::default()),
    },
    NodeFactory {
        type_name: "SkyAntenna",
        params: &[],
        build: |_| built(SkyAntenna),
    },
    // Formation boundary
    NodeFactory {
        type_name: "FormationInput",
        params: &["element", "amplitude"],
        build: |p| {
            let amplitude = p.amplitude("amplitude")?;
            match p.require("element", p.element_spec("element")?)? {
                ElementSpec::Only(element) => built(FormationInput::new(element, amplitude)),
                ElementSpec::Any => built(FormationInput::idle(amplitude)),
            }
        },
    },
    NodeFactory {
        type_name: "FormationOutput",
        params: &["element"],
        build: |_| built(StableEmitter::formation_output()),
    },
];

/// Finds the factory for a registry type name.
pub fn factory(type_name: &str) -> Option<&'static NodeFactory> {
    FACTORIES.iter().find(|f| f.type_name == type_name)
}

fn spirit_stone_socket(p: &ParamReader<'_>) -> Built {
    let element = match p.element("element")? {
        Some(element) if element != ElementType::None => element,
        _ => {
            debug!(node = p.node(), "empty spirit stone socket, skipping");
            return Ok(None);
        }
    };

    let magnitude = match (p.u32("magnitude")?, p.u32("amplitude")?) {
        (Some(m), _) | (None, Some(m)) => m,
        (None, None) => grade_magnitude(p)?,
    };

    let socket = SpiritStoneSocket::new(QiValue::new(element, magnitude));
    match p.u32("cycles")? {
        Some(cycles) => built(socket.with_cycles(cycles)),
        None => built(socket),
    }
}

/// Stone grade to magnitude. An ungraded stone is Low.
fn grade_magnitude(p: &ParamReader<'_>) -> Result<u32, LoadError> {
    let Some(grade) = p.string("grade")? else {
        return Ok(1);
    };
    match grade {
        "Low" => Ok(1),
        "Medium" => Ok(4),
        "High" => Ok(8),
        "Supreme" | "Peak" => Ok(16),
        _ => Err(p.invalid(
            "grade",
            "Low, Medium, High, Supreme or Peak",
            &grade.into(),
        )),
    }
}

fn stone_array(p: &ParamReader<'_>) -> Built {
    let Some(text) = p.string("stones")? else {
        return built(StoneArray::default());
    };
    match StoneArray::parse_stones(text) {
        Some(stones) => built(StoneArray::new(stones)),
        None => Err(p.invalid("stones", "a stone list like \"Fire:4, Fire:8\"", &text.into())),
    }
}

fn cultivator_link(p: &ParamReader<'_>) -> Built {
    let link = match p.element("element")? {
        Some(element) => CultivatorLink::new(QiValue::new(element, p.u32_or("magnitude", 1)?)),
        None => CultivatorLink::default(),
    };
    built(link)
}

/// Turns Graph IR into a runnable [`RuneGraph`].
#[derive(Debug, Clone, Default)]
pub struct GraphLoader {
    config: GraphConfig,
}

impl GraphLoader {
    pub fn new(config: GraphConfig) -> Self {
        GraphLoader { config }
    }

    /// Parses Graph IR JSON and loads it.
    pub fn load(&self, text: &str) -> Result<RuneGraph, LoadError> {
        let definition = GraphDefinition::from_json(text)?;
        self.load_definition(&definition)
    }

    pub fn load_definition(&self, definition: &GraphDefinition) -> Result<RuneGraph, LoadError> {
        let mut graph = RuneGraph::with_config(self.config.clone());
        let mut skipped: HashSet<&str> = HashSet::new();

        for instance in &definition.nodes {
            let factory =
                factory(&instance.node_type).ok_or_else(|| LoadError::UnknownNodeType {
                    id: instance.id.clone(),
                    type_name: instance.node_type.clone(),
                })?;

            for key in instance.params.keys() {
                if !factory.params.contains(&key.as_str()) {
                    debug!(node = %instance.id, param = %key, "ignoring unknown parameter");
                }
            }

            let reader = ParamReader::new(&instance.id, &instance.params);
            match factory.build(&reader)? {
                Some(node) => {
                    graph.add_boxed(instance.id.clone(), node)?;
                }
                None => {
                    skipped.insert(instance.id.as_str());
                }
            }
        }

        for edge in &definition.edges {
            let source = edge.source()?;
            let target = edge.target()?;
            if skipped.contains(source.node.as_str()) || skipped.contains(target.node.as_str()) {
                debug!(from = %edge.from, to = %edge.to, "dropping edge to skipped node");
                continue;
            }
            wire(&mut graph, &source, &target).map_err(|reason| LoadError::Wiring {
                from: edge.from.clone(),
                to: edge.to.clone(),
                reason,
            })?;
        }

        debug!(
            nodes = graph.len(),
            wires = graph.wires().len(),
            skipped = skipped.len(),
            "graph loaded"
        );
        Ok(graph)
    }
}

fn wire(graph: &mut RuneGraph, source: &Endpoint, target: &Endpoint) -> Result<(), SimError> {
    let from = graph.port(&source.node, source.port.as_deref(), PortDirection::Output)?;
    let to = graph.port(&target.node, target.port.as_deref(), PortDirection::Input)?;
    graph.connect(from, to)
}

/// Loads Graph IR JSON with the default configuration.
pub fn load(text: &str) -> Result<RuneGraph, LoadError> {
    GraphLoader::default().load(text)
}

pub fn load_definition(definition: &GraphDefinition) -> Result<RuneGraph, LoadError> {
    GraphLoader::default().load_definition(definition)
}

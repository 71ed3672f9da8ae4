//! Built-in node registry.
//!
//! The closed set of node types known to both the validator (through the
//! symbol table, under the `core` package) and the graph loader (through its
//! factory table). Each [`NodeSignature`] lists its ports in addressing
//! order with an explicit direction; runtime nodes build their port arrays
//! from the same entries.
//!
//! Synthetic types (`FormationInput`, `FormationOutput`) only appear in
//! synthesized Graph IR and are hidden from the symbol table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::element::ElementType;
use crate::error::CoreError;

/// Package under which every non-synthetic built-in is defined.
pub const CORE_PACKAGE: &str = "core";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => f.write_str("input"),
            PortDirection::Output => f.write_str("output"),
        }
    }
}

/// Element accepted by a port: a wildcard or one specific element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementSpec {
    Any,
    Only(ElementType),
}

impl ElementSpec {
    pub fn name(&self) -> &'static str {
        match self {
            ElementSpec::Any => "Any",
            ElementSpec::Only(element) => element.name(),
        }
    }
}

impl fmt::Display for ElementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Any" {
            Ok(ElementSpec::Any)
        } else {
            s.parse().map(ElementSpec::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    pub name: &'static str,
    pub direction: PortDirection,
    pub element: ElementSpec,
}

/// Broad grouping used by the CLI and in docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Source,
    Container,
    Operation,
    Control,
    Modifier,
    Sink,
    Interface,
}

/// Port signature of one built-in node type.
#[derive(Debug, PartialEq, Eq)]
pub struct NodeSignature {
    pub type_name: &'static str,
    pub category: NodeCategory,
    pub ports: &'static [PortSpec],
    pub synthetic: bool,
}

impl NodeSignature {
    pub fn inputs(&self) -> impl Iterator<Item = &PortSpec> {
        self.ports
            .iter()
            .filter(|p| p.direction == PortDirection::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &PortSpec> {
        self.ports
            .iter()
            .filter(|p| p.direction == PortDirection::Output)
    }

    pub fn port(&self, name: &str) -> Option<&PortSpec> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Position of a named port among the ports of the same direction.
    pub fn port_index(&self, direction: PortDirection, name: &str) -> Option<usize> {
        self.ports
            .iter()
            .filter(|p| p.direction == direction)
            .position(|p| p.name == name)
    }

    /// The port an endpoint without a port name resolves to: the one named
    /// `in`/`out`, else the first port of that direction.
    pub fn default_port(&self, direction: PortDirection) -> Option<usize> {
        let conventional = match direction {
            PortDirection::Input => "in",
            PortDirection::Output => "out",
        };
        match self.port_index(direction, conventional) {
            Some(index) => Some(index),
            None => self.ports.iter().any(|p| p.direction == direction).then_some(0),
        }
    }

    /// `core.<TypeName>`.
    pub fn qualified_name(&self) -> String {
        format!("{CORE_PACKAGE}.{}", self.type_name)
    }
}

const fn input(name: &'static str) -> PortSpec {
    PortSpec {
        name,
        direction: PortDirection::Input,
        element: ElementSpec::Any,
    }
}

const fn output(name: &'static str) -> PortSpec {
    PortSpec {
        name,
        direction: PortDirection::Output,
        element: ElementSpec::Any,
    }
}

const fn input_of(name: &'static str, element: ElementType) -> PortSpec {
    PortSpec {
        name,
        direction: PortDirection::Input,
        element: ElementSpec::Only(element),
    }
}

const fn builtin(
    type_name: &'static str,
    category: NodeCategory,
    ports: &'static [PortSpec],
) -> NodeSignature {
    NodeSignature {
        type_name,
        category,
        ports,
        synthetic: false,
    }
}

const IN_OUT: &[PortSpec] = &[input("in"), output("out")];
const SOURCE: &[PortSpec] = &[output("out")];
const SINK: &[PortSpec] = &[input("in")];
const AMPLIFIER: &[PortSpec] = &[input("primary"), input("catalyst"), output("out")];
const DAMPENER: &[PortSpec] = &[input("target"), input("suppressor"), output("out")];
const ATTENUATOR: &[PortSpec] = &[input("in"), output("out"), output("excess")];
const SPLITTER: &[PortSpec] = &[input("in"), output("out1"), output("out2")];
const COMBINER: &[PortSpec] = &[input("in1"), input("in2"), output("out")];
const CAPACITOR: &[PortSpec] = &[input("in"), output("out"), output("full")];
const DUAL_VESSEL: &[PortSpec] = &[input("in1"), input("in2"), output("out1"), output("out2")];
const BURST_TRIGGER: &[PortSpec] = &[input("capacitor"), input("trigger"), output("out")];
const YIN_YANG: &[PortSpec] = &[
    input("in"),
    input("cond"),
    output("true_out"),
    output("false_out"),
];
const THRESHOLD_GATE: &[PortSpec] = &[input("in"), output("pass"), output("block")];
const ELEMENT_FILTER: &[PortSpec] = &[input("in"), output("match"), output("other")];
const OVERRUN: &[PortSpec] = &[input("in"), output("out"), output("feedback")];
const HEAT_SINK: &[PortSpec] = &[input_of("in", ElementType::Fire)];
const SKY_ANTENNA: &[PortSpec] = &[input_of("in", ElementType::Tempest)];

use NodeCategory::*;

/// Every node type, in registry order.
pub static BUILTIN_NODES: &[NodeSignature] = &[
    // Sources
    builtin("SpiritStoneSocket", Source, SOURCE),
    builtin("StoneArray", Source, SOURCE),
    builtin("CultivatorLink", Source, SOURCE),
    // Operations
    builtin("TunedResonator", Operation, IN_OUT),
    builtin("AmplitudeRegulator", Operation, IN_OUT),
    builtin("Transmuter", Operation, IN_OUT),
    builtin("Amplifier", Operation, AMPLIFIER),
    builtin("Dampener", Operation, DAMPENER),
    builtin("Attenuator", Operation, ATTENUATOR),
    builtin("Splitter", Operation, SPLITTER),
    builtin("Combiner", Operation, COMBINER),
    // Containers
    builtin("QiCapacitor", Container, CAPACITOR),
    builtin("SpiritVessel", Container, IN_OUT),
    builtin("DualVessel", Container, DUAL_VESSEL),
    builtin("ElementalPool", Container, IN_OUT),
    // Control
    builtin("BurstTrigger", Control, BURST_TRIGGER),
    builtin("YinYangGate", Control, YIN_YANG),
    builtin("ThresholdGate", Control, THRESHOLD_GATE),
    builtin("ElementFilter", Control, ELEMENT_FILTER),
    // Modifiers
    builtin("Stabilizer", Modifier, IN_OUT),
    builtin("Catalyst", Modifier, IN_OUT),
    builtin("CoolingChamber", Modifier, IN_OUT),
    builtin("HeatingChamber", Modifier, IN_OUT),
    // Sinks
    builtin("QiReceptacle", Sink, SINK),
    builtin("VoidDrain", Sink, SINK),
    builtin("HeatSink", Sink, HEAT_SINK),
    builtin("GroundingRod", Sink, SINK),
    builtin("UnstableVent", Sink, SINK),
    builtin("BacklashNode", Sink, SINK),
    builtin("CorruptionSeep", Sink, SINK),
    // Interfaces
    builtin("EffectEmitter", Interface, IN_OUT),
    builtin("StableEmitter", Interface, SINK),
    builtin("OverrunEmitter", Interface, OVERRUN),
    builtin("FizzleEmitter", Interface, IN_OUT),
    builtin("SkyAntenna", Interface, SKY_ANTENNA),
    // Formation boundary
    NodeSignature {
        type_name: FORMATION_INPUT,
        category: Source,
        ports: SOURCE,
        synthetic: true,
    },
    NodeSignature {
        type_name: FORMATION_OUTPUT,
        category: Interface,
        ports: SINK,
        synthetic: true,
    },
];

/// Synthetic source standing in for a formation-level `input` port.
pub const FORMATION_INPUT: &str = "FormationInput";
/// Synthetic sink standing in for a formation-level `output` port.
pub const FORMATION_OUTPUT: &str = "FormationOutput";

/// Finds a signature by bare type name.
pub fn lookup(type_name: &str) -> Option<&'static NodeSignature> {
    BUILTIN_NODES.iter().find(|sig| sig.type_name == type_name)
}

/// Like [`lookup`], as a `Result`.
pub fn signature(type_name: &str) -> Result<&'static NodeSignature, CoreError> {
    lookup(type_name).ok_or_else(|| CoreError::UnknownNodeType {
        name: type_name.to_string(),
    })
}

/// Non-synthetic signatures: the ones users may declare.
pub fn declarable() -> impl Iterator<Item = &'static NodeSignature> {
    BUILTIN_NODES.iter().filter(|sig| !sig.synthetic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn type_names_are_unique() {
        let names: HashSet<_> = BUILTIN_NODES.iter().map(|s| s.type_name).collect();
        assert_eq!(names.len(), BUILTIN_NODES.len());
    }

    #[test]
    fn port_names_are_unique_per_node() {
        for sig in BUILTIN_NODES {
            let names: HashSet<_> = sig.ports.iter().map(|p| p.name).collect();
            assert_eq!(names.len(), sig.ports.len(), "{}", sig.type_name);
        }
    }

    #[test]
    fn declarable_count() {
        assert_eq!(declarable().count(), 35);
        assert_eq!(BUILTIN_NODES.len(), 37);
    }

    #[test]
    fn default_ports_prefer_conventional_names() {
        let capacitor = lookup("QiCapacitor").unwrap();
        assert_eq!(capacitor.default_port(PortDirection::Output), Some(0));
        assert_eq!(capacitor.port_index(PortDirection::Output, "full"), Some(1));

        let splitter = lookup("Splitter").unwrap();
        assert_eq!(splitter.default_port(PortDirection::Output), Some(0));

        let amplifier = lookup("Amplifier").unwrap();
        assert_eq!(amplifier.default_port(PortDirection::Input), Some(0));

        let socket = lookup("SpiritStoneSocket").unwrap();
        assert_eq!(socket.default_port(PortDirection::Input), None);
    }

    #[test]
    fn only_two_ports_are_element_restricted() {
        let restricted: Vec<_> = BUILTIN_NODES
            .iter()
            .flat_map(|sig| sig.ports.iter().map(move |p| (sig.type_name, p)))
            .filter(|(_, p)| p.element != ElementSpec::Any)
            .map(|(t, p)| (t, p.element))
            .collect();
        assert_eq!(
            restricted,
            vec![
                ("HeatSink", ElementSpec::Only(ElementType::Fire)),
                ("SkyAntenna", ElementSpec::Only(ElementType::Tempest)),
            ]
        );
    }

    #[test]
    fn element_spec_parses_any() {
        assert_eq!("Any".parse::<ElementSpec>().unwrap(), ElementSpec::Any);
        assert_eq!(
            "Fire".parse::<ElementSpec>().unwrap(),
            ElementSpec::Only(ElementType::Fire)
        );
        assert!("Aether".parse::<ElementSpec>().is_err());
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(matches!(
            signature("Teleporter"),
            Err(CoreError::UnknownNodeType { .. })
        ));
        assert_eq!(lookup("Amplifier").unwrap().qualified_name(), "core.Amplifier");
    }
}

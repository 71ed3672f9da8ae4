//! Lowering of a validated formation into Graph IR.
//!
//! - Every `node` declaration becomes a [`NodeInstance`] with its parameters
//!   copied in declaration order. The type is the resolved symbol's name.
//! - Every connection becomes an [`EdgeInstance`]: `node.port` for instance
//!   ports, the bare name for formation-level ports.
//! - Every formation-level port becomes a synthetic node: `input` ports a
//!   `FormationInput` source, `output` ports a `FormationOutput` sink.
//!
//! Directions and element types are not re-checked here.

use runic_core::registry::{FORMATION_INPUT, FORMATION_OUTPUT};
use runic_core::{EdgeInstance, GraphDefinition, NodeInstance, ParamValue, Params, PortDirection};
use tracing::debug;

use crate::semantics::SymbolTable;
use crate::syntax::{CompilationUnit, FormationDefinition, NodeDefinition, PortReference, Value};

pub struct GraphBuilder<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        GraphBuilder { symbols }
    }

    pub fn build(&self, formation: &FormationDefinition, unit: &CompilationUnit) -> GraphDefinition {
        let mut graph = GraphDefinition::new();

        for node in formation.nodes() {
            graph.nodes.push(NodeInstance {
                id: node.instance_name.clone(),
                node_type: self.type_name(node, unit),
                params: params(node),
            });
        }

        for conn in formation.connections() {
            graph
                .edges
                .push(EdgeInstance::new(endpoint(&conn.source), endpoint(&conn.target)));
        }

        for port in formation.ports() {
            let node = match port.direction {
                PortDirection::Input => NodeInstance::new(&port.name, FORMATION_INPUT)
                    .with_param("element", port.element_type.as_str())
                    .with_param(
                        "amplitude",
                        port.amplitude.unwrap_or_default().to_string(),
                    ),
                PortDirection::Output => NodeInstance::new(&port.name, FORMATION_OUTPUT)
                    .with_param("element", port.element_type.as_str()),
            };
            graph.nodes.push(node);
        }

        debug!(
            formation = %formation.name,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "synthesized graph"
        );
        graph
    }

    fn type_name(&self, node: &NodeDefinition, unit: &CompilationUnit) -> String {
        self.symbols
            .resolve(&node.type_name, &unit.imports)
            .map_or_else(|| node.type_name.clone(), |symbol| symbol.name.clone())
    }
}

fn params(node: &NodeDefinition) -> Params {
    node.parameters
        .iter()
        .map(|p| (p.name.clone(), param_value(&p.value)))
        .collect()
}

fn param_value(value: &Value) -> ParamValue {
    match value {
        Value::Str(s) | Value::Ident(s) => ParamValue::Str(s.clone()),
        Value::Int(n) => ParamValue::Int(*n),
        Value::Float(x) => ParamValue::Float(*x),
        Value::Bool(b) => ParamValue::Bool(*b),
    }
}

fn endpoint(reference: &PortReference) -> String {
    match &reference.port_name {
        Some(port) => format!("{}.{}", reference.node_name, port),
        None => reference.node_name.clone(),
    }
}

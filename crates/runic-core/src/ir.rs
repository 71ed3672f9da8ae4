//! Graph IR: the flat node/edge form of a formation.
//!
//! Produced by the synthesizer, consumed by the loader, and serialized as
//! JSON:
//!
//! ```json
//! { "nodes": [{ "id": "src", "type": "SpiritStoneSocket", "params": { "element": "Fire" } }],
//!   "edges": [{ "from": "src.out", "to": "cap.in" }] }
//! ```
//!
//! Parameter maps keep declaration order (`IndexMap`), so the same formation
//! always serializes to the same text.

use std::fmt;

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A node parameter as it appears in source and IR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(x) => Some(*x),
            ParamValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short shape name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "integer",
            ParamValue::Float(_) => "float",
            ParamValue::Str(_) => "string",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(x) => write!(f, "{x:?}"),
            ParamValue::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

pub type Params = IndexMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub params: Params,
}

impl NodeInstance {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        NodeInstance {
            id: id.into(),
            node_type: node_type.into(),
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeInstance {
    pub from: String,
    pub to: String,
}

impl EdgeInstance {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        EdgeInstance {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn source(&self) -> Result<Endpoint, CoreError> {
        Endpoint::parse(&self.from)
    }

    pub fn target(&self) -> Result<Endpoint, CoreError> {
        Endpoint::parse(&self.to)
    }
}

/// One side of an edge: `node.port`, or a bare `node` for its default port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub node: String,
    pub port: Option<String>,
}

impl Endpoint {
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let invalid = || CoreError::InvalidEndpoint {
            text: text.to_string(),
        };
        let (node, port) = match text.split_once('.') {
            Some((node, port)) => {
                if port.is_empty() || port.contains('.') {
                    return Err(invalid());
                }
                (node, Some(port.to_string()))
            }
            None => (text, None),
        };
        if node.is_empty() {
            return Err(invalid());
        }
        Ok(Endpoint {
            node: node.to_string(),
            port,
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.port {
            Some(port) => write!(f, "{}.{}", self.node, port),
            None => f.write_str(&self.node),
        }
    }
}

/// A complete, directly loadable formation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    #[serde(default)]
    pub nodes: Vec<NodeInstance>,
    #[serde(default)]
    pub edges: Vec<EdgeInstance>,
}

impl GraphDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn node(&self, id: &str) -> Option<&NodeInstance> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Groups of node ids that feed energy back into themselves: strongly
    /// connected components with more than one node, or a node wired to
    /// itself. Members keep declaration order; groups are ordered by their
    /// first member. Edges with unparseable or dangling endpoints are
    /// ignored.
    pub fn feedback_loops(&self) -> Vec<Vec<String>> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let indices: IndexMap<&str, NodeIndex> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.id.as_str(), graph.add_node(position)))
            .collect();

        let mut self_loops = vec![false; self.nodes.len()];
        for edge in &self.edges {
            let (Ok(source), Ok(target)) = (edge.source(), edge.target()) else {
                continue;
            };
            let (Some(&a), Some(&b)) = (
                indices.get(source.node.as_str()),
                indices.get(target.node.as_str()),
            ) else {
                continue;
            };
            if a == b {
                self_loops[graph[a]] = true;
            }
            graph.add_edge(a, b, ());
        }

        let mut groups: Vec<Vec<usize>> = tarjan_scc(&graph)
            .into_iter()
            .map(|component| {
                let mut members: Vec<usize> = component.iter().map(|&ix| graph[ix]).collect();
                members.sort_unstable();
                members
            })
            .filter(|members| members.len() > 1 || self_loops[members[0]])
            .collect();
        groups.sort_by_key(|members| members[0]);

        groups
            .into_iter()
            .map(|members| {
                members
                    .into_iter()
                    .map(|position| self.nodes[position].id.clone())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphDefinition {
        GraphDefinition {
            nodes: vec![
                NodeInstance::new("src", "SpiritStoneSocket")
                    .with_param("element", "Fire")
                    .with_param("grade", "Medium"),
                NodeInstance::new("cap", "QiCapacitor").with_param("capacity", 10i64),
                NodeInstance::new("att", "Attenuator").with_param("factor", 0.5),
            ],
            edges: vec![
                EdgeInstance::new("src.out", "cap.in"),
                EdgeInstance::new("cap.full", "att"),
            ],
        }
    }

    #[test]
    fn json_uses_type_key_and_keeps_param_order() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"type\": \"SpiritStoneSocket\""));
        let element = json.find("\"element\"").unwrap();
        let grade = json.find("\"grade\"").unwrap();
        assert!(element < grade);
        assert_eq!(GraphDefinition::from_json(&json).unwrap(), sample());
    }

    #[test]
    fn untagged_params_pick_the_narrowest_shape() {
        let graph = GraphDefinition::from_json(
            r#"{"nodes":[{"id":"n","type":"T","params":{"a":true,"b":3,"c":1.5,"d":"x"}}]}"#,
        )
        .unwrap();
        let params = &graph.nodes[0].params;
        assert_eq!(params["a"], ParamValue::Bool(true));
        assert_eq!(params["b"], ParamValue::Int(3));
        assert_eq!(params["c"], ParamValue::Float(1.5));
        assert_eq!(params["d"], ParamValue::Str("x".into()));
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            GraphDefinition::from_json("{ nodes: "),
            Err(CoreError::MalformedIr(_))
        ));
    }

    #[test]
    fn endpoints_parse_and_display() {
        let qualified = Endpoint::parse("cap.full").unwrap();
        assert_eq!(qualified.node, "cap");
        assert_eq!(qualified.port.as_deref(), Some("full"));
        assert_eq!(qualified.to_string(), "cap.full");

        let bare = Endpoint::parse("power").unwrap();
        assert_eq!(bare.port, None);
        assert_eq!(bare.to_string(), "power");

        assert!(Endpoint::parse("").is_err());
        assert!(Endpoint::parse(".out").is_err());
        assert!(Endpoint::parse("cap.").is_err());
        assert!(Endpoint::parse("a.b.c").is_err());
    }

    #[test]
    fn acyclic_graph_has_no_feedback_loops() {
        assert!(sample().feedback_loops().is_empty());
    }

    #[test]
    fn feedback_loops_report_cycles_and_self_loops() {
        let graph = GraphDefinition {
            nodes: vec![
                NodeInstance::new("src", "SpiritStoneSocket"),
                NodeInstance::new("a", "SpiritVessel"),
                NodeInstance::new("b", "SpiritVessel"),
                NodeInstance::new("echo", "SpiritVessel"),
            ],
            edges: vec![
                EdgeInstance::new("src", "a"),
                EdgeInstance::new("a.out", "b.in"),
                EdgeInstance::new("b.out", "a.in"),
                EdgeInstance::new("echo.out", "echo.in"),
                EdgeInstance::new("ghost.out", "a.in"),
            ],
        };
        assert_eq!(
            graph.feedback_loops(),
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["echo".to_string()],
            ]
        );
    }
}

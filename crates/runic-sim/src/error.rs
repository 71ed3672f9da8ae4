//! Error types for graph construction and loading.
//!
//! Simulation conditions (deviations, overloads, uncontained energy) are log
//! lines, never errors. The types here cover the two fatal tiers:
//! - [`SimError`]: misuse of the [`crate::RuneGraph`] construction API.
//! - [`LoadError`]: a Graph IR artifact that cannot be turned into a graph.

use runic_core::{CoreError, PortDirection};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("node '{id}' already exists")]
    DuplicateNode { id: String },

    #[error("node '{id}' not found")]
    UnknownNode { id: String },

    #[error("node '{node}' has no {direction} port '{port}'")]
    UnknownPort {
        node: String,
        port: String,
        direction: PortDirection,
    },

    #[error("node '{node}' has no {direction} port to use as default")]
    NoDefaultPort {
        node: String,
        direction: PortDirection,
    },

    /// Wires run from an output port to an input port.
    #[error("invalid wire {from} -> {to}: must connect output -> input")]
    InvalidWire { from: String, to: String },

    #[error("node type '{type_name}' is not in the built-in registry")]
    UnregisteredType { type_name: String },

    #[error("node '{id}' does not accept injected values")]
    NotInjectable { id: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed graph IR: {0}")]
    Malformed(#[from] CoreError),

    #[error("node '{id}': unknown node type '{type_name}'")]
    UnknownNodeType { id: String, type_name: String },

    #[error("node '{node}': missing required parameter '{param}'")]
    MissingParam { node: String, param: &'static str },

    #[error("node '{node}': parameter '{param}' expects {expected}, got {found}")]
    InvalidParam {
        node: String,
        param: String,
        expected: &'static str,
        found: String,
    },

    #[error("edge {from} -> {to}: {reason}")]
    Wiring {
        from: String,
        to: String,
        reason: SimError,
    },

    #[error(transparent)]
    Graph(#[from] SimError),
}

//! Core error types for runic-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering
//! element names, amplitude notation and Graph IR decoding.

use thiserror::Error;

/// Core errors produced by the runic-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An element name that is not part of the taxonomy.
    #[error("unknown element: '{name}'")]
    UnknownElement { name: String },

    /// A node type name missing from the built-in registry.
    #[error("unknown node type: '{name}'")]
    UnknownNodeType { name: String },

    /// Amplitude text that is not `n`, `n+` or `a..b`.
    #[error("invalid amplitude: '{text}'")]
    InvalidAmplitude { text: String },

    /// An IR endpoint that is not `node` or `node.port`.
    #[error("invalid endpoint: '{text}'")]
    InvalidEndpoint { text: String },

    /// Graph IR text that is not valid JSON of the expected shape.
    #[error("malformed graph IR: {0}")]
    MalformedIr(#[from] serde_json::Error),
}

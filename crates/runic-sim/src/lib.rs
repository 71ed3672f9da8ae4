//! Tick-based simulation of compiled formations.
//!
//! A [`RuneGraph`] owns an arena of [`RuneNode`]s and the [`Wire`]s between
//! their ports. [`GraphLoader`] builds one from Graph IR; the node library
//! in [`nodes`] can also be wired up by hand.

pub mod error;
pub mod graph;
pub mod loader;
pub mod node;
pub mod nodes;
pub mod params;
pub mod port;

// Re-export commonly used types
pub use error::{LoadError, SimError};
pub use graph::{GraphConfig, RuneGraph, TickTrace, Wire};
pub use loader::{load, load_definition, GraphLoader, NodeFactory, FACTORIES};
pub use node::{Node, NodeIo, RuneNode};
pub use params::ParamReader;
pub use port::{Port, PortHandle};

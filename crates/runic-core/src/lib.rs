pub mod element;
pub mod qi;
pub mod interaction;
pub mod amplitude;
pub mod registry;
pub mod ir;
pub mod error;

// Re-export commonly used types
pub use element::{ElementClass, ElementType};
pub use qi::{QiEffect, QiValue};
pub use interaction::{combine, combine_detailed, process_decay, Combination};
pub use amplitude::AmplitudeSpec;
pub use registry::{ElementSpec, NodeCategory, NodeSignature, PortDirection, PortSpec};
pub use ir::{EdgeInstance, Endpoint, GraphDefinition, NodeInstance, ParamValue, Params};
pub use error::CoreError;

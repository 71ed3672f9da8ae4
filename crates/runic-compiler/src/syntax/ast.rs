//! RunicHDL abstract syntax tree.
//!
//! Every node carries the [`Span`] it was parsed from. Statements keep
//! source order; the validator and synthesizer iterate them by kind through
//! the helpers on [`FormationDefinition`].

use runic_core::{AmplitudeSpec, PortDirection};

use super::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub package: PackageDeclaration,
    pub imports: Vec<ImportStatement>,
    pub formations: Vec<FormationDefinition>,
    pub span: Span,
}

impl CompilationUnit {
    pub fn formation(&self, name: &str) -> Option<&FormationDefinition> {
        self.formations.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDeclaration {
    pub qualified_id: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    /// Dotted path without the trailing `.*`.
    pub qualified_id: String,
    pub is_wildcard: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormationDefinition {
    pub name: String,
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl FormationDefinition {
    pub fn ports(&self) -> impl Iterator<Item = &PortDefinition> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Port(port) => Some(port),
            _ => None,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Node(node) => Some(node),
            _ => None,
        })
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectionDefinition> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Connection(conn) => Some(conn),
            _ => None,
        })
    }

    /// First formation-level port with this name.
    pub fn port(&self, name: &str) -> Option<&PortDefinition> {
        self.ports().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Port(PortDefinition),
    Node(NodeDefinition),
    Connection(ConnectionDefinition),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Port(port) => port.span,
            Statement::Node(node) => node.span,
            Statement::Connection(conn) => conn.span,
        }
    }
}

/// `input Fire ignition [5+];`
#[derive(Debug, Clone, PartialEq)]
pub struct PortDefinition {
    pub direction: PortDirection,
    pub element_type: String,
    pub name: String,
    pub amplitude: Option<AmplitudeSpec>,
    pub span: Span,
}

/// `node QiCapacitor cap ( capacity: 50 );`
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDefinition {
    pub type_name: String,
    pub instance_name: String,
    pub parameters: Vec<NodeParameter>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeParameter {
    pub name: String,
    pub value: Value,
    pub span: Span,
}

/// A parameter value as written. Bare identifiers (`element: Fire`) are
/// kept apart from quoted strings so printing reproduces the source form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Ident(String),
}

/// `src.out -> cap.in;`
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDefinition {
    pub source: PortReference,
    pub target: PortReference,
    pub span: Span,
}

/// `node.port`, or a bare name for a formation-level port.
#[derive(Debug, Clone, PartialEq)]
pub struct PortReference {
    pub node_name: String,
    pub port_name: Option<String>,
    pub span: Span,
}

impl PortReference {
    pub fn is_local(&self) -> bool {
        self.port_name.is_none()
    }
}

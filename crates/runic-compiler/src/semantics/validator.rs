//! Semantic validation of a parsed compilation unit.
//!
//! Validation never stops early: every import and every formation is
//! checked and all diagnostics are returned together.
//!
//! Per formation:
//! - formation-level ports: duplicate names, element names, empty ranges;
//! - node declarations: type resolution through the [`SymbolTable`],
//!   duplicate instance names (the first definition stays in scope);
//! - connections: endpoint resolution, direction, element compatibility;
//! - resolved nodes no connection mentions are reported as warnings.

use std::collections::HashSet;

use indexmap::IndexMap;
use runic_core::{ElementSpec, PortDirection};
use tracing::debug;

use super::diagnostics::{CompilerError, ErrorCode};
use super::symbols::{Symbol, SymbolTable};
use crate::syntax::{
    CompilationUnit, ConnectionDefinition, FormationDefinition, ImportStatement, PortReference,
    Span,
};

/// Validates `unit` against the built-in symbol table.
pub fn validate(unit: &CompilationUnit) -> Vec<CompilerError> {
    Validator::new(&SymbolTable::new()).validate(unit)
}

pub struct Validator<'a> {
    symbols: &'a SymbolTable,
}

/// Instance name -> resolved type and declaring span, in declaration order.
type Scope<'u> = IndexMap<&'u str, (&'u Symbol, Span)>;

/// A connection endpoint that resolved to a declared port.
struct ResolvedPort {
    element: String,
    direction: PortDirection,
    /// A formation-level port rather than a node instance port.
    local: bool,
}

impl ResolvedPort {
    fn can_drive(&self) -> bool {
        match self.direction {
            PortDirection::Output => !self.local,
            PortDirection::Input => self.local,
        }
    }

    fn can_receive(&self) -> bool {
        match self.direction {
            PortDirection::Input => !self.local,
            PortDirection::Output => self.local,
        }
    }
}

impl<'a> Validator<'a> {
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Validator { symbols }
    }

    pub fn validate(&self, unit: &CompilationUnit) -> Vec<CompilerError> {
        let mut diagnostics = Vec::new();

        for import in &unit.imports {
            self.check_import(import, &mut diagnostics);
        }
        for formation in &unit.formations {
            let before = diagnostics.len();
            self.check_formation(formation, &unit.imports, &mut diagnostics);
            debug!(
                formation = %formation.name,
                diagnostics = diagnostics.len() - before,
                "validated formation"
            );
        }

        diagnostics
    }

    fn check_import(&self, import: &ImportStatement, out: &mut Vec<CompilerError>) {
        if import.is_wildcard {
            if !self.symbols.has_package(&import.qualified_id) {
                out.push(
                    CompilerError::error(
                        ErrorCode::UnresolvedPackage,
                        import.span,
                        format!(
                            "Imported package '{}' does not exist or has no visible members.",
                            import.qualified_id
                        ),
                    )
                    .with_token(&import.qualified_id),
                );
            }
        } else if !self.symbols.is_defined(&import.qualified_id) {
            out.push(
                CompilerError::error(
                    ErrorCode::UnresolvedImport,
                    import.span,
                    format!(
                        "Imported symbol '{}' could not be resolved.",
                        import.qualified_id
                    ),
                )
                .with_token(&import.qualified_id),
            );
        }
    }

    fn check_formation(
        &self,
        formation: &FormationDefinition,
        imports: &[ImportStatement],
        out: &mut Vec<CompilerError>,
    ) {
        let mut port_names = HashSet::new();
        for port in formation.ports() {
            if !port_names.insert(port.name.as_str()) {
                out.push(
                    CompilerError::error(
                        ErrorCode::DuplicateDefinition,
                        port.span,
                        format!("Port '{}' is already defined in formation.", port.name),
                    )
                    .with_token(&port.name),
                );
            }
            if port.element_type.parse::<ElementSpec>().is_err() {
                out.push(
                    CompilerError::error(
                        ErrorCode::IncompatibleElements,
                        port.span,
                        format!(
                            "Unknown element '{}' for port '{}'.",
                            port.element_type, port.name
                        ),
                    )
                    .with_token(&port.element_type),
                );
            }
            if let Some(amplitude) = port.amplitude.filter(|a| a.is_inverted()) {
                out.push(
                    CompilerError::error(
                        ErrorCode::AmplitudeMismatch,
                        port.span,
                        format!(
                            "Amplitude range [{amplitude}] of port '{}' is empty.",
                            port.name
                        ),
                    )
                    .with_token(&port.name),
                );
            }
        }

        let mut scope: Scope<'_> = IndexMap::new();
        let mut instance_names = HashSet::new();
        for node in formation.nodes() {
            let resolved = self.symbols.resolve(&node.type_name, imports);
            if resolved.is_none() {
                out.push(
                    CompilerError::error(
                        ErrorCode::UnknownNodeType,
                        node.span,
                        format!(
                            "Unknown node type '{}' for instance '{}'.",
                            node.type_name, node.instance_name
                        ),
                    )
                    .with_token(&node.type_name),
                );
            }

            let name = node.instance_name.as_str();
            if !instance_names.insert(name) || port_names.contains(name) {
                out.push(
                    CompilerError::error(
                        ErrorCode::DuplicateDefinition,
                        node.span,
                        format!("Name '{name}' is already defined in formation."),
                    )
                    .with_token(name),
                );
                continue;
            }
            if let Some(symbol) = resolved {
                scope.insert(name, (symbol, node.span));
            }
        }

        let mut referenced = HashSet::new();
        for conn in formation.connections() {
            for reference in [&conn.source, &conn.target] {
                if !reference.is_local() {
                    referenced.insert(reference.node_name.as_str());
                }
            }
            self.check_connection(conn, formation, &scope, out);
        }

        for (name, (_, span)) in &scope {
            if !referenced.contains(name) {
                out.push(
                    CompilerError::warning(
                        ErrorCode::UnusedNode,
                        *span,
                        format!("Node instance '{name}' is never connected."),
                    )
                    .with_token(*name),
                );
            }
        }
    }

    fn check_connection(
        &self,
        conn: &ConnectionDefinition,
        formation: &FormationDefinition,
        scope: &Scope<'_>,
        out: &mut Vec<CompilerError>,
    ) {
        let source = self.resolve_port(&conn.source, formation, scope, out);
        let target = self.resolve_port(&conn.target, formation, scope, out);
        let (Some(source), Some(target)) = (source, target) else {
            return;
        };

        let mut directions_ok = true;
        if !source.can_drive() {
            directions_ok = false;
            out.push(
                CompilerError::error(
                    ErrorCode::PortDirectionMismatch,
                    conn.source.span,
                    format!(
                        "'{}' is an {} and cannot be a connection source.",
                        conn.source,
                        describe(&source)
                    ),
                )
                .with_token(conn.source.to_string()),
            );
        }
        if !target.can_receive() {
            directions_ok = false;
            out.push(
                CompilerError::error(
                    ErrorCode::PortDirectionMismatch,
                    conn.target.span,
                    format!(
                        "'{}' is an {} and cannot be a connection target.",
                        conn.target,
                        describe(&target)
                    ),
                )
                .with_token(conn.target.to_string()),
            );
        }
        if !directions_ok {
            return;
        }

        if !compatible(&source.element, &target.element) {
            out.push(
                CompilerError::error(
                    ErrorCode::IncompatibleElements,
                    conn.span,
                    format!(
                        "Incompatible elements: {} ({}) -> {} ({}).",
                        conn.source, source.element, conn.target, target.element
                    ),
                )
                .with_token(format!("{} -> {}", source.element, target.element)),
            );
        }
    }

    fn resolve_port(
        &self,
        reference: &PortReference,
        formation: &FormationDefinition,
        scope: &Scope<'_>,
        out: &mut Vec<CompilerError>,
    ) -> Option<ResolvedPort> {
        let Some(port_name) = &reference.port_name else {
            let Some(local) = formation.port(&reference.node_name) else {
                out.push(
                    CompilerError::error(
                        ErrorCode::PortNotFound,
                        reference.span,
                        format!("Port '{}' not found in formation.", reference.node_name),
                    )
                    .with_token(&reference.node_name),
                );
                return None;
            };
            return Some(ResolvedPort {
                element: local.element_type.clone(),
                direction: local.direction,
                local: true,
            });
        };

        let Some((symbol, _)) = scope.get(reference.node_name.as_str()) else {
            out.push(
                CompilerError::error(
                    ErrorCode::UndefinedNodeInstance,
                    reference.span,
                    format!("Node instance '{}' not defined.", reference.node_name),
                )
                .with_token(&reference.node_name),
            );
            return None;
        };

        let Some(port) = symbol.port(port_name) else {
            out.push(
                CompilerError::error(
                    ErrorCode::UndefinedPort,
                    reference.span,
                    format!("Type '{}' does not have port '{}'.", symbol.name, port_name),
                )
                .with_token(port_name),
            );
            return None;
        };

        Some(ResolvedPort {
            element: port.element.clone(),
            direction: port.direction,
            local: false,
        })
    }
}

fn describe(port: &ResolvedPort) -> &'static str {
    match (port.local, port.direction) {
        (false, PortDirection::Input) => "input port",
        (false, PortDirection::Output) => "output port",
        (true, PortDirection::Input) => "input of the formation",
        (true, PortDirection::Output) => "output of the formation",
    }
}

/// `Any` matches everything; otherwise the names must be equal.
fn compatible(source: &str, target: &str) -> bool {
    source == "Any" || target == "Any" || source == target
}

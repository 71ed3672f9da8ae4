//! Symbol table of node types visible to RunicHDL sources.
//!
//! Seeded with every declarable entry of the built-in registry under
//! `core.<Type>`. Further symbols can be defined, e.g. a formation exposed
//! as a reusable type; a symbol only records a name and a port signature.

use indexmap::IndexMap;
use runic_core::registry::{self, NodeSignature, CORE_PACKAGE};
use runic_core::PortDirection;

use crate::syntax::{FormationDefinition, ImportStatement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolPort {
    pub name: String,
    pub direction: PortDirection,
    /// Element name, or `Any`.
    pub element: String,
}

/// A resolvable node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ports: Vec<SymbolPort>,
}

impl Symbol {
    pub fn from_signature(signature: &NodeSignature) -> Self {
        Symbol {
            name: signature.type_name.to_string(),
            ports: signature
                .ports
                .iter()
                .map(|p| SymbolPort {
                    name: p.name.to_string(),
                    direction: p.direction,
                    element: p.element.name().to_string(),
                })
                .collect(),
        }
    }

    /// The formation's own `input`/`output` declarations become its ports.
    pub fn from_formation(formation: &FormationDefinition) -> Self {
        Symbol {
            name: formation.name.clone(),
            ports: formation
                .ports()
                .map(|p| SymbolPort {
                    name: p.name.clone(),
                    direction: p.direction,
                    element: p.element_type.clone(),
                })
                .collect(),
        }
    }

    pub fn port(&self, name: &str) -> Option<&SymbolPort> {
        self.ports.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
}

impl SymbolTable {
    /// A table holding the built-in node types.
    pub fn new() -> Self {
        let mut table = SymbolTable::empty();
        for signature in registry::declarable() {
            table.define(signature.qualified_name(), Symbol::from_signature(signature));
        }
        table
    }

    pub fn empty() -> Self {
        SymbolTable {
            symbols: IndexMap::new(),
        }
    }

    /// Defines or replaces a symbol.
    pub fn define(&mut self, qualified_name: impl Into<String>, symbol: Symbol) {
        self.symbols.insert(qualified_name.into(), symbol);
    }

    pub fn lookup(&self, qualified_name: &str) -> Option<&Symbol> {
        self.symbols.get(qualified_name)
    }

    pub fn is_defined(&self, qualified_name: &str) -> bool {
        self.symbols.contains_key(qualified_name)
    }

    /// Whether any symbol lives under `package.`.
    pub fn has_package(&self, package: &str) -> bool {
        let prefix = format!("{package}.");
        self.symbols.keys().any(|key| key.starts_with(&prefix))
    }

    /// Resolves a type name as written in a `node` declaration.
    ///
    /// Tries, in order: the name itself, `core.<name>`, then each import:
    /// `<import>.<name>` for wildcard imports, or the import itself when it
    /// ends in `.<name>`. The first hit wins.
    pub fn resolve(&self, type_name: &str, imports: &[ImportStatement]) -> Option<&Symbol> {
        if let Some(symbol) = self.lookup(type_name) {
            return Some(symbol);
        }
        if let Some(symbol) = self.lookup(&format!("{CORE_PACKAGE}.{type_name}")) {
            return Some(symbol);
        }

        let suffix = format!(".{type_name}");
        imports.iter().find_map(|import| {
            if import.is_wildcard {
                self.lookup(&format!("{}.{}", import.qualified_id, type_name))
            } else if import.qualified_id.ends_with(&suffix) {
                self.lookup(&import.qualified_id)
            } else {
                None
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.symbols.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}

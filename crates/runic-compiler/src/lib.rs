//! RunicHDL compiler: source text to Graph IR.
//!
//! Pipeline:
//! - [`syntax::parse`]: text to AST, failing on the first syntax error.
//! - [`semantics::Validator`]: AST to diagnostics, never failing early.
//! - [`synth::GraphBuilder`]: one formation to a self-contained
//!   [`GraphDefinition`].
//!
//! [`compile`] runs all three with [`CompileOptions`].

pub mod semantics;
pub mod synth;
pub mod syntax;

use runic_core::GraphDefinition;
use thiserror::Error;
use tracing::debug;

pub use semantics::{CompilerError, ErrorCode, Severity, SymbolTable, Validator};
pub use synth::GraphBuilder;
pub use syntax::{parse, CompilationUnit, ParseError};

/// Options for [`compile`].
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Formation to lower; the first one in the unit when `None`.
    pub entry_formation: Option<String>,
    /// Treat warnings as fatal.
    pub deny_warnings: bool,
}

/// A successfully lowered formation.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub formation: String,
    pub graph: GraphDefinition,
    pub warnings: Vec<CompilerError>,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    /// Validation produced errors (or warnings, with `deny_warnings`).
    #[error("validation failed with {} diagnostic(s)", .0.len())]
    Validation(Vec<CompilerError>),

    #[error("source defines no formation")]
    NoFormation,

    #[error("formation '{name}' not found")]
    UnknownFormation { name: String },
}

/// Parses, validates and lowers one formation of `source`.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Compiled, CompileError> {
    let unit = parse(source)?;
    let symbols = SymbolTable::new();

    let diagnostics = Validator::new(&symbols).validate(&unit);
    let fatal = diagnostics
        .iter()
        .any(|d| d.is_error() || options.deny_warnings);
    if fatal {
        return Err(CompileError::Validation(diagnostics));
    }

    let formation = match &options.entry_formation {
        Some(name) => unit
            .formation(name)
            .ok_or_else(|| CompileError::UnknownFormation { name: name.clone() })?,
        None => unit.formations.first().ok_or(CompileError::NoFormation)?,
    };

    let graph = GraphBuilder::new(&symbols).build(formation, &unit);
    debug!(
        formation = %formation.name,
        warnings = diagnostics.len(),
        "compiled"
    );

    Ok(Compiled {
        formation: formation.name.clone(),
        graph,
        warnings: diagnostics,
    })
}

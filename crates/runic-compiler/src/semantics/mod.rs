//! Symbol resolution and semantic diagnostics.

pub mod diagnostics;
pub mod symbols;
pub mod validator;

pub use diagnostics::{CompilerError, ErrorCode, Severity, SourceLocation};
pub use symbols::{Symbol, SymbolPort, SymbolTable};
pub use validator::{validate, Validator};

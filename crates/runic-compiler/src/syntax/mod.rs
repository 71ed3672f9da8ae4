//! Source text to AST: lexing, parsing and canonical printing.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod print;
pub mod span;

pub use ast::*;
pub use error::ParseError;
pub use parser::parse;
pub use span::{LineIndex, Position, Span};

//! Compiler diagnostics.
//!
//! [`CompilerError`] is a value, not an `Err`: validation collects as many
//! as it finds. Codes are grouped by category: 1xx imports, 2xx nodes,
//! 3xx ports, 4xx element types and amplitudes.

use std::fmt;

use serde::Serialize;

use crate::syntax::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    UnresolvedImport = 101,
    UnresolvedPackage = 102,
    UnknownNodeType = 201,
    UndefinedNodeInstance = 202,
    DuplicateDefinition = 203,
    UnusedNode = 204,
    UndefinedPort = 301,
    PortNotFound = 302,
    PortDirectionMismatch = 303,
    IncompatibleElements = 401,
    AmplitudeMismatch = 402,
}

impl ErrorCode {
    pub fn number(self) -> u16 {
        self as u16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub length: u32,
}

impl From<Span> for SourceLocation {
    fn from(span: Span) -> Self {
        SourceLocation {
            line: span.start.line,
            column: span.start.column,
            length: span.width(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

/// One diagnostic.
///
/// Rendered as `error 201(5:5): 'BadNode' Unknown node type ...`; the quoted
/// token is left out when there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompilerError {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl CompilerError {
    pub fn error(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        CompilerError {
            code,
            severity: Severity::Error,
            message: message.into(),
            location: span.into(),
            token: None,
        }
    }

    pub fn warning(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        CompilerError {
            severity: Severity::Warning,
            ..Self::error(code, span, message)
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}:", self.severity, self.code.number(), self.location)?;
        if let Some(token) = &self.token {
            write!(f, " '{token}'")?;
        }
        write!(f, " {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Position;

    fn span(line: u32, column: u32) -> Span {
        let at = |column| Position {
            line,
            column,
            offset: 0,
        };
        Span::new(at(column), at(column + 4))
    }

    #[test]
    fn codes_are_numbered_by_category() {
        assert_eq!(ErrorCode::UnresolvedImport.number(), 101);
        assert_eq!(ErrorCode::DuplicateDefinition.number(), 203);
        assert_eq!(ErrorCode::PortDirectionMismatch.number(), 303);
        assert_eq!(ErrorCode::AmplitudeMismatch.number(), 402);
    }

    #[test]
    fn renders_with_token() {
        let err = CompilerError::error(ErrorCode::UnknownNodeType, span(5, 5), "Unknown.")
            .with_token("BadNode");
        assert_eq!(err.to_string(), "error 201(5:5): 'BadNode' Unknown.");
        assert_eq!(err.location.length, 4);
    }

    #[test]
    fn renders_without_token() {
        let err = CompilerError::warning(ErrorCode::UnusedNode, span(2, 1), "Unused.");
        assert_eq!(err.to_string(), "warning 204(2:1): Unused.");
        assert!(!err.is_error());
    }
}

//! Syntax errors.

use serde::Serialize;
use thiserror::Error;

/// Maximum number of alternatives listed in `expected`.
const MAX_EXPECTED: usize = 5;
/// Longer offending snippets are cut and suffixed with `...`.
const MAX_FOUND_CHARS: usize = 10;

/// A terminal parse failure.
///
/// Rendered as `Parse error at (L:C): [expected A or B, got 'x'] message`;
/// the bracketed part is omitted when there is nothing to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("Parse error at ({line}:{column}):{} {message}", details(.expected, .found))]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub expected: Vec<String>,
    pub found: Option<String>,
    pub message: String,
}

impl ParseError {
    pub fn new(
        line: u32,
        column: u32,
        expected: Vec<String>,
        found: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        let mut unique: Vec<String> = Vec::new();
        for item in expected {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        unique.truncate(MAX_EXPECTED);

        ParseError {
            line,
            column,
            expected: unique,
            found: found.map(truncate_snippet),
            message: message.into(),
        }
    }
}

fn truncate_snippet(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() > MAX_FOUND_CHARS {
        let cut: String = text.chars().take(MAX_FOUND_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

fn details(expected: &[String], found: &Option<String>) -> String {
    let mut parts = Vec::new();
    if !expected.is_empty() {
        parts.push(format!("expected {}", expected.join(" or ")));
    }
    if let Some(found) = found {
        parts.push(format!("got '{found}'"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" [{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_is_deduplicated_and_capped() {
        let expected = ["a", "b", "a", "c", "d", "e", "f"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let err = ParseError::new(1, 1, expected, None, "m");
        assert_eq!(err.expected, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn long_snippets_are_truncated() {
        let err = ParseError::new(1, 1, vec![], Some("abcdefghijklmnop"), "m");
        assert_eq!(err.found.as_deref(), Some("abcdefghij..."));
    }

    #[test]
    fn renders_with_and_without_details() {
        let err = ParseError::new(
            5,
            10,
            vec!["'.'".into(), "'->'".into()],
            Some("is"),
            "Unexpected token",
        );
        assert_eq!(
            err.to_string(),
            "Parse error at (5:10): [expected '.' or '->', got 'is'] Unexpected token"
        );

        let bare = ParseError::new(1, 2, vec![], None, "Unexpected input");
        assert_eq!(bare.to_string(), "Parse error at (1:2): Unexpected input");
    }
}

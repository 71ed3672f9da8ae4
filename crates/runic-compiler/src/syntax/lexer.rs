//! Lexical analysis for RunicHDL.
//!
//! Tokenization uses logos. Whitespace, `//` line comments and `/* */`
//! block comments are skipped and never reach the parser.

use std::fmt;
use std::ops::Range;

use logos::Logos;

use super::error::ParseError;
use super::span::LineIndex;

/// RunicHDL token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    // === Keywords ===
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("formation")]
    Formation,
    #[token("input")]
    Input,
    #[token("output")]
    Output,
    #[token("node")]
    Node,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Punctuation ===
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("->")]
    Arrow,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    // === Literals ===
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok().filter(|x| x.is_finite()))]
    Float(f64),
    #[regex(r#""[^"\n]*""#, |lex| {
        let slice = lex.slice();
        slice[1..slice.len() - 1].to_string()
    })]
    Str(String),
}

impl Token {
    /// How the token is named in "expected ..." lists.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(_) => "identifier".to_string(),
            Token::Int(_) => "integer".to_string(),
            Token::Float(_) => "number".to_string(),
            Token::Str(_) => "string".to_string(),
            other => format!("'{other}'"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Package => "package",
            Token::Import => "import",
            Token::Formation => "formation",
            Token::Input => "input",
            Token::Output => "output",
            Token::Node => "node",
            Token::True => "true",
            Token::False => "false",
            Token::Semicolon => ";",
            Token::Dot => ".",
            Token::DotDot => "..",
            Token::Star => "*",
            Token::Plus => "+",
            Token::Arrow => "->",
            Token::Comma => ",",
            Token::Colon => ":",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Ident(name) => return f.write_str(name),
            Token::Int(n) => return write!(f, "{n}"),
            Token::Float(x) => return f.write_str(&float_literal(*x)),
            Token::Str(s) => return write!(f, "\"{s}\""),
        };
        f.write_str(text)
    }
}

/// Positional decimal text for a float, always with a fractional part.
pub(crate) fn float_literal(x: f64) -> String {
    let text = x.to_string();
    if text.contains('.') {
        text
    } else {
        text + ".0"
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub range: Range<usize>,
}

/// Tokenizes a whole source text.
///
/// The first unrecognised character (or an unterminated string) fails the
/// whole lex with a positioned [`ParseError`].
pub fn tokenize(source: &str) -> Result<Vec<Lexeme>, ParseError> {
    let index = LineIndex::new(source);
    let mut lexer = Token::lexer(source);
    let mut lexemes = Vec::new();

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        match result {
            Ok(token) => lexemes.push(Lexeme { token, range }),
            Err(()) => {
                let position = index.position(range.start);
                return Err(ParseError::new(
                    position.line,
                    position.column,
                    Vec::new(),
                    Some(lexer.slice()),
                    "Unrecognised character",
                ));
            }
        }
    }
    Ok(lexemes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|lexeme| lexeme.token)
            .collect()
    }

    #[test]
    fn keywords_beat_identifiers() {
        assert_eq!(
            tokens("node nodes input_x"),
            vec![
                Token::Node,
                Token::Ident("nodes".into()),
                Token::Ident("input_x".into()),
            ]
        );
    }

    #[test]
    fn amplitude_range_splits_into_ints() {
        assert_eq!(
            tokens("[3..10]"),
            vec![
                Token::LBracket,
                Token::Int(3),
                Token::DotDot,
                Token::Int(10),
                Token::RBracket,
            ]
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            tokens(r#"1.5 -2 "Fire ball" true"#),
            vec![
                Token::Float(1.5),
                Token::Int(-2),
                Token::Str("Fire ball".into()),
                Token::True,
            ]
        );
    }

    #[test]
    fn floats_display_positionally() {
        assert_eq!(Token::Float(0.00001).to_string(), "0.00001");
        assert_eq!(Token::Float(1e17).to_string(), "100000000000000000.0");
        assert_eq!(Token::Float(-2.0).to_string(), "-2.0");
        assert_eq!(tokens("0.00001"), vec![Token::Float(0.00001)]);

        let overflow = format!("{}.0", "9".repeat(400));
        assert!(tokenize(&overflow).is_err());
    }

    #[test]
    fn comments_are_skipped() {
        let source = "a // line\n/* block\n ** still */ -> b;";
        assert_eq!(
            tokens(source),
            vec![
                Token::Ident("a".into()),
                Token::Arrow,
                Token::Ident("b".into()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn ranges_point_into_the_source() {
        let lexemes = tokenize("  cap.full").unwrap();
        assert_eq!(lexemes[0].range, 2..5);
        assert_eq!(lexemes[2].range, 6..10);
    }

    #[test]
    fn unrecognised_character_is_positioned() {
        let err = tokenize("package a;\n  @").unwrap_err();
        assert_eq!((err.line, err.column), (2, 3));
        assert_eq!(err.found.as_deref(), Some("@"));
    }
}

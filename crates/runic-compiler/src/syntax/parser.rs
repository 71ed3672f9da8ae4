//! Recursive-descent parser for RunicHDL.
//!
//! Grammar:
//!
//! ```text
//! unit       := 'package' qualified ';' import* formation*
//! import     := 'import' ID ('.' ID)* ('.' '*')? ';'
//! formation  := 'formation' ID '{' statement* '}'
//! statement  := portDecl | nodeDecl | connection
//! portDecl   := ('input' | 'output') ID ID amplitude? ';'
//! amplitude  := '[' INT ('+' | '..' INT)? ']'
//! nodeDecl   := 'node' ID ID ('(' (param (',' param)*)? ')')? ';'
//! param      := ID ':' value
//! connection := portRef '->' portRef ';'
//! portRef    := ID ('.' ID)?
//! ```
//!
//! Parsing stops at the first error; there is no recovery.

use std::mem::discriminant;

use runic_core::{AmplitudeSpec, PortDirection};

use super::ast::*;
use super::error::ParseError;
use super::lexer::{tokenize, Lexeme, Token};
use super::span::{LineIndex, Span};

/// Parses a complete compilation unit.
pub fn parse(source: &str) -> Result<CompilationUnit, ParseError> {
    let lexemes = tokenize(source)?;
    Parser::new(source, lexemes).compilation_unit()
}

struct Parser<'src> {
    source: &'src str,
    index: LineIndex<'src>,
    lexemes: Vec<Lexeme>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, lexemes: Vec<Lexeme>) -> Self {
        Parser {
            source,
            index: LineIndex::new(source),
            lexemes,
            pos: 0,
        }
    }

    // --- Token stream ---

    fn peek(&self) -> Option<&Token> {
        self.lexemes.get(self.pos).map(|l| &l.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.lexemes.get(self.pos).map(|l| l.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if discriminant(t) == discriminant(expected))
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.unexpected(vec![expected.describe()]))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(vec!["identifier".to_string()])),
        }
    }

    /// Byte offset where the current token starts (source end at EOF).
    fn offset(&self) -> usize {
        self.lexemes
            .get(self.pos)
            .map_or(self.source.len(), |l| l.range.start)
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        let end = match self.pos.checked_sub(1).and_then(|i| self.lexemes.get(i)) {
            Some(last) => last.range.end.max(start),
            None => start,
        };
        self.index.span(start..end)
    }

    fn unexpected(&self, expected: Vec<String>) -> ParseError {
        let position = self.index.position(self.offset());
        match self.lexemes.get(self.pos) {
            Some(lexeme) => ParseError::new(
                position.line,
                position.column,
                expected,
                Some(&self.source[lexeme.range.clone()]),
                "Unexpected token",
            ),
            None => ParseError::new(
                position.line,
                position.column,
                expected,
                None,
                "Unexpected end of input",
            ),
        }
    }

    fn invalid(&self, start: usize, message: &str) -> ParseError {
        let position = self.index.position(start);
        let found = self.lexemes.get(self.pos.saturating_sub(1));
        ParseError::new(
            position.line,
            position.column,
            Vec::new(),
            found.map(|l| &self.source[l.range.clone()]),
            message,
        )
    }

    // --- Grammar ---

    fn compilation_unit(mut self) -> Result<CompilationUnit, ParseError> {
        let start = self.offset();
        let package = self.package()?;

        let mut imports = Vec::new();
        while self.check(&Token::Import) {
            imports.push(self.import()?);
        }

        let mut formations = Vec::new();
        while self.check(&Token::Formation) {
            formations.push(self.formation()?);
        }

        if self.peek().is_some() {
            let mut expected = Vec::new();
            if formations.is_empty() {
                expected.push(Token::Import.describe());
            }
            expected.push(Token::Formation.describe());
            expected.push("end of input".to_string());
            return Err(self.unexpected(expected));
        }

        Ok(CompilationUnit {
            package,
            imports,
            formations,
            span: self.index.span(start.min(self.source.len())..self.source.len()),
        })
    }

    fn package(&mut self) -> Result<PackageDeclaration, ParseError> {
        let start = self.offset();
        self.expect(Token::Package)?;
        let qualified_id = self.qualified_id()?;
        self.expect(Token::Semicolon)?;
        Ok(PackageDeclaration {
            qualified_id,
            span: self.span_from(start),
        })
    }

    fn qualified_id(&mut self) -> Result<String, ParseError> {
        let mut parts = vec![self.expect_ident()?];
        while self.eat(&Token::Dot) {
            parts.push(self.expect_ident()?);
        }
        Ok(parts.join("."))
    }

    fn import(&mut self) -> Result<ImportStatement, ParseError> {
        let start = self.offset();
        self.expect(Token::Import)?;
        let mut parts = vec![self.expect_ident()?];
        let mut is_wildcard = false;
        while self.eat(&Token::Dot) {
            if self.eat(&Token::Star) {
                is_wildcard = true;
                break;
            }
            match self.peek() {
                Some(Token::Ident(_)) => parts.push(self.expect_ident()?),
                _ => {
                    return Err(self.unexpected(vec![
                        "identifier".to_string(),
                        Token::Star.describe(),
                    ]))
                }
            }
        }
        self.expect(Token::Semicolon)?;
        Ok(ImportStatement {
            qualified_id: parts.join("."),
            is_wildcard,
            span: self.span_from(start),
        })
    }

    fn formation(&mut self) -> Result<FormationDefinition, ParseError> {
        let start = self.offset();
        self.expect(Token::Formation)?;
        let name = self.expect_ident()?;
        self.expect(Token::LBrace)?;

        let mut statements = Vec::new();
        loop {
            match self.peek() {
                Some(Token::RBrace) => {
                    self.pos += 1;
                    break;
                }
                Some(Token::Input) | Some(Token::Output) => {
                    statements.push(Statement::Port(self.port_definition()?))
                }
                Some(Token::Node) => statements.push(Statement::Node(self.node_definition()?)),
                Some(Token::Ident(_)) => {
                    statements.push(Statement::Connection(self.connection()?))
                }
                _ => {
                    return Err(self.unexpected(vec![
                        Token::Input.describe(),
                        Token::Output.describe(),
                        Token::Node.describe(),
                        "identifier".to_string(),
                        Token::RBrace.describe(),
                    ]))
                }
            }
        }

        Ok(FormationDefinition {
            name,
            statements,
            span: self.span_from(start),
        })
    }

    fn port_definition(&mut self) -> Result<PortDefinition, ParseError> {
        let start = self.offset();
        let direction = match self.advance() {
            Some(Token::Input) => PortDirection::Input,
            _ => PortDirection::Output,
        };
        let element_type = self.expect_ident()?;
        let name = self.expect_ident()?;
        let amplitude = if self.check(&Token::LBracket) {
            Some(self.amplitude()?)
        } else {
            None
        };
        self.expect(Token::Semicolon)?;
        Ok(PortDefinition {
            direction,
            element_type,
            name,
            amplitude,
            span: self.span_from(start),
        })
    }

    fn amplitude(&mut self) -> Result<AmplitudeSpec, ParseError> {
        self.expect(Token::LBracket)?;
        let first = self.amplitude_bound()?;
        let spec = if self.eat(&Token::Plus) {
            AmplitudeSpec::Min(first)
        } else if self.eat(&Token::DotDot) {
            AmplitudeSpec::Range(first, self.amplitude_bound()?)
        } else {
            AmplitudeSpec::Exact(first)
        };
        if !self.check(&Token::RBracket) {
            return Err(self.unexpected(vec![
                Token::Plus.describe(),
                Token::DotDot.describe(),
                Token::RBracket.describe(),
            ]));
        }
        self.pos += 1;
        Ok(spec)
    }

    fn amplitude_bound(&mut self) -> Result<u32, ParseError> {
        let start = self.offset();
        match self.peek() {
            Some(Token::Int(n)) => {
                let n = *n;
                self.pos += 1;
                if n < 0 {
                    return Err(self.invalid(start, "Amplitude must not be negative"));
                }
                u32::try_from(n).map_err(|_| self.invalid(start, "Amplitude is too large"))
            }
            _ => Err(self.unexpected(vec![Token::Int(0).describe()])),
        }
    }

    fn node_definition(&mut self) -> Result<NodeDefinition, ParseError> {
        let start = self.offset();
        self.expect(Token::Node)?;
        let type_name = self.expect_ident()?;
        let instance_name = self.expect_ident()?;

        let mut parameters = Vec::new();
        if self.eat(&Token::LParen) {
            if !self.eat(&Token::RParen) {
                loop {
                    parameters.push(self.parameter()?);
                    if self.eat(&Token::Comma) {
                        continue;
                    }
                    if self.eat(&Token::RParen) {
                        break;
                    }
                    return Err(self.unexpected(vec![
                        Token::Comma.describe(),
                        Token::RParen.describe(),
                    ]));
                }
            }
        }
        self.expect(Token::Semicolon)?;

        Ok(NodeDefinition {
            type_name,
            instance_name,
            parameters,
            span: self.span_from(start),
        })
    }

    fn parameter(&mut self) -> Result<NodeParameter, ParseError> {
        let start = self.offset();
        let name = self.expect_ident()?;
        self.expect(Token::Colon)?;
        let value = match self.peek() {
            Some(Token::Str(s)) => Value::Str(s.clone()),
            Some(Token::Int(n)) => Value::Int(*n),
            Some(Token::Float(x)) => Value::Float(*x),
            Some(Token::True) => Value::Bool(true),
            Some(Token::False) => Value::Bool(false),
            Some(Token::Ident(id)) => Value::Ident(id.clone()),
            _ => {
                return Err(self.unexpected(vec![
                    "string".to_string(),
                    "number".to_string(),
                    "boolean".to_string(),
                    "identifier".to_string(),
                ]))
            }
        };
        self.pos += 1;
        Ok(NodeParameter {
            name,
            value,
            span: self.span_from(start),
        })
    }

    fn connection(&mut self) -> Result<ConnectionDefinition, ParseError> {
        let start = self.offset();
        let source = self.port_reference()?;
        if !self.eat(&Token::Arrow) {
            let mut expected = Vec::new();
            if source.port_name.is_none() {
                expected.push(Token::Dot.describe());
            }
            expected.push(Token::Arrow.describe());
            return Err(self.unexpected(expected));
        }
        let target = self.port_reference()?;
        self.expect(Token::Semicolon)?;
        Ok(ConnectionDefinition {
            source,
            target,
            span: self.span_from(start),
        })
    }

    fn port_reference(&mut self) -> Result<PortReference, ParseError> {
        let start = self.offset();
        let node_name = self.expect_ident()?;
        let port_name = if self.eat(&Token::Dot) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        Ok(PortReference {
            node_name,
            port_name,
            span: self.span_from(start),
        })
    }
}

//! Canonical RunicHDL printing.
//!
//! `Display` on the AST produces normalized source: one statement per line,
//! four-space indentation, a blank line between sections. Printing a parsed
//! unit and parsing the result again yields the same printed text.

use std::fmt;

use runic_core::PortDirection;

use super::ast::*;
use super::lexer::float_literal;

const INDENT: &str = "    ";

impl fmt::Display for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "package {};", self.package.qualified_id)?;
        if !self.imports.is_empty() {
            writeln!(f)?;
            for import in &self.imports {
                writeln!(f, "{import}")?;
            }
        }
        for formation in &self.formations {
            writeln!(f)?;
            write!(f, "{formation}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ImportStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard {
            write!(f, "import {}.*;", self.qualified_id)
        } else {
            write!(f, "import {};", self.qualified_id)
        }
    }
}

impl fmt::Display for FormationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "formation {} {{", self.name)?;
        for statement in &self.statements {
            writeln!(f, "{INDENT}{statement}")?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Port(port) => port.fmt(f),
            Statement::Node(node) => node.fmt(f),
            Statement::Connection(conn) => conn.fmt(f),
        }
    }
}

impl fmt::Display for PortDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.direction {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
        };
        write!(f, "{keyword} {} {}", self.element_type, self.name)?;
        if let Some(amplitude) = &self.amplitude {
            write!(f, " [{amplitude}]")?;
        }
        f.write_str(";")
    }
}

impl fmt::Display for NodeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {} {}", self.type_name, self.instance_name)?;
        if !self.parameters.is_empty() {
            f.write_str(" ( ")?;
            for (i, param) in self.parameters.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: {}", param.name, param.value)?;
            }
            f.write_str(" )")?;
        }
        f.write_str(";")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{s}\""),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&float_literal(*x)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Ident(id) => f.write_str(id),
        }
    }
}

impl fmt::Display for ConnectionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {};", self.source, self.target)
    }
}

impl fmt::Display for PortReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.port_name {
            Some(port) => write!(f, "{}.{}", self.node_name, port),
            None => f.write_str(&self.node_name),
        }
    }
}

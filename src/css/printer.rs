// src/css/printer.rs

//! Deterministic pretty printer: two-space indentation, one declaration per
//! line, a blank line between top-level nodes.

use std::fmt::{self, Write};

use super::{AtRule, Declaration, Node, Rule, Stylesheet};

impl fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, &self.nodes, 0)
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)?;
        if self.important {
            f.write_str(" !important")?;
        }
        f.write_char(';')
    }
}

fn write_nodes(f: &mut fmt::Formatter<'_>, nodes: &[Node], depth: usize) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if depth == 0 && i > 0 {
            f.write_char('\n')?;
        }
        write_node(f, node, depth)?;
    }
    Ok(())
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match node {
        Node::Declaration(decl) => writeln!(f, "{indent}{decl}"),
        Node::Comment(text) => writeln!(f, "{indent}/*{text}*/"),
        Node::Rule(Rule { selector, body }) => {
            writeln!(f, "{indent}{selector} {{")?;
            write_nodes(f, body, depth + 1)?;
            writeln!(f, "{indent}}}")
        }
        Node::AtRule(AtRule {
            name,
            prelude,
            body,
        }) => {
            write!(f, "{indent}@{name}")?;
            if !prelude.is_empty() {
                write!(f, " {prelude}")?;
            }
            match body {
                None => writeln!(f, ";"),
                Some(body) => {
                    writeln!(f, " {{")?;
                    write_nodes(f, body, depth + 1)?;
                    writeln!(f, "{indent}}}")
                }
            }
        }
    }
}

// src/css/mod.rs

//! Minimal CSS syntax tree shared by the pipeline steps.
//!
//! The tree is deliberately shallow: selectors, at-rule preludes and
//! declaration values are kept as text, and only block structure is parsed.
//! That is enough for the steps that rewrite declarations and at-rules, while
//! the heavy lifting (prefixing, minifying) is handed to `lightningcss`.
//!
//! - [`parser`] turns text into a [`Stylesheet`].
//! - [`printer`] implements `Display` for the tree (deterministic output).
//! - [`value`] has helpers for rewriting function calls inside values.

pub mod parser;
pub mod printer;
pub mod value;

pub use parser::{SyntaxError, parse};

/// A parsed stylesheet: an ordered list of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// `selector { ... }`
    Rule(Rule),
    /// `@name prelude;` or `@name prelude { ... }`
    AtRule(AtRule),
    /// `name: value [!important]`
    Declaration(Declaration),
    /// Comment text without the `/*` `*/` delimiters.
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub selector: String,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Lowercased at-rule name without the `@`.
    pub name: String,
    pub prelude: String,
    /// `None` for statement at-rules such as `@import`.
    pub body: Option<Vec<Node>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            important: false,
        }
    }

    /// Custom property declarations (`--name: ...`).
    pub fn is_custom_property(&self) -> bool {
        self.name.starts_with("--")
    }
}

impl AtRule {
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl Stylesheet {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Visit the top-level node list and every nested block body, outermost
    /// first. The callback may insert or remove nodes in the list it is given.
    pub fn try_for_each_body<E>(
        &mut self,
        f: &mut impl FnMut(&mut Vec<Node>) -> Result<(), E>,
    ) -> Result<(), E> {
        visit_bodies(&mut self.nodes, f)
    }

    /// Visit every at-rule, at any depth.
    pub fn try_for_each_at_rule<E>(
        &mut self,
        f: &mut impl FnMut(&mut AtRule) -> Result<(), E>,
    ) -> Result<(), E> {
        visit_at_rules(&mut self.nodes, f)
    }
}

fn visit_bodies<E>(
    nodes: &mut Vec<Node>,
    f: &mut impl FnMut(&mut Vec<Node>) -> Result<(), E>,
) -> Result<(), E> {
    f(nodes)?;
    for node in nodes.iter_mut() {
        match node {
            Node::Rule(rule) => visit_bodies(&mut rule.body, f)?,
            Node::AtRule(AtRule {
                body: Some(body), ..
            }) => visit_bodies(body, f)?,
            _ => {}
        }
    }
    Ok(())
}

fn visit_at_rules<E>(
    nodes: &mut [Node],
    f: &mut impl FnMut(&mut AtRule) -> Result<(), E>,
) -> Result<(), E> {
    for node in nodes.iter_mut() {
        match node {
            Node::AtRule(at) => {
                f(at)?;
                if let Some(body) = at.body.as_mut() {
                    visit_at_rules(body, f)?;
                }
            }
            Node::Rule(rule) => visit_at_rules(&mut rule.body, f)?,
            _ => {}
        }
    }
    Ok(())
}

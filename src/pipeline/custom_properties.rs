// src/pipeline/custom_properties.rs

//! Static fallbacks for `var()` references.
//!
//! Only custom properties declared in top-level `:root` rules are known; the
//! step cannot follow the cascade, so anything else must carry its own
//! fallback (`var(--x, 1px)`).

use std::collections::HashMap;

use crate::css::value::{contains_function, replace_function, split_first_argument};
use crate::css::{Declaration, Node, Stylesheet};
use crate::errors::{CssPipeError, Result};

use super::{BuildContext, Step};

#[derive(Debug, Clone, Copy)]
pub struct CustomPropertiesStep {
    preserve: bool,
}

impl CustomPropertiesStep {
    /// With `preserve` the original `var()` declaration is kept after the
    /// fallback; without it the declaration is replaced.
    pub fn new(preserve: bool) -> Self {
        Self { preserve }
    }

    fn rewrite_block(&self, body: &mut Vec<Node>, resolver: &Resolver) -> Result<()> {
        if !body.iter().any(|node| matches!(node, Node::Declaration(decl) if needs_fallback(decl))) {
            return Ok(());
        }

        let mut out = Vec::with_capacity(body.len() + 1);
        for node in std::mem::take(body) {
            match node {
                Node::Declaration(decl) if needs_fallback(&decl) => {
                    let value = resolver.resolve(&decl.value, &mut Vec::new())?;
                    let fallback = Node::Declaration(Declaration {
                        name: decl.name.clone(),
                        value,
                        important: decl.important,
                    });
                    if out.last() != Some(&fallback) {
                        out.push(fallback);
                    }
                    if self.preserve {
                        out.push(Node::Declaration(decl));
                    }
                }
                other => out.push(other),
            }
        }
        *body = out;
        Ok(())
    }
}

fn needs_fallback(decl: &Declaration) -> bool {
    !decl.is_custom_property() && contains_function(&decl.value, "var")
}

/// Collect custom properties from top-level `:root` rules. Later
/// declarations win.
pub fn collect_root_definitions(sheet: &Stylesheet) -> HashMap<String, String> {
    let mut defs = HashMap::new();
    for node in &sheet.nodes {
        let Node::Rule(rule) = node else { continue };
        if rule.selector.trim() != ":root" {
            continue;
        }
        for decl in rule.body.iter().filter_map(|n| match n {
            Node::Declaration(d) if d.is_custom_property() => Some(d),
            _ => None,
        }) {
            defs.insert(decl.name.clone(), decl.value.trim().to_string());
        }
    }
    defs
}

struct Resolver {
    defs: HashMap<String, String>,
}

impl Resolver {
    /// Substitute every `var()` in `value`. `stack` holds the properties
    /// being expanded, innermost last.
    fn resolve(&self, value: &str, stack: &mut Vec<String>) -> Result<String> {
        replace_function(value, "var", |args| {
            let (name, fallback) = split_first_argument(args);
            let name = name.trim();
            match (self.defs.get(name), fallback) {
                (Some(definition), _) => {
                    if stack.iter().any(|s| s == name) {
                        return Err(CssPipeError::CircularCustomProperty(name.to_string()));
                    }
                    stack.push(name.to_string());
                    let resolved = self.resolve(definition, stack);
                    stack.pop();
                    resolved
                }
                (None, Some(fallback)) => self.resolve(fallback.trim(), stack),
                (None, None) => Err(CssPipeError::UnresolvedCustomProperty(name.to_string())),
            }
        })
    }
}

impl Step for CustomPropertiesStep {
    fn name(&self) -> &'static str {
        "custom-properties"
    }

    fn apply(&self, mut sheet: Stylesheet, _ctx: &mut BuildContext<'_>) -> Result<Stylesheet> {
        let resolver = Resolver {
            defs: collect_root_definitions(&sheet),
        };
        sheet.try_for_each_body(&mut |body| self.rewrite_block(body, &resolver))?;
        Ok(sheet)
    }
}

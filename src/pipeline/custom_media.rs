// src/pipeline/custom_media.rs

//! `@custom-media` alias expansion.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::css::{Node, Stylesheet};
use crate::errors::{CssPipeError, Result};

use super::{BuildContext, Step};

static ALIAS_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*(--[A-Za-z0-9_-]+)\s*\)").expect("alias reference regex is valid")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct CustomMediaStep;

/// Split `--name <query>` into its parts.
fn parse_definition(prelude: &str) -> Option<(&str, &str)> {
    let prelude = prelude.trim();
    if !prelude.starts_with("--") {
        return None;
    }
    let (name, query) = prelude.split_once(char::is_whitespace)?;
    let query = query.trim();
    (!query.is_empty()).then_some((name, query))
}

struct Aliases {
    defs: HashMap<String, String>,
}

impl Aliases {
    fn expand(&self, text: &str, stack: &mut Vec<String>) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        for caps in ALIAS_REFERENCE.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();
            let query = self
                .defs
                .get(name)
                .ok_or_else(|| CssPipeError::UnknownCustomMedia(name.to_string()))?;
            if stack.iter().any(|s| s == name) {
                return Err(CssPipeError::CircularCustomMedia(name.to_string()));
            }

            stack.push(name.to_string());
            let expanded = self.expand(query, stack)?;
            stack.pop();

            out.push_str(&text[copied..whole.start()]);
            out.push_str(&expanded);
            copied = whole.end();
        }
        out.push_str(&text[copied..]);
        Ok(out)
    }
}

impl Step for CustomMediaStep {
    fn name(&self) -> &'static str {
        "custom-media"
    }

    fn apply(&self, mut sheet: Stylesheet, ctx: &mut BuildContext<'_>) -> Result<Stylesheet> {
        let mut defs = HashMap::new();
        let mut kept = Vec::with_capacity(sheet.nodes.len());
        for node in std::mem::take(&mut sheet.nodes) {
            match node {
                Node::AtRule(at) if at.is_named("custom-media") => {
                    let (name, query) =
                        parse_definition(&at.prelude).ok_or_else(|| CssPipeError::Parse {
                            file: ctx.entry.clone(),
                            message: format!("malformed @custom-media {}", at.prelude),
                        })?;
                    defs.insert(name.to_string(), query.to_string());
                }
                other => kept.push(other),
            }
        }
        sheet.nodes = kept;

        let aliases = Aliases { defs };
        sheet.try_for_each_at_rule(&mut |at| {
            if at.is_named("media") {
                at.prelude = aliases.expand(&at.prelude, &mut Vec::new())?;
            }
            Ok::<(), CssPipeError>(())
        })?;
        Ok(sheet)
    }
}

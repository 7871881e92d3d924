// src/pipeline/font_variant.rs

//! `font-feature-settings` fallbacks for the `font-variant-*` family.

use crate::css::{Declaration, Node, Stylesheet};
use crate::errors::{CssPipeError, Result};

use super::{BuildContext, Step};

type Table = &'static [(&'static str, &'static str)];

const LIGATURES: Table = &[
    ("common-ligatures", "\"liga\", \"clig\""),
    ("no-common-ligatures", "\"liga\" off, \"clig\" off"),
    ("discretionary-ligatures", "\"dlig\""),
    ("no-discretionary-ligatures", "\"dlig\" off"),
    ("historical-ligatures", "\"hlig\""),
    ("no-historical-ligatures", "\"hlig\" off"),
    ("contextual", "\"calt\""),
    ("no-contextual", "\"calt\" off"),
];

const POSITION: Table = &[
    ("sub", "\"subs\""),
    ("super", "\"sups\""),
    ("normal", "\"subs\" off, \"sups\" off"),
];

const CAPS: Table = &[
    ("small-caps", "\"smcp\""),
    ("all-small-caps", "\"smcp\", \"c2sc\""),
    ("petite-caps", "\"pcap\""),
    ("all-petite-caps", "\"pcap\", \"c2pc\""),
    ("unicase", "\"unic\""),
    ("titling-caps", "\"titl\""),
];

const NUMERIC: Table = &[
    ("lining-nums", "\"lnum\""),
    ("oldstyle-nums", "\"onum\""),
    ("proportional-nums", "\"pnum\""),
    ("tabular-nums", "\"tnum\""),
    ("diagonal-fractions", "\"frac\""),
    ("stacked-fractions", "\"afrc\""),
    ("ordinal", "\"ordn\""),
    ("slashed-zero", "\"zero\""),
];

const KERNING: Table = &[("normal", "\"kern\""), ("none", "\"kern\" off")];

const SHORTHAND: Table = &[("normal", "normal"), ("inherit", "inherit")];

fn tables_for(property: &str) -> &'static [Table] {
    match property {
        "font-variant-ligatures" => &[LIGATURES],
        "font-variant-position" => &[POSITION],
        "font-variant-caps" => &[CAPS],
        "font-variant-numeric" => &[NUMERIC],
        "font-kerning" => &[KERNING],
        "font-variant" => &[SHORTHAND, LIGATURES, POSITION, CAPS, NUMERIC],
        _ => &[],
    }
}

fn lookup(tables: &[Table], keyword: &str) -> Option<&'static str> {
    tables
        .iter()
        .find_map(|table| table.iter().find(|(k, _)| *k == keyword).map(|(_, v)| *v))
}

/// The feature settings a single declaration maps to, if any.
pub fn feature_settings(decl: &Declaration) -> Option<String> {
    let property = decl.name.to_ascii_lowercase();
    let tables = tables_for(&property);
    if tables.is_empty() {
        return None;
    }

    let value = decl.value.to_ascii_lowercase();
    let mut features: Vec<&str> = Vec::new();
    for keyword in value.split_whitespace() {
        if let Some(feature) = lookup(tables, keyword) {
            if !features.contains(&feature) {
                features.push(feature);
            }
        }
    }

    if features.is_empty() {
        None
    } else {
        Some(features.join(", "))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FontVariantStep;

fn expand_block(body: &mut Vec<Node>) {
    let mut first = None;
    let mut values: Vec<String> = Vec::new();
    for (i, node) in body.iter().enumerate() {
        if let Node::Declaration(decl) = node {
            if let Some(value) = feature_settings(decl) {
                first.get_or_insert(i);
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
    }
    let Some(first) = first else {
        return;
    };

    let existing = body.iter_mut().find_map(|node| match node {
        Node::Declaration(decl) if decl.name.eq_ignore_ascii_case("font-feature-settings") => {
            Some(decl)
        }
        _ => None,
    });

    match existing {
        Some(decl) if decl.value.trim().eq_ignore_ascii_case("normal") => {
            decl.value = values.join(", ");
        }
        Some(decl) => {
            for value in values {
                if !decl.value.contains(&value) {
                    decl.value.push_str(", ");
                    decl.value.push_str(&value);
                }
            }
        }
        None => body.insert(
            first,
            Node::Declaration(Declaration::new("font-feature-settings", values.join(", "))),
        ),
    }
}

impl Step for FontVariantStep {
    fn name(&self) -> &'static str {
        "font-variant"
    }

    fn apply(&self, mut sheet: Stylesheet, _ctx: &mut BuildContext<'_>) -> Result<Stylesheet> {
        sheet.try_for_each_body::<CssPipeError>(&mut |body| {
            expand_block(body);
            Ok(())
        })?;
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parse;
    use crate::fs::mock::MockFileSystem;
    use std::path::PathBuf;

    fn expand(src: &str) -> String {
        let fs = MockFileSystem::new();
        let mut ctx = BuildContext::new(&fs, PathBuf::from("a.css"));
        FontVariantStep
            .apply(parse(src).unwrap(), &mut ctx)
            .unwrap()
            .to_string()
    }

    #[test]
    fn maps_longhands_to_feature_tags() {
        let decl = |name: &str, value: &str| feature_settings(&Declaration::new(name, value));
        assert_eq!(decl("font-variant-caps", "all-small-caps").unwrap(), "\"smcp\", \"c2sc\"");
        assert_eq!(decl("font-variant-position", "normal").unwrap(), "\"subs\" off, \"sups\" off");
        assert_eq!(decl("font-kerning", "none").unwrap(), "\"kern\" off");
        assert_eq!(
            decl("font-variant-numeric", "tabular-nums slashed-zero").unwrap(),
            "\"tnum\", \"zero\""
        );
        assert_eq!(decl("font-variant", "small-caps").unwrap(), "\"smcp\"");
        assert_eq!(decl("font-variant", "normal").unwrap(), "normal");
        assert!(decl("font-variant-caps", "bogus").is_none());
        assert!(decl("color", "red").is_none());
    }

    #[test]
    fn inserts_one_declaration_before_the_first_variant() {
        assert_eq!(
            expand("h1 { color: red; font-variant-caps: small-caps; font-kerning: normal }"),
            "h1 {\n  color: red;\n  font-feature-settings: \"smcp\", \"kern\";\n  font-variant-caps: small-caps;\n  font-kerning: normal;\n}\n"
        );
    }

    #[test]
    fn appends_to_existing_feature_settings() {
        let out = expand("p { font-feature-settings: \"liga\"; font-variant-numeric: ordinal }");
        assert!(out.contains("font-feature-settings: \"liga\", \"ordn\";"));
        assert_eq!(out.matches("font-feature-settings").count(), 1);
    }

    #[test]
    fn expands_inside_nested_blocks() {
        let out = expand("@media print { p { font-variant-position: sub } }");
        assert!(out.contains("font-feature-settings: \"subs\";"));
    }
}

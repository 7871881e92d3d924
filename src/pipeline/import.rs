// src/pipeline/import.rs

//! `@import` inlining.
//!
//! Top-level `@import` rules are replaced by the parsed contents of the file
//! they name, recursively. The chain of files currently being inlined is kept
//! on a stack so a cycle fails immediately instead of recursing forever.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::css::{self, AtRule, Node, Stylesheet};
use crate::errors::{CssPipeError, Result};
use crate::fs::{FileSystem, normalize_path};

use super::{BuildContext, Step};

static IMPORT_PRELUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)^(?:url\(\s*(?:"([^"]*)"|'([^']*)'|([^)\s]*))\s*\)|"([^"]*)"|'([^']*)')\s*(.*)$"#,
    )
    .expect("import prelude regex is valid")
});

/// A parsed `@import` prelude.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTarget {
    pub url: String,
    /// Trailing media query list, empty if none.
    pub media: String,
}

impl ImportTarget {
    pub fn parse(prelude: &str) -> Option<Self> {
        let caps = IMPORT_PRELUDE.captures(prelude.trim())?;
        let url = (1..=5).find_map(|i| caps.get(i))?.as_str().trim().to_string();
        if url.is_empty() {
            return None;
        }
        let media = caps
            .get(6)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        Some(Self { url, media })
    }

    /// Imports fetched by the browser rather than inlined.
    pub fn is_remote(&self) -> bool {
        let lower = self.url.to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportStep {
    import_paths: Vec<PathBuf>,
}

/// Bookkeeping for one build.
#[derive(Default)]
struct ImportState {
    /// Files currently being inlined, outermost first.
    chain: Vec<PathBuf>,
    /// Every file inlined so far.
    seen: HashSet<PathBuf>,
    /// Remote imports, hoisted to the top of the output.
    remote: Vec<Node>,
}

impl ImportStep {
    pub fn new(import_paths: Vec<PathBuf>) -> Self {
        Self { import_paths }
    }

    fn inline(
        &self,
        ctx: &mut BuildContext<'_>,
        file: &Path,
        nodes: Vec<Node>,
        media: &str,
        state: &mut ImportState,
    ) -> Result<Vec<Node>> {
        let mut out = Vec::with_capacity(nodes.len());

        for node in nodes {
            let at = match node {
                Node::AtRule(at) if at.is_named("import") && at.body.is_none() => at,
                other => {
                    out.push(other);
                    continue;
                }
            };

            let target = ImportTarget::parse(&at.prelude).ok_or_else(|| CssPipeError::Parse {
                file: file.to_path_buf(),
                message: format!("malformed @import {}", at.prelude),
            })?;
            if target.is_remote() {
                debug!(url = %target.url, media, "keeping remote import");
                state.remote.push(Node::AtRule(hoisted_import(at, &target, media)));
                continue;
            }

            let resolved = self.resolve(ctx.fs, file, &target.url)?;
            let key = ctx
                .fs
                .canonicalize(&resolved)
                .unwrap_or_else(|_| resolved.clone());

            if state.chain.contains(&key) {
                let mut chain: Vec<String> =
                    state.chain.iter().map(|p| p.display().to_string()).collect();
                chain.push(key.display().to_string());
                return Err(CssPipeError::CircularImport(chain.join(" -> ")));
            }
            if !state.seen.insert(key.clone()) {
                debug!(path = ?resolved, "skipping already inlined import");
                continue;
            }

            debug!(path = ?resolved, from = ?file, "inlining import");
            ctx.record_dependency(resolved.clone());
            let text = ctx.fs.read_to_string(&resolved)?;
            let parsed = css::parse(&text).map_err(|e| CssPipeError::Parse {
                file: resolved.clone(),
                message: e.to_string(),
            })?;

            state.chain.push(key);
            let nested_media = combine_media(media, &target.media);
            let inner = self.inline(ctx, &resolved, parsed.nodes, &nested_media, state)?;
            state.chain.pop();

            let inner: Vec<Node> = inner.into_iter().filter(|n| !is_charset(n)).collect();
            if target.media.is_empty() {
                out.extend(inner);
            } else {
                out.push(Node::AtRule(AtRule {
                    name: "media".to_string(),
                    prelude: target.media,
                    body: Some(inner),
                }));
            }
        }

        Ok(out)
    }

    /// Find the file an import refers to: next to the importing file first,
    /// then in each configured import path. `.css` is appended to
    /// extensionless names.
    fn resolve(&self, fs: &dyn FileSystem, from: &Path, url: &str) -> Result<PathBuf> {
        let base = from.parent().unwrap_or(Path::new("."));
        let search = std::iter::once(base).chain(self.import_paths.iter().map(PathBuf::as_path));

        for dir in search {
            let candidate = normalize_path(&dir.join(url));
            if fs.is_file(&candidate) {
                return Ok(candidate);
            }
            if candidate.extension().is_none() {
                let with_ext = candidate.with_extension("css");
                if fs.is_file(&with_ext) {
                    return Ok(with_ext);
                }
            }
        }

        Err(CssPipeError::ImportNotFound {
            from: from.to_path_buf(),
            import: url.to_string(),
        })
    }
}

/// Intersect two media query lists: every query of `outer` joined with every
/// query of `inner`.
fn combine_media(outer: &str, inner: &str) -> String {
    if outer.is_empty() {
        return inner.to_string();
    }
    if inner.is_empty() {
        return outer.to_string();
    }
    let mut queries = Vec::new();
    for o in outer.split(',').map(str::trim) {
        for i in inner.split(',').map(str::trim) {
            queries.push(format!("{o} and {i}"));
        }
    }
    queries.join(", ")
}

/// A remote import moved to the top level keeps the media of every file
/// that led to it.
fn hoisted_import(mut at: AtRule, target: &ImportTarget, media: &str) -> AtRule {
    if media.is_empty() {
        return at;
    }
    let prelude = at.prelude.trim();
    let url = prelude
        .strip_suffix(target.media.as_str())
        .unwrap_or(prelude)
        .trim_end();
    at.prelude = format!("{url} {}", combine_media(media, &target.media));
    at
}

fn is_charset(node: &Node) -> bool {
    matches!(node, Node::AtRule(at) if at.is_named("charset"))
}

impl Step for ImportStep {
    fn name(&self) -> &'static str {
        "import"
    }

    fn apply(&self, sheet: Stylesheet, ctx: &mut BuildContext<'_>) -> Result<Stylesheet> {
        let entry = ctx.entry.clone();
        let entry_key = ctx.fs.canonicalize(&entry).unwrap_or_else(|_| entry.clone());

        let mut state = ImportState::default();
        state.chain.push(entry_key.clone());
        state.seen.insert(entry_key);

        let inlined = self.inline(ctx, &entry, sheet.nodes, "", &mut state)?;

        // `@charset` must stay first, remote imports right after it.
        let (charset, body): (Vec<Node>, Vec<Node>) =
            inlined.into_iter().partition(is_charset);
        let mut nodes = charset;
        nodes.truncate(1);
        nodes.append(&mut state.remote);
        nodes.extend(body);

        Ok(Stylesheet::new(nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn run(fs: &MockFileSystem, entry: &str) -> Result<Stylesheet> {
        let text = fs.read_to_string(Path::new(entry)).unwrap();
        let sheet = css::parse(&text).unwrap();
        let mut ctx = BuildContext::new(fs, PathBuf::from(entry));
        ImportStep::default().apply(sheet, &mut ctx)
    }

    #[test]
    fn parses_every_prelude_form() {
        for prelude in [
            "\"a.css\"",
            "'a.css'",
            "url(a.css)",
            "url( \"a.css\" )",
            "url('a.css')",
        ] {
            let target = ImportTarget::parse(prelude).unwrap();
            assert_eq!(target.url, "a.css", "{prelude}");
            assert_eq!(target.media, "");
        }

        let target = ImportTarget::parse("\"print.css\" print and (min-width: 2in)").unwrap();
        assert_eq!(target.media, "print and (min-width: 2in)");
        assert!(ImportTarget::parse("a.css").is_none());
        assert!(ImportTarget::parse("url(https://x.test/a.css)").unwrap().is_remote());
    }

    #[test]
    fn inlines_recursively_and_wraps_media() {
        let fs = MockFileSystem::new();
        fs.add_file("src/index.css", "@import \"parts/a.css\";\n@import \"print.css\" print;\nbody { margin: 0 }");
        fs.add_file("src/parts/a.css", "@charset \"utf-8\";\n@import '../base';\n.a { color: red }");
        fs.add_file("src/base.css", ".base { top: 0 }");
        fs.add_file("src/print.css", ".p { display: none }");

        let out = run(&fs, "src/index.css").unwrap().to_string();
        assert_eq!(
            out,
            ".base {\n  top: 0;\n}\n\n.a {\n  color: red;\n}\n\n@media print {\n  .p {\n    display: none;\n  }\n}\n\nbody {\n  margin: 0;\n}\n"
        );
    }

    #[test]
    fn same_file_is_inlined_once() {
        let fs = MockFileSystem::new();
        fs.add_file("index.css", "@import \"a.css\"; @import \"b.css\";");
        fs.add_file("a.css", "@import \"shared.css\"; .a { top: 0 }");
        fs.add_file("b.css", "@import \"shared.css\"; .b { top: 0 }");
        fs.add_file("shared.css", ".shared { top: 0 }");

        let out = run(&fs, "index.css").unwrap().to_string();
        assert_eq!(out.matches(".shared").count(), 1);
    }

    #[test]
    fn cycles_fail_with_the_chain() {
        let fs = MockFileSystem::new();
        fs.add_file("index.css", "@import \"a.css\";");
        fs.add_file("a.css", "@import \"b.css\";");
        fs.add_file("b.css", "@import \"a.css\";");

        match run(&fs, "index.css") {
            Err(CssPipeError::CircularImport(chain)) => {
                assert_eq!(chain, "index.css -> a.css -> b.css -> a.css");
            }
            other => panic!("expected CircularImport, got {other:?}"),
        }
    }

    #[test]
    fn missing_import_names_both_files() {
        let fs = MockFileSystem::new();
        fs.add_file("src/index.css", "@import \"nope.css\";");

        match run(&fs, "src/index.css") {
            Err(CssPipeError::ImportNotFound { from, import }) => {
                assert_eq!(from, PathBuf::from("src/index.css"));
                assert_eq!(import, "nope.css");
            }
            other => panic!("expected ImportNotFound, got {other:?}"),
        }
    }

    #[test]
    fn remote_imports_are_hoisted_below_charset() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "index.css",
            "@charset \"utf-8\"; @import \"local.css\"; @import url(https://fonts.test/a.css);",
        );
        fs.add_file("local.css", ".l { top: 0 }");

        let sheet = run(&fs, "index.css").unwrap();
        let names: Vec<String> = sheet
            .nodes
            .iter()
            .map(|n| match n {
                Node::AtRule(at) => format!("@{}", at.name),
                Node::Rule(rule) => rule.selector.clone(),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["@charset", "@import", ".l"]);
    }

    #[test]
    fn hoisted_remote_imports_keep_the_importing_media() {
        let fs = MockFileSystem::new();
        fs.add_file("index.css", "@import \"print.css\" print; .a { top: 0 }");
        fs.add_file(
            "print.css",
            "@import url(https://fonts.test/a.css);\n@import \"https://fonts.test/b.css\" (min-width: 2in);\n.p { top: 0 }",
        );

        let sheet = run(&fs, "index.css").unwrap();
        let preludes: Vec<&str> = sheet
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::AtRule(at) if at.is_named("import") => Some(at.prelude.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            preludes,
            vec![
                "url(https://fonts.test/a.css) print",
                "\"https://fonts.test/b.css\" print and (min-width: 2in)",
            ]
        );
    }

    #[test]
    fn media_lists_combine_pairwise() {
        assert_eq!(combine_media("", "print"), "print");
        assert_eq!(combine_media("screen", ""), "screen");
        assert_eq!(
            combine_media("screen, print", "(min-width: 2in)"),
            "screen and (min-width: 2in), print and (min-width: 2in)"
        );
    }

    #[test]
    fn import_paths_are_searched_after_the_local_directory() {
        let fs = MockFileSystem::new();
        fs.add_file("src/index.css", "@import \"reset.css\";");
        fs.add_file("vendor/reset.css", "html { margin: 0 }");

        let text = fs.read_to_string(Path::new("src/index.css")).unwrap();
        let mut ctx = BuildContext::new(&fs, PathBuf::from("src/index.css"));
        let out = ImportStep::new(vec![PathBuf::from("vendor")])
            .apply(css::parse(&text).unwrap(), &mut ctx)
            .unwrap();
        assert!(out.to_string().contains("html {"));
        assert!(ctx.dependencies().contains(Path::new("vendor/reset.css")));
    }
}

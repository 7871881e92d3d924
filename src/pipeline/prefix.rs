// src/pipeline/prefix.rs

//! Vendor prefixing through `lightningcss`.
//!
//! Prefixes are only added by `StyleSheet::minify`, so this step also merges
//! adjacent rules with the same selector and shortens values.

use std::fmt::Display;
use std::path::Path;

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserFlags, ParserOptions, StyleSheet};
use lightningcss::targets::{Browsers, Features, Targets};

use crate::css::{self, Stylesheet};
use crate::errors::{CssPipeError, Result};

use super::{BuildContext, Step};

/// Turn browserslist queries into `lightningcss` targets.
///
/// Custom media queries are excluded from lowering so the aliases reach the
/// custom media step untouched.
pub fn resolve_targets(queries: &[String]) -> Result<Targets> {
    let browsers = Browsers::from_browserslist(queries.iter().map(String::as_str))
        .map_err(|e| CssPipeError::Browserslist(e.to_string()))?;
    Ok(Targets {
        browsers,
        include: Features::empty(),
        exclude: Features::CustomMediaQueries,
    })
}

#[derive(Debug, Clone)]
pub struct PrefixStep {
    targets: Targets,
}

impl PrefixStep {
    pub fn new(targets: Targets) -> Self {
        Self { targets }
    }
}

fn lightning_error(file: &Path, err: impl Display) -> CssPipeError {
    CssPipeError::Parse {
        file: file.to_path_buf(),
        message: err.to_string(),
    }
}

impl Step for PrefixStep {
    fn name(&self) -> &'static str {
        "prefix"
    }

    fn apply(&self, sheet: Stylesheet, ctx: &mut BuildContext<'_>) -> Result<Stylesheet> {
        let source = sheet.to_string();
        let file = ctx.entry.as_path();

        let prefixed = {
            let options = ParserOptions {
                filename: file.to_string_lossy().into_owned(),
                flags: ParserFlags::CUSTOM_MEDIA,
                ..ParserOptions::default()
            };
            let mut parsed =
                StyleSheet::parse(&source, options).map_err(|e| lightning_error(file, e))?;
            parsed
                .minify(MinifyOptions {
                    targets: self.targets,
                    ..MinifyOptions::default()
                })
                .map_err(|e| lightning_error(file, e))?;
            parsed
                .to_css(PrinterOptions {
                    targets: self.targets,
                    ..PrinterOptions::default()
                })
                .map_err(|e| lightning_error(file, e))?
                .code
        };

        css::parse(&prefixed).map_err(|e| lightning_error(file, e))
    }
}

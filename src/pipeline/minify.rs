// src/pipeline/minify.rs

use std::path::Path;

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};

use crate::errors::{CssPipeError, Result};

/// Print `css` without insignificant whitespace. Rules are not merged or
/// reordered.
pub fn minify(css: &str, file: &Path) -> Result<String> {
    let parse_error = |message: String| CssPipeError::Parse {
        file: file.to_path_buf(),
        message,
    };

    let options = ParserOptions {
        filename: file.to_string_lossy().into_owned(),
        ..ParserOptions::default()
    };
    let sheet = StyleSheet::parse(css, options).map_err(|e| parse_error(e.to_string()))?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| parse_error(e.to_string()))?;
    Ok(printed.code)
}

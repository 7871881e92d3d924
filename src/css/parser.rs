// src/css/parser.rs

//! Block-structure parser for CSS text.
//!
//! Strings, comments, parentheses and brackets are respected when looking for
//! the `{`, `}` and `;` delimiters, so `url(data:...;...)` or `content: "}"`
//! don't break the structure.

use thiserror::Error;

use super::{AtRule, Declaration, Node, Rule, Stylesheet};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

/// Parse CSS text into a [`Stylesheet`].
pub fn parse(input: &str) -> Result<Stylesheet, SyntaxError> {
    let mut parser = Parser::new(input);
    let nodes = parser.parse_list(false)?;
    Ok(Stylesheet { nodes })
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        // A leading BOM is not part of the stylesheet.
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    /// 1-based line of byte `offset`. Only called on the error path.
    fn line_at(&self, offset: usize) -> usize {
        self.bytes[..offset].iter().filter(|&&b| b == b'\n').count() + 1
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            line: self.line_at(offset),
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn advance_escape(&mut self) {
        self.pos = (self.pos + 2).min(self.bytes.len());
    }

    fn parse_list(&mut self, nested: bool) -> Result<Vec<Node>, SyntaxError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(b) = self.peek() else {
                if nested {
                    return Err(self.error("unexpected end of input, expected '}'"));
                }
                return Ok(nodes);
            };
            match b {
                b'}' => {
                    if nested {
                        self.pos += 1;
                        return Ok(nodes);
                    }
                    return Err(self.error("unexpected '}'"));
                }
                b';' => self.pos += 1,
                b'/' if self.starts_with("/*") => nodes.push(Node::Comment(self.comment()?)),
                b'@' => nodes.push(self.at_rule()?),
                _ => nodes.push(self.rule_or_declaration()?),
            }
        }
    }

    fn comment(&mut self) -> Result<String, SyntaxError> {
        let start = self.pos + 2;
        match self.src[start..].find("*/") {
            Some(len) => {
                self.pos = start + len + 2;
                Ok(self.src[start..start + len].to_string())
            }
            None => Err(self.error("unterminated comment")),
        }
    }

    fn at_rule(&mut self) -> Result<Node, SyntaxError> {
        self.pos += 1;
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected at-rule name after '@'"));
        }
        let name = self.src[start..self.pos].to_ascii_lowercase();

        let (prelude, stop) = self.scan_until_delimiter()?;
        let prelude = prelude.trim().to_string();
        let body = match stop {
            Some(b'{') => {
                self.pos += 1;
                Some(self.parse_list(true)?)
            }
            Some(b';') => {
                self.pos += 1;
                None
            }
            // `}` closes the enclosing block; leave it for the caller.
            _ => None,
        };

        Ok(Node::AtRule(AtRule {
            name,
            prelude,
            body,
        }))
    }

    fn rule_or_declaration(&mut self) -> Result<Node, SyntaxError> {
        let start = self.pos;
        let (text, stop) = self.scan_until_delimiter()?;
        if stop == Some(b'{') {
            self.pos += 1;
            let body = self.parse_list(true)?;
            return Ok(Node::Rule(Rule {
                selector: text.trim().to_string(),
                body,
            }));
        }
        if stop == Some(b';') {
            self.pos += 1;
        }
        parse_declaration(text)
            .map(Node::Declaration)
            .ok_or_else(|| {
                self.error_at(start, format!("expected a declaration, found `{}`", text.trim()))
            })
    }

    /// Advance to the next top-level `{`, `}` or `;` (or end of input) and
    /// return the text skipped plus the delimiter found. The delimiter itself
    /// is not consumed.
    fn scan_until_delimiter(&mut self) -> Result<(&'a str, Option<u8>), SyntaxError> {
        let src = self.src;
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(b) = self.peek() {
            match b {
                b'"' | b'\'' => self.skip_string(b)?,
                b'/' if self.starts_with("/*") => {
                    self.comment()?;
                }
                b'\\' => self.advance_escape(),
                b'(' | b'[' => {
                    depth += 1;
                    self.pos += 1;
                }
                b')' | b']' => {
                    depth = depth.saturating_sub(1);
                    self.pos += 1;
                }
                b'{' | b'}' | b';' if depth == 0 => return Ok((&src[start..self.pos], Some(b))),
                _ => self.pos += 1,
            }
        }
        Ok((&src[start..self.pos], None))
    }

    fn skip_string(&mut self, quote: u8) -> Result<(), SyntaxError> {
        self.pos += 1;
        loop {
            match self.peek() {
                None | Some(b'\n') => return Err(self.error("unterminated string")),
                Some(b'\\') => self.advance_escape(),
                Some(b) if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }
}

fn parse_declaration(text: &str) -> Option<Declaration> {
    let text = text.trim();
    let colon = text.find(':')?;
    let name = text[..colon].trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }

    let mut value = text[colon + 1..].trim();
    let mut important = false;
    let lower = value.to_ascii_lowercase();
    if let Some(stripped) = lower.strip_suffix("!important") {
        value = value[..stripped.len()].trim_end();
        important = true;
    }

    Some(Declaration {
        name: name.to_string(),
        value: value.to_string(),
        important,
    })
}

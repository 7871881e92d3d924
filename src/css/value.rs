// src/css/value.rs

//! Helpers for rewriting function calls (`var(...)`) inside declaration
//! values and preludes.

/// Replace every call to the function `name` in `value` with the result of
/// `f(arguments)`.
///
/// Matching is case-insensitive, ignores quoted strings, and requires the name
/// not to be the tail of a longer identifier (`env-var(` is not `var(`).
/// Calls whose closing parenthesis is missing extend to the end of the value.
pub fn replace_function<E>(
    value: &str,
    name: &str,
    mut f: impl FnMut(&str) -> Result<String, E>,
) -> Result<String, E> {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            q @ (b'"' | b'\'') => i = skip_string(bytes, i, q),
            _ if is_call_at(bytes, i, name) => {
                let args_start = i + name.len() + 1;
                let close = matching_paren(bytes, args_start);
                out.push_str(&value[copied..i]);
                out.push_str(&f(&value[args_start..close])?);
                i = (close + 1).min(bytes.len());
                copied = i;
            }
            _ => i += 1,
        }
    }
    out.push_str(&value[copied..]);
    Ok(out)
}

/// True if `value` contains at least one call to `name`.
pub fn contains_function(value: &str, name: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'"' | b'\'') => i = skip_string(bytes, i, q),
            _ if is_call_at(bytes, i, name) => return true,
            _ => i += 1,
        }
    }
    false
}

/// Split function arguments at the first top-level comma.
///
/// `"--a, var(--b, 1px)"` gives `("--a", Some(" var(--b, 1px)"))`.
pub fn split_first_argument(args: &str) -> (&str, Option<&str>) {
    let bytes = args.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'"' | b'\'') => {
                i = skip_string(bytes, i, q);
                continue;
            }
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => return (&args[..i], Some(&args[i + 1..])),
            _ => {}
        }
        i += 1;
    }
    (args, None)
}

fn is_call_at(bytes: &[u8], i: usize, name: &str) -> bool {
    let end = i + name.len();
    if end >= bytes.len() || bytes[end] != b'(' {
        return false;
    }
    if !bytes[i..end].eq_ignore_ascii_case(name.as_bytes()) {
        return false;
    }
    i == 0 || !is_ident_byte(bytes[i - 1])
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

/// Index of the `)` closing a call whose arguments start at `start`, or the
/// end of input.
fn matching_paren(bytes: &[u8], start: usize) -> usize {
    let mut depth = 1usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            q @ (b'"' | b'\'') => {
                i = skip_string(bytes, i, q);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

/// Index just past the string starting at `start` (which holds `quote`).
fn skip_string(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn upper(args: &str) -> Result<String, Infallible> {
        Ok(args.trim().to_uppercase())
    }

    #[test]
    fn replaces_nested_calls_and_keeps_surroundings() {
        let out = replace_function("calc(var(--a) * 2) var(--b)", "var", upper).unwrap();
        assert_eq!(out, "calc(--A * 2) --B");
    }

    #[test]
    fn ignores_strings_and_longer_identifiers() {
        let value = "\"var(--x)\" env-var(--y) VAR(--z)";
        assert_eq!(replace_function(value, "var", upper).unwrap(), "\"var(--x)\" env-var(--y) --Z");
        assert!(!contains_function("\"var(--x)\" my-var(--y)", "var"));
        assert!(contains_function("1px Var(--y)", "var"));
    }

    #[test]
    fn splits_only_on_top_level_commas() {
        assert_eq!(
            split_first_argument("--a, var(--b, 1px)"),
            ("--a", Some(" var(--b, 1px)"))
        );
        assert_eq!(split_first_argument("--a"), ("--a", None));
        assert_eq!(split_first_argument("--a,"), ("--a", Some("")));
    }
}

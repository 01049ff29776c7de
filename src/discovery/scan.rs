//! Marker scanner and table renderer for the generated discovery backend.
//!
//! The build script includes this file directly, so it depends on `std` only.
//! A component marks a kind with
//!
//! ```text
//! registry_kind!(name = "Object1", factory = create, description = "...");
//! ```
//!
//! and the build script turns every marker under the scan directory into one
//! row of a static table. Relative factory paths resolve against the module
//! the marker lives in.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::iter::Peekable;
use std::str::Chars;

/// Text the scanner looks for.
pub const MARKER: &str = "registry_kind!";

/// One marker found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Registry key
    pub name: String,
    /// Absolute path of the factory function
    pub factory: String,
    pub description: String,
    /// 1-based line of the marker
    pub line: usize,
}

/// A marker that could not be turned into a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanIssue {
    pub line: usize,
    pub message: String,
}

/// Everything found in one source file.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub declarations: Vec<Declaration>,
    pub issues: Vec<ScanIssue>,
}

/// Module path of a file given its path components relative to `src/`.
///
/// `["kinds", "object1.rs"]` is `crate::kinds::object1`; `mod.rs`, `lib.rs`
/// and `main.rs` name their parent module.
pub fn module_path(components: &[&str]) -> String {
    let mut path = String::from("crate");
    let last = components.len().saturating_sub(1);
    for (index, component) in components.iter().enumerate() {
        let segment = if index == last {
            match component.strip_suffix(".rs") {
                Some("mod") | Some("lib") | Some("main") => continue,
                Some(stem) => stem,
                None => component,
            }
        } else {
            component
        };
        path.push_str("::");
        path.push_str(segment);
    }
    path
}

/// Finds every marker in `source`, a file whose module path is `module`.
///
/// Only markers in code count. Text inside comments, string literals and
/// character literals is skipped, and so is a marker that ends a longer
/// identifier such as `my_registry_kind!`.
pub fn scan_source(module: &str, source: &str) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for start in marker_offsets(source) {
        let line = source[..start].matches('\n').count() + 1;

        match parse_arguments(&source[start + MARKER.len()..]) {
            Ok(args) => match declaration(module, line, args) {
                Ok(decl) => outcome.declarations.push(decl),
                Err(message) => outcome.issues.push(ScanIssue { line, message }),
            },
            Err(message) => outcome.issues.push(ScanIssue { line, message }),
        }
    }

    outcome
}

/// Names declared more than once, in first-seen order.
pub fn duplicate_names(declarations: &[Declaration]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    declarations
        .iter()
        .map(|decl| decl.name.as_str())
        .filter(|name| !seen.insert(*name) && reported.insert(*name))
        .collect()
}

/// Renders the generated table module.
///
/// `origin` is a human-readable description of where the markers were found.
pub fn render_table(origin: &str, declarations: &[Declaration]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// @generated by build.rs from {}. Do not edit.", origin);
    let _ = writeln!(out, "// Regenerated whenever a scanned file changes.");
    let _ = writeln!(out);
    let _ = writeln!(out, "pub(crate) static GENERATED_KINDS: &[crate::discovery::KindEntry] = &[");
    for decl in declarations {
        let _ = writeln!(out, "    crate::discovery::KindEntry {{");
        let _ = writeln!(out, "        name: {:?},", decl.name);
        let _ = writeln!(out, "        description: {:?},", decl.description);
        let _ = writeln!(out, "        factory: {},", decl.factory);
        let _ = writeln!(out, "    }},");
    }
    let _ = writeln!(out, "];");
    out
}

/// Byte offsets of markers that sit in code.
fn marker_offsets(source: &str) -> Vec<usize> {
    let bytes = source.as_bytes();
    let marker = MARKER.as_bytes();
    let mut offsets = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        i = if rest.starts_with(b"//") {
            rest.iter().position(|&b| b == b'\n').map_or(bytes.len(), |end| i + end)
        } else if rest.starts_with(b"/*") {
            skip_block_comment(bytes, i)
        } else if let Some(end) = skip_raw_string(bytes, i) {
            end
        } else if bytes[i] == b'"' {
            skip_string(bytes, i)
        } else if bytes[i] == b'\'' {
            skip_char_literal(source, i)
        } else if rest.starts_with(marker) && !(i > 0 && is_ident_byte(bytes[i - 1])) {
            offsets.push(i);
            i + marker.len()
        } else {
            i + 1
        };
    }
    offsets
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Block comments nest.
fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"/*") {
            depth += 1;
            i += 2;
        } else if bytes[i..].starts_with(b"*/") {
            depth -= 1;
            i += 2;
            if depth == 0 {
                return i;
            }
        } else {
            i += 1;
        }
    }
    bytes.len()
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// `r"..."`, `r#"..."#` and their `br` forms. `None` when `start` does not
/// open a raw string.
fn skip_raw_string(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes[start] != b'r' {
        return None;
    }
    let prefix_start = if start > 0 && bytes[start - 1] == b'b' { start - 1 } else { start };
    if prefix_start > 0 && is_ident_byte(bytes[prefix_start - 1]) {
        return None;
    }

    let hashes = bytes[start + 1..].iter().take_while(|&&b| b == b'#').count();
    let open = start + 1 + hashes;
    if bytes.get(open) != Some(&b'"') {
        return None;
    }

    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == b'"' && bytes[i + 1..].iter().take(hashes).filter(|&&b| b == b'#').count() == hashes {
            return Some(i + 1 + hashes);
        }
        i += 1;
    }
    Some(bytes.len())
}

/// Skips a character literal, or just the quote of a lifetime.
fn skip_char_literal(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    if bytes.get(start + 1) == Some(&b'\\') {
        return bytes[start + 2..]
            .iter()
            .position(|&b| b == b'\'')
            .map_or(bytes.len(), |end| start + 3 + end);
    }
    match source[start + 1..].chars().next() {
        Some(c) if bytes.get(start + 1 + c.len_utf8()) == Some(&b'\'') => start + 2 + c.len_utf8(),
        _ => start + 1,
    }
}

fn declaration(module: &str, line: usize, args: Vec<(String, String)>) -> Result<Declaration, String> {
    let mut name = None;
    let mut factory = None;
    let mut description = String::new();

    for (key, value) in args {
        match key.as_str() {
            "name" => name = Some(value),
            "factory" => factory = Some(resolve_path(module, &value)),
            "description" => description = value,
            other => return Err(format!("unknown {} argument `{}`", MARKER, other)),
        }
    }

    let name = name.ok_or_else(|| format!("{} is missing `name`", MARKER))?;
    if name.is_empty() {
        return Err(format!("{} has an empty `name`", MARKER));
    }
    let factory = factory.ok_or_else(|| format!("{} for `{}` is missing `factory`", MARKER, name))?;

    Ok(Declaration {
        name,
        factory,
        description,
        line,
    })
}

fn resolve_path(module: &str, path: &str) -> String {
    if path.starts_with("crate::") || path.starts_with("::") {
        path.to_string()
    } else if let Some(rest) = path.strip_prefix("self::") {
        format!("{}::{}", module, rest)
    } else if let Some(rest) = path.strip_prefix("super::") {
        let parent = module.rsplit_once("::").map_or(module, |(parent, _)| parent);
        format!("{}::{}", parent, rest)
    } else {
        format!("{}::{}", module, path)
    }
}

fn parse_arguments(rest: &str) -> Result<Vec<(String, String)>, String> {
    let mut chars = rest.chars().peekable();
    skip_whitespace(&mut chars);
    if chars.next() != Some('(') {
        return Err(format!("expected `(` after {}", MARKER));
    }

    let mut args = Vec::new();
    loop {
        skip_whitespace(&mut chars);
        match chars.peek() {
            Some(')') => break,
            None => return Err(format!("unterminated {} invocation", MARKER)),
            _ => {}
        }

        let key = take_while(&mut chars, |c| c.is_alphanumeric() || c == '_');
        if key.is_empty() {
            return Err("expected an argument name".to_string());
        }
        skip_whitespace(&mut chars);
        if chars.next() != Some('=') {
            return Err(format!("expected `=` after `{}`", key));
        }
        skip_whitespace(&mut chars);

        let value = if chars.peek() == Some(&'"') {
            parse_string(&mut chars)?
        } else {
            take_while(&mut chars, |c| c.is_alphanumeric() || c == '_' || c == ':')
        };
        if value.is_empty() && key != "description" {
            return Err(format!("missing value for `{}`", key));
        }
        args.push((key, value));

        skip_whitespace(&mut chars);
        match chars.next() {
            Some(',') => continue,
            Some(')') => break,
            _ => return Err("expected `,` or `)`".to_string()),
        }
    }
    Ok(args)
}

fn parse_string(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    chars.next();
    let mut value = String::new();
    loop {
        match chars.next() {
            Some('"') => return Ok(value),
            Some('\\') => match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some(c @ ('"' | '\\')) => value.push(c),
                Some(c) => {
                    value.push('\\');
                    value.push(c);
                }
                None => break,
            },
            Some(c) => value.push(c),
            None => break,
        }
    }
    Err("unterminated string literal".to_string())
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn take_while(chars: &mut Peekable<Chars<'_>>, accept: impl Fn(char) -> bool) -> String {
    let mut taken = String::new();
    while let Some(&c) = chars.peek() {
        if !accept(c) {
            break;
        }
        taken.push(c);
        chars.next();
    }
    taken
}

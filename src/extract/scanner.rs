//! Lexical scanning of JavaScript/TypeScript source for module specifiers
//! and exported declarations.
//!
//! No parsing happens here: comments are blanked out, string literal spans
//! are noted, and a handful of patterns are matched against what remains.
//! A match that starts inside a string literal is not a statement.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// ES-module imports: named, default, namespace, type-only and side-effect forms.
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s+(?:type\s+)?(?:[\w*{}\s,$]+?\s+from\s+)?["']([^"']+)["']"#)
        .expect("import pattern is valid")
});

/// CommonJS `require("...")` calls with a literal argument.
static REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*["']([^"']+)["']\s*\)"#)
        .expect("require pattern is valid")
});

static EXPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*export\s+(?:default\s+)?(?:async\s+)?(?:class|function\*?|const|let|var)\s+([A-Za-z_$][\w$]*)",
    )
    .expect("export pattern is valid")
});

/// What a single source file references and declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedSource {
    /// Module specifiers in source order (imports and requires interleaved).
    pub specifiers: Vec<String>,
    /// Names of exported classes, functions and bindings.
    pub exports: Vec<String>,
}

/// Scans one file's text.
#[must_use]
pub fn scan(source: &str) -> ScannedSource {
    let (code, literals) = strip_comments(source);
    let in_literal = |offset: usize| literals.iter().any(|span| span.contains(&offset));

    let mut found: Vec<(usize, String)> = IMPORT_RE
        .captures_iter(&code)
        .chain(REQUIRE_RE.captures_iter(&code))
        .filter(|caps| caps.get(0).is_some_and(|m| !in_literal(m.start())))
        .filter_map(|caps| caps.get(1))
        .map(|m| (m.start(), m.as_str().to_string()))
        .collect();
    found.sort_by_key(|(offset, _)| *offset);

    let exports = EXPORT_RE
        .captures_iter(&code)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    ScannedSource { specifiers: found.into_iter().map(|(_, s)| s).collect(), exports }
}

/// Replaces `//` and `/* */` comments with spaces, keeping newlines and
/// leaving string and template literals untouched. Also returns the byte
/// spans of those literals, quotes included.
fn strip_comments(source: &str) -> (String, Vec<Range<usize>>) {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Line,
        Block,
        Quoted(char),
    }

    let mut out = String::with_capacity(source.len());
    let mut literals = Vec::new();
    let mut literal_start = 0;
    let mut state = State::Code;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::Line;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::Block;
                }
                '"' | '\'' | '`' => {
                    literal_start = out.len();
                    out.push(c);
                    state = State::Quoted(c);
                }
                _ => out.push(c),
            },
            State::Line => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(' ');
                }
            }
            State::Block => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else {
                    out.push(if c == '\n' { '\n' } else { ' ' });
                }
            }
            State::Quoted(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == quote || (c == '\n' && quote != '`') {
                    literals.push(literal_start..out.len());
                    state = State::Code;
                }
            }
        }
    }
    if let State::Quoted(_) = state {
        literals.push(literal_start..out.len());
    }
    (out, literals)
}

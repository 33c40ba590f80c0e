//! Lexical escaping for Lucene query-string syntax.
//!
//! Values and field names are emitted as barewords with backslash escapes,
//! never wrapped in quotes. The only quoted token is the empty string `""`,
//! which has no bareword form.

use crate::ir::Value;
use regex::Regex;
use std::sync::OnceLock;

pub const ESCAPE_CHAR: char = '\\';
pub const REGEX_DELIMITER: char = '/';
pub const EMPTY_LITERAL: &str = "\"\"";

/// Characters with syntactic meaning in a Lucene value position.
const RESERVED_VALUE_CHARS: &[char] = &[
    '+', '-', '=', '&', '|', '!', '(', ')', '{', '}', '[', ']', '<', '>', '^', '"', '~', ':',
    '\\', '/',
];

fn is_reserved_value_char(c: char) -> bool {
    RESERVED_VALUE_CHARS.contains(&c) || c.is_whitespace()
}

/// Push `c` escaped. Control characters become `\uXXXX` so a query never
/// spans more than one line.
fn push_escaped(out: &mut String, c: char) {
    if c.is_control() {
        out.push_str(&format!("{ESCAPE_CHAR}u{:04x}", c as u32));
    } else {
        out.push(ESCAPE_CHAR);
        out.push(c);
    }
}

fn field_escape_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[\s:()\[\]{}"\\/^~+!&|<>=]"#).expect("field escape pattern is valid")
    })
}

/// Escape a field name so it reads as one bareword before the `:`.
///
/// ```rust
/// use sigma_lucene::compiler::escape::quote_field;
///
/// assert_eq!(quote_field("field name"), r"field\ name");
/// assert_eq!(quote_field("winlog.event_data.Image"), "winlog.event_data.Image");
/// ```
pub fn quote_field(name: &str) -> String {
    field_escape_pattern()
        .replace_all(name, |caps: &regex::Captures<'_>| {
            let mut escaped = String::new();
            caps[0].chars().for_each(|c| push_escaped(&mut escaped, c));
            escaped
        })
        .into_owned()
}

/// Escape a value for a field/value or keyword position.
pub fn escape_value(value: &Value) -> String {
    match value {
        Value::String(s) => escape_literal(s),
        Value::Wildcard(s) => escape_wildcard(s),
        Value::Regex(s) => escape_regex(s),
        Value::Cidr(s) => escape_cidr(s),
        Value::Number(n) => escape_literal(&n.to_string()),
        Value::Boolean(b) => b.to_string(),
    }
}

/// Literal text: every reserved character, `*` and `?` included, is escaped.
pub fn escape_literal(text: &str) -> String {
    if text.is_empty() {
        return EMPTY_LITERAL.to_string();
    }

    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        if is_reserved_value_char(c) || c.is_control() || c == '*' || c == '?' {
            push_escaped(&mut out, c);
        } else {
            out.push(c);
        }
    }
    out
}

/// Wildcard text: unescaped `*`/`?` pass through, escaped ones stay literal.
pub fn escape_wildcard(text: &str) -> String {
    if text.is_empty() {
        return EMPTY_LITERAL.to_string();
    }

    let mut out = String::with_capacity(text.len() + 4);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' | '?' => out.push(c),
            '\\' => match chars.peek() {
                Some(&next @ ('*' | '?' | '\\')) => {
                    chars.next();
                    out.push(ESCAPE_CHAR);
                    out.push(next);
                }
                _ => {
                    out.push(ESCAPE_CHAR);
                    out.push(ESCAPE_CHAR);
                }
            },
            c if is_reserved_value_char(c) || c.is_control() => push_escaped(&mut out, c),
            c => out.push(c),
        }
    }
    out
}

/// Wrap a regex in `/.../`, escaping delimiters that are not already escaped.
///
/// The pattern's own metacharacters are left alone.
pub fn escape_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    out.push(REGEX_DELIMITER);
    let mut backslashes = 0usize;
    for c in pattern.chars() {
        if c == REGEX_DELIMITER && backslashes % 2 == 0 {
            out.push(ESCAPE_CHAR);
        }
        backslashes = if c == '\\' { backslashes + 1 } else { 0 };
        out.push(c);
    }
    // A trailing lone backslash would swallow the closing delimiter.
    if backslashes % 2 == 1 {
        out.push(ESCAPE_CHAR);
    }
    out.push(REGEX_DELIMITER);
    out
}

/// CIDR block: only the prefix separator is escaped.
pub fn escape_cidr(block: &str) -> String {
    block.replace('/', "\\/")
}

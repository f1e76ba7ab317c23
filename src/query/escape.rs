//! Escaping of untrusted text interpolated into query strings
//!
//! Search terms end up inside `REGEX(..., "<pattern>", "i")`, so they pass
//! through two languages: the XPath regular expression dialect and the
//! SPARQL string literal grammar. Both layers are escaped, in that order.

/// Characters with special meaning in XPath/XSD regular expressions
const REGEX_META: &[char] = &[
    '\\', '.', '*', '+', '?', '(', ')', '[', ']', '{', '}', '|', '^', '$',
];

/// Escape a string for use inside a double-quoted SPARQL literal
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Escape regex metacharacters so the text matches literally
pub fn escape_regex(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if REGEX_META.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render text as a quoted SPARQL literal holding a literal-match regex
pub fn regex_literal(s: &str) -> String {
    format!("\"{}\"", escape_literal(&escape_regex(s)))
}

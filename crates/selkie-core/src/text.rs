//! Label text cleanup shared by both dialects.
//!
//! Raw label text arrives with markup noise: wrapping quotes, `<br/>`
//! variants, stray HTML-ish tags, `\uNNNN` escapes, and literal `\n`
//! sequences. Both parsers funnel node, edge, and title text through
//! [`clean_label`] so the semantic model only ever carries plain lines.

use regex::Regex;
use std::sync::OnceLock;

pub(crate) fn clean_label(raw: &str) -> String {
    let s = strip_quotes_once(raw.trim());
    let s = replace_br_variants(s);
    let s = strip_angle_tags(&s);
    let s = decode_escapes(&s);
    collapse_newline_whitespace(&s)
}

/// Removes exactly one layer of matching single or double quotes.
pub(crate) fn strip_quotes_once(s: &str) -> &str {
    let b = s.as_bytes();
    if b.len() >= 2 {
        let (first, last) = (b[0], b[b.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// `<br>`, `<br/>`, `<br />` (any case) become newlines.
fn replace_br_variants(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
    re.replace_all(text, "\n").into_owned()
}

/// Any remaining angle tag is dropped wholesale.
fn strip_angle_tags(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"<[^<>]*>").expect("valid regex"));
    re.replace_all(text, "").into_owned()
}

/// Decodes `\uNNNN` escapes to characters and literal `\n` to newlines.
fn decode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                chars.next();
                out.push('\n');
            }
            Some('u') => {
                let rest: String = chars.clone().skip(1).take(4).collect();
                if rest.len() == 4 && rest.chars().all(|c| c.is_ascii_hexdigit()) {
                    if let Some(decoded) =
                        u32::from_str_radix(&rest, 16).ok().and_then(char::from_u32)
                    {
                        for _ in 0..5 {
                            chars.next();
                        }
                        out.push(decoded);
                        continue;
                    }
                }
                out.push('\\');
            }
            _ => out.push('\\'),
        }
    }
    out
}

/// Trims whitespace hugging each newline so multi-line labels read evenly.
fn collapse_newline_whitespace(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
}

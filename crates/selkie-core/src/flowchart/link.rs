//! Edge-operator recognition for flowchart lines.
//!
//! A line is tokenized into text runs, arrow operators, and `|…|` label
//! segments. Operators are only recognized at bracket depth zero and
//! outside quotes, so labels like `A[x --> y]` never split.

use crate::model::EdgeKind;

/// Arrow alphabet in match priority order. At any position the first
/// operator that matches wins, which makes `-.->` beat `-.-`, and `-->`
/// beat `->`. `<->` is the only bidirectional form; `<-` deliberately still
/// reads left-to-right (the reverse semantic was never applied upstream).
const ARROWS: &[(&str, EdgeKind)] = &[
    ("-.->", EdgeKind::Directed),
    ("-->", EdgeKind::Directed),
    ("==>", EdgeKind::Directed),
    ("->>", EdgeKind::Directed),
    ("<->", EdgeKind::Bidirectional),
    ("-<>", EdgeKind::Directed),
    ("<-", EdgeKind::Directed),
    ("->", EdgeKind::Directed),
    ("---", EdgeKind::Directed),
    ("-.-", EdgeKind::Directed),
    (":::", EdgeKind::Directed),
    (":-:", EdgeKind::Directed),
    ("...", EdgeKind::Directed),
    ("~", EdgeKind::Directed),
    ("===", EdgeKind::Directed),
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Text(String),
    Arrow(EdgeKind),
    PipeLabel(String),
}

fn arrow_at(s: &str) -> Option<(usize, EdgeKind)> {
    for (op, kind) in ARROWS {
        if s.starts_with(op) {
            return Some((op.len(), *kind));
        }
    }
    None
}

pub(crate) fn tokenize(line: &str) -> Vec<Tok> {
    let mut toks: Vec<Tok> = Vec::new();
    let mut buf = String::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;

    let flush = |buf: &mut String, toks: &mut Vec<Tok>| {
        let text = buf.trim();
        if !text.is_empty() {
            toks.push(Tok::Text(text.to_string()));
        }
        buf.clear();
    };

    let mut i = 0usize;
    while i < line.len() {
        let rest = &line[i..];
        let ch = rest.chars().next().unwrap_or('\u{0}');

        if let Some(q) = quote {
            buf.push(ch);
            if ch == q {
                quote = None;
            }
            i += ch.len_utf8();
            continue;
        }

        if depth == 0 {
            if let Some((len, kind)) = arrow_at(rest) {
                flush(&mut buf, &mut toks);
                toks.push(Tok::Arrow(kind));
                i += len;
                continue;
            }
            if ch == '|' {
                if let Some(close) = rest[1..].find('|') {
                    flush(&mut buf, &mut toks);
                    toks.push(Tok::PipeLabel(rest[1..1 + close].to_string()));
                    i += close + 2;
                    continue;
                }
            }
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = (depth - 1).max(0),
            _ => {}
        }
        buf.push(ch);
        i += ch.len_utf8();
    }
    flush(&mut buf, &mut toks);
    toks
}

/// Splits a text run into its node portion and a trailing inline label
/// fragment (`A -- yes` from `A -- yes --> B`). The fragment marker is the
/// first `--` / `==` / `-.` left behind after operator tokenization.
/// Markers inside brackets or quotes are label text, not split points, so
/// the scan tracks the same depth and quote state as [`tokenize`].
pub(crate) fn split_label_fragment(text: &str) -> (&str, Option<&str>) {
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = (depth - 1).max(0),
            '-' | '=' if depth == 0 && i > 0 => {
                for marker in ["--", "==", "-."] {
                    if text[i..].starts_with(marker) {
                        return (
                            text[..i].trim_end(),
                            Some(text[i + marker.len()..].trim()),
                        );
                    }
                }
            }
            _ => {}
        }
    }
    (text, None)
}

/// Nearest text run scanning backwards. Stops at another arrow, so in a
/// run of adjacent operators (`A<-->B` lexes as `<-` then `->`) only the
/// first operator claims the left endpoint and the rest drop out.
fn text_before<'t>(iter: impl Iterator<Item = &'t Tok>) -> Option<&'t str> {
    for tok in iter {
        match tok {
            Tok::Text(s) => return Some(s.as_str()),
            Tok::PipeLabel(_) => continue,
            Tok::Arrow(_) => return None,
        }
    }
    None
}

/// Nearest text run scanning forwards; labels and stray operators are
/// skipped so the first operator of an adjacent run still reaches its
/// right endpoint.
fn text_after<'t>(mut iter: impl Iterator<Item = &'t Tok>) -> Option<&'t str> {
    iter.find_map(|tok| match tok {
        Tok::Text(s) => Some(s.as_str()),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedEdge {
    pub from_text: String,
    pub to_text: String,
    pub label: Option<String>,
    pub kind: EdgeKind,
}

/// Pairs every arrow with its nearest text neighbours, resolving the label
/// from a pipe segment beside the arrow or an inline fragment on the left.
/// Chains (`A --> B --> C`) share the middle endpoint.
pub(crate) fn extract_edges(toks: &[Tok]) -> Vec<ParsedEdge> {
    let mut out = Vec::new();
    for (i, tok) in toks.iter().enumerate() {
        let Tok::Arrow(kind) = tok else {
            continue;
        };

        let lhs = text_before(toks[..i].iter().rev());
        let rhs = text_after(toks[i + 1..].iter());
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            continue;
        };

        let (from_text, inline) = split_label_fragment(lhs);
        let (to_text, _) = split_label_fragment(rhs);

        let pipe_after = match toks.get(i + 1) {
            Some(Tok::PipeLabel(s)) => Some(s.as_str()),
            _ => None,
        };
        let pipe_before = match i.checked_sub(1).and_then(|j| toks.get(j)) {
            Some(Tok::PipeLabel(s)) => Some(s.as_str()),
            _ => None,
        };

        out.push(ParsedEdge {
            from_text: from_text.to_string(),
            to_text: to_text.to_string(),
            label: pipe_after.or(pipe_before).or(inline).map(str::to_string),
            kind: *kind,
        });
    }
    out
}

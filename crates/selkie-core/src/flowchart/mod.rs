//! Flowchart dialect parser.
//!
//! The grammar is line-oriented and noisy in the wild, so parsing is a
//! two-pass affair over preprocessed lines:
//!
//! 1. a definition scan harvests every explicit shape definition (first
//!    definition wins) and the set of declared subgraph ids, so late
//!    definitions and forward subgraph references resolve;
//! 2. a structural pass walks the document with a stack of open subgraphs,
//!    creating nodes, edges, and membership as statements appear.
//!
//! Unrecognized lines are skipped; the caller validates the finished graph.

mod link;

use crate::error::Result;
use crate::model::{Dialect, Direction, Edge, Graph, Node, NodeKind, Subgraph};
use crate::text::clean_label;
use link::{extract_edges, split_label_fragment, tokenize, Tok};
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::OnceLock;

pub(crate) fn parse(source: &str) -> Result<Graph> {
    let lines = preprocess(source);
    let mut graph = Graph::new(Dialect::Flowchart);

    // Pass 1: shape definitions and declared subgraph ids.
    let mut defs: FxHashMap<String, (NodeKind, String)> = FxHashMap::default();
    let mut subgraph_ids: FxHashSet<String> = FxHashSet::default();
    let mut direction: Option<Direction> = None;

    for line in &lines {
        if let Some(dir) = header_direction(&line.text) {
            if direction.is_none() {
                direction = Some(dir.unwrap_or_default());
            }
            continue;
        }
        if let Some(rest) = subgraph_rest(&line.text) {
            let (id, _) = parse_subgraph_header(rest, line.number);
            subgraph_ids.insert(id);
            continue;
        }
        if line.text == "end" || direction_token(&line.text).is_some() {
            continue;
        }
        for tok in tokenize(&line.text) {
            let Tok::Text(text) = tok else { continue };
            let (node_part, _) = split_label_fragment(&text);
            let Some(node_ref) = parse_node_text(node_part) else {
                continue;
            };
            if let Some((kind, label)) = node_ref.shape {
                defs.entry(node_ref.id).or_insert((kind, label));
            }
        }
    }

    graph.meta.direction = direction.unwrap_or_default();

    // Pass 2: structure.
    let mut stack: Vec<String> = Vec::new();
    let mut edge_counter = 0usize;

    for line in &lines {
        if header_direction(&line.text).is_some() {
            continue;
        }
        if let Some(rest) = subgraph_rest(&line.text) {
            let (id, label) = parse_subgraph_header(rest, line.number);
            if !graph.subgraphs.contains_key(&id) {
                graph.subgraphs.insert(
                    id.clone(),
                    Subgraph {
                        id: id.clone(),
                        label,
                        parent: stack.last().cloned(),
                        children: Vec::new(),
                        direction: None,
                        boundary: None,
                    },
                );
            }
            stack.push(id);
            continue;
        }
        if line.text == "end" {
            stack.pop();
            continue;
        }
        if let Some(dir) = direction_token(&line.text) {
            if let Some(top) = stack.last() {
                if let Some(sg) = graph.subgraphs.get_mut(top) {
                    sg.direction = Some(dir);
                }
            }
            continue;
        }

        let toks = tokenize(&line.text);
        let edges = extract_edges(&toks);
        if !edges.is_empty() {
            for parsed in edges {
                let Some(from) =
                    touch_endpoint(&mut graph, &parsed.from_text, &defs, &subgraph_ids, &stack)
                else {
                    continue;
                };
                let Some(to) =
                    touch_endpoint(&mut graph, &parsed.to_text, &defs, &subgraph_ids, &stack)
                else {
                    continue;
                };
                let id = format!("e-{from}-{to}-{edge_counter}");
                edge_counter += 1;
                let label = parsed
                    .label
                    .map(|l| clean_label(&l))
                    .filter(|l| !l.is_empty());
                graph.edges.insert(
                    id.clone(),
                    Edge {
                        id,
                        from,
                        to,
                        label,
                        kind: parsed.kind,
                        c4: None,
                    },
                );
            }
            continue;
        }

        // Standalone node declaration: exactly one text run, nothing else.
        let mut texts = toks.iter().filter_map(|t| match t {
            Tok::Text(s) => Some(s.as_str()),
            _ => None,
        });
        if let (Some(text), None) = (texts.next(), texts.next()) {
            let _ = touch_endpoint(&mut graph, text, &defs, &subgraph_ids, &stack);
        }
    }

    Ok(graph)
}

#[derive(Debug)]
struct Line {
    /// 1-based number of the first physical line of the statement.
    number: usize,
    text: String,
}

/// Trims, drops blanks and `%%` comments, coalesces lines while the bracket
/// balance stays positive (multi-line labels), then splits top-level `;`
/// statement separators.
fn preprocess(source: &str) -> Vec<Line> {
    let mut logical: Vec<Line> = Vec::new();
    let mut raw_lines = source
        .lines()
        .enumerate()
        .map(|(ix, l)| (ix + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with("%%"));

    let mut pending: Option<(usize, String, i32)> = None;
    loop {
        match pending.take() {
            Some((number, text, balance)) if balance > 0 => match raw_lines.next() {
                Some((_, next)) => {
                    let balance = balance + bracket_balance(next);
                    pending = Some((number, format!("{text} {next}"), balance));
                }
                None => {
                    logical.push(Line { number, text });
                    break;
                }
            },
            Some((number, text, _)) => {
                logical.push(Line { number, text });
                pending = None;
            }
            None => match raw_lines.next() {
                Some((number, text)) => {
                    pending = Some((number, text.to_string(), bracket_balance(text)));
                }
                None => break,
            },
        }
    }

    let mut out = Vec::new();
    for line in logical {
        for stmt in split_statements(&line.text) {
            let stmt = stmt.trim();
            if !stmt.is_empty() {
                out.push(Line {
                    number: line.number,
                    text: stmt.to_string(),
                });
            }
        }
    }
    out
}

fn bracket_balance(s: &str) -> i32 {
    let mut balance = 0;
    for ch in s.chars() {
        match ch {
            '[' | '(' | '{' => balance += 1,
            ']' | ')' | '}' => balance -= 1,
            _ => {}
        }
    }
    balance
}

/// Splits on `;` outside quotes and brackets.
fn split_statements(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    for ch in s.chars() {
        if let Some(q) = quote {
            buf.push(ch);
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            ';' if depth == 0 => {
                out.push(std::mem::take(&mut buf));
                continue;
            }
            '"' | '\'' => quote = Some(ch),
            '[' | '(' | '{' => depth += 1,
            ']' | ')' | '}' => depth = (depth - 1).max(0),
            _ => {}
        }
        buf.push(ch);
    }
    out.push(buf);
    out
}

/// `Some(direction)` when the line is a `flowchart`/`graph` header. Only the
/// first header's direction is honored; later ones are consumed as noise.
fn header_direction(line: &str) -> Option<Option<Direction>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(?:flowchart|graph)\b(?:\s+(TB|TD|BT|RL|LR))?").expect("valid regex")
    });
    let caps = re.captures(line)?;
    Some(caps.get(1).and_then(|m| Direction::from_token(m.as_str())))
}

fn subgraph_rest(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("subgraph")?;
    if rest.is_empty() {
        return None;
    }
    // Require a separator so node ids like `subgraphX` stay nodes.
    let first = rest.chars().next()?;
    if first.is_whitespace() || matches!(first, '"' | '\'' | '[') {
        Some(rest.trim())
    } else {
        None
    }
}

fn direction_token(line: &str) -> Option<Direction> {
    let rest = line.strip_prefix("direction")?;
    Direction::from_token(rest.trim())
}

fn id_prefix_len(s: &str) -> usize {
    s.chars()
        .take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .map(char::len_utf8)
        .sum()
}

#[derive(Debug)]
struct NodeRef {
    id: String,
    shape: Option<(NodeKind, String)>,
}

/// Parses `id`, `id[label]`, `id(label)`, `id((label))`, `id([label])`,
/// `id{label}`. Returns `None` for anything else (the line is then skipped).
fn parse_node_text(text: &str) -> Option<NodeRef> {
    let t = text.trim();
    let id_len = id_prefix_len(t);
    if id_len == 0 {
        return None;
    }
    let (id, rest) = t.split_at(id_len);
    let rest = rest.trim();
    if rest.is_empty() {
        return Some(NodeRef {
            id: id.to_string(),
            shape: None,
        });
    }

    // Delimiter pairs in specificity order: double before single.
    const SHAPES: &[(&str, &str, NodeKind)] = &[
        ("((", "))", NodeKind::Circle),
        ("([", "])", NodeKind::Stadium),
        ("[", "]", NodeKind::Rect),
        ("{", "}", NodeKind::Diamond),
        ("(", ")", NodeKind::Round),
    ];
    for (open, close, kind) in SHAPES {
        if rest.len() >= open.len() + close.len()
            && rest.starts_with(open)
            && rest.ends_with(close)
        {
            let inner = &rest[open.len()..rest.len() - close.len()];
            return Some(NodeRef {
                id: id.to_string(),
                shape: Some((*kind, clean_label(inner))),
            });
        }
    }
    None
}

/// Resolves an edge endpoint or standalone declaration. Declared subgraph
/// ids pass through untouched; node ids are created on first sight (shape
/// from the definitions table) and re-homed into the innermost open
/// subgraph. Re-encounters move the node to the end of the membership list
/// (second appearance wins for position; the first-won shape stays).
fn touch_endpoint(
    graph: &mut Graph,
    text: &str,
    defs: &FxHashMap<String, (NodeKind, String)>,
    subgraph_ids: &FxHashSet<String>,
    stack: &[String],
) -> Option<String> {
    let node_ref = parse_node_text(text)?;
    let id = node_ref.id;
    if subgraph_ids.contains(&id) {
        return Some(id);
    }

    if !graph.nodes.contains_key(&id) {
        let (kind, label) = defs
            .get(&id)
            .cloned()
            .unwrap_or((NodeKind::Rect, id.clone()));
        graph.nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                label,
                kind,
                parent: None,
                c4: None,
            },
        );
    }

    if let Some(top) = stack.last() {
        let previous = graph.nodes.get(&id).and_then(|n| n.parent.clone());
        if let Some(prev) = previous {
            if let Some(sg) = graph.subgraphs.get_mut(&prev) {
                sg.children.retain(|c| c != &id);
            }
        }
        if let Some(node) = graph.nodes.get_mut(&id) {
            node.parent = Some(top.clone());
        }
        if let Some(sg) = graph.subgraphs.get_mut(top) {
            sg.children.retain(|c| c != &id);
            sg.children.push(id.clone());
        }
    }

    Some(id)
}

/// Subgraph header forms, in order of attempt:
/// `"title"` (slugged id), `id`, `id[title]`, `id "title"`, and the bare
/// `id tail with spaces` form where the entire tail becomes the title *and*
/// its slug replaces the id. The last form shadows the written id; edges
/// naming it create a plain node instead. Kept bug-for-bug.
fn parse_subgraph_header(rest: &str, line_number: usize) -> (String, Option<String>) {
    let rest = rest.trim();

    let slug_or_fallback = |title: &str| {
        let slug = slugify(title);
        if slug.is_empty() {
            format!("sg-{line_number}")
        } else {
            slug
        }
    };

    if rest.starts_with('"') || rest.starts_with('\'') {
        let title = clean_label(rest);
        return (slug_or_fallback(&title), Some(title));
    }

    let id_len = id_prefix_len(rest);
    if id_len == 0 {
        let title = clean_label(rest);
        return (slug_or_fallback(&title), Some(title));
    }

    let (token, tail) = rest.split_at(id_len);
    let tail = tail.trim();
    if tail.is_empty() {
        return (token.to_string(), Some(token.to_string()));
    }
    if tail.starts_with('[') && tail.ends_with(']') && tail.len() >= 2 {
        let title = clean_label(&tail[1..tail.len() - 1]);
        return (token.to_string(), Some(title));
    }
    if tail.starts_with('"') || tail.starts_with('\'') {
        let title = clean_label(tail);
        return (token.to_string(), Some(title));
    }

    let title = clean_label(rest);
    (slug_or_fallback(&title), Some(title))
}

/// Lowercase, every non-alphanumeric character to `-`, trim `-`.
fn slugify(s: &str) -> String {
    let mapped: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    mapped.trim_matches('-').to_string()
}

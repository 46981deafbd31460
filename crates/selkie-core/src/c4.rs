//! C4-Context dialect parser.
//!
//! The grammar is a flat sequence of macro-style calls, `Name(arg, "arg")`,
//! with `{ … }` blocks opening boundary scopes. Each line holds one call;
//! multi-line joining never applies. Forward references are legal: edges
//! carry string endpoints and the graph is validated only after the whole
//! document is consumed. Unrecognized or malformed calls are skipped.

use crate::error::Result;
use crate::model::{
    BoundaryType, C4EdgeData, C4NodeData, C4Type, Dialect, Edge, EdgeKind, Graph, Node, NodeKind,
    Subgraph,
};
use crate::text::clean_label;

pub(crate) fn parse(source: &str) -> Result<Graph> {
    let mut graph = Graph::new(Dialect::C4Context);
    let mut stack: Vec<String> = Vec::new();
    let mut edge_counter = 0usize;
    let mut header_seen = false;

    let mut lines = source.lines().peekable();
    while let Some(raw) = lines.next() {
        let stripped = strip_inline_comment(raw);
        let t = stripped.trim();
        if t.is_empty() {
            continue;
        }

        if !header_seen {
            // The detector routed us here, so the first non-blank line is
            // the `C4Context` header; consume it.
            header_seen = true;
            continue;
        }

        if t == "}" {
            stack.pop();
            continue;
        }
        if t == "{" {
            continue;
        }
        if let Some(title) = t.strip_prefix("title ") {
            let title = clean_label(title);
            if !title.is_empty() {
                graph.meta.title = Some(title);
            }
            continue;
        }

        let Some(call) = parse_macro_stmt(t) else {
            continue;
        };

        if let Some(boundary) = boundary_type(&call.name) {
            push_boundary(&mut graph, &mut stack, &call, boundary);
            if !call.has_lbrace {
                consume_lbrace(&mut lines);
            }
            continue;
        }

        if let Some(c4_type) = element_type(&call.name) {
            add_element(&mut graph, &stack, &call, c4_type);
            continue;
        }

        if let Some(kind) = rel_kind(&call.name) {
            add_rel(&mut graph, &mut edge_counter, &call, kind);
            continue;
        }
        // Unknown macro: best-effort skip.
    }

    Ok(graph)
}

#[derive(Debug)]
struct MacroCall {
    name: String,
    args: Vec<String>,
    tags: Option<String>,
    has_lbrace: bool,
}

impl MacroCall {
    fn arg(&self, ix: usize) -> Option<&str> {
        self.args.get(ix).map(String::as_str).filter(|s| !s.is_empty())
    }
}

fn boundary_type(name: &str) -> Option<BoundaryType> {
    match name {
        "Enterprise_Boundary" => Some(BoundaryType::Enterprise),
        "System_Boundary" => Some(BoundaryType::System),
        "Container_Boundary" => Some(BoundaryType::Container),
        "Boundary" => Some(BoundaryType::Boundary),
        _ => None,
    }
}

fn element_type(name: &str) -> Option<C4Type> {
    match name {
        "Person" => Some(C4Type::Person),
        "Person_Ext" => Some(C4Type::PersonExt),
        "System" => Some(C4Type::System),
        "System_Ext" => Some(C4Type::SystemExt),
        "SystemDb" => Some(C4Type::SystemDb),
        "SystemQueue" => Some(C4Type::SystemQueue),
        "Container" => Some(C4Type::Container),
        "Container_Ext" => Some(C4Type::ContainerExt),
        "ContainerDb" => Some(C4Type::ContainerDb),
        "ContainerQueue" => Some(C4Type::ContainerQueue),
        "Component" => Some(C4Type::Component),
        "Component_Ext" => Some(C4Type::ComponentExt),
        "ComponentDb" => Some(C4Type::ComponentDb),
        "ComponentQueue" => Some(C4Type::ComponentQueue),
        _ => None,
    }
}

fn rel_kind(name: &str) -> Option<EdgeKind> {
    match name {
        "BiRel" => Some(EdgeKind::Bidirectional),
        // Direction suffixes are semantic hints only; layout ignores them.
        "Rel" | "Rel_U" | "Rel_Up" | "Rel_D" | "Rel_Down" | "Rel_L" | "Rel_Left" | "Rel_R"
        | "Rel_Right" | "Rel_Back" | "Rel_Neighbor" => Some(EdgeKind::Directed),
        _ => None,
    }
}

fn push_boundary(
    graph: &mut Graph,
    stack: &mut Vec<String>,
    call: &MacroCall,
    boundary: BoundaryType,
) {
    let Some(id) = call.arg(0).map(str::to_string) else {
        return;
    };
    let label = call.arg(1).map(clean_label).filter(|l| !l.is_empty());
    if !graph.subgraphs.contains_key(&id) {
        graph.subgraphs.insert(
            id.clone(),
            Subgraph {
                id: id.clone(),
                label,
                parent: stack.last().cloned(),
                children: Vec::new(),
                direction: None,
                boundary: Some(boundary),
            },
        );
    }
    stack.push(id);
}

fn add_element(graph: &mut Graph, stack: &[String], call: &MacroCall, c4_type: C4Type) {
    let Some(id) = call.arg(0).map(str::to_string) else {
        return;
    };
    let label = call
        .arg(1)
        .map(clean_label)
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| id.clone());

    // Containers and components carry a technology argument before the
    // description; people and systems do not.
    let (technology, description) = if matches!(
        c4_type,
        C4Type::Container
            | C4Type::ContainerExt
            | C4Type::ContainerDb
            | C4Type::ContainerQueue
            | C4Type::Component
            | C4Type::ComponentExt
            | C4Type::ComponentDb
            | C4Type::ComponentQueue
    ) {
        (call.arg(2), call.arg(3))
    } else {
        (None, call.arg(2))
    };

    let parent = stack.last().cloned();
    let node = Node {
        id: id.clone(),
        label,
        kind: NodeKind::Rect,
        parent: parent.clone(),
        c4: Some(C4NodeData {
            c4_type,
            description: description.map(clean_label).filter(|s| !s.is_empty()),
            technology: technology.map(str::trim).map(str::to_string),
            tags: call.tags.clone(),
        }),
    };

    let existed = graph.nodes.contains_key(&id);
    graph.nodes.insert(id.clone(), node);

    if let Some(parent_id) = parent {
        if let Some(sg) = graph.subgraphs.get_mut(&parent_id) {
            if existed {
                sg.children.retain(|c| c != &id);
            }
            sg.children.push(id.clone());
        }
    }
}

fn add_rel(graph: &mut Graph, edge_counter: &mut usize, call: &MacroCall, kind: EdgeKind) {
    let (Some(from), Some(to)) = (call.arg(0), call.arg(1)) else {
        return;
    };
    let id = format!("e-{from}-{to}-{edge_counter}");
    *edge_counter += 1;
    graph.edges.insert(
        id.clone(),
        Edge {
            id,
            from: from.to_string(),
            to: to.to_string(),
            label: call.arg(2).map(clean_label).filter(|l| !l.is_empty()),
            kind,
            c4: Some(C4EdgeData {
                technology: call.arg(3).map(str::trim).map(str::to_string),
                description: call.arg(4).map(clean_label).filter(|s| !s.is_empty()),
                tags: call.tags.clone(),
            }),
        },
    );
}

/// Splits `Name(arg, "arg") {` into its name, positional arguments, `$tags`
/// attribute, and whether an opening brace trails the call. Returns `None`
/// for anything that does not look like a complete macro call.
fn parse_macro_stmt(t: &str) -> Option<MacroCall> {
    let t = t.trim_end();
    let paren = t.find('(')?;
    let name = t[..paren].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    let after = &t[paren + 1..];
    let end_paren = after.rfind(')')?;
    let args_raw = &after[..end_paren];
    let rest = after[end_paren + 1..].trim();

    let has_lbrace = match rest {
        "" => false,
        "{" => true,
        _ => return None,
    };

    let mut args = Vec::new();
    let mut tags = None;
    let mut cur = args_raw;
    loop {
        if cur.trim().is_empty() && args.is_empty() {
            break;
        }
        let (seg, rest) = split_next_arg(cur);
        match parse_arg(seg.trim()) {
            Arg::Positional(s) => args.push(s),
            Arg::Tags(s) => tags = Some(s),
            Arg::OtherAttr => {}
        }
        match rest {
            Some(r) => cur = r,
            None => break,
        }
    }

    Some(MacroCall {
        name: name.to_string(),
        args,
        tags,
        has_lbrace,
    })
}

enum Arg {
    Positional(String),
    Tags(String),
    OtherAttr,
}

/// Splits off the next comma-separated argument, ignoring commas inside
/// quotes.
fn split_next_arg(input: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;
    for (i, c) in input.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return (&input[..i], Some(&input[i + 1..])),
            _ => {}
        }
    }
    (input, None)
}

fn parse_arg(seg: &str) -> Arg {
    if let Some(rest) = seg.strip_prefix('$') {
        // `$key="value"` attribute arguments; only `tags` is modeled.
        let Some(eq) = rest.find('=') else {
            return Arg::OtherAttr;
        };
        let key = rest[..eq].trim();
        let value = unquote(rest[eq + 1..].trim());
        if key == "tags" {
            return Arg::Tags(value);
        }
        return Arg::OtherAttr;
    }
    Arg::Positional(unquote(seg))
}

fn unquote(seg: &str) -> String {
    let seg = seg.trim();
    if seg.len() >= 2 && seg.starts_with('"') && seg.ends_with('"') {
        seg[1..seg.len() - 1].to_string()
    } else {
        seg.to_string()
    }
}

/// Comment markers outside quotes end the line.
fn strip_inline_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_quotes = false;
    let mut idx = 0usize;
    while idx < bytes.len() {
        match bytes[idx] {
            b'"' => in_quotes = !in_quotes,
            b'%' if !in_quotes && idx + 1 < bytes.len() && bytes[idx + 1] == b'%' => {
                return &line[..idx];
            }
            _ => {}
        }
        idx += 1;
    }
    line
}

/// After a boundary call without a trailing `{`, the brace may sit alone on
/// the next non-blank line.
fn consume_lbrace(lines: &mut std::iter::Peekable<std::str::Lines<'_>>) {
    while let Some(peek) = lines.peek() {
        let t = peek.trim();
        if t.is_empty() {
            lines.next();
            continue;
        }
        if t == "{" {
            lines.next();
        }
        return;
    }
}

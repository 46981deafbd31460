use pretty_assertions::assert_eq;
use selkie::{auto_layout, convert, parse, to_renderer, NodeVisual, Point, VisualState};

#[test]
fn convert_produces_all_three_products() {
    let converted = convert("graph TD\nA[Start] --> B[End]", None).unwrap();
    assert_eq!(converted.graph.nodes.len(), 2);
    assert_eq!(converted.state.nodes.len(), 2);
    assert_eq!(converted.records.nodes.len(), 2);
    assert_eq!(converted.records.edges.len(), 1);
}

#[test]
fn convert_propagates_parse_errors() {
    let err = convert("", None).unwrap_err();
    assert_eq!(err.line, 0);
}

#[test]
fn renderer_record_counts_hold_for_both_dialects() {
    for src in [
        "graph TD\nsubgraph s\n A --> B\nend\nC",
        "C4Context\nSystem_Boundary(b, \"B\") {\n System(x, \"X\")\n}\nPerson(p, \"P\")\nRel(p, x, \"r\")",
    ] {
        let g = parse(src).unwrap();
        let records = to_renderer(&g, &auto_layout(&g, None));
        assert_eq!(
            records.nodes.len(),
            g.nodes.len() + g.subgraphs.len(),
            "node records for {src:?}"
        );
        assert_eq!(records.edges.len(), g.edges.len(), "edge records for {src:?}");
    }
}

#[test]
fn reparsing_identical_text_yields_identical_key_sets() {
    let src = "graph TD\nsubgraph s\n A --> B\nend\nB --> C\nC --> A";
    let g1 = parse(src).unwrap();
    let g2 = parse(src).unwrap();
    let nodes1: Vec<&String> = g1.nodes.keys().collect();
    let nodes2: Vec<&String> = g2.nodes.keys().collect();
    assert_eq!(nodes1, nodes2);
    let edges1: Vec<&String> = g1.edges.keys().collect();
    let edges2: Vec<&String> = g2.edges.keys().collect();
    assert_eq!(edges1, edges2);
}

// The layout-preservation scenario: lock one node at a hand-picked spot,
// relayout, and expect only that node frozen.
#[test]
fn locked_prior_position_survives_relayout() {
    let src = "graph TD\nA[Start] --> B[Middle] --> C[End]";
    let first = convert(src, None).unwrap();
    let unlocked_a = first.state.nodes["A"].clone();

    let mut prior = VisualState::default();
    prior.nodes.insert(
        "B".to_string(),
        NodeVisual {
            position: Point::new(999.0, 999.0),
            size: None,
            locked: true,
        },
    );

    let second = convert(src, Some(&prior)).unwrap();
    assert_eq!(second.state.nodes["B"], prior.nodes["B"]);
    assert_eq!(second.state.nodes["A"], unlocked_a);

    // The records mirror the state: B is pinned and not draggable.
    let b = second
        .records
        .nodes
        .iter()
        .find(|n| n.id == "B")
        .unwrap();
    assert_eq!(b.position, Point::new(999.0, 999.0));
    assert!(!b.draggable);
}

#[test]
fn persisted_state_round_trips_through_json() {
    let converted = convert("graph TD\nsubgraph s\n A --> B\nend", None).unwrap();
    let json = converted.state.to_json().unwrap();
    let back = VisualState::from_json(&json).unwrap();
    assert_eq!(converted.state, back);
}

#[test]
fn convert_is_deterministic_end_to_end() {
    let src = "C4Context\ntitle Ctx\nPerson(u, \"User\")\nSystem(s, \"Sys\")\nRel(u, s, \"uses\")";
    let a = convert(src, None).unwrap();
    let b = convert(src, None).unwrap();
    assert_eq!(a.graph, b.graph);
    assert_eq!(a.state, b.state);
    assert_eq!(a.records, b.records);
}

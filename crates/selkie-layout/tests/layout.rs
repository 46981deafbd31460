use selkie_core::parse;
use selkie_layout::{auto_layout, NodeVisual, Point, Size, VisualState};

#[test]
fn empty_graph_yields_empty_state() {
    let g = parse("graph TD").unwrap();
    let state = auto_layout(&g, None);
    assert!(state.is_empty());
}

#[test]
fn single_node_gets_position_and_size() {
    let g = parse("graph TD\nA[Hello]").unwrap();
    let state = auto_layout(&g, None);
    let a = &state.nodes["A"];
    // Meta-graph margin offsets the lone vertex off the origin.
    assert_eq!(a.position, Point::new(40.0, 40.0));
    let size = a.size.unwrap();
    assert_eq!(size, Size::new(100.0, 58.0));
}

#[test]
fn chain_descends_along_tb() {
    let g = parse("graph TD\nA --> B --> C").unwrap();
    let state = auto_layout(&g, None);
    let ay = state.nodes["A"].position.y;
    let by = state.nodes["B"].position.y;
    let cy = state.nodes["C"].position.y;
    assert!(ay < by && by < cy);
}

#[test]
fn lr_chain_advances_on_x() {
    let g = parse("graph LR\nA --> B").unwrap();
    let state = auto_layout(&g, None);
    assert!(state.nodes["A"].position.x < state.nodes["B"].position.x);
    assert_eq!(state.nodes["A"].position.y, state.nodes["B"].position.y);
}

#[test]
fn subgraph_children_are_parent_relative_and_contained() {
    let src = "graph TB\nsubgraph box\n A --> B\nend";
    let g = parse(src).unwrap();
    let state = auto_layout(&g, None);

    let sg = &state.subgraphs["box"];
    assert!(sg.size.width >= 300.0);
    assert!(sg.size.height >= 200.0);

    for id in ["A", "B"] {
        let n = &state.nodes[id];
        let size = n.size.unwrap();
        assert!(n.position.x >= 0.0, "{id} x within parent");
        assert!(n.position.y >= 0.0, "{id} y within parent");
        assert!(n.position.x + size.width <= sg.size.width + 1e-9);
        assert!(n.position.y + size.height <= sg.size.height + 1e-9);
    }
}

#[test]
fn nested_subgraph_positions_are_parent_relative() {
    let src = "graph TB\n subgraph outer\n  subgraph inner\n   X --> Y\n  end\n  Z\n end";
    let g = parse(src).unwrap();
    let state = auto_layout(&g, None);

    let outer = &state.subgraphs["outer"];
    let inner = &state.subgraphs["inner"];
    assert!(outer.size.width >= 300.0);

    // Inner is inside outer: relative offsets are non-negative and the
    // box fits within the parent's recorded extent.
    assert!(inner.position.x >= 0.0);
    assert!(inner.position.y >= 0.0);
    assert!(inner.position.x + inner.size.width <= outer.size.width + 1e-9);
    assert!(inner.position.y + inner.size.height <= outer.size.height + 1e-9);

    // Z is a direct child of outer, X/Y of inner.
    let z = &state.nodes["Z"];
    assert!(z.position.y >= 0.0);
    assert!(state.nodes["X"].position.y >= 0.0);
}

#[test]
fn three_levels_nest_without_losing_anyone() {
    let src = "graph TD\nsubgraph a\n subgraph b\n  subgraph c\n   N\n  end\n end\nend";
    let g = parse(src).unwrap();
    let state = auto_layout(&g, None);
    for id in ["a", "b", "c"] {
        assert!(state.subgraphs.contains_key(id));
    }
    assert!(state.nodes.contains_key("N"));
    // Every nested level is offset inside its parent.
    assert!(state.subgraphs["b"].position.y > 0.0);
    assert!(state.subgraphs["c"].position.y > 0.0);
}

#[test]
fn locked_node_survives_byte_for_byte() {
    let g = parse("graph TD\nA[Start] --> B[Middle] --> C[End]").unwrap();

    let mut prior = VisualState::default();
    prior.nodes.insert(
        "B".to_string(),
        NodeVisual {
            position: Point::new(999.0, 999.0),
            size: None,
            locked: true,
        },
    );

    let state = auto_layout(&g, Some(&prior));
    assert_eq!(state.nodes["B"], prior.nodes["B"]);
    // A and C were computed normally.
    assert_ne!(state.nodes["A"].position, Point::new(999.0, 999.0));
    assert!(state.nodes["A"].size.is_some());
}

#[test]
fn prior_edges_and_viewport_pass_through() {
    let g = parse("graph TD\nA --> B").unwrap();
    let prior: VisualState = VisualState::from_json(
        r#"{
            "edges": {
                "e-A-B-0": {"bendPoints": [{"x": 5.0, "y": 6.0}]},
                "e-gone-gone-9": {"bendPoints": [{"x": 0.0, "y": 0.0}]}
            },
            "viewport": {"zoom": 2.0, "pan": {"x": 7.0, "y": 8.0}}
        }"#,
    )
    .unwrap();

    let state = auto_layout(&g, Some(&prior));
    assert_eq!(
        state.edges["e-A-B-0"].bend_points.as_ref().unwrap()[0],
        Point::new(5.0, 6.0)
    );
    // Entries for ids the graph does not have are dropped.
    assert!(!state.edges.contains_key("e-gone-gone-9"));
    assert_eq!(state.viewport.unwrap().zoom, 2.0);
}

#[test]
fn same_rank_nodes_do_not_overlap() {
    let g = parse("graph TD\nsubgraph s\n R --> A\n R --> B\n R --> C\nend").unwrap();
    let state = auto_layout(&g, None);

    // A, B, C share a rank under TB: x-intervals must be disjoint.
    let mut intervals: Vec<(f64, f64)> = ["A", "B", "C"]
        .iter()
        .map(|id| {
            let n = &state.nodes[*id];
            let w = n.size.unwrap().width;
            (n.position.x, n.position.x + w)
        })
        .collect();
    intervals.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    for pair in intervals.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "overlap: {pair:?}");
    }
}

#[test]
fn disjoint_components_all_get_positions() {
    let g = parse("graph TD\nA --> B\nC --> D\nE").unwrap();
    let state = auto_layout(&g, None);
    for id in ["A", "B", "C", "D", "E"] {
        assert!(state.nodes.contains_key(id));
    }
}

#[test]
fn two_top_level_subgraphs_do_not_overlap() {
    let src = "graph TD\nsubgraph one\n A\nend\nsubgraph two\n B\nend\nA --> B";
    let g = parse(src).unwrap();
    let state = auto_layout(&g, None);

    let one = &state.subgraphs["one"];
    let two = &state.subgraphs["two"];
    let one_bottom = one.position.y + one.size.height;
    let one_right = one.position.x + one.size.width;
    let separated_vertically =
        two.position.y >= one_bottom || one.position.y >= two.position.y + two.size.height;
    let separated_horizontally =
        two.position.x >= one_right || one.position.x >= two.position.x + two.size.width;
    assert!(separated_vertically || separated_horizontally);
}

#[test]
fn layout_is_deterministic() {
    let src = "graph TD\nsubgraph s\n A --> B\nend\nC --> A\nD";
    let g = parse(src).unwrap();
    let s1 = auto_layout(&g, None);
    let s2 = auto_layout(&g, None);
    assert_eq!(s1, s2);
}

#[test]
fn c4_boundaries_lay_out_like_subgraphs() {
    let src = "C4Context\nSystem_Boundary(b, \"Bank\") {\n System(s1, \"Core\")\n System(s2, \"Edge\")\n}\nPerson(u, \"User\")\nRel(u, s1, \"Uses\")";
    let g = parse(src).unwrap();
    let state = auto_layout(&g, None);

    let b = &state.subgraphs["b"];
    assert!(b.size.width >= 300.0);
    // Boundary members are boundary-relative.
    for id in ["s1", "s2"] {
        let n = &state.nodes[id];
        assert!(n.position.x >= 0.0);
        assert!(n.position.y >= 0.0);
    }
    // The standalone person is canvas-absolute and was placed by the
    // meta-graph pass.
    assert!(state.nodes["u"].size.is_some());
}

#[test]
fn locked_subgraph_survives_relayout() {
    let src = "graph TD\nsubgraph s\n A\nend\nB --> A";
    let g = parse(src).unwrap();
    let first = auto_layout(&g, None);

    let mut prior = VisualState::default();
    let mut locked = first.subgraphs["s"].clone();
    locked.position = Point::new(123.0, 456.0);
    locked.locked = true;
    prior.subgraphs.insert("s".to_string(), locked.clone());

    let second = auto_layout(&g, Some(&prior));
    assert_eq!(second.subgraphs["s"], locked);
}

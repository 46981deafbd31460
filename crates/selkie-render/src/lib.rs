#![forbid(unsafe_code)]

//! Render adapter: `(Graph, VisualState) → RendererRecords`.
//!
//! A pure mapping with no semantic or geometric decisions. Containers and
//! leaves flatten into one record list the canvas can consume directly;
//! subgraph ids gain a `subgraph-` prefix so they never collide with node
//! ids in the renderer's flat namespace. Styling here is presentation-only
//! and deterministic (palette by index, C4 colours by element type); the
//! layout engine never reads any of it.

mod palette;

use selkie_core::{EdgeKind, Graph};
use selkie_layout::{Point, Size, VisualState};
use serde::Serialize;

/// The four cardinal connection points every leaf node exposes, as both
/// source and target handles.
pub const HANDLE_SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    /// Parent-relative for nested records, canvas-absolute otherwise,
    /// exactly as the visual state stores it.
    pub position: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(rename = "parentNode", skip_serializing_if = "Option::is_none")]
    pub parent_node: Option<String>,
    pub container: bool,
    pub draggable: bool,
    #[serde(rename = "sourceHandles")]
    pub source_handles: Vec<String>,
    #[serde(rename = "targetHandles")]
    pub target_handles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub bidirectional: bool,
    /// Advisory; the renderer may route edges its own way.
    #[serde(rename = "bendPoints", skip_serializing_if = "Option::is_none")]
    pub bend_points: Option<Vec<Point>>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RendererRecords {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

fn container_id(id: &str) -> String {
    format!("subgraph-{id}")
}

/// Rewrites an edge endpoint to its container record id when it names a
/// subgraph.
fn endpoint_id(graph: &Graph, id: &str) -> String {
    if graph.is_subgraph(id) {
        container_id(id)
    } else {
        id.to_string()
    }
}

pub fn to_renderer(graph: &Graph, state: &VisualState) -> RendererRecords {
    let mut records = RendererRecords::default();

    for (index, (id, sg)) in graph.subgraphs.iter().enumerate() {
        let visual = state.subgraphs.get(id);
        records.nodes.push(RenderNode {
            id: container_id(id),
            label: sg.label.clone().unwrap_or_else(|| id.clone()),
            position: visual.map(|v| v.position).unwrap_or_default(),
            size: visual.map(|v| v.size),
            parent_node: sg.parent.as_deref().map(container_id),
            container: true,
            draggable: !visual.map(|v| v.locked).unwrap_or(false),
            source_handles: Vec::new(),
            target_handles: Vec::new(),
            color: Some(match sg.boundary {
                Some(boundary) => palette::boundary_color(boundary).to_string(),
                None => palette::subgraph_color(index).to_string(),
            }),
        });
    }

    for (id, node) in &graph.nodes {
        let visual = state.nodes.get(id);
        let handles: Vec<String> = HANDLE_SIDES.iter().map(|s| s.to_string()).collect();
        records.nodes.push(RenderNode {
            id: id.clone(),
            label: node.label.clone(),
            position: visual.map(|v| v.position).unwrap_or_default(),
            size: visual.and_then(|v| v.size),
            parent_node: node.parent.as_deref().map(container_id),
            container: false,
            draggable: !visual.map(|v| v.locked).unwrap_or(false),
            source_handles: handles.clone(),
            target_handles: handles,
            color: node
                .c4
                .as_ref()
                .map(|c4| palette::c4_color(c4.c4_type).to_string()),
        });
    }

    for (index, (id, edge)) in graph.edges.iter().enumerate() {
        records.edges.push(RenderEdge {
            id: id.clone(),
            source: endpoint_id(graph, &edge.from),
            target: endpoint_id(graph, &edge.to),
            label: edge.label.clone(),
            bidirectional: edge.kind == EdgeKind::Bidirectional,
            bend_points: state.edges.get(id).and_then(|v| v.bend_points.clone()),
            color: palette::edge_color(index).to_string(),
        });
    }

    records
}

//! The visual state: pure geometry keyed by the semantic ids.
//!
//! This is also the persisted layout format. Serialization is plain JSON
//! with camelCase keys; unknown keys are dropped on load and absent
//! sections default to empty, so older or hand-edited files stay loadable.
//! Entries whose ids no longer exist in the graph are ignored at merge
//! time, not here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Geometry for one node. Positions are top-left corners; a child node's
/// position is relative to its parent subgraph's top-left, a top-level
/// node's to the canvas. `locked` entries survive relayouts verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeVisual {
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeVisual {
    /// Advisory waypoints; the renderer may ignore them and the engine
    /// passes them through untouched.
    #[serde(
        rename = "bendPoints",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bend_points: Option<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubgraphVisual {
    pub position: Point,
    pub size: Size,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Point,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualState {
    #[serde(default)]
    pub nodes: IndexMap<String, NodeVisual>,
    #[serde(default)]
    pub edges: IndexMap<String, EdgeVisual>,
    #[serde(default)]
    pub subgraphs: IndexMap<String, SubgraphVisual>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

impl VisualState {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.edges.is_empty()
            && self.subgraphs.is_empty()
            && self.viewport.is_none()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

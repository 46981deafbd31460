//! The semantic graph model.
//!
//! Everything here is identity and relationship; geometry lives entirely in
//! the visual state. Collections are insertion-ordered maps keyed by stable
//! string ids, which is what makes relayouts and renderer diffs stable:
//! iteration order always equals source-appearance order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type NodeId = String;
pub type EdgeId = String;
pub type SubgraphId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    #[serde(rename = "TB")]
    Tb,
    #[serde(rename = "BT")]
    Bt,
    #[serde(rename = "LR")]
    Lr,
    #[serde(rename = "RL")]
    Rl,
}

impl Direction {
    /// Parses a header token; `TD` is the legacy alias for `TB`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TB" | "TD" => Some(Self::Tb),
            "BT" => Some(Self::Bt),
            "LR" => Some(Self::Lr),
            "RL" => Some(Self::Rl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tb => "TB",
            Self::Bt => "BT",
            Self::Lr => "LR",
            Self::Rl => "RL",
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Tb | Self::Bt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    #[serde(rename = "flowchart")]
    Flowchart,
    #[serde(rename = "c4context")]
    C4Context,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMeta {
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub dialect: Dialect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Rect,
    Round,
    Stadium,
    Circle,
    Diamond,
}

/// C4 element kinds. The `_Ext`/`Db`/`Queue` variants matter to styling and
/// tooling, not to layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum C4Type {
    Person,
    PersonExt,
    System,
    SystemExt,
    SystemDb,
    SystemQueue,
    Container,
    ContainerExt,
    ContainerDb,
    ContainerQueue,
    Component,
    ComponentExt,
    ComponentDb,
    ComponentQueue,
}

/// Extra payload a node carries when it came from a C4 dialect. Its
/// presence is the discriminator between plain flowchart nodes and C4
/// elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct C4NodeData {
    #[serde(rename = "c4Type")]
    pub c4_type: C4Type,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<SubgraphId>,
    #[serde(flatten)]
    pub c4: Option<C4NodeData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Directed,
    Bidirectional,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct C4EdgeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub kind: EdgeKind,
    #[serde(flatten)]
    pub c4: Option<C4EdgeData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryType {
    Enterprise,
    System,
    Container,
    Boundary,
}

/// A named container of child nodes. C4 boundaries are subgraphs with a
/// `boundary` tag; both share storage and the layout path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub id: SubgraphId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<SubgraphId>,
    /// Direct node children only; nested subgraphs are discovered through
    /// their own `parent` field.
    pub children: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(rename = "boundaryType", skip_serializing_if = "Option::is_none")]
    pub boundary: Option<BoundaryType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub meta: GraphMeta,
    pub nodes: IndexMap<NodeId, Node>,
    pub edges: IndexMap<EdgeId, Edge>,
    pub subgraphs: IndexMap<SubgraphId, Subgraph>,
}

impl Graph {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            meta: GraphMeta {
                direction: Direction::Tb,
                title: None,
                dialect,
            },
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            subgraphs: IndexMap::new(),
        }
    }

    pub fn is_subgraph(&self, id: &str) -> bool {
        self.subgraphs.contains_key(id)
    }

    /// Effective layout direction for a subgraph: its own override, or the
    /// graph-wide direction.
    pub fn direction_of(&self, subgraph: &Subgraph) -> Direction {
        subgraph.direction.unwrap_or(self.meta.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_node_serializes_without_c4_keys() {
        let node = Node {
            id: "A".to_string(),
            label: "Start".to_string(),
            kind: NodeKind::Rect,
            parent: None,
            c4: None,
        };
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"id": "A", "label": "Start", "kind": "rect"})
        );
    }

    #[test]
    fn c4_payload_flattens_into_the_node() {
        let node = Node {
            id: "u".to_string(),
            label: "User".to_string(),
            kind: NodeKind::Rect,
            parent: Some("b".to_string()),
            c4: Some(C4NodeData {
                c4_type: C4Type::PersonExt,
                description: Some("external".to_string()),
                technology: None,
                tags: None,
            }),
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["c4Type"], json!("person_ext"));
        assert_eq!(value["description"], json!("external"));
        assert_eq!(value["parent"], json!("b"));
    }

    #[test]
    fn direction_tokens_round_trip() {
        assert_eq!(Direction::from_token("TD"), Some(Direction::Tb));
        assert_eq!(Direction::from_token("RL"), Some(Direction::Rl));
        assert_eq!(Direction::from_token("XX"), None);
        assert_eq!(
            serde_json::to_value(Direction::Lr).unwrap(),
            json!("LR")
        );
    }
}

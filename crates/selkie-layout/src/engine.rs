//! The hierarchical auto-layout engine.
//!
//! Layout runs bottom-up and outside-in over four phases:
//!
//! 1. every subgraph lays out its direct child nodes with the layered
//!    algorithm and records its own content size;
//! 1b. parents grow (children before parents) until node content and the
//!    estimated nested-subgraph block both fit, with a minimum footprint;
//! 2. a meta-graph of top-level containers and standalone nodes is laid
//!    out to place the outermost boxes on the canvas;
//! 3. nested subgraphs are placed inside their already-positioned parents,
//!    iterating until nothing placeable remains (bounded);
//! 4. the visual state is assembled, converting to parent-relative
//!    coordinates and folding in locked entries from the prior state.
//!
//! The engine reads the semantic graph and the prior state; it mutates
//! neither. All scratch state is owned by the single call.

use crate::measure::{node_size, TextMeasurer};
use crate::spacing::{LayoutSpacing, SUBGRAPH_MIN_HEIGHT, SUBGRAPH_MIN_WIDTH};
use crate::state::{NodeVisual, Point, Size, SubgraphVisual, VisualState};
use kelpie::{EdgeLabel, LayoutConfig, NodeLabel, RankDir, Ranker};
use rustc_hash::FxHashMap;
use selkie_core::{Direction, Graph, Subgraph};

/// Phase 3 is a fixed point over "parent positioned, children not yet";
/// the bound guarantees termination on any input.
const NESTED_PLACEMENT_MAX_ITERATIONS: usize = 100;

pub(crate) fn run(
    graph: &Graph,
    prior: Option<&VisualState>,
    spacing: &LayoutSpacing,
    measurer: &dyn TextMeasurer,
) -> VisualState {
    let mut engine = Engine {
        graph,
        spacing,
        node_sizes: FxHashMap::default(),
        node_local: FxHashMap::default(),
        sg_sizes: FxHashMap::default(),
        sg_abs: FxHashMap::default(),
    };

    for (id, node) in &graph.nodes {
        engine
            .node_sizes
            .insert(id.clone(), node_size(node, measurer));
    }

    engine.interior_layouts();
    engine.enlarge_parents();
    engine.meta_layout();
    engine.nested_placement();
    engine.assemble(prior)
}

struct Engine<'a> {
    graph: &'a Graph,
    spacing: &'a LayoutSpacing,
    node_sizes: FxHashMap<String, Size>,
    /// Child nodes: relative to their subgraph's top-left (Phase 1).
    /// Standalone nodes: canvas-absolute (Phase 2).
    node_local: FxHashMap<String, Point>,
    sg_sizes: FxHashMap<String, Size>,
    sg_abs: FxHashMap<String, Point>,
}

fn rankdir(direction: Direction) -> RankDir {
    match direction {
        Direction::Tb => RankDir::TB,
        Direction::Bt => RankDir::BT,
        Direction::Lr => RankDir::LR,
        Direction::Rl => RankDir::RL,
    }
}

/// `nodesep` separates siblings within a rank, `ranksep` separates ranks;
/// which of the configured horizontal/vertical gaps they take depends on
/// the rank axis.
fn layout_config(direction: Direction, horizontal_gap: f64, vertical_gap: f64) -> LayoutConfig {
    let (nodesep, ranksep) = if direction.is_vertical() {
        (horizontal_gap, vertical_gap)
    } else {
        (vertical_gap, horizontal_gap)
    };
    LayoutConfig {
        rankdir: rankdir(direction),
        nodesep,
        ranksep,
        ranker: Ranker::TightTree,
    }
}

fn bump_edge(lg: &mut kelpie::Graph<NodeLabel, EdgeLabel>, v: &str, w: &str) {
    if lg.has_edge(v, w) {
        if let Some(e) = lg.edge_mut(v, w) {
            e.weight += 1.0;
        }
    } else {
        lg.set_edge(v.to_string(), w.to_string(), EdgeLabel::default());
    }
}

#[derive(Debug, Clone, Copy)]
struct BBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BBox {
    fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Bounding box over laid-out kelpie nodes (centers plus half sizes).
fn laid_out_bbox(lg: &kelpie::Graph<NodeLabel, EdgeLabel>) -> Option<BBox> {
    let mut bbox: Option<BBox> = None;
    for (_, lbl) in lg.nodes() {
        let (Some(cx), Some(cy)) = (lbl.x, lbl.y) else {
            continue;
        };
        let (half_w, half_h) = (lbl.width / 2.0, lbl.height / 2.0);
        let b = bbox.get_or_insert(BBox {
            min_x: cx - half_w,
            min_y: cy - half_h,
            max_x: cx + half_w,
            max_y: cy + half_h,
        });
        b.min_x = b.min_x.min(cx - half_w);
        b.min_y = b.min_y.min(cy - half_h);
        b.max_x = b.max_x.max(cx + half_w);
        b.max_y = b.max_y.max(cy + half_h);
    }
    bbox
}

impl<'a> Engine<'a> {
    /// Subgraph ids ordered deepest-first (children before parents), with
    /// insertion order as the stable tie-break.
    fn subgraphs_children_first(&self) -> Vec<String> {
        let graph = self.graph;
        let mut depths: FxHashMap<&str, usize> = FxHashMap::default();
        for id in graph.subgraphs.keys() {
            let mut depth = 0usize;
            let mut cursor = id.as_str();
            // Bounded walk: validation guarantees acyclicity, the cap
            // keeps even a broken graph from spinning.
            for _ in 0..graph.subgraphs.len() {
                match graph.subgraphs.get(cursor).and_then(|s| s.parent.as_deref()) {
                    Some(parent) => {
                        depth += 1;
                        cursor = parent;
                    }
                    None => break,
                }
            }
            depths.insert(id.as_str(), depth);
        }

        let mut ids: Vec<String> = graph.subgraphs.keys().cloned().collect();
        ids.sort_by_key(|id| std::cmp::Reverse(depths.get(id.as_str()).copied().unwrap_or(0)));
        ids
    }

    fn direct_child_subgraphs(&self, parent: &str) -> Vec<&'a Subgraph> {
        self.graph
            .subgraphs
            .values()
            .filter(|sg| sg.parent.as_deref() == Some(parent))
            .collect()
    }

    fn direction_of_subgraph(&self, sg: &Subgraph) -> Direction {
        self.graph.direction_of(sg)
    }

    /// Phase 1: layered layout of each subgraph's direct child nodes,
    /// translated into the subgraph-local frame, recording content size.
    fn interior_layouts(&mut self) {
        let graph = self.graph;
        let sp = self.spacing;
        let top_inset = sp.subgraph_padding + sp.subgraph_header_height + sp.subgraph_content_top_margin;

        for sg_id in self.subgraphs_children_first() {
            let Some(sg) = graph.subgraphs.get(&sg_id) else {
                continue;
            };

            let mut lg: kelpie::Graph<NodeLabel, EdgeLabel> = kelpie::Graph::new();
            for child in &sg.children {
                let size = self.node_sizes.get(child).copied().unwrap_or_default();
                lg.set_node(child.clone(), NodeLabel::sized(size.width, size.height));
            }
            for edge in graph.edges.values() {
                if edge.from != edge.to && lg.has_node(&edge.from) && lg.has_node(&edge.to) {
                    bump_edge(&mut lg, &edge.from, &edge.to);
                }
            }

            kelpie::layout(
                &mut lg,
                &layout_config(
                    self.direction_of_subgraph(sg),
                    sp.node_separation_horizontal,
                    sp.node_separation_vertical,
                ),
            );

            let bbox = laid_out_bbox(&lg);
            for child in &sg.children {
                let Some(bbox) = bbox else { break };
                let Some(lbl) = lg.node(child) else { continue };
                let (Some(cx), Some(cy)) = (lbl.x, lbl.y) else {
                    continue;
                };
                self.node_local.insert(
                    child.clone(),
                    Point::new(
                        cx - lbl.width / 2.0 - bbox.min_x + sp.subgraph_padding,
                        cy - lbl.height / 2.0 - bbox.min_y + top_inset,
                    ),
                );
            }

            let (content_w, content_h) = bbox.map(|b| (b.width(), b.height())).unwrap_or((0.0, 0.0));
            self.sg_sizes.insert(
                sg_id,
                Size::new(
                    content_w + 2.0 * sp.subgraph_padding + 4.0,
                    content_h
                        + 2.0 * sp.subgraph_padding
                        + sp.subgraph_header_height
                        + sp.subgraph_content_top_margin
                        + 4.0,
                ),
            );
        }
    }

    /// Lowest bottom edge of a subgraph's own (direct) node content, in the
    /// subgraph-local frame.
    fn node_content_bottom(&self, sg: &Subgraph) -> Option<f64> {
        sg.children
            .iter()
            .filter_map(|id| {
                let pos = self.node_local.get(id)?;
                let size = self.node_sizes.get(id)?;
                Some(pos.y + size.height)
            })
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }

    fn node_content_right(&self, sg: &Subgraph) -> Option<f64> {
        sg.children
            .iter()
            .filter_map(|id| {
                let pos = self.node_local.get(id)?;
                let size = self.node_sizes.get(id)?;
                Some(pos.x + size.width)
            })
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }

    /// Phase 1b: walking children before parents, grow each parent so its
    /// node content and an estimated stack of its child subgraphs both
    /// fit, then apply the minimum footprint to every subgraph.
    fn enlarge_parents(&mut self) {
        let graph = self.graph;
        let sp = self.spacing;

        for sg_id in self.subgraphs_children_first() {
            let Some(sg) = graph.subgraphs.get(&sg_id) else {
                continue;
            };
            let kids = self.direct_child_subgraphs(&sg_id);

            if !kids.is_empty() {
                let direction = self.direction_of_subgraph(sg);
                let vertical = direction.is_vertical();

                // Stacked estimate of the nested block: sum along the
                // layout axis, max across it. Phase 3 refines placement.
                let (mut block_w, mut block_h) = (0.0_f64, 0.0_f64);
                for kid in &kids {
                    let size = self.sg_sizes.get(&kid.id).copied().unwrap_or_default();
                    if vertical {
                        block_w = block_w.max(size.width);
                        block_h += size.height;
                    } else {
                        block_h = block_h.max(size.height);
                        block_w += size.width;
                    }
                }
                let gaps = (kids.len() - 1) as f64;
                if vertical {
                    block_h += sp.nested_subgraph_separation_vertical * gaps;
                } else {
                    block_w += sp.nested_subgraph_separation_horizontal * gaps;
                }

                let (required_w, required_h) = if vertical {
                    let origin_y = (sp.subgraph_padding + sp.subgraph_header_height).max(
                        self.node_content_bottom(sg)
                            .map(|b| b + sp.mixed_content_vertical_spacing)
                            .unwrap_or(0.0),
                    );
                    (
                        block_w + 2.0 * sp.nested_content_margin,
                        origin_y + block_h + sp.subgraph_padding,
                    )
                } else {
                    let origin_x = sp.subgraph_padding.max(
                        self.node_content_right(sg)
                            .map(|r| r + sp.mixed_content_horizontal_spacing)
                            .unwrap_or(0.0),
                    );
                    (
                        origin_x + block_w + sp.subgraph_padding,
                        block_h + sp.subgraph_header_height + 2.0 * sp.nested_content_margin,
                    )
                };

                if let Some(size) = self.sg_sizes.get_mut(&sg_id) {
                    size.width = size.width.max(required_w);
                    size.height = size.height.max(required_h);
                }
            }

            if let Some(size) = self.sg_sizes.get_mut(&sg_id) {
                size.width = size.width.max(SUBGRAPH_MIN_WIDTH);
                size.height = size.height.max(SUBGRAPH_MIN_HEIGHT);
            }
        }
    }

    /// The meta-graph vertex an endpoint belongs to: its immediate parent
    /// container, or itself when standalone. Endpoints whose immediate
    /// parent is a nested container therefore map to a non-vertex and the
    /// edge is skipped, which is the intended aggregation behavior.
    fn meta_vertex<'g>(&'g self, endpoint: &'g str) -> &'g str {
        if let Some(node) = self.graph.nodes.get(endpoint) {
            return node.parent.as_deref().unwrap_or(endpoint);
        }
        if let Some(sg) = self.graph.subgraphs.get(endpoint) {
            return sg.parent.as_deref().unwrap_or(endpoint);
        }
        endpoint
    }

    fn is_ancestor_container(&self, ancestor: &str, descendant: &str) -> bool {
        let mut cursor = self
            .graph
            .subgraphs
            .get(descendant)
            .and_then(|s| s.parent.as_deref());
        for _ in 0..self.graph.subgraphs.len() {
            match cursor {
                Some(id) if id == ancestor => return true,
                Some(id) => {
                    cursor = self.graph.subgraphs.get(id).and_then(|s| s.parent.as_deref())
                }
                None => return false,
            }
        }
        false
    }

    /// Phase 2: place top-level subgraphs and standalone nodes by laying
    /// out the aggregated meta-graph.
    fn meta_layout(&mut self) {
        let graph = self.graph;
        let sp = self.spacing;
        let mut lg: kelpie::Graph<NodeLabel, EdgeLabel> = kelpie::Graph::new();

        for (id, sg) in &graph.subgraphs {
            if sg.parent.is_none() {
                let size = self.sg_sizes.get(id).copied().unwrap_or_default();
                lg.set_node(id.clone(), NodeLabel::sized(size.width, size.height));
            }
        }
        for (id, node) in &graph.nodes {
            if node.parent.is_none() {
                let size = self.node_sizes.get(id).copied().unwrap_or_default();
                lg.set_node(id.clone(), NodeLabel::sized(size.width, size.height));
            }
        }
        if lg.node_count() == 0 {
            return;
        }

        for edge in graph.edges.values() {
            let u = self.meta_vertex(&edge.from).to_string();
            let v = self.meta_vertex(&edge.to).to_string();
            if u == v || !lg.has_node(&u) || !lg.has_node(&v) {
                continue;
            }
            if self.is_ancestor_container(&u, &v) || self.is_ancestor_container(&v, &u) {
                continue;
            }
            bump_edge(&mut lg, &u, &v);
        }

        kelpie::layout(
            &mut lg,
            &layout_config(
                self.graph.meta.direction,
                sp.container_separation_horizontal,
                sp.container_separation_vertical,
            ),
        );

        let margin = sp.meta_graph_margin;
        for (id, lbl) in lg.nodes() {
            let (Some(cx), Some(cy)) = (lbl.x, lbl.y) else {
                continue;
            };
            let top_left = Point::new(cx - lbl.width / 2.0 + margin, cy - lbl.height / 2.0 + margin);
            if graph.subgraphs.contains_key(id) {
                self.sg_abs.insert(id.to_string(), top_left);
            } else {
                self.node_local.insert(id.to_string(), top_left);
            }
        }
    }

    /// The direct-child subgraph of `parent` that `endpoint` lives under,
    /// if its ancestry passes through one.
    fn child_anchor(&self, endpoint: &str, parent: &str) -> Option<String> {
        let mut cursor: Option<&str> = if let Some(node) = self.graph.nodes.get(endpoint) {
            node.parent.as_deref()
        } else if self.graph.subgraphs.contains_key(endpoint) {
            Some(endpoint)
        } else {
            None
        };

        for _ in 0..=self.graph.subgraphs.len() {
            let id = cursor?;
            let sg = self.graph.subgraphs.get(id)?;
            if sg.parent.as_deref() == Some(parent) {
                return Some(id.to_string());
            }
            cursor = sg.parent.as_deref();
        }
        None
    }

    /// Phase 3: place the direct child subgraphs of every positioned
    /// parent, in canvas-absolute coordinates, until nothing new can be
    /// placed.
    fn nested_placement(&mut self) {
        for _ in 0..NESTED_PLACEMENT_MAX_ITERATIONS {
            let mut progressed = false;
            let parents: Vec<String> = self
                .graph
                .subgraphs
                .keys()
                .filter(|id| self.sg_abs.contains_key(*id))
                .cloned()
                .collect();

            for parent_id in parents {
                let unplaced: Vec<String> = self
                    .direct_child_subgraphs(&parent_id)
                    .iter()
                    .filter(|sg| !self.sg_abs.contains_key(&sg.id))
                    .map(|sg| sg.id.clone())
                    .collect();
                if unplaced.is_empty() {
                    continue;
                }
                self.place_children(&parent_id, &unplaced);
                progressed = true;
            }

            if !progressed {
                break;
            }
        }
    }

    fn place_children(&mut self, parent_id: &str, kids: &[String]) {
        let graph = self.graph;
        let sp = self.spacing;
        let Some(parent) = graph.subgraphs.get(parent_id) else {
            return;
        };
        let direction = self.direction_of_subgraph(parent);
        let vertical = direction.is_vertical();

        let mut lg: kelpie::Graph<NodeLabel, EdgeLabel> = kelpie::Graph::new();
        for kid in kids {
            let size = self.sg_sizes.get(kid).copied().unwrap_or_default();
            lg.set_node(kid.clone(), NodeLabel::sized(size.width, size.height));
        }

        for edge in graph.edges.values() {
            let (Some(u), Some(v)) = (
                self.child_anchor(&edge.from, parent_id),
                self.child_anchor(&edge.to, parent_id),
            ) else {
                continue;
            };
            if u == v || !lg.has_node(&u) || !lg.has_node(&v) {
                continue;
            }
            bump_edge(&mut lg, &u, &v);
        }

        // A linear chain keeps edgeless siblings in a stable arrangement.
        if lg.edge_count() == 0 && kids.len() > 1 {
            for pair in kids.windows(2) {
                lg.set_edge(pair[0].clone(), pair[1].clone(), EdgeLabel::default());
            }
        }

        kelpie::layout(
            &mut lg,
            &layout_config(
                direction,
                sp.nested_subgraph_separation_horizontal,
                sp.nested_subgraph_separation_vertical,
            ),
        );

        let Some(bbox) = laid_out_bbox(&lg) else {
            return;
        };
        let parent_abs = self.sg_abs.get(parent_id).copied().unwrap_or_default();
        let parent_size = self.sg_sizes.get(parent_id).copied().unwrap_or_default();

        // The content origin clears the parent's own node content along
        // the layout axis; the cross axis centers the block.
        let (origin_x, origin_y) = if vertical {
            let below_nodes = self
                .node_content_bottom(parent)
                .map(|b| b + sp.mixed_content_vertical_spacing)
                .unwrap_or(0.0);
            (
                (parent_size.width - bbox.width()) / 2.0,
                (sp.subgraph_padding + sp.subgraph_header_height).max(below_nodes),
            )
        } else {
            let beside_nodes = self
                .node_content_right(parent)
                .map(|r| r + sp.mixed_content_horizontal_spacing)
                .unwrap_or(0.0);
            (
                sp.subgraph_padding.max(beside_nodes),
                (parent_size.height - bbox.height()) / 2.0,
            )
        };

        for kid in kids {
            let Some(lbl) = lg.node(kid) else { continue };
            let (Some(cx), Some(cy)) = (lbl.x, lbl.y) else {
                continue;
            };
            self.sg_abs.insert(
                kid.clone(),
                Point::new(
                    parent_abs.x + origin_x + (cx - lbl.width / 2.0 - bbox.min_x),
                    parent_abs.y + origin_y + (cy - lbl.height / 2.0 - bbox.min_y),
                ),
            );
        }
    }

    /// Phase 4: fold computed geometry and the prior state into a fresh
    /// visual state. Locked prior entries win verbatim; prior edge entries
    /// and the viewport pass through (dropping ids the graph no longer
    /// has).
    fn assemble(&self, prior: Option<&VisualState>) -> VisualState {
        let mut state = VisualState::default();

        for (id, sg) in &self.graph.subgraphs {
            if let Some(previous) = prior
                .and_then(|p| p.subgraphs.get(id))
                .filter(|v| v.locked)
            {
                state.subgraphs.insert(id.clone(), previous.clone());
                continue;
            }
            let abs = self.sg_abs.get(id).copied().unwrap_or_default();
            let position = match sg.parent.as_deref().and_then(|p| self.sg_abs.get(p)) {
                Some(parent_abs) => Point::new(abs.x - parent_abs.x, abs.y - parent_abs.y),
                None => abs,
            };
            state.subgraphs.insert(
                id.clone(),
                SubgraphVisual {
                    position,
                    size: self.sg_sizes.get(id).copied().unwrap_or_default(),
                    locked: false,
                },
            );
        }

        for id in self.graph.nodes.keys() {
            if let Some(previous) = prior.and_then(|p| p.nodes.get(id)).filter(|v| v.locked) {
                state.nodes.insert(id.clone(), previous.clone());
                continue;
            }
            state.nodes.insert(
                id.clone(),
                NodeVisual {
                    position: self.node_local.get(id).copied().unwrap_or_default(),
                    size: self.node_sizes.get(id).copied(),
                    locked: false,
                },
            );
        }

        if let Some(prior) = prior {
            for (id, edge_visual) in &prior.edges {
                if self.graph.edges.contains_key(id) {
                    state.edges.insert(id.clone(), edge_visual.clone());
                }
            }
            state.viewport = prior.viewport;
        }

        state
    }
}

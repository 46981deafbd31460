//! Layout spacing configuration.

/// The single knob record for every gap and margin the engine uses, in
/// canvas units. The defaults are tuned for readable output on a plain
/// canvas:
///
/// | option | default |
/// |---|---|
/// | `subgraph_header_height` | 40 |
/// | `subgraph_padding` | 20 |
/// | `subgraph_content_top_margin` | 10 |
/// | `node_separation_horizontal` / `_vertical` | 50 |
/// | `container_separation_horizontal` / `_vertical` | 80 |
/// | `nested_subgraph_separation_horizontal` / `_vertical` | 40 |
/// | `meta_graph_margin` | 40 |
/// | `nested_content_margin` | 20 |
/// | `mixed_content_vertical_spacing` / `_horizontal_spacing` | 30 |
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSpacing {
    /// Vertical room reserved for a subgraph's title strip.
    pub subgraph_header_height: f64,
    /// Inset between a subgraph border and its content on every side.
    pub subgraph_padding: f64,
    /// Extra gap between the header strip and the first content row.
    pub subgraph_content_top_margin: f64,
    pub node_separation_horizontal: f64,
    pub node_separation_vertical: f64,
    /// Gaps between top-level containers in the meta-graph pass.
    pub container_separation_horizontal: f64,
    pub container_separation_vertical: f64,
    /// Gaps between sibling subgraphs nested in the same parent.
    pub nested_subgraph_separation_horizontal: f64,
    pub nested_subgraph_separation_vertical: f64,
    /// Offset applied to everything the meta-graph pass places.
    pub meta_graph_margin: f64,
    /// Side margin kept around a nested-children block.
    pub nested_content_margin: f64,
    /// Clearance between a parent's own nodes and its nested subgraphs.
    pub mixed_content_vertical_spacing: f64,
    pub mixed_content_horizontal_spacing: f64,
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self {
            subgraph_header_height: 40.0,
            subgraph_padding: 20.0,
            subgraph_content_top_margin: 10.0,
            node_separation_horizontal: 50.0,
            node_separation_vertical: 50.0,
            container_separation_horizontal: 80.0,
            container_separation_vertical: 80.0,
            nested_subgraph_separation_horizontal: 40.0,
            nested_subgraph_separation_vertical: 40.0,
            meta_graph_margin: 40.0,
            nested_content_margin: 20.0,
            mixed_content_vertical_spacing: 30.0,
            mixed_content_horizontal_spacing: 30.0,
        }
    }
}

/// Minimum subgraph footprint after the enlargement pass.
pub(crate) const SUBGRAPH_MIN_WIDTH: f64 = 300.0;
pub(crate) const SUBGRAPH_MIN_HEIGHT: f64 = 200.0;

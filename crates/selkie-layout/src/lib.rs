#![forbid(unsafe_code)]

//! Semantic graph to visual state.
//!
//! The companion of `selkie-core`: where the core decides *what* exists,
//! this crate decides *where* it sits. Geometry is computed fresh on every
//! call from the graph alone (plus spacing configuration), then merged with
//! the caller's prior state so locked elements, edge bend points, and the
//! viewport survive relayouts. Nothing here ever mutates the graph.

mod engine;
pub mod measure;
pub mod spacing;
pub mod state;

pub use measure::{DeterministicTextMeasurer, TextMeasurer};
pub use spacing::LayoutSpacing;
pub use state::{EdgeVisual, NodeVisual, Point, Size, SubgraphVisual, Viewport, VisualState};

use selkie_core::Graph;

/// Computes a fresh visual state with default spacing and the formula
/// text measurer. Infallible: an empty graph yields an empty state.
pub fn auto_layout(graph: &Graph, prior: Option<&VisualState>) -> VisualState {
    auto_layout_with(
        graph,
        prior,
        &LayoutSpacing::default(),
        &DeterministicTextMeasurer::default(),
    )
}

/// [`auto_layout`] with explicit spacing and text measurement.
pub fn auto_layout_with(
    graph: &Graph,
    prior: Option<&VisualState>,
    spacing: &LayoutSpacing,
    measurer: &dyn TextMeasurer,
) -> VisualState {
    engine::run(graph, prior, spacing, measurer)
}

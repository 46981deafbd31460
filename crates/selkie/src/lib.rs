#![forbid(unsafe_code)]

//! `selkie` turns Mermaid-style diagram text into two layered products: a
//! semantic graph (identity and relationships, no geometry) and a visual
//! state (positions and sizes, no meaning). A render adapter translates the
//! pair into flat records an external canvas consumes.
//!
//! The whole pipeline in one call:
//!
//! ```
//! let converted = selkie::convert("graph TD\nA[Start] --> B[Done]", None)?;
//! assert_eq!(converted.records.nodes.len(), 2);
//! # Ok::<(), selkie::ParseError>(())
//! ```
//!
//! Or step by step, carrying a prior state so user-locked elements stay
//! put:
//!
//! ```
//! use selkie::{auto_layout, parse, to_renderer};
//!
//! let graph = parse("graph LR\nA --> B")?;
//! let state = auto_layout(&graph, None);
//! let records = to_renderer(&graph, &state);
//! assert_eq!(records.edges.len(), 1);
//! # Ok::<(), selkie::ParseError>(())
//! ```

pub use selkie_core::{
    detect, parse, BoundaryType, C4EdgeData, C4NodeData, C4Type, Dialect, Direction, Edge, EdgeId,
    EdgeKind, Graph, GraphMeta, Node, NodeId, NodeKind, ParseError, Subgraph, SubgraphId,
};
pub use selkie_layout::{
    auto_layout, auto_layout_with, DeterministicTextMeasurer, EdgeVisual, LayoutSpacing,
    NodeVisual, Point, Size, SubgraphVisual, TextMeasurer, Viewport, VisualState,
};
pub use selkie_render::{to_renderer, RenderEdge, RenderNode, RendererRecords, HANDLE_SIDES};

/// Everything one source text produces.
#[derive(Debug, Clone)]
pub struct Converted {
    pub graph: Graph,
    pub state: VisualState,
    pub records: RendererRecords,
}

fn timing_enabled() -> bool {
    static ENABLED: std::sync::OnceLock<bool> = std::sync::OnceLock::new();
    *ENABLED.get_or_init(|| {
        matches!(
            std::env::var("SELKIE_TIMING").as_deref(),
            Ok("1") | Ok("true")
        )
    })
}

/// Parse, lay out, and translate in one step.
///
/// `prior` seeds the layout: locked entries are preserved verbatim, edge
/// bend points and the viewport pass through. Set `SELKIE_TIMING=1` to get
/// stage timings on stderr.
pub fn convert(source: &str, prior: Option<&VisualState>) -> Result<Converted, ParseError> {
    let timing = timing_enabled();
    let total_start = timing.then(std::time::Instant::now);

    let parse_start = timing.then(std::time::Instant::now);
    let graph = parse(source)?;
    let parse_elapsed = parse_start.map(|s| s.elapsed());

    let layout_start = timing.then(std::time::Instant::now);
    let state = auto_layout(&graph, prior);
    let layout_elapsed = layout_start.map(|s| s.elapsed());

    let records = to_renderer(&graph, &state);

    if let Some(start) = total_start {
        eprintln!(
            "[selkie-timing] dialect={:?} total={:?} parse={:?} layout={:?} input_bytes={}",
            graph.meta.dialect,
            start.elapsed(),
            parse_elapsed.unwrap_or_default(),
            layout_elapsed.unwrap_or_default(),
            source.len(),
        );
    }

    Ok(Converted {
        graph,
        state,
        records,
    })
}

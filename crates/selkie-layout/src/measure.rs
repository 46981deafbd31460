//! Node sizing from label text.
//!
//! Headless callers have no font metrics, so the default measurer is a
//! character-count formula. A host with a real text measurer can plug one
//! in through the trait; the formula stays the fallback so layouts do not
//! shift between headless and rendered environments.

use crate::state::Size;
use selkie_core::{Node, NodeKind};

pub trait TextMeasurer {
    /// Width of a single line of label text, in canvas units.
    fn line_width(&self, line: &str) -> f64;
}

/// The formula measurer: eight units per character.
#[derive(Debug, Clone)]
pub struct DeterministicTextMeasurer {
    pub char_width: f64,
}

impl Default for DeterministicTextMeasurer {
    fn default() -> Self {
        Self { char_width: 8.0 }
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn line_width(&self, line: &str) -> f64 {
        line.chars().count() as f64 * self.char_width
    }
}

/// Label-driven box size with shape corrections: diamonds get 5% slack on
/// both axes (never below 90×90), circles square up to the larger side
/// plus a ring allowance.
pub(crate) fn node_size(node: &Node, measurer: &dyn TextMeasurer) -> Size {
    let lines: Vec<&str> = node.label.split('\n').collect();
    let max_line = lines
        .iter()
        .map(|l| measurer.line_width(l))
        .fold(0.0_f64, f64::max);

    let width = (max_line + 60.0).max(80.0);
    let height = (lines.len() as f64 * 18.0 + 40.0).max(40.0);

    match node.kind {
        NodeKind::Diamond => Size::new((width * 1.05).max(90.0), (height * 1.05).max(90.0)),
        NodeKind::Circle => {
            let side = width.max(height) + 10.0;
            Size::new(side, side)
        }
        NodeKind::Rect | NodeKind::Round | NodeKind::Stadium => Size::new(width, height),
    }
}

//! Deterministic presentation palettes.
//!
//! Flowchart containers cycle a soft background palette by declaration
//! index; edges cycle a five-colour stroke palette; C4 elements and
//! boundaries use the conventional C4 colour scheme. Callers may restyle
//! freely; nothing downstream depends on these values.

use selkie_core::{BoundaryType, C4Type};

const SUBGRAPH_COLORS: [&str; 7] = [
    "#e8f0fe", "#fef7e0", "#e6f4ea", "#fce8e6", "#f3e8fd", "#e4f7fb", "#fff0e8",
];

const EDGE_COLORS: [&str; 5] = ["#5f6368", "#1a73e8", "#188038", "#d93025", "#9334e6"];

pub(crate) fn subgraph_color(index: usize) -> &'static str {
    SUBGRAPH_COLORS[index % SUBGRAPH_COLORS.len()]
}

pub(crate) fn edge_color(index: usize) -> &'static str {
    EDGE_COLORS[index % EDGE_COLORS.len()]
}

pub(crate) fn c4_color(c4_type: C4Type) -> &'static str {
    match c4_type {
        C4Type::Person => "#08427b",
        C4Type::PersonExt => "#686868",
        C4Type::System | C4Type::SystemDb | C4Type::SystemQueue => "#1168bd",
        C4Type::SystemExt => "#999999",
        C4Type::Container | C4Type::ContainerDb | C4Type::ContainerQueue => "#438dd5",
        C4Type::ContainerExt => "#b3b3b3",
        C4Type::Component | C4Type::ComponentDb | C4Type::ComponentQueue => "#85bbf0",
        C4Type::ComponentExt => "#cccccc",
    }
}

pub(crate) fn boundary_color(boundary: BoundaryType) -> &'static str {
    match boundary {
        BoundaryType::Enterprise => "#444444",
        BoundaryType::System => "#666666",
        BoundaryType::Container => "#888888",
        BoundaryType::Boundary => "#aaaaaa",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_wrap_by_modulo() {
        assert_eq!(subgraph_color(0), subgraph_color(7));
        assert_eq!(edge_color(2), edge_color(7));
    }

    #[test]
    fn external_variants_differ_from_internal() {
        assert_ne!(c4_color(C4Type::System), c4_color(C4Type::SystemExt));
        assert_ne!(c4_color(C4Type::Person), c4_color(C4Type::PersonExt));
    }
}

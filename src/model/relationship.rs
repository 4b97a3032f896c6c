//! Edge labels in the evidence graph.

use serde::{Deserialize, Serialize};

use super::{Identifier, NodeIdx};

/// Document → wrapper and document → content.
pub const CONTAIN: &str = "contain";
/// Wrapper → content.
pub const EXTRACT: &str = "extract";
/// Suffix appended to a label to name its inverse.
pub const INVERSE_SUFFIX: &str = "By";

/// Label of the inverse edge: `contain` ↔ `containBy`.
pub fn inverse_label(label: &str) -> Identifier {
    match label.strip_suffix(INVERSE_SUFFIX) {
        Some(forward) if !forward.is_empty() => Identifier::new(forward),
        _ => Identifier::new(format!("{label}{INVERSE_SUFFIX}")),
    }
}

/// A directed, labeled edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub src: NodeIdx,
    pub label: Identifier,
    pub dst: NodeIdx,
}

impl Edge {
    pub fn new(src: NodeIdx, label: impl Into<Identifier>, dst: NodeIdx) -> Self {
        Self { src, label: label.into(), dst }
    }

    /// The same edge walked the other way.
    pub fn inverse(&self) -> Self {
        Self { src: self.dst, label: inverse_label(&self.label), dst: self.src }
    }
}

//! Node in the evidence graph.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Identifier;

/// Position of a node in its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIdx(pub u32);

impl NodeIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Document,
    Wrapper,
    Content,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Document => "document",
            NodeType::Wrapper => "wrapper",
            NodeType::Content => "content",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node: its identifier and type. Weights live outside the graph, in a
/// per-pass [`NodeWeights`](crate::graph::NodeWeights) overlay.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub idx: NodeIdx,
    pub id: Identifier,
    pub kind: NodeType,
}

impl Node {
    pub fn new(idx: NodeIdx, id: impl Into<Identifier>, kind: NodeType) -> Self {
        Self { idx, id: id.into(), kind }
    }

    pub fn is(&self, kind: NodeType) -> bool {
        self.kind == kind
    }
}

/// `type:name`, as used in the textual dump.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

//! # Evidence Graph
//!
//! Typed, labeled node/edge index over one corpus snapshot.
//!
//! ```text
//! document ──contain──▶ wrapper ──extract──▶ content
//!     │                                        ▲
//!     └──────────────contain───────────────────┘
//! ```
//!
//! Every edge added by [`Graph::load`] is bidirectional: `a -contain-> b`
//! comes with `b -containBy-> a`. Nodes are identified by name alone, so a
//! name may carry only one [`NodeType`]; re-adding it under another type is
//! rejected with [`Error::NodeTypeConflict`].
//!
//! The graph holds no weights. A ranking pass writes its scores into a
//! [`NodeWeights`] overlay, which keeps the graph reusable across passes.

pub mod weights;
pub mod export;

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;
use tracing::debug;

use crate::model::*;
use crate::{Error, Result};

pub use export::{EdgeRecord, GraphSnapshot, NodeRecord};
pub use weights::NodeWeights;

/// Out-edges of one node grouped by label. Nodes built by `load` carry at
/// most two labels each way, so this rarely spills.
type LabeledEdges = SmallVec<[(Identifier, HashSet<NodeIdx>); 2]>;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<Identifier, NodeIdx>,
    /// Parallel to `nodes`.
    edges: Vec<LabeledEdges>,
    edge_count: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a corpus.
    pub fn from_corpus(corpus: &DocumentSet) -> Result<Self> {
        let mut graph = Self::new();
        graph.load(corpus)?;
        Ok(graph)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges, inverses included.
    pub fn num_edges(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Add a node, or return the existing one with the same identifier.
    pub fn add_node(&mut self, id: impl Into<Identifier>, kind: NodeType) -> Result<NodeIdx> {
        let id = id.into();
        if let Some(&idx) = self.index.get(&id) {
            let existing = self.nodes[idx.index()].kind;
            if existing != kind {
                return Err(Error::NodeTypeConflict {
                    id: id.to_string(),
                    existing: existing.as_str(),
                    requested: kind.as_str(),
                });
            }
            return Ok(idx);
        }
        let idx = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(Node::new(idx, id.clone(), kind));
        self.edges.push(LabeledEdges::new());
        self.index.insert(id, idx);
        Ok(idx)
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|idx| &self.nodes[idx.index()])
    }

    pub fn node(&self, idx: NodeIdx) -> Option<&Node> {
        self.nodes.get(idx.index())
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIdx> {
        self.index.get(id).copied()
    }

    /// Every node, in insertion order. Callers needing a particular order
    /// must sort.
    pub fn all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn nodes_of(&self, kind: NodeType) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Insert `from -label-> to`. Returns `false` if the edge already existed
    /// or either endpoint is unknown.
    pub fn add(&mut self, from: NodeIdx, label: impl Into<Identifier>, to: NodeIdx) -> bool {
        if to.index() >= self.nodes.len() {
            return false;
        }
        let Some(labeled) = self.edges.get_mut(from.index()) else {
            return false;
        };
        let label = label.into();
        let inserted = match labeled.iter_mut().find(|(l, _)| *l == label) {
            Some((_, targets)) => targets.insert(to),
            None => {
                labeled.push((label, HashSet::from_iter([to])));
                true
            }
        };
        if inserted {
            self.edge_count += 1;
        }
        inserted
    }

    /// Insert `from -label-> to` together with `to -labelBy-> from`.
    pub fn add_bidirect(&mut self, from: NodeIdx, label: impl Into<Identifier>, to: NodeIdx) {
        let label = label.into();
        let inverse = inverse_label(&label);
        self.add(from, label, to);
        self.add(to, inverse, from);
    }

    /// Nodes reached from `id` over `label`.
    pub fn follow_edge(&self, id: &str, label: &str) -> Vec<&Node> {
        self.node_index(id)
            .and_then(|idx| self.targets(idx, label))
            .map(|targets| targets.iter().map(|t| &self.nodes[t.index()]).collect())
            .unwrap_or_default()
    }

    /// Target set of one labeled relation.
    pub fn targets(&self, from: NodeIdx, label: &str) -> Option<&HashSet<NodeIdx>> {
        self.edges
            .get(from.index())?
            .iter()
            .find(|(l, _)| l.as_str() == label)
            .map(|(_, targets)| targets)
    }

    /// Labels leaving `id`.
    pub fn get_edges(&self, id: &str) -> Vec<&Identifier> {
        self.node_index(id)
            .map(|idx| self.labeled_edges(idx).iter().map(|(l, _)| l).collect())
            .unwrap_or_default()
    }

    /// Out-edges of `from`, grouped by label.
    pub fn labeled_edges(&self, from: NodeIdx) -> &[(Identifier, HashSet<NodeIdx>)] {
        self.edges.get(from.index()).map(|l| l.as_slice()).unwrap_or(&[])
    }

    /// Every directed edge, inverses included.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().enumerate().flat_map(|(i, labeled)| {
            labeled.iter().flat_map(move |(label, targets)| {
                targets
                    .iter()
                    .map(move |&dst| Edge::new(NodeIdx(i as u32), label.clone(), dst))
            })
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Index a corpus: documents contain wrappers and contents, wrappers
    /// extract contents. Content names are case-folded.
    pub fn load(&mut self, corpus: &DocumentSet) -> Result<()> {
        for doc in corpus {
            let d = self.add_node(doc.url.clone(), NodeType::Document)?;
            for wrapper in &doc.wrappers {
                let w = self.add_node(wrapper.id.clone(), NodeType::Wrapper)?;
                self.add_bidirect(d, CONTAIN, w);
                for extraction in &wrapper.contents {
                    if extraction.literal.is_blank() {
                        continue;
                    }
                    let c = self.add_node(extraction.literal.folded(), NodeType::Content)?;
                    self.add_bidirect(w, EXTRACT, c);
                    self.add_bidirect(d, CONTAIN, c);
                }
            }
        }
        debug!(
            documents = corpus.len(),
            nodes = self.num_nodes(),
            edges = self.num_edges(),
            "evidence graph loaded"
        );
        Ok(())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
        self.edge_count = 0;
    }
}

//! Pass-scoped node weights.

use serde::Serialize;

use super::Graph;
use crate::model::{NodeIdx, NodeType, SparseVector};

/// Weight per node index, owned by one ranking pass.
///
/// Sized for the graph it was made for; indices past the end read as zero
/// and are ignored on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeWeights {
    weights: Vec<f64>,
}

impl NodeWeights {
    /// All-zero overlay for `graph`.
    pub fn for_graph(graph: &Graph) -> Self {
        Self { weights: vec![0.0; graph.num_nodes()] }
    }

    /// Overlay read off a state vector keyed by node identifier. Entries with
    /// no matching node are dropped.
    pub fn from_state(graph: &Graph, state: &SparseVector) -> Self {
        let mut weights = Self::for_graph(graph);
        for (id, w) in state.iter() {
            if let Some(idx) = graph.node_index(id) {
                weights.set(idx, w);
            }
        }
        weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, idx: NodeIdx) -> f64 {
        self.weights.get(idx.index()).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, idx: NodeIdx, weight: f64) {
        if let Some(slot) = self.weights.get_mut(idx.index()) {
            *slot = weight;
        }
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Weight of the node named `id`, zero when absent.
    pub fn of(&self, graph: &Graph, id: &str) -> f64 {
        graph.node_index(id).map_or(0.0, |idx| self.get(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, f64)> + '_ {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, w)| (NodeIdx(i as u32), *w))
    }

    /// Weights of one node type, keyed by identifier.
    pub fn of_type(&self, graph: &Graph, kind: NodeType) -> SparseVector {
        graph
            .nodes_of(kind)
            .map(|n| (n.id.clone(), self.get(n.idx)))
            .collect()
    }
}

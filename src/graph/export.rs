//! Graph dump: serialize a scored evidence graph for inspection.
//!
//! Two renderings:
//!
//! ```text
//! dump()      weight \t type:name \t label>type:neighbor ...   (one line per node)
//! snapshot()  { nodes: [...], edges: [...] }                   (serde / JSON)
//! ```
//!
//! Dump lines are sorted by descending weight; ties and neighbor lists are
//! sorted by name so the output is stable.

use std::io::Write;

use serde::Serialize;

use super::{Graph, NodeWeights};
use crate::model::{Identifier, Node, NodeType};
use crate::Result;

impl Graph {
    /// Render the per-node dump into a string.
    pub fn dump(&self, weights: &NodeWeights) -> String {
        let mut out = String::new();
        for (weight, node) in self.ranked_nodes(weights) {
            out.push_str(&self.dump_line(weight, node));
            out.push('\n');
        }
        out
    }

    /// Write the per-node dump to `writer`.
    pub fn write_dump(&self, weights: &NodeWeights, writer: &mut dyn Write) -> Result<()> {
        for (weight, node) in self.ranked_nodes(weights) {
            writeln!(writer, "{}", self.dump_line(weight, node))?;
        }
        Ok(())
    }

    /// Serializable view of nodes (with weights when given) and edges.
    pub fn snapshot(&self, weights: Option<&NodeWeights>) -> GraphSnapshot {
        let nodes = self
            .all_nodes()
            .map(|n| NodeRecord {
                id: n.id.clone(),
                kind: n.kind,
                weight: weights.map(|w| w.get(n.idx)),
            })
            .collect();

        let mut edges: Vec<EdgeRecord> = self
            .edges()
            .filter_map(|e| {
                Some(EdgeRecord {
                    from: self.node(e.src)?.id.clone(),
                    label: e.label,
                    to: self.node(e.dst)?.id.clone(),
                })
            })
            .collect();
        edges.sort_by(|a, b| {
            (&a.from, &a.label, &a.to).cmp(&(&b.from, &b.label, &b.to))
        });

        GraphSnapshot { nodes, edges }
    }

    fn ranked_nodes<'g>(&'g self, weights: &NodeWeights) -> Vec<(f64, &'g Node)> {
        let mut ranked: Vec<(f64, &Node)> =
            self.all_nodes().map(|n| (weights.get(n.idx), n)).collect();
        ranked.sort_by(|a, b| {
            b.0.total_cmp(&a.0)
                .then_with(|| a.1.kind.as_str().cmp(b.1.kind.as_str()))
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        ranked
    }

    fn dump_line(&self, weight: f64, node: &Node) -> String {
        let mut neighbors: Vec<String> = Vec::new();
        for (label, targets) in self.labeled_edges(node.idx) {
            for &t in targets {
                if let Some(target) = self.node(t) {
                    neighbors.push(format!("{label}>{target}"));
                }
            }
        }
        neighbors.sort();

        let mut line = format!("{weight:.6}\t{node}");
        for n in neighbors {
            line.push('\t');
            line.push_str(&n);
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub id: Identifier,
    pub kind: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeRecord {
    pub from: Identifier,
    pub label: Identifier,
    pub to: Identifier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

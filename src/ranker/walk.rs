//! Random-walk rankers over the evidence graph.
//!
//! One engine, two named policies:
//!
//! | Policy | restart | relation-aware | damping |
//! |--------|---------|----------------|---------|
//! | PageRank (`PR`) | no | no | 0.85 |
//! | Graph walk (`GW`) | yes | yes | 0.99 |
//!
//! A pass moves through
//! `Idle → GraphBuilt → MatrixBuilt → Iterating → Converged | MaxIterExhausted → WeightsProjected`.
//! With `disable_walk` set it stops at `GraphBuilt`.

use tracing::{debug, trace, warn};

use super::{Ranker, RankerKind, WalkConfig};
use crate::graph::{Graph, NodeWeights};
use crate::model::*;
use crate::{Error, Result};

/// Where a [`GraphRanker`] is in its current pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkPhase {
    Idle,
    GraphBuilt,
    MatrixBuilt,
    Iterating,
    Converged,
    MaxIterExhausted,
    WeightsProjected,
}

/// How the last walk ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkOutcome {
    pub iterations: usize,
    /// Euclidean distance between the last two states.
    pub distance: f64,
    pub converged: bool,
}

// ============================================================================
// Transition matrix
// ============================================================================

/// Row-stochastic transition matrix: row = source node, column = target.
///
/// Relation-aware: each label leaving a node gets `1/|labels|` of its mass,
/// split evenly over that label's targets. Otherwise all targets are merged
/// and share the mass evenly. Nodes with no out-edges get no row.
pub fn transition_matrix(graph: &Graph, relation_aware: bool) -> SparseMatrix {
    let mut matrix = SparseMatrix::new();
    for node in graph.all_nodes() {
        let labeled: Vec<_> = graph
            .labeled_edges(node.idx)
            .iter()
            .filter(|(_, targets)| !targets.is_empty())
            .collect();
        if labeled.is_empty() {
            continue;
        }

        if relation_aware {
            let label_share = 1.0 / labeled.len() as f64;
            for (_, targets) in &labeled {
                let share = label_share / targets.len() as f64;
                for &t in targets.iter() {
                    if let Some(target) = graph.node(t) {
                        matrix.add(node.id.clone(), target.id.clone(), share);
                    }
                }
            }
        } else {
            let mut merged: Vec<NodeIdx> = labeled
                .iter()
                .flat_map(|(_, targets)| targets.iter().copied())
                .collect();
            merged.sort_unstable();
            merged.dedup();
            let share = 1.0 / merged.len() as f64;
            for t in merged {
                if let Some(target) = graph.node(t) {
                    matrix.add(node.id.clone(), target.id.clone(), share);
                }
            }
        }
    }
    matrix
}

// ============================================================================
// GraphRanker
// ============================================================================

pub struct GraphRanker {
    kind: RankerKind,
    config: WalkConfig,
    feature: Identifier,
    seeds: Distribution,
    graph: Graph,
    matrix: SparseMatrix,
    state: SparseVector,
    weights: NodeWeights,
    phase: WalkPhase,
    outcome: Option<WalkOutcome>,
}

impl GraphRanker {
    pub fn new(kind: RankerKind, config: WalkConfig, feature: Identifier) -> Self {
        Self {
            kind,
            config,
            feature,
            seeds: Distribution::new(),
            graph: Graph::new(),
            matrix: SparseMatrix::new(),
            state: SparseVector::new(),
            weights: NodeWeights::default(),
            phase: WalkPhase::Idle,
            outcome: None,
        }
    }

    pub fn page_rank() -> Self {
        let kind = RankerKind::PageRank;
        Self::new(kind, WalkConfig::page_rank(), Identifier::new(kind.tag()))
    }

    pub fn graph_walk() -> Self {
        let kind = RankerKind::GraphWalk;
        Self::new(kind, WalkConfig::graph_walk(), Identifier::new(kind.tag()))
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    pub fn phase(&self) -> WalkPhase {
        self.phase
    }

    /// Result of the last walk, if one ran.
    pub fn outcome(&self) -> Option<WalkOutcome> {
        self.outcome
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn matrix(&self) -> &SparseMatrix {
        &self.matrix
    }

    /// Final (normalized) walk state keyed by node identifier.
    pub fn state(&self) -> &SparseVector {
        &self.state
    }

    pub fn weights(&self) -> &NodeWeights {
        &self.weights
    }

    /// Tab-separated dump of the scored graph.
    pub fn dump(&self) -> Result<String> {
        if self.phase == WalkPhase::Idle {
            return Err(Error::NotFound("no evidence graph loaded".into()));
        }
        Ok(self.graph.dump(&self.weights))
    }

    fn reset_pass(&mut self) {
        self.graph.clear();
        self.matrix.clear();
        self.state.clear();
        self.weights = NodeWeights::default();
        self.outcome = None;
        self.phase = WalkPhase::Idle;
    }

    /// Seeds as case-folded probabilities, or uniform over every column.
    fn initial_state(&self, seeds: &Distribution) -> SparseVector {
        if seeds.is_empty() {
            let mut state = SparseVector::new();
            for col in self.matrix.column_ids() {
                state.set(col.clone(), 1.0);
            }
            state.normalize();
            state
        } else {
            seeds.probabilities()
        }
    }

    /// Case-folded seeds that have a node in the graph.
    ///
    /// An all-zero seed set is weighted uniformly; a seed set with no node
    /// in the graph comes back empty, so the walk teleports uniformly.
    fn graph_seeds(&self) -> Distribution {
        let folded = self.seeds.folded();
        let seeds: Distribution = folded
            .ids()
            .filter(|s| self.graph.get_node(s).is_some())
            .map(|s| (s.clone(), folded.weight(s)))
            .collect();

        let missing = folded.len() - seeds.len();
        if missing > 0 {
            warn!(missing, seeds = folded.len(), "seeds not present in evidence graph");
            if seeds.is_empty() {
                warn!("no seed in evidence graph; falling back to uniform teleportation");
            }
        }
        if !seeds.is_empty() && seeds.total() == 0.0 {
            warn!(seeds = seeds.len(), "seed weights sum to zero; weighting seeds uniformly");
            return Distribution::uniform(seeds.ids().cloned().collect::<Vec<_>>());
        }
        seeds
    }

    /// Iterate to a fixed point or the iteration cap.
    fn walk(&mut self) -> WalkOutcome {
        self.phase = WalkPhase::Iterating;
        let seeds = self.graph_seeds();

        let damping = self.config.damping;
        let teleport: Vec<Identifier> = if self.config.restart && !seeds.is_empty() {
            seeds.ids().cloned().collect()
        } else {
            self.graph.all_nodes().map(|n| n.id.clone()).collect()
        };
        let teleport_mass = if teleport.is_empty() {
            0.0
        } else {
            (1.0 - damping) / teleport.len() as f64
        };

        let mut state = self.initial_state(&seeds);
        let mut outcome = WalkOutcome { iterations: 0, distance: f64::INFINITY, converged: false };

        for iteration in 1..=self.config.max_iterations {
            let mut current = state;
            current.normalize();

            let mut next = self.matrix.left_multiply(&current);
            next.normalize();
            if damping < 1.0 {
                next.scale(damping);
                for id in &teleport {
                    next.add(id.clone(), teleport_mass);
                }
            }

            let distance = current.euclidean_distance(&next);
            trace!(iteration, distance, "walk step");
            outcome.iterations = iteration;
            outcome.distance = distance;
            state = next;

            if distance < self.config.threshold {
                outcome.converged = true;
                break;
            }
        }

        state.normalize();
        self.state = state;
        self.phase = if outcome.converged {
            WalkPhase::Converged
        } else {
            warn!(
                iterations = outcome.iterations,
                distance = outcome.distance,
                "walk hit the iteration cap before converging"
            );
            WalkPhase::MaxIterExhausted
        };
        debug!(
            iterations = outcome.iterations,
            distance = outcome.distance,
            converged = outcome.converged,
            "walk finished"
        );
        self.outcome = Some(outcome);
        outcome
    }

    /// Copy content-node weights onto matching entities.
    fn project(&mut self, entities: &mut EntityList) {
        self.weights = NodeWeights::from_state(&self.graph, &self.state);
        entities.clear_weight(&self.feature);

        let mut projected = 0usize;
        for node in self.graph.nodes_of(NodeType::Content) {
            if let Some(entity) = entities.get_mut(&node.id) {
                entity.set_weight(self.feature.clone(), self.weights.get(node.idx));
                projected += 1;
            }
        }
        self.phase = WalkPhase::WeightsProjected;
        debug!(projected, entities = entities.len(), feature = %self.feature, "walk weights projected");
    }
}

impl Ranker for GraphRanker {
    fn kind(&self) -> RankerKind {
        self.kind
    }

    fn feature(&self) -> &Identifier {
        &self.feature
    }

    fn description(&self) -> String {
        let c = &self.config;
        format!(
            "{} (damping {}, {}, {}, threshold {}, max {} iterations{})",
            match self.kind {
                RankerKind::PageRank => "PageRank",
                _ => "Graph walk",
            },
            c.damping,
            if c.restart { "restart at seeds" } else { "uniform teleport" },
            if c.relation_aware { "relation-aware" } else { "labels merged" },
            c.threshold,
            c.max_iterations,
            if c.disable_walk { ", walk disabled" } else { "" },
        )
    }

    fn seeds(&self) -> &Distribution {
        &self.seeds
    }

    fn seeds_mut(&mut self) -> &mut Distribution {
        &mut self.seeds
    }

    fn clear(&mut self) {
        self.seeds.clear();
        self.reset_pass();
    }

    fn load(&mut self, entities: &mut EntityList, corpus: &DocumentSet) -> Result<()> {
        self.reset_pass();

        if let Err(e) = self.graph.load(corpus) {
            self.reset_pass();
            return Err(e);
        }
        self.phase = WalkPhase::GraphBuilt;
        if self.config.disable_walk {
            debug!(nodes = self.graph.num_nodes(), "walk disabled; graph only");
            return Ok(());
        }

        self.matrix = transition_matrix(&self.graph, self.config.relation_aware);
        self.phase = WalkPhase::MatrixBuilt;
        debug!(
            rows = self.matrix.num_rows(),
            columns = self.matrix.num_columns(),
            cells = self.matrix.nnz(),
            "transition matrix built"
        );

        self.walk();
        self.project(entities);
        Ok(())
    }
}

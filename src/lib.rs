//! # seal-rank: Ranking Engine for Automatic Set Expansion
//!
//! Given a few seed items and a corpus of documents on which extraction
//! rules ("wrappers") have fired, score every extracted candidate by how
//! likely it is to belong to the same set as the seeds.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: [`Ranker`] is the contract every scoring strategy implements
//! 2. **Plain data**: [`Identifier`], [`SparseVector`], [`DocumentSet`], [`EntityList`] cross all boundaries
//! 3. **Graph owns no scores**: a ranking pass writes into a [`NodeWeights`] overlay
//! 4. **Closed dispatch**: strategies are picked by [`RankerKind`], never by type inspection
//!
//! ## Quick Start
//!
//! ```rust
//! use seal_rank::{
//!     build_ranker, AppliedWrapper, Document, DocumentSet, EntityList, Ranker, RankerConfig,
//!     RankerKind,
//! };
//!
//! # fn example() -> seal_rank::Result<()> {
//! let corpus: DocumentSet = [
//!     Document::new("http://a").with_wrapper(
//!         AppliedWrapper::new("<li>|</li>").with_literals(["Chicago Bears", "Seattle Seahawks"]),
//!     ),
//! ]
//! .into_iter()
//! .collect();
//!
//! let mut ranker = build_ranker("graph-walk".parse::<RankerKind>()?, &RankerConfig::default())?;
//! ranker.add_seed("Seattle Seahawks".into(), 1.0);
//!
//! let mut candidates: EntityList = ["Chicago Bears", "Seattle Seahawks"].into_iter().collect();
//! ranker.load(&mut candidates, &corpus)?;
//!
//! for entity in candidates.sorted_by(ranker.feature()) {
//!     println!("{}\t{}", entity.name, entity.weight(ranker.feature()));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Strategies
//!
//! | Kind | Tag | Description |
//! |------|-----|-------------|
//! | Term frequency | `TF` | Occurrence counts across all wrapper hits |
//! | Document frequency | `DF` | Distinct documents extracting the candidate |
//! | Wrapper frequency | `WF` | Distinct wrappers extracting the candidate |
//! | Wrapper length | `WL` | Context length relative to document length |
//! | PageRank | `PR` | Unrestricted random walk over the evidence graph |
//! | Graph walk | `GW` | Relation-aware walk restarting at the seeds |
//! | Bayesian Sets | `BS` | Seed/population feature odds, summed in log space |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod graph;
pub mod ranker;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Identifier, SparseVector, SparseMatrix, Distribution,
    Document, DocumentSet, AppliedWrapper, Extraction,
    Entity, EntityList, Node, NodeIdx, NodeType,
};

// ============================================================================
// Re-exports: Graph
// ============================================================================

pub use graph::{Graph, NodeWeights, GraphSnapshot};

// ============================================================================
// Re-exports: Rankers
// ============================================================================

pub use ranker::{
    build_ranker, build_from_config, transition_matrix,
    Ranker, RankerKind, RankerConfig, WalkConfig, BayesConfig,
    GraphRanker, WalkPhase, WalkOutcome, BayesianSetsRanker,
    FrequencyRanker, FrequencyMode,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown ranker: {0}")]
    UnknownRanker(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Node type conflict: '{id}' is a {existing} node, cannot re-add it as {requested}")]
    NodeTypeConflict {
        id: String,
        existing: &'static str,
        requested: &'static str,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! # Ranker Contract
//!
//! Every scoring strategy implements [`Ranker`]: given a candidate list and
//! a corpus, fill one named feature slot on each candidate.
//!
//! ## Implementations
//!
//! | Ranker | Module | Kinds |
//! |--------|--------|-------|
//! | `FrequencyRanker` | `frequency` | `TF`, `DF`, `WF`, `WL` |
//! | `GraphRanker` | `walk` | `PR`, `GW` |
//! | `BayesianSetsRanker` | `bayes` | `BS` |
//!
//! Strategies are chosen through [`build_ranker`] from a [`RankerKind`];
//! unknown strategy identifiers fail with [`Error::UnknownRanker`].

pub mod config;
pub mod frequency;
pub mod walk;
pub mod bayes;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::model::*;
use crate::{Error, Result};

pub use bayes::BayesianSetsRanker;
pub use config::{BayesConfig, RankerConfig, WalkConfig};
pub use frequency::{FrequencyMode, FrequencyRanker};
pub use walk::{transition_matrix, GraphRanker, WalkOutcome, WalkPhase};

// ============================================================================
// RankerKind
// ============================================================================

/// The closed set of ranking strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankerKind {
    TermFrequency,
    DocFrequency,
    WrapperFrequency,
    WrapperLength,
    PageRank,
    GraphWalk,
    BayesSets,
}

impl RankerKind {
    pub const ALL: [RankerKind; 7] = [
        RankerKind::TermFrequency,
        RankerKind::DocFrequency,
        RankerKind::WrapperFrequency,
        RankerKind::WrapperLength,
        RankerKind::PageRank,
        RankerKind::GraphWalk,
        RankerKind::BayesSets,
    ];

    /// Short tag, also the default feature slot.
    pub fn tag(self) -> &'static str {
        match self {
            RankerKind::TermFrequency => "TF",
            RankerKind::DocFrequency => "DF",
            RankerKind::WrapperFrequency => "WF",
            RankerKind::WrapperLength => "WL",
            RankerKind::PageRank => "PR",
            RankerKind::GraphWalk => "GW",
            RankerKind::BayesSets => "BS",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RankerKind::TermFrequency => "term-frequency",
            RankerKind::DocFrequency => "doc-frequency",
            RankerKind::WrapperFrequency => "wrapper-frequency",
            RankerKind::WrapperLength => "wrapper-length",
            RankerKind::PageRank => "page-rank",
            RankerKind::GraphWalk => "graph-walk",
            RankerKind::BayesSets => "bayes-sets",
        }
    }
}

impl fmt::Display for RankerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RankerKind {
    type Err = Error;

    /// Accepts the tag or the name, ignoring case, `_` and spaces.
    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .trim()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c.to_ascii_lowercase() })
            .collect();
        RankerKind::ALL
            .into_iter()
            .find(|k| k.tag().eq_ignore_ascii_case(&wanted) || k.name() == wanted)
            .ok_or_else(|| Error::UnknownRanker(s.to_string()))
    }
}

// ============================================================================
// Ranker trait
// ============================================================================

/// A scoring strategy.
///
/// One instance serves one scoring pass at a time. [`Ranker::clear`] (or a
/// fresh instance) is required between unrelated passes; `load` itself may
/// be called again on the same seeds and rebuilds all pass state.
pub trait Ranker {
    fn kind(&self) -> RankerKind;

    /// Feature slot this ranker writes on each entity.
    fn feature(&self) -> &Identifier;

    fn description(&self) -> String;

    /// Log-scale scores are summed, not multiplied, when combined with
    /// other rankers.
    fn is_log_scale(&self) -> bool {
        false
    }

    fn seeds(&self) -> &Distribution;

    fn seeds_mut(&mut self) -> &mut Distribution;

    fn add_seed(&mut self, id: Identifier, weight: f64) {
        self.seeds_mut().add(id, weight);
    }

    /// Use one feature of the entity list as seed weights.
    fn add_seeds(&mut self, entities: &EntityList, feature: &str) {
        let seeds = self.seeds_mut();
        for e in entities.iter().filter(|e| e.has_weight(feature)) {
            seeds.add(e.name.clone(), e.weight(feature));
        }
    }

    /// Drop seeds and any memoized graph or matrix.
    fn clear(&mut self);

    /// Score `entities` against `corpus`, writing this ranker's feature.
    fn load(&mut self, entities: &mut EntityList, corpus: &DocumentSet) -> Result<()>;
}

// ============================================================================
// Factory
// ============================================================================

/// Construct the ranker for `kind`.
pub fn build_ranker(kind: RankerKind, config: &RankerConfig) -> Result<Box<dyn Ranker>> {
    config.validate()?;
    let feature = config
        .feature
        .as_deref()
        .map_or_else(|| Identifier::new(kind.tag()), Identifier::new);

    let ranker: Box<dyn Ranker> = match kind {
        RankerKind::TermFrequency => Box::new(FrequencyRanker::new(FrequencyMode::Term, feature)),
        RankerKind::DocFrequency => Box::new(FrequencyRanker::new(FrequencyMode::Document, feature)),
        RankerKind::WrapperFrequency => {
            Box::new(FrequencyRanker::new(FrequencyMode::Wrapper, feature))
        }
        RankerKind::WrapperLength => {
            Box::new(FrequencyRanker::new(FrequencyMode::WrapperLength, feature))
        }
        RankerKind::PageRank | RankerKind::GraphWalk => {
            Box::new(GraphRanker::new(kind, config.walk_for(kind), feature))
        }
        RankerKind::BayesSets => Box::new(BayesianSetsRanker::new(config.bayes, feature)),
    };
    debug!(kind = %kind, description = %ranker.description(), "ranker built");
    Ok(ranker)
}

/// Construct the ranker named by `config.strategy`.
pub fn build_from_config(config: &RankerConfig) -> Result<Box<dyn Ranker>> {
    build_ranker(config.kind()?, config)
}

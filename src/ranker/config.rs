//! Ranker configuration.
//!
//! Plain values, loadable from JSON:
//!
//! ```json
//! {
//!   "strategy": "graph-walk",
//!   "feature": "GW",
//!   "walk":  { "damping": 0.99, "threshold": 0.001, "max_iterations": 50,
//!              "relation_aware": true, "restart": true, "disable_walk": false },
//!   "bayes": { "c": 2.0, "epsilon": 1e-10, "binarize_ratio": null, "log_score": true }
//! }
//! ```
//!
//! Every field is optional. A missing `walk` section means "use the named
//! policy for the strategy" (see [`WalkConfig::page_rank`] and
//! [`WalkConfig::graph_walk`]).

use serde::{Deserialize, Serialize};

use super::RankerKind;
use crate::{Error, Result};

pub const DEFAULT_THRESHOLD: f64 = 1e-3;
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

// ============================================================================
// Walk
// ============================================================================

/// Parameters of the random-walk engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Mass kept by the walk each step; `1 - damping` is redistributed.
    pub damping: f64,
    /// Stop once successive states are closer than this (Euclidean).
    pub threshold: f64,
    pub max_iterations: usize,
    /// Split a node's mass per edge label before splitting per target.
    pub relation_aware: bool,
    /// Return redistributed mass to the seeds only.
    pub restart: bool,
    /// Build the graph but skip matrix construction and iteration.
    pub disable_walk: bool,
}

impl WalkConfig {
    /// Plain PageRank: uniform teleportation, all labels merged.
    pub fn page_rank() -> Self {
        Self {
            damping: 0.85,
            threshold: DEFAULT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            relation_aware: false,
            restart: false,
            disable_walk: false,
        }
    }

    /// Personalized, relation-aware walk restarting at the seeds.
    pub fn graph_walk() -> Self {
        Self {
            damping: 0.99,
            relation_aware: true,
            restart: true,
            ..Self::page_rank()
        }
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_disable_walk(mut self, disable_walk: bool) -> Self {
        self.disable_walk = disable_walk;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(Error::Config(format!(
                "damping must be in (0, 1], got {}",
                self.damping
            )));
        }
        if !(self.threshold >= 0.0) {
            return Err(Error::Config(format!(
                "convergence threshold must be non-negative, got {}",
                self.threshold
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::Config("max_iterations must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self::graph_walk()
    }
}

// ============================================================================
// Bayesian Sets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesConfig {
    /// Prior strength: `alpha = c·mean + ε`, `beta = c·(1 - mean) + ε`.
    pub c: f64,
    pub epsilon: f64,
    /// Experimental, off by default: keep only cells above `ratio × mean`
    /// of their candidate column, binarized. Not known to be correct.
    pub binarize_ratio: Option<f64>,
    /// Sum log odds (default). `false` selects the experimental product
    /// form, which underflows on large feature sets.
    pub log_score: bool,
}

impl Default for BayesConfig {
    fn default() -> Self {
        Self { c: 2.0, epsilon: 1e-10, binarize_ratio: None, log_score: true }
    }
}

impl BayesConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0) || !(self.epsilon > 0.0) {
            return Err(Error::Config(format!(
                "Bayesian constants must be positive, got c={} epsilon={}",
                self.c, self.epsilon
            )));
        }
        if let Some(ratio) = self.binarize_ratio {
            if !(ratio > 0.0) {
                return Err(Error::Config(format!("binarize_ratio must be positive, got {ratio}")));
            }
        }
        Ok(())
    }
}

// ============================================================================
// RankerConfig
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Strategy identifier, e.g. `"graph-walk"` or `"BS"`.
    pub strategy: Option<String>,
    /// Feature slot the ranker writes; defaults to the strategy tag.
    pub feature: Option<String>,
    pub walk: Option<WalkConfig>,
    pub bayes: BayesConfig,
}

impl RankerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    pub fn with_walk(mut self, walk: WalkConfig) -> Self {
        self.walk = Some(walk);
        self
    }

    pub fn with_bayes(mut self, bayes: BayesConfig) -> Self {
        self.bayes = bayes;
        self
    }

    /// The configured strategy. Missing or unknown identifiers are errors;
    /// there is no default strategy.
    pub fn kind(&self) -> Result<RankerKind> {
        self.strategy
            .as_deref()
            .ok_or_else(|| Error::Config("no ranker strategy configured".into()))?
            .parse()
    }

    /// Walk parameters for `kind`: the explicit section if present,
    /// otherwise the named policy.
    pub fn walk_for(&self, kind: RankerKind) -> WalkConfig {
        match (self.walk, kind) {
            (Some(walk), _) => walk,
            (None, RankerKind::PageRank) => WalkConfig::page_rank(),
            (None, _) => WalkConfig::graph_walk(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(walk) = &self.walk {
            walk.validate()?;
        }
        self.bayes.validate()?;
        if let Some(strategy) = &self.strategy {
            strategy.parse::<RankerKind>()?;
        }
        if self.feature.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(Error::Config("feature name must not be blank".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_policies() {
        let pr = WalkConfig::page_rank();
        assert_eq!((pr.restart, pr.relation_aware, pr.damping), (false, false, 0.85));
        let gw = WalkConfig::graph_walk();
        assert_eq!((gw.restart, gw.relation_aware, gw.damping), (true, true, 0.99));
        assert_eq!(gw.threshold, 1e-3);
        assert_eq!(gw.max_iterations, 50);
    }

    #[test]
    fn test_walk_for_kind() {
        let config = RankerConfig::default();
        assert_eq!(config.walk_for(RankerKind::PageRank), WalkConfig::page_rank());
        assert_eq!(config.walk_for(RankerKind::GraphWalk), WalkConfig::graph_walk());

        let custom = WalkConfig::page_rank().with_damping(0.5);
        let config = RankerConfig::default().with_walk(custom);
        assert_eq!(config.walk_for(RankerKind::GraphWalk), custom);
    }

    #[test]
    fn test_from_json_partial() {
        let config = RankerConfig::from_json(
            r#"{"strategy": "page-rank", "walk": {"damping": 0.9, "relation_aware": true}}"#,
        )
        .unwrap();
        assert_eq!(config.kind().unwrap(), RankerKind::PageRank);
        let walk = config.walk.unwrap();
        assert_eq!(walk.damping, 0.9);
        assert!(walk.relation_aware);
        assert_eq!(walk.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(config.bayes, BayesConfig::default());
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            RankerConfig::from_json(r#"{"walk": {"damping": 1.5}}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RankerConfig::from_json(r#"{"walk": {"max_iterations": 0}}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RankerConfig::from_json(r#"{"bayes": {"c": 0.0}}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            RankerConfig::from_json(r#"{"strategy": "magic"}"#),
            Err(Error::UnknownRanker(_))
        ));
        assert!(matches!(RankerConfig::from_json("[1, 2]"), Err(Error::Json(_))));
    }

    #[test]
    fn test_missing_strategy_is_an_error() {
        assert!(matches!(RankerConfig::default().kind(), Err(Error::Config(_))));
    }
}

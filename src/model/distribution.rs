//! Distribution: non-negative weights over identifiers, read back normalized.
//!
//! Rankers hold their seeds as a `Distribution`: callers add raw weights and
//! the ranker reads probabilities.

use serde::Serialize;
use tracing::warn;

use super::{Identifier, SparseVector};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distribution {
    weights: SparseVector,
}

impl Distribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform distribution over `ids`.
    pub fn uniform<I, K>(ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Identifier>,
    {
        let mut d = Self::new();
        for id in ids {
            d.set(id, 1.0);
        }
        d
    }

    /// Accumulate raw weight. Negative and non-finite weights are ignored.
    pub fn add(&mut self, id: impl Into<Identifier>, weight: f64) {
        if weight.is_finite() && weight >= 0.0 {
            self.weights.add(id, weight);
        }
    }

    pub fn set(&mut self, id: impl Into<Identifier>, weight: f64) {
        if weight.is_finite() && weight >= 0.0 {
            self.weights.set(id, weight);
        }
    }

    /// Raw (unnormalized) weight.
    pub fn weight(&self, id: &str) -> f64 {
        self.weights.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.weights.contains(id)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
        self.weights.keys()
    }

    pub fn total(&self) -> f64 {
        self.weights.sum()
    }

    pub fn clear(&mut self) {
        self.weights.clear();
    }

    /// Normalized copy of the weights.
    ///
    /// When the total mass is zero the copy is returned as-is (all zero) and
    /// no normalization is performed.
    pub fn probabilities(&self) -> SparseVector {
        let mut v = self.weights.clone();
        if !v.is_empty() && !v.normalize() {
            warn!(entries = v.len(), "distribution has zero mass; left unnormalized");
        }
        v
    }

    pub fn probability(&self, id: &str) -> f64 {
        let total = self.total();
        if total > 0.0 { self.weight(id) / total } else { 0.0 }
    }

    /// Copy with every key lowercased; keys folding to the same name merge.
    pub fn folded(&self) -> Self {
        let mut d = Self::new();
        for (id, w) in self.weights.iter() {
            d.add(id.folded(), w);
        }
        d
    }
}

impl<K: Into<Identifier>> FromIterator<(K, f64)> for Distribution {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        let mut d = Distribution::new();
        for (k, w) in iter {
            d.add(k, w);
        }
        d
    }
}

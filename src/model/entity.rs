//! Candidate entities and the list rankers score.

use hashbrown::HashMap;
use serde::Serialize;
use tracing::warn;

use super::Identifier;

/// A candidate with one weight slot per feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub name: Identifier,
    weights: HashMap<Identifier, f64>,
}

impl Entity {
    pub fn new(name: impl Into<Identifier>) -> Self {
        Self { name: name.into(), weights: HashMap::new() }
    }

    /// Weight on `feature`, zero when the slot is empty.
    pub fn weight(&self, feature: &str) -> f64 {
        self.weights.get(feature).copied().unwrap_or(0.0)
    }

    pub fn has_weight(&self, feature: &str) -> bool {
        self.weights.contains_key(feature)
    }

    pub fn set_weight(&mut self, feature: impl Into<Identifier>, weight: f64) {
        self.weights.insert(feature.into(), weight);
    }

    pub fn add_weight(&mut self, feature: impl Into<Identifier>, delta: f64) {
        *self.weights.entry(feature.into()).or_insert(0.0) += delta;
    }

    pub fn clear_weight(&mut self, feature: &str) {
        self.weights.remove(feature);
    }

    pub fn features(&self) -> impl Iterator<Item = (&Identifier, f64)> {
        self.weights.iter().map(|(k, v)| (k, *v))
    }
}

/// Ordered candidate list, deduplicated by case-folded name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityList {
    entities: Vec<Entity>,
    #[serde(skip)]
    index: HashMap<Identifier, usize>,
    max_size: Option<usize>,
}

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of entities kept by [`EntityList::reduce_size`].
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Add a candidate, or return the existing one with the same folded name.
    ///
    /// Blank literals are not candidates and yield `None`.
    pub fn add(&mut self, literal: impl Into<Identifier>) -> Option<&mut Entity> {
        let literal = literal.into();
        if literal.is_blank() {
            return None;
        }
        let key = literal.folded();
        let pos = match self.index.get(&key) {
            Some(&pos) => pos,
            None => {
                self.entities.push(Entity::new(literal));
                self.index.insert(key, self.entities.len() - 1);
                self.entities.len() - 1
            }
        };
        self.entities.get_mut(pos)
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        let pos = *self.index.get(name.to_lowercase().as_str())?;
        self.entities.get(pos)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        let pos = *self.index.get(name.to_lowercase().as_str())?;
        self.entities.get_mut(pos)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.entities.iter_mut()
    }

    pub fn clear_weight(&mut self, feature: &str) {
        for e in &mut self.entities {
            e.clear_weight(feature);
        }
    }

    /// Add `delta` to one entity's feature. Returns `false` when the entity
    /// is not in the list.
    pub fn add_weight(&mut self, name: &str, feature: impl Into<Identifier>, delta: f64) -> bool {
        match self.get_mut(name) {
            Some(e) => {
                e.add_weight(feature, delta);
                true
            }
            None => false,
        }
    }

    /// Sum of one feature over the list.
    pub fn total(&self, feature: &str) -> f64 {
        self.entities.iter().map(|e| e.weight(feature)).sum()
    }

    /// Divide one feature by its sum across the list.
    ///
    /// Returns `false` and changes nothing when the sum is zero.
    pub fn normalize(&mut self, feature: &str) -> bool {
        let total = self.total(feature);
        if total == 0.0 || !total.is_finite() {
            warn!(feature, total, "cannot normalize feature column");
            return false;
        }
        for e in &mut self.entities {
            if let Some(w) = e.weights.get_mut(feature) {
                *w /= total;
            }
        }
        true
    }

    /// Entities sorted by descending weight on `feature`.
    pub fn sorted_by(&self, feature: &str) -> Vec<&Entity> {
        let mut sorted: Vec<&Entity> = self.entities.iter().collect();
        sorted.sort_by(|a, b| {
            b.weight(feature)
                .total_cmp(&a.weight(feature))
                .then_with(|| a.name.cmp(&b.name))
        });
        sorted
    }

    /// Bound the feature column after a ranking pass.
    ///
    /// Non-finite weights on `feature` are cleared. When a maximum size is
    /// configured, only the top entities by `feature` are kept.
    pub fn reduce_size(&mut self, feature: &str) {
        for e in &mut self.entities {
            if e.weights.get(feature).is_some_and(|w| !w.is_finite()) {
                e.clear_weight(feature);
            }
        }
        let Some(max) = self.max_size else { return };
        if self.entities.len() <= max {
            return;
        }
        let mut entities = std::mem::take(&mut self.entities);
        entities.sort_by(|a, b| {
            b.weight(feature)
                .total_cmp(&a.weight(feature))
                .then_with(|| a.name.cmp(&b.name))
        });
        entities.truncate(max);
        self.entities = entities;
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.folded(), i))
            .collect();
    }
}

impl<S: Into<Identifier>> FromIterator<S> for EntityList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut list = EntityList::new();
        for literal in iter {
            list.add(literal);
        }
        list
    }
}

//! Single-pass frequency baselines.

use hashbrown::HashSet;
use tracing::debug;

use super::{Ranker, RankerKind};
use crate::model::*;
use crate::Result;

/// Which statistic a [`FrequencyRanker`] counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyMode {
    /// Sum of per-wrapper occurrence counts.
    Term,
    /// Distinct documents extracting the candidate.
    Document,
    /// Distinct wrappers extracting the candidate.
    Wrapper,
    /// `ln(context length) / ln(document length)` per extraction.
    WrapperLength,
}

impl FrequencyMode {
    pub fn kind(self) -> RankerKind {
        match self {
            FrequencyMode::Term => RankerKind::TermFrequency,
            FrequencyMode::Document => RankerKind::DocFrequency,
            FrequencyMode::Wrapper => RankerKind::WrapperFrequency,
            FrequencyMode::WrapperLength => RankerKind::WrapperLength,
        }
    }
}

pub struct FrequencyRanker {
    mode: FrequencyMode,
    feature: Identifier,
    seeds: Distribution,
}

impl FrequencyRanker {
    pub fn new(mode: FrequencyMode, feature: Identifier) -> Self {
        Self { mode, feature, seeds: Distribution::new() }
    }

    pub fn mode(&self) -> FrequencyMode {
        self.mode
    }

    fn count_terms(&self, entities: &mut EntityList, corpus: &DocumentSet) {
        for doc in corpus {
            for (_, extraction) in doc.extractions() {
                if let Some(e) = entities.add(extraction.literal.clone()) {
                    e.add_weight(self.feature.clone(), f64::from(extraction.frequency));
                }
            }
        }
    }

    /// One count per distinct (owner, candidate) pair, where the owner is the
    /// document URL or the wrapper id depending on the mode.
    fn count_distinct(&self, entities: &mut EntityList, corpus: &DocumentSet) {
        let mut seen: HashSet<(Identifier, Identifier)> = HashSet::new();
        for doc in corpus {
            for (wrapper, extraction) in doc.extractions() {
                let owner = match self.mode {
                    FrequencyMode::Document => &doc.url,
                    _ => &wrapper.id,
                };
                if !seen.insert((owner.clone(), extraction.literal.folded())) {
                    continue;
                }
                if let Some(e) = entities.add(extraction.literal.clone()) {
                    e.add_weight(self.feature.clone(), 1.0);
                }
            }
        }
    }

    fn count_wrapper_length(&self, entities: &mut EntityList, corpus: &DocumentSet) {
        for doc in corpus {
            // ln(1) = 0; shorter documents carry no length signal.
            if doc.length < 2 {
                continue;
            }
            let doc_len = (doc.length as f64).ln();
            for (wrapper, extraction) in doc.extractions() {
                if wrapper.context_length == 0 {
                    continue;
                }
                let weight = (wrapper.context_length as f64).ln() / doc_len;
                if let Some(e) = entities.add(extraction.literal.clone()) {
                    e.add_weight(self.feature.clone(), weight);
                }
            }
        }
    }
}

impl Ranker for FrequencyRanker {
    fn kind(&self) -> RankerKind {
        self.mode.kind()
    }

    fn feature(&self) -> &Identifier {
        &self.feature
    }

    fn description(&self) -> String {
        match self.mode {
            FrequencyMode::Term => "Term frequency (occurrences across all wrapper hits)",
            FrequencyMode::Document => "Document frequency (distinct documents per candidate)",
            FrequencyMode::Wrapper => "Wrapper frequency (distinct wrappers per candidate)",
            FrequencyMode::WrapperLength => "Wrapper length (log context length over log document length)",
        }
        .to_string()
    }

    fn seeds(&self) -> &Distribution {
        &self.seeds
    }

    fn seeds_mut(&mut self) -> &mut Distribution {
        &mut self.seeds
    }

    fn clear(&mut self) {
        self.seeds.clear();
    }

    fn load(&mut self, entities: &mut EntityList, corpus: &DocumentSet) -> Result<()> {
        entities.clear_weight(&self.feature);
        match self.mode {
            FrequencyMode::Term => self.count_terms(entities, corpus),
            FrequencyMode::Document | FrequencyMode::Wrapper => self.count_distinct(entities, corpus),
            FrequencyMode::WrapperLength => self.count_wrapper_length(entities, corpus),
        }
        entities.reduce_size(&self.feature);
        debug!(
            mode = ?self.mode,
            entities = entities.len(),
            extractions = corpus.num_extractions(),
            "frequency ranker loaded"
        );
        Ok(())
    }
}

//! Bayesian Sets ranker.
//!
//! Features are the wrappers and documents a candidate was extracted by.
//! For every feature `f` with `m_f` = fraction of candidates having it:
//!
//! ```text
//! alpha  = C·m_f + ε          beta  = C·(1 - m_f) + ε
//! alpha^ = alpha + s_f        beta^ = beta + N - s_f      (s_f seeds have f, N seeds)
//!
//! q_f    = ln alpha^ - ln alpha - ln beta^ + ln beta                 (per candidate having f)
//! const  = Σ_f ln(alpha + beta) - ln(alpha + beta + N) + ln beta^ - ln beta
//! score  = const + Σ_{f ∈ candidate} q_f
//! ```

use hashbrown::HashMap;
use tracing::{debug, warn};

use super::{BayesConfig, Ranker, RankerKind};
use crate::model::*;
use crate::Result;

pub struct BayesianSetsRanker {
    config: BayesConfig,
    feature: Identifier,
    seeds: Distribution,
    matrix: SparseMatrix,
}

impl BayesianSetsRanker {
    pub fn new(config: BayesConfig, feature: Identifier) -> Self {
        Self { config, feature, seeds: Distribution::new(), matrix: SparseMatrix::new() }
    }

    pub fn config(&self) -> &BayesConfig {
        &self.config
    }

    /// Feature matrix of the last pass.
    pub fn matrix(&self) -> &SparseMatrix {
        &self.matrix
    }

    /// Co-occurrence matrix: one row per wrapper and per document, one
    /// column per (case-folded) candidate. Cells are tagged with the row's
    /// node type.
    pub fn feature_matrix(corpus: &DocumentSet) -> SparseMatrix {
        let wrapper_tag = Identifier::new(NodeType::Wrapper.as_str());
        let document_tag = Identifier::new(NodeType::Document.as_str());

        let mut matrix = SparseMatrix::new();
        for doc in corpus {
            for (wrapper, extraction) in doc.extractions() {
                if extraction.literal.is_blank() {
                    continue;
                }
                let candidate = extraction.literal.folded();
                matrix.add_tagged(wrapper.id.clone(), candidate.clone(), 1.0, wrapper_tag.clone());
                matrix.add_tagged(doc.url.clone(), candidate, 1.0, document_tag.clone());
            }
        }
        matrix
    }

    /// First literal seen for each folded candidate, as it appeared in the corpus.
    fn literals(corpus: &DocumentSet) -> HashMap<Identifier, Identifier> {
        let mut literals = HashMap::new();
        for doc in corpus {
            for (_, extraction) in doc.extractions() {
                if !extraction.literal.is_blank() {
                    literals
                        .entry(extraction.literal.folded())
                        .or_insert_with(|| extraction.literal.clone());
                }
            }
        }
        literals
    }

    /// Experimental. Keep a cell (as 1.0) only where it exceeds `ratio` times
    /// the mean cell value of its candidate column; features left empty
    /// disappear.
    pub fn binarize(matrix: &SparseMatrix, ratio: f64) -> SparseMatrix {
        let mut out = SparseMatrix::new();
        for (candidate, column) in matrix.columns() {
            if column.is_empty() {
                continue;
            }
            let mean = column.sum() / column.len() as f64;
            for (feature, cell) in column.cells() {
                if cell.value > ratio * mean {
                    match &cell.tag {
                        Some(tag) => out.add_tagged(feature.clone(), candidate.clone(), 1.0, tag.clone()),
                        None => out.add(feature.clone(), candidate.clone(), 1.0),
                    }
                }
            }
        }
        out
    }

    /// Score every candidate column of `matrix` against `seeds`.
    ///
    /// `seeds` are matched by exact identifier; fold them first when the
    /// matrix columns are folded.
    pub fn score_matrix(matrix: &SparseMatrix, seeds: &Distribution, config: &BayesConfig) -> SparseVector {
        if config.log_score {
            log_scores(matrix, seeds, config)
        } else {
            product_scores(matrix, seeds, config)
        }
    }
}

/// Per-feature prior and posterior parameters.
struct FeatureParams {
    alpha: f64,
    beta: f64,
    alpha_hat: f64,
    beta_hat: f64,
}

fn feature_params(row: &SparseVector, n_items: f64, seeds: &Distribution, config: &BayesConfig) -> FeatureParams {
    let mean = row.iter().filter(|(_, v)| *v != 0.0).count() as f64 / n_items;
    let alpha = config.c * mean + config.epsilon;
    let beta = config.c * (1.0 - mean) + config.epsilon;
    let n_seeds = seeds.len() as f64;
    let with_feature = seeds.ids().filter(|s| row.get(s) != 0.0).count() as f64;
    FeatureParams {
        alpha,
        beta,
        alpha_hat: alpha + with_feature,
        beta_hat: beta + n_seeds - with_feature,
    }
}

fn log_scores(matrix: &SparseMatrix, seeds: &Distribution, config: &BayesConfig) -> SparseVector {
    let n_items = matrix.num_columns() as f64;
    let n_seeds = seeds.len() as f64;
    let mut scores = SparseVector::new();
    let mut constant = 0.0;

    for (_, row) in matrix.rows() {
        let p = feature_params(row, n_items, seeds, config);
        let q = p.alpha_hat.ln() - p.alpha.ln() - p.beta_hat.ln() + p.beta.ln();
        constant += (p.alpha + p.beta).ln() - (p.alpha + p.beta + n_seeds).ln() + p.beta_hat.ln()
            - p.beta.ln();
        for (candidate, v) in row.iter() {
            if v != 0.0 {
                scores.add(candidate.clone(), q);
            }
        }
    }
    for candidate in matrix.column_ids() {
        scores.add(candidate.clone(), constant);
    }
    scores
}

/// Bernoulli product form. Underflows to zero on large feature sets.
fn product_scores(matrix: &SparseMatrix, seeds: &Distribution, config: &BayesConfig) -> SparseVector {
    let n_items = matrix.num_columns() as f64;
    let n_seeds = seeds.len() as f64;
    let mut scores: SparseVector = matrix.column_ids().map(|c| (c.clone(), 1.0)).collect();

    for (_, row) in matrix.rows() {
        let p = feature_params(row, n_items, seeds, config);
        let shared = (p.alpha + p.beta) / (p.alpha + p.beta + n_seeds);
        let present = shared * p.alpha_hat / p.alpha;
        let absent = shared * p.beta_hat / p.beta;
        for candidate in matrix.column_ids() {
            let factor = if row.get(candidate) != 0.0 { present } else { absent };
            let current = scores.get(candidate);
            scores.set(candidate.clone(), current * factor);
        }
    }
    if !scores.normalize() {
        warn!(candidates = scores.len(), "product scores underflowed to zero");
    }
    scores
}

impl Ranker for BayesianSetsRanker {
    fn kind(&self) -> RankerKind {
        RankerKind::BayesSets
    }

    fn feature(&self) -> &Identifier {
        &self.feature
    }

    fn description(&self) -> String {
        let c = &self.config;
        format!(
            "Bayesian Sets (C {}, epsilon {}, {}{})",
            c.c,
            c.epsilon,
            if c.log_score { "log score" } else { "product score, experimental" },
            match c.binarize_ratio {
                Some(r) => format!(", binarized at {r}x mean, experimental"),
                None => String::new(),
            },
        )
    }

    fn is_log_scale(&self) -> bool {
        self.config.log_score
    }

    fn seeds(&self) -> &Distribution {
        &self.seeds
    }

    fn seeds_mut(&mut self) -> &mut Distribution {
        &mut self.seeds
    }

    fn clear(&mut self) {
        self.seeds.clear();
        self.matrix.clear();
    }

    fn load(&mut self, entities: &mut EntityList, corpus: &DocumentSet) -> Result<()> {
        self.matrix = Self::feature_matrix(corpus);
        if let Some(ratio) = self.config.binarize_ratio {
            self.matrix = Self::binarize(&self.matrix, ratio);
        }
        debug!(
            features = self.matrix.num_rows(),
            candidates = self.matrix.num_columns(),
            cells = self.matrix.nnz(),
            "feature matrix built"
        );

        let seeds = self.seeds.folded();
        let scores = Self::score_matrix(&self.matrix, &seeds, &self.config);

        let literals = Self::literals(corpus);
        entities.clear_weight(&self.feature);
        for (candidate, score) in scores.iter() {
            let literal = literals.get(candidate).unwrap_or(candidate);
            if let Some(entity) = entities.add(literal.clone()) {
                entity.set_weight(self.feature.clone(), score);
            }
        }
        debug!(scored = scores.len(), seeds = seeds.len(), "bayesian sets scored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Candidates a, b, c; seeds a, b.
    ///   f1 = {a, b}   f2 = {a, c}   f3 = {c}
    fn toy() -> (SparseMatrix, Distribution) {
        let mut m = SparseMatrix::new();
        for (f, c) in [("f1", "a"), ("f1", "b"), ("f2", "a"), ("f2", "c"), ("f3", "c")] {
            m.add(f, c, 1.0);
        }
        (m, Distribution::uniform(["a", "b"]))
    }

    #[test]
    fn test_log_scores_match_closed_form() {
        // C = 2, N = 2, three candidates:
        //   f1: alpha 4/3, beta 2/3, s 2 -> q = ln 2.5,  const ln 0.5
        //   f2: alpha 4/3, beta 2/3, s 1 -> q = ln 0.7,  const ln 1.25
        //   f3: alpha 2/3, beta 4/3, s 0 -> q = ln 0.4,  const ln 1.25
        let (m, seeds) = toy();
        let scores = BayesianSetsRanker::score_matrix(&m, &seeds, &BayesConfig::default());
        let constant = (0.5f64 * 1.25 * 1.25).ln();

        assert!((scores.get("a") - (constant + 2.5f64.ln() + 0.7f64.ln())).abs() < 1e-6);
        assert!((scores.get("b") - (constant + 2.5f64.ln())).abs() < 1e-6);
        assert!((scores.get("c") - (constant + 0.7f64.ln() + 0.4f64.ln())).abs() < 1e-6);
        assert!((scores.get("a") - 1.3671875f64.ln()).abs() < 1e-6);
        assert!(scores.get("b") > scores.get("a"));
        assert!(scores.get("a") > scores.get("c"));
    }

    #[test]
    fn test_no_seeds_scores_zero() {
        // With N = 0, alpha^ = alpha and beta^ = beta: every term cancels.
        let (m, _) = toy();
        let scores = BayesianSetsRanker::score_matrix(&m, &Distribution::new(), &BayesConfig::default());
        for c in ["a", "b", "c"] {
            assert!(scores.get(c).abs() < 1e-9);
        }
    }

    #[test]
    fn test_product_scores_rank_like_log_scores() {
        let (m, seeds) = toy();
        let config = BayesConfig { log_score: false, ..BayesConfig::default() };
        let product = BayesianSetsRanker::score_matrix(&m, &seeds, &config);
        assert!((product.sum() - 1.0).abs() < EPSILON);

        // Unnormalized product = exp(log score); normalization preserves ratios.
        let logs = BayesianSetsRanker::score_matrix(&m, &seeds, &BayesConfig::default());
        let ratio = product.get("b") / product.get("c");
        assert!((ratio - (logs.get("b") - logs.get("c")).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_feature_matrix_rows_and_tags() {
        let corpus: DocumentSet = [
            Document::new("doc1").with_wrapper(AppliedWrapper::new("w1").with_literals(["A", "B"])),
            Document::new("doc2").with_wrapper(AppliedWrapper::new("w1").with_literals(["a"])),
        ]
        .into_iter()
        .collect();
        let m = BayesianSetsRanker::feature_matrix(&corpus);

        assert_eq!(m.num_rows(), 3);
        assert_eq!(m.num_columns(), 2);
        assert_eq!(m.get("w1", "a"), 2.0);
        assert_eq!(m.get("doc2", "a"), 1.0);
        let tag = m.row("doc1").unwrap().cell("b").unwrap().tag.clone();
        assert_eq!(tag.as_ref().map(Identifier::as_str), Some("document"));
    }

    #[test]
    fn test_binarize_keeps_concentrated_cells() {
        let mut m = SparseMatrix::new();
        m.add("w1", "a", 4.0);
        m.add("d1", "a", 1.0);
        m.add("d2", "a", 1.0);
        m.add("d1", "b", 1.0);

        // Column a has mean 2; only w1 exceeds 1.5 × 2. Column b has mean 1.
        let out = BayesianSetsRanker::binarize(&m, 1.5);
        assert_eq!(out.get("w1", "a"), 1.0);
        assert_eq!(out.get("d1", "a"), 0.0);
        assert!(out.column("b").is_none());
        assert_eq!(out.nnz(), 1);
    }

    #[test]
    fn test_load_writes_feature() {
        let corpus: DocumentSet = [
            Document::new("doc1").with_wrapper(
                AppliedWrapper::new("w1").with_literals(["Pittsburgh Steelers", "Chicago Bears"]),
            ),
            Document::new("doc2").with_wrapper(
                AppliedWrapper::new("w2").with_literals(["Seattle Seahawks", "Chicago Bears"]),
            ),
            Document::new("doc3")
                .with_wrapper(AppliedWrapper::new("w3").with_literals(["Paris", "London"])),
        ]
        .into_iter()
        .collect();

        let mut ranker = BayesianSetsRanker::new(BayesConfig::default(), Identifier::new("BS"));
        ranker.add_seed(Identifier::new("Pittsburgh Steelers"), 1.0);
        ranker.add_seed(Identifier::new("Seattle Seahawks"), 1.0);
        let mut entities = EntityList::new();
        ranker.load(&mut entities, &corpus).unwrap();

        assert_eq!(entities.len(), 5);
        let bears = entities.get("chicago bears").unwrap().weight("BS");
        let paris = entities.get("paris").unwrap().weight("BS");
        assert!(bears > paris);
        assert_eq!(ranker.matrix().num_rows(), 6);

        ranker.clear();
        assert!(ranker.matrix().is_empty());
        assert!(ranker.seeds().is_empty());
    }

    #[test]
    fn test_new_candidates_keep_corpus_casing() {
        let corpus: DocumentSet = [
            Document::new("doc1").with_wrapper(
                AppliedWrapper::new("w1").with_literals(["Pittsburgh Steelers", "Chicago Bears"]),
            ),
            Document::new("doc2")
                .with_wrapper(AppliedWrapper::new("w2").with_literals(["CHICAGO BEARS", "Paris"])),
        ]
        .into_iter()
        .collect();

        let mut ranker = BayesianSetsRanker::new(BayesConfig::default(), Identifier::new("BS"));
        ranker.add_seed(Identifier::new("pittsburgh steelers"), 1.0);
        let mut entities = EntityList::new();
        ranker.load(&mut entities, &corpus).unwrap();

        let mut names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["Chicago Bears", "Paris", "Pittsburgh Steelers"]);
        // Columns stay folded.
        assert!(ranker.matrix().column("chicago bears").is_some());
    }
}

//! Corpus: the fetched documents and the wrappers that fired on them.
//!
//! Fetching, parsing and wrapper induction happen upstream; this module only
//! describes the snapshot they hand to a ranker.

use serde::{Deserialize, Serialize};

use super::Identifier;
use crate::Result;

/// One candidate literal produced by a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub literal: Identifier,
    /// How many times the wrapper extracted this literal in the document.
    #[serde(default = "default_frequency")]
    pub frequency: u32,
}

fn default_frequency() -> u32 {
    1
}

impl Extraction {
    pub fn new(literal: impl Into<Identifier>) -> Self {
        Self { literal: literal.into(), frequency: 1 }
    }

    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = frequency;
        self
    }
}

/// A wrapper (extraction rule) applied to one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedWrapper {
    pub id: Identifier,
    /// Length of the left + right context the wrapper matches on.
    #[serde(default)]
    pub context_length: usize,
    #[serde(default)]
    pub contents: Vec<Extraction>,
}

impl AppliedWrapper {
    pub fn new(id: impl Into<Identifier>) -> Self {
        Self { id: id.into(), context_length: 0, contents: Vec::new() }
    }

    pub fn with_context_length(mut self, context_length: usize) -> Self {
        self.context_length = context_length;
        self
    }

    pub fn with_content(mut self, extraction: Extraction) -> Self {
        self.contents.push(extraction);
        self
    }

    /// Add literals with a frequency of one each.
    pub fn with_literals(mut self, literals: impl IntoIterator<Item = impl Into<Identifier>>) -> Self {
        self.contents.extend(literals.into_iter().map(Extraction::new));
        self
    }
}

/// A fetched document and its applied wrappers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub url: Identifier,
    /// Length of the document text in characters.
    #[serde(default)]
    pub length: usize,
    #[serde(default)]
    pub wrappers: Vec<AppliedWrapper>,
}

impl Document {
    pub fn new(url: impl Into<Identifier>) -> Self {
        Self { url: url.into(), length: 0, wrappers: Vec::new() }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_wrapper(mut self, wrapper: AppliedWrapper) -> Self {
        self.wrappers.push(wrapper);
        self
    }

    /// Every extraction in the document, paired with its wrapper.
    pub fn extractions(&self) -> impl Iterator<Item = (&AppliedWrapper, &Extraction)> {
        self.wrappers
            .iter()
            .flat_map(|w| w.contents.iter().map(move |e| (w, e)))
    }
}

/// The document snapshot scored by one ranking pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSet {
    documents: Vec<Document>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total number of extractions across every document.
    pub fn num_extractions(&self) -> usize {
        self.documents.iter().map(|d| d.extractions().count()).sum()
    }

    /// Parse a JSON array of documents.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromIterator<Document> for DocumentSet {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        Self { documents: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a DocumentSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

//! # Evidence Model
//!
//! Plain data shared by the graph and every ranker: identifiers, sparse
//! vectors and matrices, seed distributions, the corpus snapshot and the
//! candidate list rankers write into.
//!
//! Design rule: nothing here knows about a particular ranking strategy.

pub mod identifier;
pub mod sparse;
pub mod distribution;
pub mod corpus;
pub mod entity;
pub mod node;
pub mod relationship;

pub use identifier::{Identifier, RELATION_DELIMITER};
pub use sparse::{Cell, SparseMatrix, SparseVector, EPSILON};
pub use distribution::Distribution;
pub use corpus::{AppliedWrapper, Document, DocumentSet, Extraction};
pub use entity::{Entity, EntityList};
pub use node::{Node, NodeIdx, NodeType};
pub use relationship::{Edge, inverse_label, CONTAIN, EXTRACT, INVERSE_SUFFIX};

//! Identifier: the value-compared name token shared by every structure.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Separator between the parts of a relational (compound) name.
pub const RELATION_DELIMITER: &str = "::";

/// A shared, immutable name.
///
/// Cloning is a reference-count bump. Equality, ordering and hashing all go
/// through the string value, so two identifiers built from the same text are
/// interchangeable regardless of where they were created.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(Arc<str>);

impl Identifier {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Build a compound name from the parts of a relation tuple.
    pub fn relation<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = parts
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .collect::<Vec<_>>()
            .join(RELATION_DELIMITER);
        Self::new(joined)
    }

    pub fn is_relational(&self) -> bool {
        self.0.contains(RELATION_DELIMITER)
    }

    /// Parts of a relational name; a literal name yields itself.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.0.split(RELATION_DELIMITER)
    }

    /// Lowercase form used wherever matching is case-insensitive.
    ///
    /// Same mapping as `str::to_lowercase`, titlecase letters included.
    /// Returns a clone of `self` when the name is already folded.
    pub fn folded(&self) -> Self {
        let lower = self.0.to_lowercase();
        if *lower == *self.0 {
            self.clone()
        } else {
            Self::new(lower)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&String> for Identifier {
    fn from(s: &String) -> Self {
        Self::new(s)
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

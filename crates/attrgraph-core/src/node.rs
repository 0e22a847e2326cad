//! Node records.

use crate::types::{AttrValue, Attributes};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A node: an immutable uid plus the attributes it currently holds.
///
/// Identity is the uid alone. Two records with the same uid compare equal
/// and hash the same regardless of their attributes.
#[derive(Debug, Clone)]
pub struct Node {
    uid: String,
    attributes: Attributes,
}

impl Node {
    #[must_use]
    pub fn new(uid: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            uid: uid.into(),
            attributes,
        }
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }

    /// Overwrite by key; keys not in `attributes` are left alone.
    pub(crate) fn merge(&mut self, attributes: Attributes) {
        self.attributes.extend(attributes);
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uid.cmp(&other.uid)
    }
}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uid.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uid)
    }
}

//! # Schema Module
//!
//! Attribute declarations for the nodes of one store.
//!
//! Each declared name maps to an [`AttrType`]. The schema is the single
//! authority for what a node may hold: [`Schema::validate`] is a lenient
//! filter that keeps the admissible pairs and silently drops the rest.

use crate::types::{AttrType, AttrValue, Attributes, GraphError, GraphResult, RESERVED_UID};
use std::collections::BTreeMap;

/// Attribute name -> declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    keys: BTreeMap<String, AttrType>,
}

impl Schema {
    /// Build a schema from prototype values. Only each value's type is kept.
    ///
    /// Fails with [`GraphError::InvalidSchemaKind`] if `uid` is declared.
    pub fn new<K, V, I>(prototypes: I) -> GraphResult<Self>
    where
        K: Into<String>,
        V: Into<AttrValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_types(
            prototypes
                .into_iter()
                .map(|(k, v)| (k, v.into().attr_type())),
        )
    }

    /// Build a schema from type tags.
    pub fn from_types<K, I>(types: I) -> GraphResult<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, AttrType)>,
    {
        let mut keys = BTreeMap::new();
        for (name, attr_type) in types {
            let name = name.into();
            if name == RESERVED_UID {
                return Err(GraphError::InvalidSchemaKind(name));
            }
            keys.insert(name, attr_type);
        }
        Ok(Self { keys })
    }

    /// Declare a new attribute.
    ///
    /// The name must not be `uid` and must not already be declared, so an
    /// existing key's type never changes.
    pub fn add_key(&mut self, name: impl Into<String>, prototype: impl Into<AttrValue>) -> GraphResult<()> {
        let name = name.into();
        if name == RESERVED_UID {
            return Err(GraphError::InvalidSchemaKind(name));
        }
        if self.keys.contains_key(&name) {
            return Err(GraphError::DuplicateKey(name));
        }
        self.keys.insert(name, prototype.into().attr_type());
        Ok(())
    }

    /// Keep only the pairs whose key is declared with exactly the value's type.
    pub fn validate(&self, candidate: &Attributes) -> Attributes {
        candidate
            .iter()
            .filter(|(key, value)| {
                let admitted = self.admits(key, value);
                if !admitted {
                    tracing::trace!(key = %key, "dropping attribute not admitted by schema");
                }
                admitted
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Whether `key` is declared and `value` has its declared type.
    #[must_use]
    pub fn admits(&self, key: &str, value: &AttrValue) -> bool {
        self.keys.get(key) == Some(&value.attr_type())
    }

    #[must_use]
    pub fn attr_type(&self, key: &str) -> Option<AttrType> {
        self.keys.get(key).copied()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Declarations in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, AttrType)> {
        self.keys.iter().map(|(k, t)| (k.as_str(), *t))
    }

    /// Each declared name with its representative prototype value.
    pub fn prototypes(&self) -> Attributes {
        self.keys
            .iter()
            .map(|(k, t)| (k.clone(), t.prototype()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

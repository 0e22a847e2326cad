//! # Types Module
//!
//! Value types, type tags and the error type shared by the store and the codecs.
//!
//! A schema binds each attribute name to an [`AttrType`] tag. Node attributes
//! are [`AttrValue`]s, and validation is a tag comparison: a boolean never
//! satisfies an integer key and an integer never satisfies a boolean key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reserved attribute name. It identifies a node and can never be declared in a schema.
pub const RESERVED_UID: &str = "uid";

// =============================================================================
// ATTRIBUTE TYPE TAG
// =============================================================================

/// The declared type of a schema attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    Boolean,
    Integer,
    Float,
    String,
}

impl AttrType {
    /// Representative zero value used when a schema is rebuilt from tags alone.
    #[must_use]
    pub fn prototype(self) -> AttrValue {
        match self {
            Self::Boolean => AttrValue::Boolean(true),
            Self::Integer => AttrValue::Integer(0),
            Self::Float => AttrValue::Float(0.0),
            Self::String => AttrValue::String(String::new()),
        }
    }

    /// GraphML `attr.type` name.
    #[must_use]
    pub fn graphml_name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "int",
            Self::Float => "double",
            Self::String => "string",
        }
    }

    /// Map a GraphML `attr.type` back to a tag.
    ///
    /// Anything that is not boolean, int or double is read as string.
    #[must_use]
    pub fn from_graphml_name(name: &str) -> Self {
        match name {
            "boolean" => Self::Boolean,
            "int" => Self::Integer,
            "double" => Self::Float,
            _ => Self::String,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// Accepts the display names plus the GraphML and short spellings.
impl FromStr for AttrType {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(Self::Boolean),
            "integer" | "int" | "long" => Ok(Self::Integer),
            "float" | "double" => Ok(Self::Float),
            "string" | "str" => Ok(Self::String),
            other => Err(GraphError::DeserializationError(format!(
                "unknown attribute type '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// ATTRIBUTE VALUE
// =============================================================================

/// A node attribute value.
///
/// Serialized untagged, so JSON documents carry plain scalars. Variant order
/// matters for decoding: `true` must never be read as an integer and `0.0`
/// must stay a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl AttrValue {
    /// The type tag of this value.
    #[must_use]
    pub fn attr_type(&self) -> AttrType {
        match self {
            Self::Boolean(_) => AttrType::Boolean,
            Self::Integer(_) => AttrType::Integer,
            Self::Float(_) => AttrType::Float,
            Self::String(_) => AttrType::String,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Parse text as a value of the given type.
    ///
    /// Booleans accept `true`/`false`/`1`/`0` in any case. Strings are taken
    /// verbatim, other types ignore surrounding whitespace.
    pub fn parse_as(attr_type: AttrType, text: &str) -> Result<Self, GraphError> {
        let invalid = || GraphError::DeserializationError(format!(
            "cannot parse '{}' as {}",
            text, attr_type
        ));
        match attr_type {
            AttrType::Boolean => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Self::Boolean(true)),
                "false" | "0" => Ok(Self::Boolean(false)),
                _ => Err(invalid()),
            },
            AttrType::Integer => text.trim().parse().map(Self::Integer).map_err(|_| invalid()),
            AttrType::Float => text.trim().parse().map(Self::Float).map_err(|_| invalid()),
            AttrType::String => Ok(Self::String(text.to_string())),
        }
    }
}

/// Text form used by the GraphML writer: lowercase booleans, doubles in
/// shortest round-trip form with a decimal point kept (`42.0`, not `42`).
/// Non-finite doubles use the XML Schema spellings `NaN`, `INF` and `-INF`.
impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) if x.is_nan() => f.write_str("NaN"),
            Self::Float(x) if x.is_infinite() => {
                f.write_str(if x.is_sign_positive() { "INF" } else { "-INF" })
            }
            Self::Float(x) => write!(f, "{:?}", x),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Attribute bag of a node, keyed by schema attribute name.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Build an [`Attributes`] map from name/value pairs.
///
/// ```
/// use attrgraph_core::{attrs, AttrValue};
///
/// let a = attrs([("name", AttrValue::from("Alice")), ("age", 30.into())]);
/// assert_eq!(a.len(), 2);
/// ```
pub fn attrs<K, V, I>(pairs: I) -> Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// =============================================================================
// ERRORS
// =============================================================================

/// Which end of an operation referenced the missing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Node,
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Node => "node",
            Self::Source => "source node",
            Self::Target => "target node",
        };
        f.write_str(s)
    }
}

/// Errors raised by the store and the codecs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A schema declared the reserved name.
    #[error("invalid schema: '{0}' is a reserved attribute name")]
    InvalidSchemaKind(String),

    /// `add_key` on a name that is already declared.
    #[error("attribute '{0}' is already declared")]
    DuplicateKey(String),

    /// An operation referenced a uid absent from the store.
    #[error("{operation}: {endpoint} '{uid}' does not exist")]
    NodeNotFound {
        operation: &'static str,
        endpoint: Endpoint,
        uid: String,
    },

    /// A decoded node carried an attribute the schema does not admit.
    #[error("node '{uid}': attribute '{key}' is not admitted by the schema")]
    SchemaViolation { uid: String, key: String },

    /// A decoded document declared the same uid twice, or an empty uid.
    #[error("duplicate or empty node uid '{0}'")]
    DuplicateNode(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("deserialization error: {0}")]
    DeserializationError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl GraphError {
    pub(crate) fn node_not_found(
        operation: &'static str,
        endpoint: Endpoint,
        uid: &str,
    ) -> Self {
        Self::NodeNotFound {
            operation,
            endpoint,
            uid: uid.to_string(),
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

// =============================================================================
// TESTS
// =============================================================================

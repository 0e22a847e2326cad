//! # Native Tree Format
//!
//! Snapshot document with four fields:
//!
//! ```text
//! {
//!   "keys":     { name: prototype-value },
//!   "progress": u64,
//!   "nodes":    { uid: { "uid": uid, "attributes": { name: value } } },
//!   "edges":    { type: { source: [target, ...] } }
//! }
//! ```
//!
//! JSON has no literal for non-finite numbers, so NaN and the infinities are
//! written as the strings `"NaN"`, `"Infinity"` and `"-Infinity"` and turned
//! back into floats for keys declared as float.
//!
//! Only the forward index is written. Decoding rebuilds the reverse index by
//! replaying every edge through `add_edge`, and restores `progress` verbatim
//! so auto-uid minting continues exactly where the source store left off.

use crate::graph::{Graph, GraphStore};
use crate::node::Node;
use crate::schema::Schema;
use crate::types::{AttrType, AttrValue, Attributes, GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const NAN_TOKEN: &str = "NaN";
const INFINITY_TOKEN: &str = "Infinity";
const NEG_INFINITY_TOKEN: &str = "-Infinity";

fn to_document_value(value: &AttrValue) -> AttrValue {
    match value {
        AttrValue::Float(x) if x.is_nan() => AttrValue::from(NAN_TOKEN),
        AttrValue::Float(x) if x.is_infinite() => AttrValue::from(if x.is_sign_positive() {
            INFINITY_TOKEN
        } else {
            NEG_INFINITY_TOKEN
        }),
        other => other.clone(),
    }
}

fn from_document_value(attr_type: Option<AttrType>, value: AttrValue) -> AttrValue {
    if attr_type != Some(AttrType::Float) {
        return value;
    }
    let special = match value.as_str() {
        Some(NAN_TOKEN) => Some(f64::NAN),
        Some(INFINITY_TOKEN) => Some(f64::INFINITY),
        Some(NEG_INFINITY_TOKEN) => Some(f64::NEG_INFINITY),
        _ => None,
    };
    special.map_or(value, AttrValue::Float)
}

/// One entry of [`NativeDocument::nodes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub uid: String,
    #[serde(default)]
    pub attributes: Attributes,
}

/// Serializable snapshot of a [`Graph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeDocument {
    pub keys: BTreeMap<String, AttrValue>,
    pub progress: u64,
    pub nodes: BTreeMap<String, NodeRecord>,
    pub edges: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl NativeDocument {
    /// Capture the schema, counter, nodes and forward edges of `graph`.
    #[must_use]
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| {
                (
                    node.uid().to_string(),
                    NodeRecord {
                        uid: node.uid().to_string(),
                        attributes: node
                            .attributes()
                            .iter()
                            .map(|(key, value)| (key.clone(), to_document_value(value)))
                            .collect(),
                    },
                )
            })
            .collect();

        let mut edges: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for (source, target, edge_type) in graph.edges() {
            edges
                .entry(edge_type.to_string())
                .or_default()
                .entry(source.to_string())
                .or_default()
                .push(target.to_string());
        }

        Self {
            keys: graph.schema().prototypes(),
            progress: graph.progress(),
            nodes,
            edges,
        }
    }

    /// Rebuild a graph. Any inconsistency aborts the whole decode.
    pub fn to_graph(self) -> GraphResult<Graph> {
        let mut graph = Graph::new(Schema::new(self.keys)?);
        graph.restore_progress(self.progress);

        for (uid, record) in self.nodes {
            if record.uid != uid {
                return Err(GraphError::DeserializationError(format!(
                    "node entry '{}' carries uid '{}'",
                    uid, record.uid
                )));
            }
            let attributes = record
                .attributes
                .into_iter()
                .map(|(key, value)| {
                    let value = from_document_value(graph.schema().attr_type(&key), value);
                    (key, value)
                })
                .collect();
            graph.import_node(Node::new(record.uid, attributes))?;
        }

        for (edge_type, by_source) in &self.edges {
            for (source, targets) in by_source {
                for target in targets {
                    graph.add_edge(source, target, edge_type)?;
                }
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            progress = graph.progress(),
            "decoded native document"
        );
        Ok(graph)
    }
}

impl From<&Graph> for NativeDocument {
    fn from(graph: &Graph) -> Self {
        Self::from_graph(graph)
    }
}

impl TryFrom<NativeDocument> for Graph {
    type Error = GraphError;

    fn try_from(doc: NativeDocument) -> GraphResult<Self> {
        doc.to_graph()
    }
}

#[must_use]
pub fn encode_native(graph: &Graph) -> NativeDocument {
    NativeDocument::from_graph(graph)
}

pub fn decode_native(doc: NativeDocument) -> GraphResult<Graph> {
    doc.to_graph()
}

/// Pretty-printed JSON (2-space indent).
pub fn to_json_string(graph: &Graph) -> GraphResult<String> {
    serde_json::to_string_pretty(&NativeDocument::from_graph(graph))
        .map_err(|e| GraphError::SerializationError(e.to_string()))
}

pub fn from_json_str(json: &str) -> GraphResult<Graph> {
    let doc: NativeDocument = serde_json::from_str(json)
        .map_err(|e| GraphError::DeserializationError(e.to_string()))?;
    doc.to_graph()
}

pub fn to_json_value(graph: &Graph) -> GraphResult<serde_json::Value> {
    serde_json::to_value(NativeDocument::from_graph(graph))
        .map_err(|e| GraphError::SerializationError(e.to_string()))
}

pub fn from_json_value(value: serde_json::Value) -> GraphResult<Graph> {
    let doc: NativeDocument = serde_json::from_value(value)
        .map_err(|e| GraphError::DeserializationError(e.to_string()))?;
    doc.to_graph()
}

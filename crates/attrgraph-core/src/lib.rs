//! # attrgraph-core
//!
//! In-memory typed-attribute directed multigraph store.
//!
//! A [`Graph`] holds nodes identified by string uids, each carrying attributes
//! checked against a fixed [`Schema`], and any number of independently typed
//! edge relations. Every relation is indexed forward and in reverse, and the
//! two indices are kept symmetric by every mutation.
//!
//! ```
//! use attrgraph_core::{attrs, AttrValue, Graph, GraphStore};
//!
//! let mut graph = Graph::with_prototypes([("name", AttrValue::from("")), ("age", 0.into())])?;
//! let alice = graph.add_node(None, attrs([("name", AttrValue::from("Alice")), ("age", 30.into())]));
//! let bob = graph.add_node(Some("bob"), attrs([("name", "Bob")]));
//! graph.add_edge(&alice, &bob, "knows")?;
//!
//! assert!(graph.get_predecessors(&bob, Some("knows"))?.contains(&alice));
//! let restored = attrgraph_core::from_json_str(&attrgraph_core::to_json_string(&graph)?)?;
//! assert!(restored.has_edge(&alice, &bob, "knows"));
//! # Ok::<(), attrgraph_core::GraphError>(())
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no file I/O (the app layer owns paths)
//! - Deterministic iteration: BTreeMap/BTreeSet only
//! - Invalid attributes are dropped, never rejected

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod graph;
pub mod node;
pub mod schema;
pub mod sync;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use graph::{AUTO_UID_PREFIX, Graph, GraphStore};
pub use node::Node;
pub use schema::Schema;
pub use sync::SharedGraph;
pub use types::{
    AttrType, AttrValue, Attributes, Endpoint, GraphError, GraphResult, RESERVED_UID, attrs,
};

pub use formats::{
    Format, NativeDocument, from_graphml_str, from_json_str, to_graphml_string, to_json_string,
};

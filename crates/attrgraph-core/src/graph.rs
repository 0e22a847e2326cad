//! # Graph Engine
//!
//! The in-memory store: nodes with schema-checked attributes, and typed edge
//! relations kept in two symmetric indices.
//!
//! For every edge type `t`: `v2 ∈ edges[t][v1]` iff `v1 ∈ rev_edges[t][v2]`.
//! Neither index ever holds an empty per-uid set or an empty per-type map.
//! All data structures use `BTreeMap`/`BTreeSet` for deterministic ordering.

use crate::node::Node;
use crate::schema::Schema;
use crate::types::{AttrValue, Attributes, Endpoint, GraphError, GraphResult};
use std::collections::{BTreeMap, BTreeSet};

/// Prefix of auto-minted uids.
pub const AUTO_UID_PREFIX: &str = "node-";

/// edge type -> uid -> set of uids
type EdgeIndex = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

// =============================================================================
// GRAPHSTORE TRAIT
// =============================================================================

/// The GraphStore trait defines the store operations.
pub trait GraphStore {
    /// Insert a node and return its resolved uid.
    ///
    /// A non-empty `uid` that is not taken is used verbatim; otherwise a
    /// `node-<n>` uid is minted. Attributes the schema does not admit are
    /// dropped. Never fails.
    fn add_node(&mut self, uid: Option<&str>, attributes: Attributes) -> String;

    /// Merge admissible attributes into an existing node.
    fn modify_node(&mut self, uid: &str, attributes: Attributes) -> GraphResult<()>;

    /// Remove a node and every edge, of any type and direction, touching it.
    fn del_node(&mut self, uid: &str) -> GraphResult<Node>;

    /// Insert the edge `v1 -> v2` of type `edge_type`. Idempotent.
    fn add_edge(&mut self, v1: &str, v2: &str, edge_type: &str) -> GraphResult<()>;

    /// Remove the edge if present. Returns whether it existed; never fails.
    fn del_edge(&mut self, v1: &str, v2: &str, edge_type: &str) -> bool;

    /// Successors of `uid`, for one type or the union across all types.
    fn get_neighbors(&self, uid: &str, edge_type: Option<&str>) -> GraphResult<BTreeSet<String>>;

    /// Predecessors of `uid`, for one type or the union across all types.
    fn get_predecessors(&self, uid: &str, edge_type: Option<&str>)
        -> GraphResult<BTreeSet<String>>;

    /// Forward-index membership. Unknown uids simply yield `false`.
    fn has_edge(&self, v1: &str, v2: &str, edge_type: &str) -> bool;

    /// Get the total number of nodes.
    fn node_count(&self) -> usize;

    /// Get the total number of `(source, target, type)` edges.
    fn edge_count(&self) -> usize;
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// The main Graph structure.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Attribute declarations
    schema: Schema,

    /// Node storage: uid -> Node
    nodes: BTreeMap<String, Node>,

    /// Forward adjacency: type -> source -> targets
    edges: EdgeIndex,

    /// Reverse adjacency: type -> target -> sources
    rev_edges: EdgeIndex,

    /// Auto-uid counter, never decremented
    progress: u64,
}

impl Graph {
    /// Create an empty graph over `schema`.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Create an empty graph from prototype values.
    ///
    /// Fails with [`GraphError::InvalidSchemaKind`] if `uid` is declared.
    pub fn with_prototypes<K, V, I>(prototypes: I) -> GraphResult<Self>
    where
        K: Into<String>,
        V: Into<AttrValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Ok(Self::new(Schema::new(prototypes)?))
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Declare a new attribute on the live graph. Existing nodes are untouched.
    pub fn add_key(&mut self, name: impl Into<String>, prototype: impl Into<AttrValue>) -> GraphResult<()> {
        self.schema.add_key(name, prototype)
    }

    /// Filter `candidate` down to the pairs the schema admits.
    pub fn validate_attributes(&self, candidate: &Attributes) -> Attributes {
        self.schema.validate(candidate)
    }

    /// Current value of the auto-uid counter.
    #[must_use]
    pub fn progress(&self) -> u64 {
        self.progress
    }

    /// Mint the next free `node-<n>` uid.
    ///
    /// Always advances the counter at least once; skips values already taken
    /// by nodes inserted under that literal uid. Once the counter reaches
    /// `u64::MAX` it stays there and minting falls back to the lowest free
    /// `node-<n>`.
    pub fn next_auto_uid(&mut self) -> String {
        loop {
            let Some(next) = self.progress.checked_add(1) else {
                return self.lowest_free_auto_uid();
            };
            let uid = format!("{}{}", AUTO_UID_PREFIX, self.progress);
            self.progress = next;
            if !self.nodes.contains_key(&uid) {
                return uid;
            }
        }
    }

    // Terminates: the node map holds fewer than 2^64 uids.
    fn lowest_free_auto_uid(&self) -> String {
        tracing::warn!("auto-uid counter exhausted, reusing the lowest free uid");
        let mut n: u64 = 0;
        loop {
            let uid = format!("{}{}", AUTO_UID_PREFIX, n);
            if !self.nodes.contains_key(&uid) {
                return uid;
            }
            n = n.wrapping_add(1);
        }
    }

    #[must_use]
    pub fn node(&self, uid: &str) -> Option<&Node> {
        self.nodes.get(uid)
    }

    #[must_use]
    pub fn contains_node(&self, uid: &str) -> bool {
        self.nodes.contains_key(uid)
    }

    /// Get all nodes in uid order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Edge types present in the forward index.
    pub fn edge_types(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Edge types present in the reverse index.
    pub fn reverse_edge_types(&self) -> impl Iterator<Item = &str> {
        self.rev_edges.keys().map(String::as_str)
    }

    /// Get all edges as `(source, target, type)`, ordered by type, then source, then target.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &str)> + '_ {
        self.edges.iter().flat_map(|(edge_type, by_source)| {
            by_source.iter().flat_map(move |(source, targets)| {
                targets
                    .iter()
                    .map(move |target| (source.as_str(), target.as_str(), edge_type.as_str()))
            })
        })
    }

    /// Forward adjacency of one type: source -> targets.
    pub fn edges_of_type(&self, edge_type: &str) -> Option<&BTreeMap<String, BTreeSet<String>>> {
        self.edges.get(edge_type)
    }

    /// Set the auto-uid counter verbatim (used when restoring a snapshot).
    pub fn restore_progress(&mut self, progress: u64) {
        self.progress = progress;
    }

    /// Insert a node as-is, bypassing the lenient filter.
    ///
    /// Used when restoring a snapshot whose data was valid when written. The
    /// uid must be non-empty and free, and every attribute must be admitted by
    /// the schema, so a tampered snapshot is reported instead of absorbed.
    /// The auto-uid counter is not touched.
    pub fn import_node(&mut self, node: Node) -> GraphResult<()> {
        if node.uid().is_empty() || self.nodes.contains_key(node.uid()) {
            return Err(GraphError::DuplicateNode(node.uid().to_string()));
        }
        if let Some((key, _)) = node
            .attributes()
            .iter()
            .find(|(key, value)| !self.schema.admits(key, value))
        {
            return Err(GraphError::SchemaViolation {
                uid: node.uid().to_string(),
                key: key.clone(),
            });
        }
        self.nodes.insert(node.uid().to_string(), node);
        Ok(())
    }

    /// Check the index invariants: forward/reverse symmetry, no empty
    /// containers, no edge endpoint outside the node set.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let no_empty = |index: &EdgeIndex| {
            index
                .values()
                .all(|by_uid| !by_uid.is_empty() && by_uid.values().all(|set| !set.is_empty()))
        };
        if !no_empty(&self.edges) || !no_empty(&self.rev_edges) {
            return false;
        }

        let forward_in_reverse = self.edges().all(|(source, target, edge_type)| {
            self.contains_node(source)
                && self.contains_node(target)
                && contains(&self.rev_edges, edge_type, target, source)
        });
        let reverse_in_forward = self.rev_edges.iter().all(|(edge_type, by_target)| {
            by_target.iter().all(|(target, sources)| {
                sources
                    .iter()
                    .all(|source| contains(&self.edges, edge_type, source, target))
            })
        });

        forward_in_reverse && reverse_in_forward
    }

    fn require(&self, operation: &'static str, endpoint: Endpoint, uid: &str) -> GraphResult<()> {
        if self.nodes.contains_key(uid) {
            Ok(())
        } else {
            Err(GraphError::node_not_found(operation, endpoint, uid))
        }
    }
}

/// Membership of `member` in `index[edge_type][key]`.
fn contains(index: &EdgeIndex, edge_type: &str, key: &str, member: &str) -> bool {
    index
        .get(edge_type)
        .and_then(|by_uid| by_uid.get(key))
        .is_some_and(|set| set.contains(member))
}

fn link(index: &mut EdgeIndex, edge_type: &str, key: &str, member: &str) {
    index
        .entry(edge_type.to_string())
        .or_default()
        .entry(key.to_string())
        .or_default()
        .insert(member.to_string());
}

/// Remove `member` from `index[edge_type][key]`, pruning whatever becomes empty.
fn unlink(index: &mut EdgeIndex, edge_type: &str, key: &str, member: &str) -> bool {
    let Some(by_uid) = index.get_mut(edge_type) else {
        return false;
    };

    let mut removed = false;
    if let Some(set) = by_uid.get_mut(key) {
        removed = set.remove(member);
        if set.is_empty() {
            by_uid.remove(key);
        }
    }
    if by_uid.is_empty() {
        index.remove(edge_type);
    }
    removed
}

/// Copy of `index[edge_type][uid]`, or the union over every type.
fn adjacent(index: &EdgeIndex, uid: &str, edge_type: Option<&str>) -> BTreeSet<String> {
    match edge_type {
        Some(edge_type) => index
            .get(edge_type)
            .and_then(|by_uid| by_uid.get(uid))
            .cloned()
            .unwrap_or_default(),
        None => index
            .values()
            .filter_map(|by_uid| by_uid.get(uid))
            .flatten()
            .cloned()
            .collect(),
    }
}

impl GraphStore for Graph {
    fn add_node(&mut self, uid: Option<&str>, attributes: Attributes) -> String {
        let uid = match uid {
            Some(uid) if !uid.is_empty() && !self.nodes.contains_key(uid) => uid.to_string(),
            _ => self.next_auto_uid(),
        };

        let attributes = self.schema.validate(&attributes);
        self.nodes
            .insert(uid.clone(), Node::new(uid.clone(), attributes));
        uid
    }

    fn modify_node(&mut self, uid: &str, attributes: Attributes) -> GraphResult<()> {
        let valid = self.schema.validate(&attributes);
        let node = self
            .nodes
            .get_mut(uid)
            .ok_or_else(|| GraphError::node_not_found("modify_node", Endpoint::Node, uid))?;
        node.merge(valid);
        Ok(())
    }

    fn del_node(&mut self, uid: &str) -> GraphResult<Node> {
        self.require("del_node", Endpoint::Node, uid)?;

        let outgoing: Vec<(String, String)> = self
            .edges
            .iter()
            .filter_map(|(edge_type, by_source)| by_source.get(uid).map(|t| (edge_type, t)))
            .flat_map(|(edge_type, targets)| {
                targets
                    .iter()
                    .map(move |target| (edge_type.clone(), target.clone()))
            })
            .collect();
        let incoming: Vec<(String, String)> = self
            .rev_edges
            .iter()
            .filter_map(|(edge_type, by_target)| by_target.get(uid).map(|s| (edge_type, s)))
            .flat_map(|(edge_type, sources)| {
                sources
                    .iter()
                    .map(move |source| (edge_type.clone(), source.clone()))
            })
            .collect();

        let mut removed = 0usize;
        for (edge_type, target) in &outgoing {
            if self.del_edge(uid, target, edge_type) {
                removed = removed.saturating_add(1);
            }
        }
        for (edge_type, source) in &incoming {
            if self.del_edge(source, uid, edge_type) {
                removed = removed.saturating_add(1);
            }
        }

        tracing::debug!(uid = %uid, edges_removed = removed, "deleted node");
        self.nodes
            .remove(uid)
            .ok_or_else(|| GraphError::node_not_found("del_node", Endpoint::Node, uid))
    }

    fn add_edge(&mut self, v1: &str, v2: &str, edge_type: &str) -> GraphResult<()> {
        self.require("add_edge", Endpoint::Source, v1)?;
        self.require("add_edge", Endpoint::Target, v2)?;

        link(&mut self.edges, edge_type, v1, v2);
        link(&mut self.rev_edges, edge_type, v2, v1);
        Ok(())
    }

    fn del_edge(&mut self, v1: &str, v2: &str, edge_type: &str) -> bool {
        let removed = unlink(&mut self.edges, edge_type, v1, v2);
        unlink(&mut self.rev_edges, edge_type, v2, v1);
        removed
    }

    fn get_neighbors(&self, uid: &str, edge_type: Option<&str>) -> GraphResult<BTreeSet<String>> {
        self.require("get_neighbors", Endpoint::Node, uid)?;
        Ok(adjacent(&self.edges, uid, edge_type))
    }

    fn get_predecessors(
        &self,
        uid: &str,
        edge_type: Option<&str>,
    ) -> GraphResult<BTreeSet<String>> {
        self.require("get_predecessors", Endpoint::Node, uid)?;
        Ok(adjacent(&self.rev_edges, uid, edge_type))
    }

    fn has_edge(&self, v1: &str, v2: &str, edge_type: &str) -> bool {
        contains(&self.edges, edge_type, v1, v2)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeSet::len)
            .sum()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attrs;

    fn graph() -> Graph {
        Graph::with_prototypes([
            ("name", AttrValue::from("")),
            ("value", AttrValue::from(0)),
            ("active", AttrValue::from(true)),
        ])
        .unwrap()
    }

    fn set(uids: &[&str]) -> BTreeSet<String> {
        uids.iter().map(|s| s.to_string()).collect()
    }

    fn add(g: &mut Graph, uid: &str) -> String {
        g.add_node(Some(uid), Attributes::new())
    }

    #[test]
    fn empty_graph() {
        let g = Graph::default();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.progress(), 0);
        assert!(g.schema().is_empty());
    }

    #[test]
    fn reserved_uid_in_schema_fails() {
        let err = Graph::with_prototypes([("uid", "")]).unwrap_err();
        assert!(matches!(err, GraphError::InvalidSchemaKind(_)));
    }

    #[test]
    fn next_auto_uid_sequential() {
        let mut g = graph();
        assert_eq!(g.next_auto_uid(), "node-0");
        assert_eq!(g.next_auto_uid(), "node-1");
        assert_eq!(g.next_auto_uid(), "node-2");
        assert_eq!(g.progress(), 3);
    }

    #[test]
    fn next_auto_uid_skips_existing() {
        let mut g = graph();
        add(&mut g, "node-0");
        add(&mut g, "node-1");
        assert_eq!(g.next_auto_uid(), "node-2");
        assert_eq!(g.progress(), 3);
    }

    #[test]
    fn next_auto_uid_terminates_at_counter_limit() {
        let mut g = graph();
        g.restore_progress(u64::MAX - 1);
        add(&mut g, "node-0");
        add(&mut g, &format!("node-{}", u64::MAX));

        assert_eq!(g.next_auto_uid(), format!("node-{}", u64::MAX - 1));
        assert_eq!(g.progress(), u64::MAX);

        // Counter exhausted: lowest free uid, counter left alone.
        assert_eq!(g.next_auto_uid(), "node-1");
        assert_eq!(g.add_node(None, Attributes::new()), "node-1");
        assert_eq!(g.next_auto_uid(), "node-2");
        assert_eq!(g.progress(), u64::MAX);
    }

    #[test]
    fn add_node_filters_attributes() {
        let mut g = Graph::with_prototypes([("name", AttrValue::from("")), ("value", 0.into())]).unwrap();
        let uid = g.add_node(
            None,
            attrs([
                ("name", AttrValue::from("Test")),
                ("value", 42.into()),
                ("bogus", "x".into()),
            ]),
        );
        assert_eq!(uid, "node-0");
        assert_eq!(
            g.node(&uid).map(Node::attributes),
            Some(&attrs([("name", AttrValue::from("Test")), ("value", 42.into())]))
        );
    }

    #[test]
    fn add_node_custom_uid() {
        let mut g = graph();
        let uid = g.add_node(Some("custom-1"), attrs([("name", "Custom Node")]));
        assert_eq!(uid, "custom-1");
        assert_eq!(g.node("custom-1").map(Node::uid), Some("custom-1"));
        assert_eq!(g.progress(), 0);
    }

    #[test]
    fn duplicate_uid_falls_back_to_auto() {
        let mut g = graph();
        let first = g.add_node(Some("A"), attrs([("name", "First")]));
        let second = g.add_node(Some("A"), attrs([("name", "Second")]));
        assert_eq!(first, "A");
        assert_eq!(second, "node-0");
        assert_eq!(
            g.node("A").and_then(|n| n.get("name")),
            Some(&AttrValue::from("First"))
        );
        assert_eq!(
            g.node("node-0").and_then(|n| n.get("name")),
            Some(&AttrValue::from("Second"))
        );
    }

    #[test]
    fn empty_uid_is_auto_minted() {
        let mut g = graph();
        assert_eq!(g.add_node(Some(""), Attributes::new()), "node-0");
    }

    #[test]
    fn modify_node_merges() {
        let mut g = graph();
        let uid = g.add_node(
            None,
            attrs([
                ("name", AttrValue::from("Original")),
                ("value", 10.into()),
                ("active", false.into()),
            ]),
        );
        g.modify_node(
            &uid,
            attrs([
                ("name", AttrValue::from("Modified")),
                ("value", 20.into()),
                ("invalid_key", "x".into()),
                ("active", 1.into()),
            ]),
        )
        .unwrap();

        let node = g.node(&uid).unwrap();
        assert_eq!(node.get("name"), Some(&AttrValue::from("Modified")));
        assert_eq!(node.get("value"), Some(&AttrValue::Integer(20)));
        assert_eq!(node.get("active"), Some(&AttrValue::Boolean(false)));
        assert!(node.get("invalid_key").is_none());
    }

    #[test]
    fn modify_missing_node_fails() {
        let mut g = graph();
        let err = g.modify_node("ghost", attrs([("name", "x")])).unwrap_err();
        assert_eq!(
            err,
            GraphError::NodeNotFound {
                operation: "modify_node",
                endpoint: Endpoint::Node,
                uid: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn add_edge_populates_both_indices() {
        let mut g = graph();
        let v1 = add(&mut g, "v1");
        let v2 = add(&mut g, "v2");
        g.add_edge(&v1, &v2, "connection").unwrap();

        assert!(contains(&g.edges, "connection", "v1", "v2"));
        assert!(contains(&g.rev_edges, "connection", "v2", "v1"));
        assert!(g.is_consistent());
    }

    #[test]
    fn add_edge_is_idempotent() {
        let mut g = graph();
        add(&mut g, "a");
        add(&mut g, "b");
        g.add_edge("a", "b", "t").unwrap();
        g.add_edge("a", "b", "t").unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn add_edge_reports_missing_endpoint() {
        let mut g = graph();
        add(&mut g, "a");

        let err = g.add_edge("ghost", "a", "t").unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound { endpoint: Endpoint::Source, .. }));

        let err = g.add_edge("a", "ghost", "t").unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound { endpoint: Endpoint::Target, .. }));

        // Both missing: the source is reported first.
        let err = g.add_edge("x", "y", "t").unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound { endpoint: Endpoint::Source, .. }));

        assert!(g.edges.is_empty());
        assert!(g.rev_edges.is_empty());
    }

    #[test]
    fn multiple_types_between_same_nodes() {
        let mut g = graph();
        add(&mut g, "p1");
        add(&mut g, "p2");
        for t in ["friend", "colleague", "neighbor"] {
            g.add_edge("p1", "p2", t).unwrap();
        }
        assert!(g.del_edge("p1", "p2", "colleague"));

        assert!(g.has_edge("p1", "p2", "friend"));
        assert!(!g.has_edge("p1", "p2", "colleague"));
        assert!(g.has_edge("p1", "p2", "neighbor"));
        assert_eq!(g.edge_types().collect::<Vec<_>>(), vec!["friend", "neighbor"]);
    }

    #[test]
    fn del_edge_prunes_empty_containers() {
        let mut g = graph();
        add(&mut g, "a");
        add(&mut g, "b");
        add(&mut g, "c");
        g.add_edge("a", "b", "link").unwrap();
        g.add_edge("a", "c", "link").unwrap();

        g.del_edge("a", "b", "link");
        assert!(g.edges.contains_key("link"));
        assert!(!g.rev_edges["link"].contains_key("b"));

        g.del_edge("a", "c", "link");
        assert!(!g.edges.contains_key("link"));
        assert!(!g.rev_edges.contains_key("link"));
        assert!(g.is_consistent());
    }

    #[test]
    fn del_edge_missing_is_noop() {
        let mut g = graph();
        add(&mut g, "a");
        add(&mut g, "b");
        g.add_edge("a", "b", "link").unwrap();

        assert!(!g.del_edge("ghost", "other", "nope"));
        assert!(!g.del_edge("a", "b", "nope"));
        assert!(!g.del_edge("b", "a", "link"));
        assert!(!g.del_edge("a", "ghost", "link"));
        assert!(g.has_edge("a", "b", "link"));
        assert!(g.is_consistent());
    }

    #[test]
    fn has_edge_is_directional_and_typed() {
        let mut g = graph();
        add(&mut g, "v1");
        add(&mut g, "v2");
        add(&mut g, "v3");
        g.add_edge("v1", "v2", "link").unwrap();

        assert!(g.has_edge("v1", "v2", "link"));
        assert!(!g.has_edge("v2", "v1", "link"));
        assert!(!g.has_edge("v1", "v3", "link"));
        assert!(!g.has_edge("v1", "v2", "other"));
        assert!(!g.has_edge("nobody", "v2", "link"));
    }

    #[test]
    fn neighbors_and_predecessors() {
        let mut g = graph();
        for uid in ["v1", "v2", "v3", "v4"] {
            add(&mut g, uid);
        }
        g.add_edge("v1", "v2", "link").unwrap();
        g.add_edge("v1", "v3", "link").unwrap();
        g.add_edge("v1", "v4", "other").unwrap();
        g.add_edge("v2", "v3", "link").unwrap();
        g.add_edge("v4", "v3", "other").unwrap();

        assert_eq!(g.get_neighbors("v1", Some("link")).unwrap(), set(&["v2", "v3"]));
        assert_eq!(g.get_neighbors("v1", Some("other")).unwrap(), set(&["v4"]));
        assert_eq!(g.get_neighbors("v1", None).unwrap(), set(&["v2", "v3", "v4"]));
        assert_eq!(g.get_neighbors("v3", None).unwrap(), set(&[]));
        assert_eq!(g.get_neighbors("v1", Some("missing")).unwrap(), set(&[]));

        assert_eq!(g.get_predecessors("v3", Some("link")).unwrap(), set(&["v1", "v2"]));
        assert_eq!(g.get_predecessors("v3", Some("other")).unwrap(), set(&["v4"]));
        assert_eq!(g.get_predecessors("v3", None).unwrap(), set(&["v1", "v2", "v4"]));
        assert_eq!(g.get_predecessors("v1", None).unwrap(), set(&[]));

        assert!(g.get_neighbors("ghost", None).is_err());
        assert!(g.get_predecessors("ghost", Some("link")).is_err());
    }

    #[test]
    fn neighbors_returns_copy() {
        let mut g = graph();
        add(&mut g, "v1");
        add(&mut g, "v2");
        add(&mut g, "v3");
        g.add_edge("v1", "v2", "link").unwrap();

        let mut neighbors = g.get_neighbors("v1", Some("link")).unwrap();
        neighbors.insert("v3".to_string());

        assert!(!g.has_edge("v1", "v3", "link"));
        assert_eq!(g.get_neighbors("v1", Some("link")).unwrap(), set(&["v2"]));
    }

    #[test]
    fn del_node_removes_all_edges() {
        let mut g = graph();
        let v1 = add(&mut g, "v1");
        let v2 = add(&mut g, "v2");
        let v3 = add(&mut g, "v3");
        g.add_edge(&v1, &v2, "link").unwrap();
        g.add_edge(&v2, &v3, "link").unwrap();
        g.add_edge(&v1, &v3, "other").unwrap();

        let removed = g.del_node(&v2).unwrap();
        assert_eq!(removed.uid(), "v2");

        assert!(!g.has_edge(&v1, &v2, "link"));
        assert!(!g.has_edge(&v2, &v3, "link"));
        assert!(g.has_edge(&v1, &v3, "other"));
        assert!(!g.edges.contains_key("link"));
        assert!(!g.rev_edges.contains_key("link"));
        assert!(!g.contains_node(&v2));
        assert!(g.is_consistent());
    }

    #[test]
    fn del_node_with_self_loop() {
        let mut g = graph();
        add(&mut g, "a");
        add(&mut g, "b");
        g.add_edge("a", "a", "loop").unwrap();
        g.add_edge("b", "a", "loop").unwrap();

        g.del_node("a").unwrap();
        assert_eq!(g.edge_count(), 0);
        assert!(g.edges.is_empty());
        assert!(g.rev_edges.is_empty());
    }

    #[test]
    fn del_missing_node_fails() {
        let mut g = graph();
        let err = g.del_node("ghost").unwrap_err();
        assert_eq!(err.to_string(), "del_node: node 'ghost' does not exist");
    }

    #[test]
    fn deleted_auto_uids_are_not_reused() {
        let mut g = graph();
        let first = g.add_node(None, Attributes::new());
        g.del_node(&first).unwrap();
        let second = g.add_node(None, Attributes::new());
        assert_eq!(first, "node-0");
        assert_eq!(second, "node-1");
    }

    #[test]
    fn circular_dependencies() {
        let mut g = graph();
        add(&mut g, "v1");
        add(&mut g, "v2");
        add(&mut g, "v3");
        g.add_edge("v1", "v2", "next").unwrap();
        g.add_edge("v2", "v3", "next").unwrap();
        g.add_edge("v3", "v1", "next").unwrap();

        assert!(g.get_neighbors("v1", Some("next")).unwrap().contains("v2"));
        assert!(g.get_neighbors("v2", Some("next")).unwrap().contains("v3"));
        assert!(g.get_neighbors("v3", Some("next")).unwrap().contains("v1"));
    }

    #[test]
    fn edges_iterate_in_order() {
        let mut g = graph();
        for uid in ["a", "b", "c"] {
            add(&mut g, uid);
        }
        g.add_edge("b", "c", "x").unwrap();
        g.add_edge("a", "c", "x").unwrap();
        g.add_edge("a", "b", "w").unwrap();

        let edges: Vec<_> = g.edges().collect();
        assert_eq!(edges, vec![("a", "b", "w"), ("a", "c", "x"), ("b", "c", "x")]);
    }

    #[test]
    fn import_node_checks_schema_and_uid() {
        let mut g = graph();
        g.import_node(Node::new("n", attrs([("name", "ok")]))).unwrap();
        assert_eq!(g.progress(), 0);

        assert_eq!(
            g.import_node(Node::new("n", Attributes::new())),
            Err(GraphError::DuplicateNode("n".to_string()))
        );
        assert_eq!(
            g.import_node(Node::new("", Attributes::new())),
            Err(GraphError::DuplicateNode(String::new()))
        );
        assert_eq!(
            g.import_node(Node::new("m", attrs([("value", true)]))),
            Err(GraphError::SchemaViolation {
                uid: "m".to_string(),
                key: "value".to_string(),
            })
        );
    }

    #[test]
    fn add_key_then_use_it() {
        let mut g = graph();
        let uid = g.add_node(None, attrs([("weight", 2.5)]));
        assert!(g.node(&uid).unwrap().get("weight").is_none());

        g.add_key("weight", 0.0).unwrap();
        g.modify_node(&uid, attrs([("weight", 2.5)])).unwrap();
        assert_eq!(g.node(&uid).unwrap().get("weight"), Some(&AttrValue::Float(2.5)));
    }
}

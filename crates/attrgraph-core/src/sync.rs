//! # Shared Store
//!
//! A [`Graph`] behind one whole-store lock.
//!
//! The forward and reverse indices form a single coupled invariant, so there
//! is no finer-grained locking: readers share the lock, every mutation
//! (including auto-uid minting) takes it exclusively.

use crate::graph::{Graph, GraphStore};
use crate::types::{Attributes, GraphResult};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable handle to a graph shared between threads.
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<Graph>>,
}

impl SharedGraph {
    #[must_use]
    pub fn new(graph: Graph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    // Operations validate before mutating, so a poisoned lock still guards a consistent graph.
    fn read_guard(&self) -> RwLockReadGuard<'_, Graph> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, Graph> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` under the shared lock.
    pub fn read<T>(&self, f: impl FnOnce(&Graph) -> T) -> T {
        f(&*self.read_guard())
    }

    /// Run `f` under the exclusive lock.
    pub fn write<T>(&self, f: impl FnOnce(&mut Graph) -> T) -> T {
        f(&mut *self.write_guard())
    }

    /// Independent copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Graph {
        self.read(Graph::clone)
    }

    pub fn add_node(&self, uid: Option<&str>, attributes: Attributes) -> String {
        self.write(|g| g.add_node(uid, attributes))
    }

    pub fn modify_node(&self, uid: &str, attributes: Attributes) -> GraphResult<()> {
        self.write(|g| g.modify_node(uid, attributes))
    }

    pub fn del_node(&self, uid: &str) -> GraphResult<()> {
        self.write(|g| g.del_node(uid).map(|_| ()))
    }

    pub fn add_edge(&self, v1: &str, v2: &str, edge_type: &str) -> GraphResult<()> {
        self.write(|g| g.add_edge(v1, v2, edge_type))
    }

    pub fn del_edge(&self, v1: &str, v2: &str, edge_type: &str) -> bool {
        self.write(|g| g.del_edge(v1, v2, edge_type))
    }

    pub fn next_auto_uid(&self) -> String {
        self.write(Graph::next_auto_uid)
    }

    pub fn has_edge(&self, v1: &str, v2: &str, edge_type: &str) -> bool {
        self.read(|g| g.has_edge(v1, v2, edge_type))
    }
}

impl From<Graph> for SharedGraph {
    fn from(graph: Graph) -> Self {
        Self::new(graph)
    }
}

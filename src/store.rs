use crate::cluster::{ClusterId, LogCluster};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Capacity-bounded owner of every resident cluster, evicting the
/// least-recently-used entry on overflow.
///
/// Only [`ClusterStore::touch`] and insertion refresh recency; `peek`,
/// `peek_mut` and `contains` leave the order alone.
#[derive(Debug)]
pub struct ClusterStore {
    clusters: LruCache<ClusterId, LogCluster>,
}

impl ClusterStore {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            clusters: LruCache::new(cap),
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Inserts `cluster` as most-recently-used and returns the identity it
    /// pushed out, if any.
    pub fn insert(&mut self, cluster: LogCluster) -> Option<ClusterId> {
        let id = cluster.id;
        match self.clusters.push(id, cluster) {
            Some((evicted, _)) if evicted != id => Some(evicted),
            _ => None,
        }
    }

    pub fn contains(&self, id: ClusterId) -> bool {
        self.clusters.contains(&id)
    }

    pub fn peek(&self, id: ClusterId) -> Option<&LogCluster> {
        self.clusters.peek(&id)
    }

    pub fn peek_mut(&mut self, id: ClusterId) -> Option<&mut LogCluster> {
        self.clusters.peek_mut(&id)
    }

    pub fn touch(&mut self, id: ClusterId) -> bool {
        self.clusters.promote(&id);
        self.clusters.contains(&id)
    }

    /// Resident clusters from least- to most-recently-used.
    pub fn iter(&self) -> impl Iterator<Item = &LogCluster> {
        self.clusters.iter().rev().map(|(_, c)| c)
    }
}

use crate::cluster::{ChangeType, ClusterId, LogCluster};
use crate::config::DrainConfig;
use crate::matching::{self, SearchStrategy};
use crate::store::ClusterStore;
use crate::tokenizer::tokenize;
use crate::tree::PrefixTree;
use tracing::{debug, trace, warn};

/// Unlocked clustering engine: prefix tree, bounded store and identity
/// counter. [`crate::miner::TemplateMiner`] wraps it behind a single lock.
#[derive(Debug)]
pub struct Drain {
    pub(crate) similarity: f64,
    pub(crate) max_clusters: usize,
    pub(crate) retain_samples: bool,
    pub(crate) cluster_counter: ClusterId,
    pub(crate) store: ClusterStore,
    pub(crate) tree: PrefixTree,
}

impl Default for Drain {
    fn default() -> Self {
        Self::new(&DrainConfig::default())
    }
}

impl Drain {
    pub fn new(config: &DrainConfig) -> Self {
        let max_clusters = config.effective_max_clusters();
        Self {
            similarity: config.similarity,
            max_clusters,
            retain_samples: config.retain_samples,
            cluster_counter: 0,
            store: ClusterStore::new(max_clusters),
            tree: PrefixTree::new(config.depth, config.max_children),
        }
    }

    pub fn cluster_counter(&self) -> ClusterId {
        self.cluster_counter
    }

    pub fn tree(&self) -> &PrefixTree {
        &self.tree
    }

    pub fn cluster_count(&self) -> usize {
        self.store.len()
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&LogCluster> {
        self.store.peek(id)
    }

    /// Clusters a (masked) message: generalizes the best match or starts a new cluster.
    pub fn add_message(&mut self, message: &str) -> (ClusterId, ChangeType) {
        let tokens = tokenize(message);
        let matched = self.tree.search(&tokens, self.similarity, false, &self.store);
        let Some(id) = matched else {
            return (self.create_cluster(message, tokens), ChangeType::NewCluster);
        };

        let retain = self.retain_samples;
        let Some(cluster) = self.store.peek_mut(id) else {
            return (id, ChangeType::Unchanged);
        };
        if retain && !message.is_empty() {
            cluster.append_sample(message);
        }
        // Recency only moves when the template actually changes.
        match matching::update_template(&tokens, &mut cluster.template_tokens) {
            Ok(true) => {
                trace!(cluster_id = id, template = %cluster.template(), "template generalized");
                self.store.touch(id);
                (id, ChangeType::Updated)
            }
            Ok(false) => (id, ChangeType::Unchanged),
            Err(e) => {
                warn!(cluster_id = id, error = %e, "template update skipped");
                (id, ChangeType::Unchanged)
            }
        }
    }

    fn create_cluster(&mut self, message: &str, tokens: Vec<String>) -> ClusterId {
        self.cluster_counter += 1;
        let id = self.cluster_counter;
        let mut cluster = LogCluster::new(id, tokens.clone());
        if self.retain_samples && !message.is_empty() {
            cluster.append_sample(message);
        }
        if let Some(evicted) = self.store.insert(cluster) {
            debug!(cluster_id = evicted, "cluster evicted");
        }
        self.tree.insert(id, &tokens, &self.store);
        debug!(cluster_id = id, token_count = tokens.len(), "cluster created");
        id
    }

    /// Read-only exact match (similarity 1.0, wildcards count as matches).
    /// Never creates or modifies a cluster and does not refresh recency.
    pub fn match_message(&self, message: &str, strategy: SearchStrategy) -> Option<&LogCluster> {
        let tokens = tokenize(message);
        let id = match strategy {
            SearchStrategy::Always => self.full_search(&tokens),
            SearchStrategy::Fallback => self
                .tree
                .search(&tokens, 1.0, true, &self.store)
                .or_else(|| self.full_search(&tokens)),
            SearchStrategy::Never => self.tree.search(&tokens, 1.0, true, &self.store),
        }?;
        self.store.peek(id)
    }

    fn full_search(&self, tokens: &[String]) -> Option<ClusterId> {
        let candidates = self.tree.clusters_for_len(tokens.len());
        matching::fast_match(&candidates, tokens, 1.0, true, &self.store)
    }

    /// Resident clusters from least- to most-recently-used.
    pub fn clusters(&self) -> impl Iterator<Item = &LogCluster> {
        self.store.iter()
    }

    /// One entry per cluster line and per sample, each newline-terminated
    /// and separated by a blank line.
    pub fn status(&self) -> String {
        let mut entries = Vec::new();
        for cluster in self.store.iter() {
            entries.push(format!("count {}, {}\n", cluster.size(), cluster.template()));
            entries.extend(cluster.samples.iter().map(|sample| format!("\t{sample}\n")));
        }
        format!("cluster count {}\n{}", self.store.len(), entries.join("\n"))
    }
}

use crate::cluster::{ClusterId, WILDCARD};
use crate::matching;
use crate::store::ClusterStore;
use crate::tokenizer::has_digit;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// First level under the root, keyed by token count.
    Length(usize),
    Token,
}

/// Length or token node. Children are keyed by literal token or [`WILDCARD`]
/// and iterate in sorted order.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub(crate) kind: NodeKind,
    pub(crate) children: BTreeMap<String, TreeNode>,
    pub(crate) clusters: Vec<ClusterId>,
}

impl TreeNode {
    pub fn length(len: usize) -> Self {
        Self {
            kind: NodeKind::Length(len),
            children: BTreeMap::new(),
            clusters: Vec::new(),
        }
    }

    pub fn token() -> Self {
        Self {
            kind: NodeKind::Token,
            children: BTreeMap::new(),
            clusters: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn child(&self, token: &str) -> Option<&TreeNode> {
        self.children.get(token)
    }

    pub fn children(&self) -> &BTreeMap<String, TreeNode> {
        &self.children
    }

    /// Attached identities, possibly including evicted ones.
    pub fn clusters(&self) -> &[ClusterId] {
        &self.clusters
    }

    fn lookup_child(&self, token: &str) -> Option<&TreeNode> {
        self.children.get(token).or_else(|| self.children.get(WILDCARD))
    }

    /// Picks (creating if absent) the child a new template token descends into.
    /// Tokens carrying digits always share the wildcard child; otherwise a
    /// literal child is created while fan-out allows, the last free slot being
    /// reserved for the wildcard child.
    fn child_for_insert(&mut self, token: &str, max_children: usize) -> &mut TreeNode {
        let key = if self.children.contains_key(token) {
            token
        } else if has_digit(token) {
            WILDCARD
        } else if self.children.contains_key(WILDCARD) {
            if self.children.len() < max_children {
                token
            } else {
                WILDCARD
            }
        } else if self.children.len() + 1 < max_children {
            token
        } else {
            WILDCARD
        };
        self.children.entry(key.to_string()).or_insert_with(TreeNode::token)
    }
}

/// Depth- and fan-out-bounded prefix tree over token sequences. The root
/// dispatches on token count; leaves hold cluster identities owned by the
/// [`ClusterStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixTree {
    max_depth: usize,
    max_children: usize,
    pub(crate) lengths: BTreeMap<usize, TreeNode>,
}

impl PrefixTree {
    pub fn new(max_depth: usize, max_children: usize) -> Self {
        Self {
            max_depth,
            max_children,
            lengths: BTreeMap::new(),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn max_children(&self) -> usize {
        self.max_children
    }

    /// Depth at which a walk stops, counting the length node as depth 1.
    fn max_node_depth(&self) -> usize {
        self.max_depth.saturating_sub(2)
    }

    pub fn length_node(&self, len: usize) -> Option<&TreeNode> {
        self.lengths.get(&len)
    }

    pub fn lengths(&self) -> &BTreeMap<usize, TreeNode> {
        &self.lengths
    }

    /// Attaches `id` (template `tokens`) to its leaf, dropping identities
    /// no longer resident in `store` from that leaf.
    pub fn insert(&mut self, id: ClusterId, tokens: &[String], store: &ClusterStore) {
        let token_count = tokens.len();
        let max_node_depth = self.max_node_depth();
        let max_children = self.max_children;
        let mut node = self
            .lengths
            .entry(token_count)
            .or_insert_with(|| TreeNode::length(token_count));
        let mut depth = 1;
        for token in tokens {
            if depth >= max_node_depth || depth >= token_count {
                break;
            }
            node = node.child_for_insert(token, max_children);
            depth += 1;
        }
        node.clusters.retain(|c| store.contains(*c));
        node.clusters.push(id);
    }

    /// Leaf reached by `tokens`, following the wildcard child where no
    /// literal child exists.
    pub fn leaf(&self, tokens: &[String]) -> Option<&TreeNode> {
        let token_count = tokens.len();
        let max_node_depth = self.max_node_depth();
        let mut node = self.lengths.get(&token_count)?;
        let mut depth = 1;
        for token in tokens {
            if depth >= max_node_depth || depth >= token_count {
                break;
            }
            node = node.lookup_child(token)?;
            depth += 1;
        }
        Some(node)
    }

    pub fn search(
        &self,
        tokens: &[String],
        required_similarity: f64,
        include_wildcards: bool,
        store: &ClusterStore,
    ) -> Option<ClusterId> {
        let leaf = self.leaf(tokens)?;
        matching::fast_match(&leaf.clusters, tokens, required_similarity, include_wildcards, store)
    }

    /// Every identity attached anywhere under the length node for `len`,
    /// in a deterministic depth-first order.
    pub fn clusters_for_len(&self, len: usize) -> Vec<ClusterId> {
        let Some(root) = self.lengths.get(&len) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            out.extend_from_slice(&node.clusters);
            stack.extend(node.children.values().rev());
        }
        out
    }
}

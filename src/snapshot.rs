//! Language-neutral encoding of a [`Drain`] engine.
//!
//! Field names are fixed for compatibility with other implementations:
//! `maxDepth`, `similarityThreshold`, `maxChildren`, `maxClusters`,
//! `clusterCounter`, `clusters[{id, templateTokens}]` and a recursive
//! `rootNode`. Clusters are listed least- to most-recently-used so a restore
//! reproduces the eviction order.

use crate::cluster::{ClusterId, LogCluster};
use crate::config::{similarity_in_range, MaskConfig};
use crate::drain::Drain;
use crate::error::{MinerError, Result};
use crate::store::ClusterStore;
use crate::tree::{NodeKind, PrefixTree, TreeNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub max_depth: usize,
    pub similarity_threshold: f64,
    pub max_children: usize,
    pub max_clusters: usize,
    pub cluster_counter: ClusterId,
    pub clusters: Vec<ClusterSnapshot>,
    pub root_node: NodeSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masking: Option<MaskConfig>,
    #[serde(default = "default_retain_samples")]
    pub retain_samples: bool,
}

fn default_retain_samples() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    pub id: ClusterId,
    pub template_tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Root,
    Length,
    Token,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub node_type: NodeType,
    #[serde(default)]
    pub length: usize,
    #[serde(default)]
    pub token_children: BTreeMap<String, NodeSnapshot>,
    #[serde(default)]
    pub length_children: BTreeMap<usize, NodeSnapshot>,
    #[serde(default)]
    pub clusters: Vec<ClusterId>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl From<&LogCluster> for ClusterSnapshot {
    fn from(c: &LogCluster) -> Self {
        Self {
            id: c.id,
            template_tokens: c.template_tokens.clone(),
            samples: c.samples.clone(),
        }
    }
}

impl From<ClusterSnapshot> for LogCluster {
    fn from(c: ClusterSnapshot) -> Self {
        Self {
            id: c.id,
            template_tokens: c.template_tokens,
            samples: c.samples,
        }
    }
}

fn node_to_snapshot(node: &TreeNode) -> NodeSnapshot {
    let (node_type, length) = match node.kind {
        NodeKind::Length(len) => (NodeType::Length, len),
        NodeKind::Token => (NodeType::Token, 0),
    };
    NodeSnapshot {
        node_type,
        length,
        token_children: node
            .children
            .iter()
            .map(|(token, child)| (token.clone(), node_to_snapshot(child)))
            .collect(),
        length_children: BTreeMap::new(),
        clusters: node.clusters.clone(),
    }
}

fn node_from_snapshot(node: NodeSnapshot, expected: NodeType) -> Result<TreeNode> {
    if node.node_type != expected {
        return Err(MinerError::InvalidSnapshot(format!(
            "expected {:?} node, found {:?}",
            expected, node.node_type
        )));
    }
    if !node.length_children.is_empty() {
        return Err(MinerError::InvalidSnapshot(format!(
            "{:?} node cannot have length children",
            node.node_type
        )));
    }
    let kind = match expected {
        NodeType::Length => NodeKind::Length(node.length),
        _ => NodeKind::Token,
    };
    let children = node
        .token_children
        .into_iter()
        .map(|(token, child)| -> Result<(String, TreeNode)> {
            Ok((token, node_from_snapshot(child, NodeType::Token)?))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;
    Ok(TreeNode {
        kind,
        children,
        clusters: node.clusters,
    })
}

impl Drain {
    pub fn to_snapshot(&self) -> Snapshot {
        let root_node = NodeSnapshot {
            node_type: NodeType::Root,
            length: 0,
            token_children: BTreeMap::new(),
            length_children: self
                .tree
                .lengths
                .iter()
                .map(|(len, node)| (*len, node_to_snapshot(node)))
                .collect(),
            clusters: Vec::new(),
        };
        Snapshot {
            max_depth: self.tree.max_depth(),
            similarity_threshold: self.similarity,
            max_children: self.tree.max_children(),
            max_clusters: self.max_clusters,
            cluster_counter: self.cluster_counter,
            clusters: self.store.iter().map(ClusterSnapshot::from).collect(),
            root_node,
            masking: None,
            retain_samples: self.retain_samples,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        if !similarity_in_range(snapshot.similarity_threshold) {
            return Err(MinerError::InvalidSnapshot(format!(
                "similarity threshold {} outside [0, 1]",
                snapshot.similarity_threshold
            )));
        }
        let root = snapshot.root_node;
        if root.node_type != NodeType::Root {
            return Err(MinerError::InvalidSnapshot(format!(
                "root node has type {:?}",
                root.node_type
            )));
        }
        if !root.token_children.is_empty() || !root.clusters.is_empty() {
            return Err(MinerError::InvalidSnapshot(
                "root node may only hold length children".into(),
            ));
        }
        let mut tree = PrefixTree::new(snapshot.max_depth, snapshot.max_children);
        for (len, node) in root.length_children {
            if node.length != len {
                return Err(MinerError::InvalidSnapshot(format!(
                    "length node keyed {len} declares length {}",
                    node.length
                )));
            }
            tree.lengths.insert(len, node_from_snapshot(node, NodeType::Length)?);
        }

        let max_clusters = if snapshot.max_clusters > 0 {
            snapshot.max_clusters
        } else {
            crate::config::DEFAULT_MAX_CLUSTERS
        };
        let mut store = ClusterStore::new(max_clusters);
        for cluster in snapshot.clusters {
            if cluster.id > snapshot.cluster_counter {
                return Err(MinerError::InvalidSnapshot(format!(
                    "cluster id {} exceeds counter {}",
                    cluster.id, snapshot.cluster_counter
                )));
            }
            store.insert(cluster.into());
        }

        Ok(Self {
            similarity: snapshot.similarity_threshold,
            max_clusters,
            retain_samples: snapshot.retain_samples,
            cluster_counter: snapshot.cluster_counter,
            store,
            tree,
        })
    }
}

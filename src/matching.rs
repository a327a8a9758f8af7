use crate::cluster::{ClusterId, WILDCARD};
use crate::error::{MinerError, Result};
use crate::store::ClusterStore;
use serde::{Deserialize, Serialize};

/// How exhaustively a read-only match explores clusters of the same token count.
///
/// `Never` walks the tree once and can miss a match the tree routed elsewhere.
/// `Fallback` scans every cluster of that length only when the tree finds nothing.
/// `Always` skips the tree and picks the best cluster among all of that length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    #[default]
    Never,
    Fallback,
    Always,
}

impl std::str::FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "never" | "tree" => Ok(Self::Never),
            "fallback" => Ok(Self::Fallback),
            "always" | "full" => Ok(Self::Always),
            other => Err(format!("unknown search strategy: {other}")),
        }
    }
}

/// Similarity of `tokens` against `template` plus the template's wildcard count.
///
/// Wildcard positions never count as equal literals; with `include_wildcards`
/// they are added to the score instead.
pub fn seq_distance(template: &[String], tokens: &[String], include_wildcards: bool) -> Result<(f64, usize)> {
    if template.len() != tokens.len() {
        return Err(MinerError::Internal(format!(
            "template length {} not equal to token length {}",
            template.len(),
            tokens.len()
        )));
    }
    if template.is_empty() {
        return Ok((1.0, 0));
    }
    let mut same = 0usize;
    let mut wildcards = 0usize;
    for (t, token) in template.iter().zip(tokens) {
        if t == WILDCARD {
            wildcards += 1;
        } else if t == token {
            same += 1;
        }
    }
    if include_wildcards {
        same += wildcards;
    }
    Ok((same as f64 / template.len() as f64, wildcards))
}

/// Best resident candidate by similarity, ties broken by more wildcards,
/// earliest candidate winning a full tie.
pub fn fast_match(
    candidates: &[ClusterId],
    tokens: &[String],
    required_similarity: f64,
    include_wildcards: bool,
    store: &ClusterStore,
) -> Option<ClusterId> {
    let mut best: Option<(ClusterId, f64, usize)> = None;
    for &id in candidates {
        let Some(cluster) = store.peek(id) else {
            continue;
        };
        let Ok((sim, wildcards)) = seq_distance(&cluster.template_tokens, tokens, include_wildcards) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((_, best_sim, best_wildcards)) => {
                sim > best_sim || (sim == best_sim && wildcards > best_wildcards)
            }
        };
        if better {
            best = Some((id, sim, wildcards));
        }
    }
    match best {
        Some((id, sim, _)) if sim >= required_similarity => Some(id),
        _ => None,
    }
}

/// Generalizes `template` in place against `tokens`; returns whether any
/// position turned into a wildcard.
pub fn update_template(tokens: &[String], template: &mut [String]) -> Result<bool> {
    if tokens.len() != template.len() {
        return Err(MinerError::Internal(format!(
            "token length {} not equal to template length {}",
            tokens.len(),
            template.len()
        )));
    }
    let mut updated = false;
    for (slot, token) in template.iter_mut().zip(tokens) {
        if *slot != *token && slot.as_str() != WILDCARD {
            *slot = WILDCARD.to_string();
            updated = true;
        }
    }
    Ok(updated)
}

use crate::cluster::{ClusterId, LogCluster};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    New,
    Increase,
    Equal,
    Decrease,
}

/// Drift of one current cluster against the baseline cluster sharing its template text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterDiff {
    pub delta: i64,
    pub rate: f64,
    pub kind: DiffKind,
}

/// Compares clusters by template text. Baseline templates seen more than once
/// resolve to the last occurrence. A baseline with no samples cannot yield a
/// rate, so its counterpart is reported as `New`.
pub fn diff_clusters<'a, 'b>(
    current: impl IntoIterator<Item = &'a LogCluster>,
    baseline: impl IntoIterator<Item = &'b LogCluster>,
) -> BTreeMap<ClusterId, ClusterDiff> {
    let index: AHashMap<String, usize> = baseline.into_iter().map(|c| (c.template(), c.size())).collect();

    current
        .into_iter()
        .map(|cluster| {
            let count = cluster.size() as i64;
            let diff = match index.get(&cluster.template()) {
                Some(&base) if base > 0 => {
                    let delta = count - base as i64;
                    let kind = match delta {
                        d if d > 0 => DiffKind::Increase,
                        0 => DiffKind::Equal,
                        _ => DiffKind::Decrease,
                    };
                    ClusterDiff {
                        delta,
                        rate: delta as f64 / base as f64,
                        kind,
                    }
                }
                _ => ClusterDiff {
                    delta: count,
                    rate: 0.0,
                    kind: DiffKind::New,
                },
            };
            (cluster.id, diff)
        })
        .collect()
}

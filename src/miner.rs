use crate::cluster::{ChangeType, ClusterId, LogCluster};
use crate::config::{DrainConfig, MaskConfig, MinerConfig};
use crate::diff::{self, ClusterDiff};
use crate::drain::Drain;
use crate::error::Result;
use crate::masking::{LogMasker, Masker};
use crate::matching::SearchStrategy;
use crate::persistence::PersistenceHandler;
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddOutcome {
    pub change_type: ChangeType,
    pub cluster_id: ClusterId,
    pub template: String,
    pub cluster_count: usize,
}

/// Masks, tokenizes and clusters log lines. One lock guards the whole engine;
/// every public operation holds it for its full duration and never does I/O
/// under it.
pub struct TemplateMiner {
    drain: Mutex<Drain>,
    masker: Box<dyn Masker + Send + Sync>,
    mask_config: Option<MaskConfig>,
}

impl std::fmt::Debug for TemplateMiner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateMiner")
            .field("drain", &self.drain)
            .field("mask_config", &self.mask_config)
            .finish_non_exhaustive()
    }
}

impl TemplateMiner {
    pub fn new(config: &MinerConfig) -> Result<Self> {
        config.drain.validate()?;
        let masker = LogMasker::from_config(&config.mask)?;
        let mask_config = masker.to_config();
        Ok(Self {
            drain: Mutex::new(Drain::new(&config.drain)),
            masker: Box::new(masker),
            mask_config: Some(mask_config),
        })
    }

    /// Uses a caller-supplied masker; snapshots of such a miner carry no masking rules.
    pub fn with_masker(config: &DrainConfig, masker: impl Masker + Send + Sync + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            drain: Mutex::new(Drain::new(config)),
            masker: Box::new(masker),
            mask_config: None,
        })
    }

    /// Restores a miner, masking with the snapshot's rules. A snapshot taken
    /// from a miner with a custom masker carries no rules and restores
    /// unmasked; use [`TemplateMiner::from_snapshot_with_masker`] for those.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let mask_config = snapshot.masking.clone().unwrap_or_default();
        let masker = LogMasker::from_config(&mask_config)?;
        Ok(Self {
            drain: Mutex::new(Drain::from_snapshot(snapshot)?),
            masker: Box::new(masker),
            mask_config: Some(mask_config),
        })
    }

    /// Restores a miner around a caller-supplied masker, ignoring any masking
    /// rules stored in the snapshot.
    pub fn from_snapshot_with_masker(
        snapshot: Snapshot,
        masker: impl Masker + Send + Sync + 'static,
    ) -> Result<Self> {
        Ok(Self {
            drain: Mutex::new(Drain::from_snapshot(snapshot)?),
            masker: Box::new(masker),
            mask_config: None,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Drain> {
        self.drain.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_message(&self, raw: &str) -> AddOutcome {
        let masked = self.masker.mask(raw);
        let mut drain = self.lock();
        let (cluster_id, change_type) = drain.add_message(&masked);
        let template = drain.cluster(cluster_id).map(LogCluster::template).unwrap_or_default();
        AddOutcome {
            change_type,
            cluster_id,
            template,
            cluster_count: drain.cluster_count(),
        }
    }

    pub fn match_message(&self, raw: &str, strategy: SearchStrategy) -> Option<LogCluster> {
        let masked = self.masker.mask(raw);
        self.lock().match_message(&masked, strategy).cloned()
    }

    pub fn cluster_count(&self) -> usize {
        self.lock().cluster_count()
    }

    /// Resident clusters from least- to most-recently-used.
    pub fn clusters(&self) -> Vec<LogCluster> {
        self.lock().clusters().cloned().collect()
    }

    pub fn status(&self) -> String {
        self.lock().status()
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = self.lock().to_snapshot();
        snapshot.masking = self.mask_config.clone();
        snapshot
    }

    /// Drift of every resident cluster against a baseline snapshot.
    pub fn diff(&self, baseline: &Snapshot) -> BTreeMap<ClusterId, ClusterDiff> {
        let baseline: Vec<LogCluster> = baseline.clusters.iter().cloned().map(LogCluster::from).collect();
        let drain = self.lock();
        diff::diff_clusters(drain.clusters(), &baseline)
    }

    /// Drift against another live miner. The two locks are never held together.
    pub fn diff_against(&self, baseline: &TemplateMiner) -> BTreeMap<ClusterId, ClusterDiff> {
        let baseline = baseline.clusters();
        let drain = self.lock();
        diff::diff_clusters(drain.clusters(), &baseline)
    }

    pub fn save(&self, handler: &dyn PersistenceHandler) -> Result<()> {
        let snapshot = self.snapshot();
        handler.save(&snapshot)
    }

    pub fn load(handler: &dyn PersistenceHandler) -> Result<Self> {
        Self::from_snapshot(handler.load()?)
    }
}

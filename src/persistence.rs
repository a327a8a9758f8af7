use crate::error::Result;
use crate::snapshot::Snapshot;
use std::fs;
use std::path::PathBuf;

/// External store for engine snapshots. Retries and backoff are the
/// implementation's business.
pub trait PersistenceHandler {
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
    fn load(&self) -> Result<Snapshot>;
}

/// Keeps one snapshot as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PersistenceHandler for FilePersistence {
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let body = serde_json::to_vec(snapshot)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Snapshot> {
        let body = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

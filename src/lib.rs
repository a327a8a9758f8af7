pub mod error;
pub mod config;
pub mod tokenizer;
pub mod masking;
pub mod cluster;
pub mod store;
pub mod matching;
pub mod tree;
pub mod drain;
pub mod diff;
pub mod snapshot;
pub mod persistence;
pub mod miner;

pub use cluster::{ChangeType, ClusterId, LogCluster, WILDCARD};
pub use config::{DrainConfig, MaskConfig, MaskInstruction, MinerConfig};
pub use diff::{ClusterDiff, DiffKind};
pub use drain::Drain;
pub use error::MinerError;
pub use masking::{LogMasker, Masker};
pub use matching::SearchStrategy;
pub use miner::{AddOutcome, TemplateMiner};
pub use persistence::{FilePersistence, PersistenceHandler};
pub use snapshot::Snapshot;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinerError {
    #[error("compile mask pattern error for {name:?}: {source}")]
    MaskPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("persistence io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MinerError>;

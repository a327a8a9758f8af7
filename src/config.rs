use crate::error::{MinerError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DEPTH: usize = 4;
pub const DEFAULT_SIMILARITY: f64 = 0.4;
pub const DEFAULT_MAX_CHILDREN: usize = 100;
pub const DEFAULT_MAX_CLUSTERS: usize = 1000;
pub const DEFAULT_MASK_PREFIX: &str = "[:";
pub const DEFAULT_MASK_SUFFIX: &str = ":]";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrainConfig {
    /// Tree depth including the root and length levels; token levels are `depth - 2`.
    pub depth: usize,
    pub similarity: f64,
    pub max_children: usize,
    /// Zero falls back to [`DEFAULT_MAX_CLUSTERS`].
    pub max_clusters: usize,
    pub retain_samples: bool,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_MAX_DEPTH,
            similarity: DEFAULT_SIMILARITY,
            max_children: DEFAULT_MAX_CHILDREN,
            max_clusters: DEFAULT_MAX_CLUSTERS,
            retain_samples: true,
        }
    }
}

impl DrainConfig {
    pub fn effective_max_clusters(&self) -> usize {
        if self.max_clusters > 0 {
            self.max_clusters
        } else {
            DEFAULT_MAX_CLUSTERS
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !similarity_in_range(self.similarity) {
            return Err(MinerError::InvalidConfig(format!(
                "similarity must be within [0, 1], got {}",
                self.similarity
            )));
        }
        Ok(())
    }
}

pub(crate) fn similarity_in_range(similarity: f64) -> bool {
    similarity.is_finite() && (0.0..=1.0).contains(&similarity)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskInstruction {
    pub pattern: String,
    pub mask_with: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    pub prefix: String,
    pub suffix: String,
    pub instructions: Vec<MaskInstruction>,
    /// Prepend the built-in rule set (timestamps, addresses, numbers, ...).
    pub builtin_rules: bool,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_MASK_PREFIX.to_string(),
            suffix: DEFAULT_MASK_SUFFIX.to_string(),
            instructions: Vec::new(),
            builtin_rules: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    pub drain: DrainConfig,
    pub mask: MaskConfig,
}

impl MinerConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: MinerConfig = serde_json::from_str(s)?;
        config.drain.validate()?;
        Ok(config)
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.drain.depth = depth;
        self
    }

    pub fn with_similarity(mut self, similarity: f64) -> Self {
        self.drain.similarity = similarity;
        self
    }

    pub fn with_max_children(mut self, max_children: usize) -> Self {
        self.drain.max_children = max_children;
        self
    }

    pub fn with_max_clusters(mut self, max_clusters: usize) -> Self {
        self.drain.max_clusters = max_clusters;
        self
    }

    pub fn with_retain_samples(mut self, retain: bool) -> Self {
        self.drain.retain_samples = retain;
        self
    }

    pub fn with_mask_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mask.prefix = prefix.into();
        self
    }

    pub fn with_mask_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.mask.suffix = suffix.into();
        self
    }

    pub fn with_mask_instruction(mut self, pattern: impl Into<String>, mask_with: impl Into<String>) -> Self {
        self.mask.instructions.push(MaskInstruction {
            pattern: pattern.into(),
            mask_with: mask_with.into(),
        });
        self
    }

    pub fn with_builtin_masks(mut self) -> Self {
        self.mask.builtin_rules = true;
        self
    }
}

use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const WILDCARD: &str = "[*]";

pub type ClusterId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogCluster {
    pub id: ClusterId,
    pub template_tokens: Vec<String>,
    pub samples: Vec<String>,
}

impl LogCluster {
    pub fn new(id: ClusterId, template_tokens: Vec<String>) -> Self {
        Self {
            id,
            template_tokens,
            samples: Vec::new(),
        }
    }

    pub fn template(&self) -> String {
        self.template_tokens.iter().join(" ")
    }

    pub fn size(&self) -> usize {
        self.samples.len()
    }

    pub fn append_sample(&mut self, line: &str) {
        self.samples.push(line.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    NewCluster,
    Updated,
    Unchanged,
}

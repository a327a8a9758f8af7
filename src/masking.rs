use crate::config::{MaskConfig, MaskInstruction};
use crate::error::{MinerError, Result};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

/// Pre-tokenization rewrite applied to every raw line.
pub trait Masker {
    fn mask(&self, raw: &str) -> String;
}

/// Leaves lines untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMasker;

impl Masker for NoopMasker {
    fn mask(&self, raw: &str) -> String {
        raw.to_string()
    }
}

// Order matters: timestamps, URLs and addresses before the bare numbers they contain.
static BUILTIN_RULES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    let rules: [(&str, &str); 11] = [
        (
            "TIMESTAMP",
            r"\b\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d{1,9})?(?:Z|[+-](?:\d{2}(?::?\d{2})?|\d{4}))\b",
        ),
        ("URL", r#"\b[a-zA-Z][a-zA-Z0-9+.-]*://[^\s"']+\b"#),
        ("IPV6", r"\b(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}\b"),
        (
            "IPV4",
            r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\b",
        ),
        ("EMAIL", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
        (
            "UUID",
            r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b",
        ),
        ("PATH", r"(?:/[\w.\-]+(?:/[\w.\-]+)+|\./[\w.\-]+(?:/[\w.\-]+)*|~/[\w.\-]+(?:/[\w.\-]+)*)"),
        ("HEX", r"\b[0-9a-fA-F]{16,}\b"),
        ("B64", r"\b[A-Za-z0-9+/]{16,}={0,2}\b"),
        ("FLOAT", r"\b-?\d+\.\d+\b"),
        ("NUM", r"\b-?\d+\b"),
    ];
    rules
        .into_iter()
        .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
        .collect()
});

#[derive(Debug, Clone)]
struct Instruction {
    name: String,
    pattern: String,
    re: Regex,
}

/// Regex masker applying named rules in insertion order.
#[derive(Debug, Clone)]
pub struct LogMasker {
    prefix: String,
    suffix: String,
    instructions: Vec<Instruction>,
}

impl LogMasker {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            instructions: Vec::new(),
        }
    }

    pub fn from_config(config: &MaskConfig) -> Result<Self> {
        let mut masker = Self::new(config.prefix.clone(), config.suffix.clone());
        if config.builtin_rules {
            for (name, re) in BUILTIN_RULES.iter() {
                masker.upsert(Instruction {
                    name: name.to_string(),
                    pattern: re.as_str().to_string(),
                    re: re.clone(),
                });
            }
        }
        for ins in &config.instructions {
            masker.add_instruction(&ins.mask_with, &ins.pattern)?;
        }
        Ok(masker)
    }

    /// Adds a rule, replacing any rule already registered under `name`
    /// without changing its position.
    pub fn add_instruction(&mut self, name: &str, pattern: &str) -> Result<()> {
        let re = Regex::new(pattern).map_err(|source| MinerError::MaskPattern {
            name: name.to_string(),
            source,
        })?;
        self.upsert(Instruction {
            name: name.to_string(),
            pattern: pattern.to_string(),
            re,
        });
        Ok(())
    }

    fn upsert(&mut self, ins: Instruction) {
        match self.instructions.iter_mut().find(|i| i.name == ins.name) {
            Some(existing) => *existing = ins,
            None => self.instructions.push(ins),
        }
    }

    pub fn mask_names(&self) -> Vec<&str> {
        self.instructions.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn instructions(&self) -> Vec<MaskInstruction> {
        self.instructions
            .iter()
            .map(|i| MaskInstruction {
                pattern: i.pattern.clone(),
                mask_with: i.name.clone(),
            })
            .collect()
    }

    pub fn to_config(&self) -> MaskConfig {
        MaskConfig {
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            instructions: self.instructions(),
            builtin_rules: false,
        }
    }
}

impl Masker for LogMasker {
    fn mask(&self, raw: &str) -> String {
        let mut out = raw.to_string();
        for ins in &self.instructions {
            let replacement = format!("{}{}{}", self.prefix, ins.name, self.suffix);
            out = ins.re.replace_all(&out, NoExpand(&replacement)).into_owned();
        }
        out
    }
}

//! Chromosome labels.
//!
//! Labels are uppercased and a `CHR` prefix is stripped before anything
//! else, so `chr23` and `23` are the same chromosome. The X aliases (`X`,
//! `23`) collapse to `X`. Y and mitochondrial labels are rejected: only
//! autosomes and X are supported.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::error::{PruneError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Chromosome(String);

const UNSUPPORTED: &[&str] = &["Y", "24", "M", "MT", "25", "26"];

impl Chromosome {
    /// Normalize a raw label. `source_name`/`line` locate the label for
    /// error reporting.
    pub fn parse_at(label: &str, source_name: &str, line: usize) -> Result<Self> {
        let upper = label.trim().to_ascii_uppercase();
        let stripped = upper.strip_prefix("CHR").unwrap_or(&upper);
        if stripped.is_empty() {
            return Err(PruneError::parse(
                source_name,
                line,
                format!("invalid chromosome: '{}'", label),
            ));
        }
        if UNSUPPORTED.contains(&stripped) {
            return Err(PruneError::parse(
                source_name,
                line,
                format!("unsupported chromosome: {}", label),
            ));
        }
        if stripped == "X" || stripped == "23" {
            return Ok(Chromosome("X".to_string()));
        }
        Ok(Chromosome(stripped.to_string()))
    }

    pub fn parse(label: &str) -> Result<Self> {
        Self::parse_at(label, "chromosome", 0)
    }

    pub fn is_x(&self) -> bool {
        self.0 == "X"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Numeric labels first in numeric order, then the rest lexically.
impl Ord for Chromosome {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Chromosome {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

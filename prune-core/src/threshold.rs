//! p-value keyed threshold tables and metric weights.
//!
//! Both tables are kept sorted by ascending p-value boundary so lookups
//! return the tightest bracket that covers a locus.

use serde::Serialize;

/// r² threshold per p-value bracket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct R2Thresholds {
    entries: Vec<(f64, f64)>,
}

impl R2Thresholds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `(p boundary, r²)` bracket.
    pub fn add(&mut self, p_value: f64, r2: f64) {
        let at = self.entries.partition_point(|&(p, _)| p <= p_value);
        self.entries.insert(at, (p_value, r2));
    }

    /// Threshold of the first bracket with `p_value <= boundary`.
    pub fn lookup(&self, p_value: f64) -> Option<f64> {
        self.entries
            .iter()
            .find(|&&(boundary, _)| p_value <= boundary)
            .map(|&(_, r2)| r2)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(f64, f64)] {
        &self.entries
    }
}

/// Number of surrogates per p-value bracket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SurrogateThresholds {
    entries: Vec<(f64, usize)>,
}

impl SurrogateThresholds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, p_value: f64, count: usize) {
        let at = self.entries.partition_point(|&(p, _)| p <= p_value);
        self.entries.insert(at, (p_value, count));
    }

    /// Count of the first bracket with `p_value < boundary`, else zero.
    pub fn lookup(&self, p_value: f64) -> usize {
        self.entries
            .iter()
            .find(|&&(boundary, _)| p_value < boundary)
            .map_or(0, |&(_, n)| n)
    }

    pub fn entries(&self) -> &[(f64, usize)] {
        &self.entries
    }
}

/// A named column of the SNP table used to rank surrogate candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub weight: f64,
}

impl Metric {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

//! Run configuration, built once and shared by reference.

use serde::Serialize;

use crate::chrom::Chromosome;
use crate::error::{PruneError, Result};
use crate::threshold::{Metric, R2Thresholds, SurrogateThresholds};

/// Metric name reserved for the built-in design score column.
pub const RESERVED_METRIC: &str = "design_score";

/// Configuration for a pruning run.
#[derive(Debug, Clone, Serialize)]
pub struct PruneConfig {
    /// Half-width of the window around each index SNP, in base pairs.
    pub max_distance: u64,
    /// Minimum minor allele frequency.
    pub min_maf: f64,
    /// Minimum fraction of non-missing calls.
    pub min_call_rate: f64,
    /// Minimum design score for index and surrogate SNPs.
    pub min_design_score: f64,
    /// Weighted metrics used to rank surrogate candidates.
    pub metrics: Vec<Metric>,
    pub r2_thresholds: R2Thresholds,
    pub surrogate_thresholds: SurrogateThresholds,
    /// Restrict the run to one chromosome.
    pub chromosome: Option<Chromosome>,
    /// Visit force-included SNPs before all others.
    pub force_include_first: bool,
    /// Pick surrogates for force-included index SNPs.
    pub surrogates_for_force_included: bool,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            max_distance: 500_000,
            min_maf: 0.0,
            min_call_rate: 0.1,
            min_design_score: 0.0,
            metrics: Vec::new(),
            r2_thresholds: R2Thresholds::new(),
            surrogate_thresholds: SurrogateThresholds::new(),
            chromosome: None,
            force_include_first: true,
            surrogates_for_force_included: true,
        }
    }
}

impl PruneConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=0.5).contains(&self.min_maf) {
            return Err(PruneError::config(format!(
                "minimum MAF must be between 0 and 0.5, got {}",
                self.min_maf
            )));
        }
        if !(0.0..=1.0).contains(&self.min_call_rate) {
            return Err(PruneError::config(format!(
                "minimum SNP call rate must be between 0 and 1, got {}",
                self.min_call_rate
            )));
        }
        if self.r2_thresholds.is_empty() {
            return Err(PruneError::config("at least one r^2 threshold is required"));
        }
        for &(p, r2) in self.r2_thresholds.entries() {
            if !(0.0..=1.0).contains(&p) || !(0.0..=1.0).contains(&r2) {
                return Err(PruneError::config(format!(
                    "r^2 threshold ({}, {}) is outside [0, 1]",
                    p, r2
                )));
            }
        }
        for &(p, _) in self.surrogate_thresholds.entries() {
            if !(0.0..=1.0).contains(&p) {
                return Err(PruneError::config(format!(
                    "surrogate threshold p-value {} is outside [0, 1]",
                    p
                )));
            }
        }
        for (i, metric) in self.metrics.iter().enumerate() {
            if metric.name.eq_ignore_ascii_case(RESERVED_METRIC) {
                return Err(PruneError::config(format!(
                    "'{}' cannot be used as a metric name",
                    RESERVED_METRIC
                )));
            }
            if !(metric.weight >= 0.0) {
                return Err(PruneError::config(format!(
                    "weight of metric '{}' must be non-negative, got {}",
                    metric.name, metric.weight
                )));
            }
            if self.metrics[..i].iter().any(|m| m.name == metric.name) {
                return Err(PruneError::config(format!(
                    "metric '{}' is specified more than once",
                    metric.name
                )));
            }
        }
        Ok(())
    }

    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name.as_str()).collect()
    }
}

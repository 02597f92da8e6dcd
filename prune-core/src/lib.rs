//! prune-core: LD estimation and greedy tag-SNP selection.
//!
//! Implements the compressed genotype store, per-locus allele statistics,
//! the two-locus EM haplotype estimator (r² and D′), the windowed
//! candidate finder and the priority-ordered greedy pruner.

pub mod chrom;
pub mod config;
pub mod error;
pub mod genotype;
pub mod ld;
pub mod locus;
pub mod panel;
pub mod priority;
pub mod pruner;
pub mod sample;
pub mod stats;
pub mod threshold;
pub mod window;

pub use error::{PruneError, Result};

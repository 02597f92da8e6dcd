//! prune-geno: PLINK transposed-format readers and result writers.
//!
//! Reads the candidate SNP table, `.tfam` founders, keep/remove sample
//! lists and `.tped` genotypes into the types `prune-core` operates on,
//! and writes the `.results` and `.ld` tables.

pub mod output;
pub mod sample_list;
pub mod snp_table;
pub mod tfam;
pub mod tped;

//! Error taxonomy shared by every stage of a pruning run.
//!
//! All variants are fatal to the run; the expected per-candidate skips of
//! the pruner are ordinary control flow and never surface here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PruneError {
    /// Malformed input row, column or value.
    #[error("{source_name}, line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    /// Inconsistent or incomplete options.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid genotype: {genotype} found for locus {locus}")]
    InvalidGenotype { locus: String, genotype: String },

    #[error("SNP {name} (chr {chrom}, position {pos}) was not found in the genotype data")]
    LocusNotGenotyped {
        name: String,
        chrom: String,
        pos: u64,
    },

    /// Broken internal invariant. Indicates a bug.
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PruneError {
    pub fn parse(source_name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        PruneError::Parse {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PruneError::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PruneError>;

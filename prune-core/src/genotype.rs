//! Compressed per-locus genotype storage.
//!
//! Each diploid call takes 2 bits; four samples share a byte with the
//! first sample in the most significant bits. Unused trailing bits of the
//! final byte stay zero.

use crate::error::{PruneError, Result};

/// A single decoded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Genotype {
    Missing = 0,
    HomAllele1 = 1,
    HomAllele2 = 2,
    Het = 3,
}

impl Genotype {
    #[inline]
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Genotype::Missing,
            1 => Genotype::HomAllele1,
            2 => Genotype::HomAllele2,
            _ => Genotype::Het,
        }
    }

    pub fn is_missing(self) -> bool {
        self == Genotype::Missing
    }
}

/// Missing-allele token used by the pedigree formats.
pub const MISSING_ALLELE: &str = "0";

/// Immutable 2-bit packed genotype vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedGenotypes {
    bytes: Vec<u8>,
    n_samples: usize,
}

impl CompressedGenotypes {
    /// Pack allele-pair calls against the locus' two allele labels.
    pub fn encode(
        locus_name: &str,
        calls: &[(&str, &str)],
        allele1: &str,
        allele2: &str,
    ) -> Result<Self> {
        let mut genotypes = Vec::with_capacity(calls.len());
        for &(a, b) in calls {
            genotypes.push(classify_call(locus_name, a, b, allele1, allele2)?);
        }
        Ok(Self::from_genotypes(&genotypes))
    }

    pub fn from_genotypes(genotypes: &[Genotype]) -> Self {
        let mut bytes = vec![0u8; genotypes.len().div_ceil(4)];
        for (i, &g) in genotypes.iter().enumerate() {
            bytes[i / 4] |= (g as u8) << shift(i);
        }
        Self {
            bytes,
            n_samples: genotypes.len(),
        }
    }

    /// Decode the call of sample `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Genotype {
        debug_assert!(index < self.n_samples);
        Genotype::from_bits(self.bytes[index / 4] >> shift(index))
    }

    pub fn len(&self) -> usize {
        self.n_samples
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[inline]
fn shift(index: usize) -> u32 {
    ((3 - index % 4) * 2) as u32
}

fn classify_call(locus: &str, a: &str, b: &str, allele1: &str, allele2: &str) -> Result<Genotype> {
    let invalid = || PruneError::InvalidGenotype {
        locus: locus.to_string(),
        genotype: format!("{}{}", a, b),
    };
    let a_missing = a == MISSING_ALLELE;
    let b_missing = b == MISSING_ALLELE;
    if a_missing && b_missing {
        return Ok(Genotype::Missing);
    }
    if a_missing || b_missing {
        return Err(invalid());
    }
    let code = |allele: &str| {
        if allele == allele1 {
            Some(1u8)
        } else if allele == allele2 {
            Some(2u8)
        } else {
            None
        }
    };
    match (code(a), code(b)) {
        (Some(1), Some(1)) => Ok(Genotype::HomAllele1),
        (Some(2), Some(2)) => Ok(Genotype::HomAllele2),
        (Some(_), Some(_)) => Ok(Genotype::Het),
        _ => Err(invalid()),
    }
}

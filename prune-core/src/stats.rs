//! Per-locus allele statistics: minor allele frequency, missingness and
//! major/minor allele assignment.
//!
//! Male founders on X contribute a single chromosome; everyone else
//! contributes two.

use crate::genotype::{CompressedGenotypes, Genotype};
use crate::sample::Founder;

/// One of the two allele labels of a locus, in genotype-source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allele {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocusStats {
    pub maf: f64,
    pub missing_fraction: f64,
    pub minor: Allele,
    pub major: Allele,
}

impl LocusStats {
    /// MAF and call-rate gate. NaN frequencies never pass.
    pub fn passes(&self, min_maf: f64, min_call_rate: f64) -> bool {
        self.maf >= min_maf && (1.0 - self.missing_fraction) >= min_call_rate
    }

    pub fn passes_maf(&self, min_maf: f64) -> bool {
        self.maf >= min_maf
    }

    pub fn passes_call_rate(&self, min_call_rate: f64) -> bool {
        (1.0 - self.missing_fraction) >= min_call_rate
    }

    /// Haplotype-table code of an allele: major 1, minor 2.
    #[inline]
    pub fn marker_code(&self, allele: Allele) -> usize {
        if allele == self.major {
            1
        } else {
            2
        }
    }
}

pub fn compute_locus_stats(
    genotypes: &CompressedGenotypes,
    founders: &[Founder],
    x_chromosome: bool,
) -> LocusStats {
    debug_assert_eq!(genotypes.len(), founders.len());
    let mut n1 = 0u64;
    let mut n2 = 0u64;
    let mut missing = 0u64;
    let mut chromosomes = 0u64;

    for (i, founder) in founders.iter().enumerate() {
        let g = genotypes.get(i);
        if founder.is_hemizygous(x_chromosome) {
            chromosomes += 1;
            match g {
                Genotype::HomAllele1 => n1 += 1,
                Genotype::HomAllele2 => n2 += 1,
                Genotype::Het => {}
                Genotype::Missing => missing += 1,
            }
        } else {
            chromosomes += 2;
            match g {
                Genotype::HomAllele1 => n1 += 2,
                Genotype::HomAllele2 => n2 += 2,
                Genotype::Het => {
                    n1 += 1;
                    n2 += 1;
                }
                Genotype::Missing => missing += 2,
            }
        }
    }

    let called = (n1 + n2) as f64;
    // Ties keep allele1 as major.
    let (maf, minor, major) = if n1 >= n2 {
        (n2 as f64 / called, Allele::Second, Allele::First)
    } else {
        (n1 as f64 / called, Allele::First, Allele::Second)
    };

    LocusStats {
        maf,
        missing_fraction: missing as f64 / chromosomes as f64,
        minor,
        major,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Sex;

    fn founders(sexes: &[Sex]) -> Vec<Founder> {
        sexes
            .iter()
            .enumerate()
            .map(|(i, &s)| Founder::new("F", format!("I{}", i), s))
            .collect()
    }

    #[test]
    fn test_diploid_frequencies() {
        use Genotype::*;
        let calls = [HomAllele1, HomAllele1, Het, HomAllele2, Missing];
        let g = CompressedGenotypes::from_genotypes(&calls);
        let stats = compute_locus_stats(&g, &founders(&[Sex::Female; 5]), false);
        // allele1: 2+2+1 = 5, allele2: 1+2 = 3
        assert!((stats.maf - 3.0 / 8.0).abs() < 1e-12);
        assert_eq!(stats.minor, Allele::Second);
        assert_eq!(stats.major, Allele::First);
        assert!((stats.missing_fraction - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_minor_is_allele1_when_rarer() {
        use Genotype::*;
        let g = CompressedGenotypes::from_genotypes(&[HomAllele2, HomAllele2, Het]);
        let stats = compute_locus_stats(&g, &founders(&[Sex::Male; 3]), false);
        assert_eq!(stats.minor, Allele::First);
        assert!((stats.maf - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_keeps_allele1_major() {
        use Genotype::*;
        let g = CompressedGenotypes::from_genotypes(&[HomAllele1, HomAllele2]);
        let stats = compute_locus_stats(&g, &founders(&[Sex::Female; 2]), false);
        assert_eq!(stats.major, Allele::First);
        assert_eq!(stats.minor, Allele::Second);
        assert!((stats.maf - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_hemizygous_males_on_x() {
        use Genotype::*;
        let g = CompressedGenotypes::from_genotypes(&[HomAllele1, HomAllele2, Missing, HomAllele1]);
        let stats = compute_locus_stats(&g, &founders(&[Sex::Male; 4]), true);
        // One chromosome per male: denominator is 4, not 8.
        assert!((stats.missing_fraction - 0.25).abs() < 1e-12);
        assert!((stats.maf - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_male_het_on_x_counts_no_allele() {
        use Genotype::*;
        let g = CompressedGenotypes::from_genotypes(&[Het, HomAllele1]);
        let stats = compute_locus_stats(&g, &founders(&[Sex::Male, Sex::Male]), true);
        assert_eq!(stats.maf, 0.0);
        assert_eq!(stats.missing_fraction, 0.0);
    }

    #[test]
    fn test_all_missing_never_passes() {
        let g = CompressedGenotypes::from_genotypes(&[Genotype::Missing; 3]);
        let stats = compute_locus_stats(&g, &founders(&[Sex::Female; 3]), false);
        assert!(stats.maf.is_nan());
        assert!(!stats.passes(0.0, 0.0));
    }

    #[test]
    fn test_passes_thresholds() {
        let stats = LocusStats {
            maf: 0.05,
            missing_fraction: 0.1,
            minor: Allele::Second,
            major: Allele::First,
        };
        assert!(stats.passes(0.05, 0.9));
        assert!(!stats.passes(0.06, 0.9));
        assert!(!stats.passes(0.05, 0.95));
    }
}

//! Locus records and their per-run selection state.
//!
//! Identity and policy fields live in [`Locus`], genotypes and their
//! one-shot statistics in [`LocusGenotypes`], and the mutable
//! picked/tagged state in a separate [`LocusState`] arena owned by the
//! pruner. All three are addressed by the same locus id.

use crate::chrom::Chromosome;
use crate::genotype::CompressedGenotypes;
use crate::sample::Founder;
use crate::stats::{compute_locus_stats, LocusStats};

/// A candidate SNP from the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct Locus {
    pub name: String,
    pub chrom: Chromosome,
    pub pos: u64,
    pub allele1: String,
    pub allele2: String,
    pub p_value: f64,
    pub force_include: bool,
    pub design_score: f64,
    /// Values of the configured metrics, in configuration order.
    pub metrics: Vec<f64>,
}

impl Locus {
    /// A locus with neutral policy fields, for building panels in code.
    pub fn new(name: impl Into<String>, chrom: Chromosome, pos: u64, p_value: f64) -> Self {
        Self {
            name: name.into(),
            chrom,
            pos,
            allele1: "A".to_string(),
            allele2: "B".to_string(),
            p_value,
            force_include: false,
            design_score: 1.0,
            metrics: Vec::new(),
        }
    }

    /// Same name, position and allele pair (in either order).
    pub fn same_variant(&self, other: &Locus) -> bool {
        self.name == other.name
            && self.chrom == other.chrom
            && self.pos == other.pos
            && ((self.allele1 == other.allele1 && self.allele2 == other.allele2)
                || (self.allele1 == other.allele2 && self.allele2 == other.allele1))
    }
}

/// Genotypes of one locus plus the statistics derived from them once.
#[derive(Debug, Clone)]
pub struct LocusGenotypes {
    genotypes: CompressedGenotypes,
    allele1: String,
    allele2: String,
    stats: Option<LocusStats>,
    valid: bool,
}

impl LocusGenotypes {
    pub fn new(
        genotypes: CompressedGenotypes,
        allele1: impl Into<String>,
        allele2: impl Into<String>,
    ) -> Self {
        Self {
            genotypes,
            allele1: allele1.into(),
            allele2: allele2.into(),
            stats: None,
            valid: false,
        }
    }

    pub fn genotypes(&self) -> &CompressedGenotypes {
        &self.genotypes
    }

    pub fn alleles(&self) -> (&str, &str) {
        (&self.allele1, &self.allele2)
    }

    pub fn stats(&self) -> Option<&LocusStats> {
        self.stats.as_ref()
    }

    /// Compute statistics and the validity flag. Later calls are no-ops.
    pub fn compute_stats(
        &mut self,
        founders: &[Founder],
        x_chromosome: bool,
        min_maf: f64,
        min_call_rate: f64,
    ) -> LocusStats {
        if let Some(stats) = self.stats {
            return stats;
        }
        let stats = compute_locus_stats(&self.genotypes, founders, x_chromosome);
        self.valid = stats.passes(min_maf, min_call_rate);
        self.stats = Some(stats);
        stats
    }

    pub(crate) fn stats_or_compute(&self, founders: &[Founder], x_chromosome: bool) -> LocusStats {
        match self.stats {
            Some(stats) => stats,
            None => compute_locus_stats(&self.genotypes, founders, x_chromosome),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// A (tagging locus, r²) entry. Negative r² marks a transitive tag of
/// unknown strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagLink {
    pub tagger: usize,
    pub r2: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocusState {
    pub picked: bool,
    pub tagged: bool,
    pub pick_order: Option<u32>,
    pub tagged_by: Vec<TagLink>,
}

impl LocusState {
    /// The strongest known tag.
    pub fn best_tag(&self) -> Option<&TagLink> {
        self.tagged_by
            .iter()
            .filter(|link| link.r2 >= 0.0)
            .fold(None, |best: Option<&TagLink>, link| match best {
                Some(b) if b.r2 >= link.r2 => Some(b),
                _ => Some(link),
            })
    }
}

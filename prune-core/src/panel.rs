//! The in-memory dataset of a run: candidate loci, their genotypes and the
//! kept founders.

use rayon::prelude::*;
use tracing::info;

use crate::error::{PruneError, Result};
use crate::locus::{Locus, LocusGenotypes};
use crate::sample::Founder;

#[derive(Debug, Clone)]
pub struct Panel {
    loci: Vec<Locus>,
    genotypes: Vec<LocusGenotypes>,
    founders: Vec<Founder>,
}

/// Outcome of the MAF / call-rate pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub total: usize,
    pub failed_maf: usize,
    pub failed_call_rate: usize,
    pub valid: usize,
}

impl Panel {
    /// `genotypes[i]` belongs to `loci[i]` and has one call per founder.
    pub fn new(
        loci: Vec<Locus>,
        genotypes: Vec<LocusGenotypes>,
        founders: Vec<Founder>,
    ) -> Result<Self> {
        if loci.len() != genotypes.len() {
            return Err(PruneError::Internal(format!(
                "{} loci but {} genotype vectors",
                loci.len(),
                genotypes.len()
            )));
        }
        if let Some((locus, g)) = loci
            .iter()
            .zip(&genotypes)
            .find(|(_, g)| g.genotypes().len() != founders.len())
        {
            return Err(PruneError::Internal(format!(
                "SNP {} has {} genotype calls for {} founders",
                locus.name,
                g.genotypes().len(),
                founders.len()
            )));
        }
        Ok(Self {
            loci,
            genotypes,
            founders,
        })
    }

    pub fn loci(&self) -> &[Locus] {
        &self.loci
    }

    pub fn genotypes(&self) -> &[LocusGenotypes] {
        &self.genotypes
    }

    pub fn founders(&self) -> &[Founder] {
        &self.founders
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    /// Compute per-locus statistics and validity. Loci are independent,
    /// so the pass runs on the rayon pool.
    pub fn compute_statistics(&mut self, min_maf: f64, min_call_rate: f64) -> FilterSummary {
        let founders = &self.founders;
        let outcomes: Vec<(bool, bool)> = self
            .genotypes
            .par_iter_mut()
            .zip(self.loci.par_iter())
            .map(|(g, locus)| {
                let stats = g.compute_stats(founders, locus.chrom.is_x(), min_maf, min_call_rate);
                (stats.passes_maf(min_maf), stats.passes_call_rate(min_call_rate))
            })
            .collect();

        let summary = FilterSummary {
            total: outcomes.len(),
            failed_maf: outcomes.iter().filter(|o| !o.0).count(),
            failed_call_rate: outcomes.iter().filter(|o| !o.1).count(),
            valid: self.genotypes.iter().filter(|g| g.is_valid()).count(),
        };
        info!(
            "{} SNPs failed the MAF threshold ({}), {} failed the call-rate threshold ({})",
            summary.failed_maf, min_maf, summary.failed_call_rate, min_call_rate
        );
        info!("{} of {} SNPs remain", summary.valid, summary.total);
        summary
    }
}

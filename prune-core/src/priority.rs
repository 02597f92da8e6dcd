//! Order in which candidate SNPs are visited as index SNPs.

use std::cmp::Ordering;

use crate::config::PruneConfig;
use crate::locus::Locus;

/// Locus ids sorted by visiting priority.
///
/// Sort key: force-included first (unless disabled), then chromosome when
/// the run spans several chromosomes, then ascending p-value, then name.
pub fn priority_order(loci: &[Locus], config: &PruneConfig) -> Vec<usize> {
    let by_chromosome = config.chromosome.is_none();
    let mut order: Vec<usize> = (0..loci.len()).collect();
    order.sort_by(|&a, &b| {
        let (la, lb) = (&loci[a], &loci[b]);
        let forced = if config.force_include_first {
            lb.force_include.cmp(&la.force_include)
        } else {
            Ordering::Equal
        };
        let chrom = if by_chromosome {
            la.chrom.cmp(&lb.chrom)
        } else {
            Ordering::Equal
        };
        forced
            .then(chrom)
            .then_with(|| la.p_value.total_cmp(&lb.p_value))
            .then_with(|| la.name.cmp(&lb.name))
    });
    order
}

//! Two-locus linkage disequilibrium from unphased genotypes.
//!
//! Haplotype frequencies are estimated with an EM over the double
//! heterozygotes, whose phase is ambiguous. All other founders resolve
//! into known haplotype counts. Male founders on X contribute a single
//! haplotype each.
//!
//! Haplotype layout: A is the major allele and B the minor allele of each
//! locus, so `AB` is major at the first locus and minor at the second.

use std::f64::consts::LN_10;

use crate::genotype::Genotype;
use crate::locus::LocusGenotypes;
use crate::sample::Founder;
use crate::stats::{Allele, LocusStats};

const PSEUDOCOUNT: f64 = 0.1;
const MAX_ROUNDS: u32 = 1000;
const TOLERANCE: f64 = 1e-8;
const PROB_FLOOR: f64 = 1e-10;
const INITIAL_LOG_LIKELIHOOD: f64 = -999_999_999.0;

const AA: usize = 0;
const AB: usize = 1;
const BA: usize = 2;
const BB: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LdResult {
    pub r2: f64,
    pub dprime: f64,
}

/// One evaluated (index, partner) pair, by locus id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairwiseResult {
    pub index: usize,
    pub partner: usize,
    pub r2: f64,
    pub dprime: f64,
}

/// Haplotype counts indexed by marker code (major 1, minor 2; row 0 and
/// column 0 unused).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HaplotypeTable {
    pub cells: [[u32; 3]; 3],
    pub double_het: u32,
}

impl HaplotypeTable {
    /// Known (phase-resolved) counts in `[AA, AB, BA, BB]` order.
    pub fn known(&self) -> [f64; 4] {
        [
            self.cells[1][1] as f64,
            self.cells[1][2] as f64,
            self.cells[2][1] as f64,
            self.cells[2][2] as f64,
        ]
    }
}

/// Estimate r² and D′ between two loci. Returns `None` when the pair
/// carries no information (a monomorphic side and no double heterozygotes).
pub fn estimate(
    a: &LocusGenotypes,
    b: &LocusGenotypes,
    founders: &[Founder],
    x_chromosome: bool,
) -> Option<LdResult> {
    if std::ptr::eq(a, b) {
        return Some(LdResult {
            r2: 1.0,
            dprime: 1.0,
        });
    }
    let table = count_haplotypes(a, b, founders, x_chromosome);
    estimate_from_counts(table.known(), table.double_het as f64)
}

pub fn count_haplotypes(
    a: &LocusGenotypes,
    b: &LocusGenotypes,
    founders: &[Founder],
    x_chromosome: bool,
) -> HaplotypeTable {
    let stats_a = a.stats_or_compute(founders, x_chromosome);
    let stats_b = b.stats_or_compute(founders, x_chromosome);
    let ga = a.genotypes();
    let gb = b.genotypes();
    let mut table = HaplotypeTable::default();

    for (i, founder) in founders.iter().enumerate() {
        let (g1, g2) = (ga.get(i), gb.get(i));
        if founder.is_hemizygous(x_chromosome) {
            if g1.is_missing() || g2.is_missing() {
                continue;
            }
            let r = code(&stats_a, haploid_allele(g1));
            let c = code(&stats_b, haploid_allele(g2));
            table.cells[r][c] += 1;
            continue;
        }
        match (g1, g2) {
            (Genotype::Missing, _) | (_, Genotype::Missing) => {}
            (Genotype::Het, Genotype::Het) => table.double_het += 1,
            (Genotype::Het, hom) => {
                let c = code(&stats_b, hom_allele(hom));
                table.cells[1][c] += 1;
                table.cells[2][c] += 1;
            }
            (hom, Genotype::Het) => {
                let r = code(&stats_a, hom_allele(hom));
                table.cells[r][1] += 1;
                table.cells[r][2] += 1;
            }
            (hom1, hom2) => {
                let r = code(&stats_a, hom_allele(hom1));
                let c = code(&stats_b, hom_allele(hom2));
                table.cells[r][c] += 2;
            }
        }
    }
    table
}

#[inline]
fn code(stats: &LocusStats, allele: Allele) -> usize {
    stats.marker_code(allele)
}

#[inline]
fn hom_allele(g: Genotype) -> Allele {
    match g {
        Genotype::HomAllele2 => Allele::Second,
        _ => Allele::First,
    }
}

// A male het on X is a calling artefact; it reads as allele1.
#[inline]
fn haploid_allele(g: Genotype) -> Allele {
    hom_allele(g)
}

/// EM haplotype estimation over known counts `[AA, AB, BA, BB]` plus
/// `double_het` phase-ambiguous founders.
pub fn estimate_from_counts(known: [f64; 4], double_het: f64) -> Option<LdResult> {
    let margins = [
        known[AA] + known[AB],
        known[BA] + known[BB],
        known[AA] + known[BA],
        known[AB] + known[BB],
    ];
    if double_het == 0.0 && margins.iter().any(|&m| m == 0.0) {
        return None;
    }

    let total = known.iter().sum::<f64>() + 2.0 * double_het;
    let p_a1 = (known[AA] + known[AB] + double_het) / total;
    let p_b1 = 1.0 - p_a1;
    let mut p_a2 = (known[AA] + known[BA] + double_het) / total;
    let mut p_b2 = 1.0 - p_a2;

    let mut nums = known;
    let mut probs = [0.0f64; 4];
    maximize(&nums, PSEUDOCOUNT, &mut probs);

    let mut loglike = INITIAL_LOG_LIKELIHOOD;
    let mut round = 1;
    while round < MAX_ROUNDS {
        let previous = loglike;
        expect(&known, double_het, &probs, &mut nums);
        loglike = log_likelihood(&known, double_het, &probs);
        if (loglike - previous).abs() < TOLERANCE {
            break;
        }
        maximize(&nums, 0.0, &mut probs);
        round += 1;
    }

    let mut d = probs[AA] * probs[BB] - probs[AB] * probs[BA];
    if d < 0.0 {
        probs.swap(AA, AB);
        probs.swap(BA, BB);
        std::mem::swap(&mut p_a2, &mut p_b2);
        d = probs[AA] * probs[BB] - probs[AB] * probs[BA];
    }

    let denom1 = (probs[AA] + probs[BA]) * (probs[BA] + probs[BB]);
    let denom2 = (probs[AA] + probs[AB]) * (probs[AB] + probs[BB]);
    let dprime = d / denom1.min(denom2);
    let r2 = (d * d) / (p_a1 * p_b1 * p_a2 * p_b2);

    Some(LdResult { r2, dprime })
}

// M-step: normalized expected counts, floored.
#[inline]
fn maximize(nums: &[f64; 4], pseudocount: f64, probs: &mut [f64; 4]) {
    let total = nums.iter().sum::<f64>() + 4.0 * pseudocount;
    for (p, &n) in probs.iter_mut().zip(nums) {
        *p = ((n + pseudocount) / total).max(PROB_FLOOR);
    }
}

// E-step: split each double heterozygote between the two phases.
#[inline]
fn expect(known: &[f64; 4], double_het: f64, probs: &[f64; 4], nums: &mut [f64; 4]) {
    *nums = *known;
    if double_het > 0.0 {
        let cis = probs[AA] * probs[BB];
        let trans = probs[AB] * probs[BA];
        let denom = cis + trans;
        nums[AA] += double_het * cis / denom;
        nums[BB] += double_het * cis / denom;
        nums[AB] += double_het * trans / denom;
        nums[BA] += double_het * trans / denom;
    }
}

#[inline]
fn log_likelihood(known: &[f64; 4], double_het: f64, probs: &[f64; 4]) -> f64 {
    let resolved: f64 = known.iter().zip(probs).map(|(&n, &p)| n * p.ln()).sum();
    resolved / LN_10 + double_het * (probs[AA] * probs[BB] + probs[AB] * probs[BA]).ln() / LN_10
}

//! Greedy, priority-ordered tag SNP selection.
//!
//! Each unresolved candidate in priority order becomes an index SNP:
//! it is picked, surrogates are chosen among its strongest LD partners
//! and every partner above the r² threshold is marked as tagged. State
//! lives in a flat arena indexed by locus id; `tagged_by` links refer to
//! taggers by id.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::config::PruneConfig;
use crate::error::{PruneError, Result};
use crate::ld::{self, PairwiseResult};
use crate::locus::{LocusState, TagLink};
use crate::panel::Panel;
use crate::priority::priority_order;
use crate::window::PositionIndex;

/// Receives every evaluated (index, partner) pair.
pub trait LdSink {
    fn record(&mut self, panel: &Panel, pair: &PairwiseResult) -> Result<()>;
}

/// Discards LD pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLdOutput;

impl LdSink for NoLdOutput {
    fn record(&mut self, _panel: &Panel, _pair: &PairwiseResult) -> Result<()> {
        Ok(())
    }
}

impl LdSink for Vec<PairwiseResult> {
    fn record(&mut self, _panel: &Panel, pair: &PairwiseResult) -> Result<()> {
        self.push(*pair);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneSummary {
    pub index_snps: usize,
    pub picked: usize,
    pub tagged: usize,
}

pub struct Pruner<'a> {
    panel: &'a Panel,
    config: &'a PruneConfig,
    order: Vec<usize>,
    positions: PositionIndex,
    state: Vec<LocusState>,
    next_pick: u32,
}

struct Candidate {
    id: usize,
    r2: f64,
    score: f64,
}

impl<'a> Pruner<'a> {
    pub fn new(panel: &'a Panel, config: &'a PruneConfig) -> Self {
        let order = priority_order(panel.loci(), config);
        let positions = PositionIndex::new(panel.loci(), &order);
        Self {
            panel,
            config,
            order,
            positions,
            state: vec![LocusState::default(); panel.len()],
            next_pick: 1,
        }
    }

    /// Visit every candidate in priority order.
    pub fn run(&mut self, sink: &mut dyn LdSink) -> Result<PruneSummary> {
        let panel = self.panel;
        let loci = panel.loci();
        let mut index_snps = 0;
        for i in 0..self.order.len() {
            let id = self.order[i];
            let state = &self.state[id];
            if !state.picked && (!state.tagged || loci[id].force_include) {
                if self.prune(id, sink)? {
                    index_snps += 1;
                }
            } else {
                debug!("Skipping {}: already picked or tagged", loci[id].name);
            }
        }

        let summary = PruneSummary {
            index_snps,
            picked: self.state.iter().filter(|s| s.picked).count(),
            tagged: self.state.iter().filter(|s| s.tagged).count(),
        };
        info!(
            "Pruning finished: {} index SNPs, {} SNPs selected, {} SNPs tagged",
            summary.index_snps, summary.picked, summary.tagged
        );
        Ok(summary)
    }

    /// Process one index SNP. Returns false when the gate skipped it.
    fn prune(&mut self, index: usize, sink: &mut dyn LdSink) -> Result<bool> {
        let panel = self.panel;
        let config = self.config;
        let loci = panel.loci();
        let genotypes = panel.genotypes();
        let locus = &loci[index];

        if locus.design_score < config.min_design_score && !locus.force_include {
            debug!(
                "Skipping {}: design score {} below {}",
                locus.name, locus.design_score, config.min_design_score
            );
            return Ok(false);
        }
        if !genotypes[index].is_valid() && !locus.force_include {
            debug!("Skipping {}: failed MAF or call-rate filter", locus.name);
            return Ok(false);
        }

        let range = self.positions.window(loci, index, config.max_distance);
        let members = self.positions.ids(range);
        if !members.contains(&index) {
            return Err(PruneError::Internal(format!(
                "index SNP {} is missing from its own window",
                locus.name
            )));
        }

        let x_chromosome = locus.chrom.is_x();
        let pairs: Vec<PairwiseResult> = members
            .iter()
            .filter(|&&id| id == index || genotypes[id].is_valid())
            .filter_map(|&id| {
                let ld = ld::estimate(
                    &genotypes[index],
                    &genotypes[id],
                    panel.founders(),
                    x_chromosome,
                )?;
                if ld.r2.is_nan() {
                    return None;
                }
                Some(PairwiseResult {
                    index,
                    partner: id,
                    r2: if ld.r2 > 1.0 { 1.0 } else { ld.r2 },
                    dprime: ld.dprime,
                })
            })
            .collect();

        let threshold = config.r2_thresholds.lookup(locus.p_value).ok_or_else(|| {
            PruneError::config(format!(
                "no r^2 threshold defined for p-value of {}: {}",
                locus.name, locus.p_value
            ))
        })?;

        self.pick(index);
        debug!(
            "Picked {} (p = {}) with {} partners in window",
            locus.name,
            locus.p_value,
            pairs.len().saturating_sub(1)
        );

        let quota = if locus.force_include && !config.surrogates_for_force_included {
            0
        } else {
            config.surrogate_thresholds.lookup(locus.p_value)
        };
        if quota > 0 {
            self.pick_surrogates(index, &pairs, threshold, quota);
        }

        for pair in &pairs {
            if pair.r2 >= threshold {
                let state = &mut self.state[pair.partner];
                state.tagged = true;
                state.tagged_by.push(TagLink {
                    tagger: index,
                    r2: pair.r2,
                });
            }
            sink.record(panel, pair)?;
        }
        Ok(true)
    }

    fn pick(&mut self, id: usize) {
        let state = &mut self.state[id];
        state.picked = true;
        state.tagged = true;
        state.pick_order = Some(self.next_pick);
        self.next_pick += 1;
    }

    fn pick_surrogates(
        &mut self,
        index: usize,
        pairs: &[PairwiseResult],
        threshold: f64,
        quota: usize,
    ) {
        let panel = self.panel;
        let loci = panel.loci();
        let min_design = self.config.min_design_score;

        let mut already = 0;
        let mut pool = Vec::new();
        for pair in pairs.iter().filter(|p| p.partner != index && p.r2 >= threshold) {
            let partner = &loci[pair.partner];
            if self.state[pair.partner].picked {
                already += 1;
            } else if partner.design_score >= min_design || partner.force_include {
                pool.push(Candidate {
                    id: pair.partner,
                    r2: pair.r2,
                    score: 0.0,
                });
            }
        }

        if self.config.metrics.is_empty() {
            self.rank(&mut pool, |c| c.r2);
        } else {
            self.score(&mut pool);
            self.rank(&mut pool, |c| c.score);
        }

        let mut chosen = already;
        for candidate in pool {
            if chosen >= quota {
                break;
            }
            self.pick(candidate.id);
            chosen += 1;
            debug!(
                "Picked surrogate {} for {} (r^2 = {})",
                loci[candidate.id].name, loci[index].name, candidate.r2
            );
        }
    }

    /// Weighted sum of min-max normalized metrics over the pool.
    fn score(&self, pool: &mut [Candidate]) {
        let loci = self.panel.loci();
        for (m, metric) in self.config.metrics.iter().enumerate() {
            let (min, max) = pool.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                let v = loci[c.id].metrics[m];
                (lo.min(v), hi.max(v))
            });
            for c in pool.iter_mut() {
                if max == min {
                    c.score += metric.weight;
                } else {
                    c.score += metric.weight * (loci[c.id].metrics[m] - min) / (max - min);
                }
            }
        }
    }

    /// Force-included first, then `key` descending, then name descending.
    fn rank(&self, pool: &mut [Candidate], key: impl Fn(&Candidate) -> f64) {
        let loci = self.panel.loci();
        pool.sort_by(|a, b| {
            let (la, lb) = (&loci[a.id], &loci[b.id]);
            lb.force_include
                .cmp(&la.force_include)
                .then_with(|| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal))
                .then_with(|| lb.name.cmp(&la.name))
        });
    }

    pub fn states(&self) -> &[LocusState] {
        &self.state
    }

    /// Locus ids in visiting order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

//! Founder records and sample filtering.
//!
//! Keep, remove and keep-random filters all reduce to a boolean mask over
//! the pedigree order; the kept founders are the individuals whose genotype
//! columns are read.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use crate::error::{PruneError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

/// An individual without parents in the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Founder {
    pub family_id: String,
    pub individual_id: String,
    pub sex: Sex,
}

impl Founder {
    pub fn new(family_id: impl Into<String>, individual_id: impl Into<String>, sex: Sex) -> Self {
        Self {
            family_id: family_id.into(),
            individual_id: individual_id.into(),
            sex,
        }
    }

    /// Whether this founder carries a single X.
    #[inline]
    pub fn is_hemizygous(&self, x_chromosome: bool) -> bool {
        x_chromosome && self.sex == Sex::Male
    }
}

/// Set of (family ID, individual ID) pairs.
#[derive(Debug, Clone, Default)]
pub struct SampleSet(HashSet<(String, String)>);

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the pair was already present.
    pub fn insert(&mut self, family_id: &str, individual_id: &str) -> bool {
        self.0
            .insert((family_id.to_string(), individual_id.to_string()))
    }

    pub fn contains(&self, founder: &Founder) -> bool {
        self.0
            .contains(&(founder.family_id.clone(), founder.individual_id.clone()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub enum SampleFilter {
    #[default]
    All,
    Keep(SampleSet),
    Remove(SampleSet),
    KeepRandom { fraction: f64, seed: Option<u64> },
}

/// Build the keep mask over `individuals` in pedigree order.
pub fn apply_filter(individuals: &[Founder], filter: &SampleFilter) -> Result<Vec<bool>> {
    let mask = match filter {
        SampleFilter::All => vec![true; individuals.len()],
        SampleFilter::Keep(set) => individuals.iter().map(|f| set.contains(f)).collect(),
        SampleFilter::Remove(set) => individuals.iter().map(|f| !set.contains(f)).collect(),
        SampleFilter::KeepRandom { fraction, seed } => {
            if !(*fraction > 0.0 && *fraction <= 1.0) {
                return Err(PruneError::config(format!(
                    "keep-random fraction must be in (0, 1], got {}",
                    fraction
                )));
            }
            let seed = seed.unwrap_or_else(rand::random);
            info!("Keeping a random {} of individuals (seed {})", fraction, seed);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut order: Vec<usize> = (0..individuals.len()).collect();
            order.shuffle(&mut rng);
            let n_keep = (fraction * individuals.len() as f64).round() as usize;
            let mut mask = vec![false; individuals.len()];
            for &i in order.iter().take(n_keep) {
                mask[i] = true;
            }
            mask
        }
    };
    let kept = mask.iter().filter(|&&k| k).count();
    if kept == 0 {
        return Err(PruneError::config("no individuals remain after sample filtering"));
    }
    info!(
        "{} of {} individuals kept after sample filtering",
        kept,
        individuals.len()
    );
    Ok(mask)
}

/// The founders selected by `mask`, in pedigree order.
pub fn kept_founders(individuals: &[Founder], mask: &[bool]) -> Vec<Founder> {
    individuals
        .iter()
        .zip(mask)
        .filter_map(|(f, &keep)| keep.then(|| f.clone()))
        .collect()
}

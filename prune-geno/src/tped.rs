//! Transposed PED genotypes (`.tped`).
//!
//! One variant per line: chromosome, name, genetic distance, position,
//! then two allele columns per individual in `.tfam` order. Only the
//! columns of kept individuals are encoded, and only variants listed in
//! the SNP table are retained.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use prune_core::chrom::Chromosome;
use prune_core::error::PruneError;
use prune_core::genotype::{CompressedGenotypes, MISSING_ALLELE};
use prune_core::locus::LocusGenotypes;

use crate::snp_table::SnpTable;

/// Read genotypes for every table SNP, aligned with `table.loci`.
///
/// `keep` has one entry per `.tfam` individual.
pub fn read_tped<P: AsRef<Path>>(
    path: P,
    keep: &[bool],
    table: &SnpTable,
    chromosome: Option<&Chromosome>,
) -> Result<Vec<LocusGenotypes>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open tped file: {}", path.display()))?;
    info!("Reading genotypes from {}", path.display());
    parse_tped(
        BufReader::new(file),
        &path.display().to_string(),
        keep,
        table,
        chromosome,
    )
}

pub fn parse_tped<R: BufRead>(
    reader: R,
    source: &str,
    keep: &[bool],
    table: &SnpTable,
    chromosome: Option<&Chromosome>,
) -> Result<Vec<LocusGenotypes>> {
    let expected_columns = 4 + 2 * keep.len();
    let n_kept = keep.iter().filter(|&&k| k).count();
    let mut found: Vec<Option<LocusGenotypes>> = vec![None; table.len()];
    let mut n_lines = 0usize;
    let mut not_in_table = 0usize;

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", source))?;
        let line_num = line_idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        n_lines += 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != expected_columns {
            return Err(PruneError::parse(
                source,
                line_num,
                format!(
                    "expected 4 + 2 * {} = {} columns, found {}",
                    keep.len(),
                    expected_columns,
                    fields.len()
                ),
            )
            .into());
        }

        // Unsupported chromosomes (Y, MT) cannot be in the table.
        let Ok(chrom) = Chromosome::parse_at(fields[0], source, line_num) else {
            not_in_table += 1;
            continue;
        };
        if chromosome.is_some_and(|c| *c != chrom) {
            continue;
        }
        let name = fields[1];
        let pos = match fields[3].parse::<u64>() {
            Ok(p) if p >= 1 => p,
            _ => {
                return Err(PruneError::parse(
                    source,
                    line_num,
                    format!("invalid position '{}' in column 4", fields[3]),
                )
                .into())
            }
        };

        let upper: Vec<String> = fields[4..].iter().map(|a| a.to_ascii_uppercase()).collect();
        let mut calls: Vec<(&str, &str)> = Vec::with_capacity(n_kept);
        let (allele1, allele2) = {
            let mut allele1 = MISSING_ALLELE;
            let mut allele2 = MISSING_ALLELE;
            for (i, pair) in upper.chunks_exact(2).enumerate() {
                if !keep[i] {
                    continue;
                }
                for a in pair {
                    let a = a.as_str();
                    if a == MISSING_ALLELE || a == allele1 || a == allele2 {
                        continue;
                    }
                    if allele1 == MISSING_ALLELE {
                        allele1 = a;
                    } else if allele2 == MISSING_ALLELE {
                        allele2 = a;
                    } else {
                        return Err(PruneError::InvalidGenotype {
                            locus: name.to_string(),
                            genotype: format!(
                                "{}{} (more than two alleles; already seen {} and {})",
                                pair[0], pair[1], allele1, allele2
                            ),
                        }
                        .into());
                    }
                }
                calls.push((pair[0].as_str(), pair[1].as_str()));
            }
            (allele1, allele2)
        };

        let Some(id) = table.find(name, &chrom, pos, allele1, allele2) else {
            not_in_table += 1;
            continue;
        };
        if found[id].is_some() {
            return Err(PruneError::parse(
                source,
                line_num,
                format!(
                    "duplicate SNP {}: name, chromosome, position and alleles must be unique",
                    name
                ),
            )
            .into());
        }
        let genotypes = CompressedGenotypes::encode(name, &calls, allele1, allele2)?;
        found[id] = Some(LocusGenotypes::new(genotypes, allele1, allele2));
    }

    info!("Excluding {} SNPs missing from the SNP table", not_in_table);
    let included = found.iter().filter(|g| g.is_some()).count();
    info!("{} (of {}) SNPs included from {}", included, n_lines, source);

    found
        .into_iter()
        .zip(&table.loci)
        .map(|(g, locus)| {
            g.ok_or_else(|| {
                anyhow::Error::from(PruneError::LocusNotGenotyped {
                    name: locus.name.clone(),
                    chrom: locus.chrom.to_string(),
                    pos: locus.pos,
                })
            })
        })
        .collect()
}

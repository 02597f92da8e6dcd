//! Candidate SNP table.
//!
//! Whitespace-separated with a header. The first eight columns are fixed:
//!
//! ```text
//! name chr pos a1 a2 p forceSelect designScore [metric columns...]
//! ```
//!
//! Any column, fixed or extra, can serve as a weighted metric by name.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use prune_core::chrom::Chromosome;
use prune_core::error::PruneError;
use prune_core::locus::Locus;
use prune_core::threshold::Metric;

pub const REQUIRED_COLUMNS: [&str; 8] = [
    "name",
    "chr",
    "pos",
    "a1",
    "a2",
    "p",
    "forceSelect",
    "designScore",
];

/// Parsed candidate table.
#[derive(Debug, Clone)]
pub struct SnpTable {
    pub loci: Vec<Locus>,
    by_name: HashMap<String, Vec<usize>>,
}

impl SnpTable {
    /// Read the table, keeping only rows on `chromosome` when given.
    /// `metrics` names the columns copied into [`Locus::metrics`].
    pub fn read<P: AsRef<Path>>(
        path: P,
        metrics: &[Metric],
        chromosome: Option<&Chromosome>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read SNP table: {}", path.display()))?;
        let table = Self::parse(&contents, &path.display().to_string(), metrics, chromosome)?;
        info!("Read {} SNPs from {}", table.loci.len(), path.display());
        Ok(table)
    }

    pub fn parse(
        contents: &str,
        source: &str,
        metrics: &[Metric],
        chromosome: Option<&Chromosome>,
    ) -> Result<Self> {
        let mut lines = contents
            .lines()
            .enumerate()
            .filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines
            .next()
            .ok_or_else(|| PruneError::parse(source, 1, "SNP table is empty"))?;
        let columns: Vec<&str> = header.split_whitespace().collect();
        let metric_columns = resolve_columns(&columns, source, metrics)?;

        let mut table = SnpTable {
            loci: Vec::new(),
            by_name: HashMap::new(),
        };
        let mut skipped = 0usize;

        for (line_idx, line) in lines {
            let line_num = line_idx + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != columns.len() {
                return Err(PruneError::parse(
                    source,
                    line_num,
                    format!("expected {} columns, found {}", columns.len(), fields.len()),
                )
                .into());
            }

            let chrom = Chromosome::parse_at(fields[1], source, line_num)?;
            if chromosome.is_some_and(|c| *c != chrom) {
                skipped += 1;
                continue;
            }

            let locus = Locus {
                name: fields[0].to_string(),
                chrom,
                pos: parse_position(fields[2], source, line_num)?,
                allele1: parse_allele(fields[3], "a1", source, line_num)?,
                allele2: parse_allele(fields[4], "a2", source, line_num)?,
                p_value: parse_float(fields[5], "p", source, line_num)?,
                force_include: parse_flag(fields[6], source, line_num)?,
                design_score: parse_float(fields[7], "designScore", source, line_num)?,
                metrics: metric_columns
                    .iter()
                    .map(|&c| parse_float(fields[c], columns[c], source, line_num))
                    .collect::<std::result::Result<_, _>>()?,
            };
            table.insert(locus, source, line_num)?;
        }

        if table.loci.is_empty() {
            return Err(match chromosome {
                Some(c) => PruneError::config(format!("no SNPs on chromosome {} in {}", c, source)),
                None => PruneError::parse(source, 1, "SNP table contains no SNPs"),
            }
            .into());
        }
        if skipped > 0 {
            info!("{} SNPs on other chromosomes skipped", skipped);
        }
        Ok(table)
    }

    fn insert(&mut self, locus: Locus, source: &str, line: usize) -> Result<()> {
        let ids = self.by_name.entry(locus.name.clone()).or_default();
        if ids.iter().any(|&id| self.loci[id].same_variant(&locus)) {
            return Err(PruneError::parse(
                source,
                line,
                format!(
                    "duplicate SNP {} (chr {}, position {}, alleles {}/{})",
                    locus.name, locus.chrom, locus.pos, locus.allele1, locus.allele2
                ),
            )
            .into());
        }
        ids.push(self.loci.len());
        self.loci.push(locus);
        Ok(())
    }

    /// Table entry matching a genotype-file variant. Alleles match in either
    /// order; a missing (`0`) allele on the genotype side matches either
    /// table allele.
    pub fn find(
        &self,
        name: &str,
        chrom: &Chromosome,
        pos: u64,
        a1: &str,
        a2: &str,
    ) -> Option<usize> {
        self.by_name.get(name)?.iter().copied().find(|&id| {
            let l = &self.loci[id];
            if l.chrom != *chrom || l.pos != pos {
                return false;
            }
            let one_of = |a: &str| a == l.allele1 || a == l.allele2;
            match (a1 == "0", a2 == "0") {
                (false, true) => one_of(a1),
                (true, false) => one_of(a2),
                _ => {
                    (a1 == l.allele1 && a2 == l.allele2) || (a1 == l.allele2 && a2 == l.allele1)
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    pub fn into_loci(self) -> Vec<Locus> {
        self.loci
    }
}

/// Validate the header and locate the metric columns.
fn resolve_columns(columns: &[&str], source: &str, metrics: &[Metric]) -> Result<Vec<usize>> {
    for (i, expected) in REQUIRED_COLUMNS.iter().enumerate() {
        match columns.get(i) {
            Some(c) if c == expected => {}
            Some(c) => {
                return Err(PruneError::parse(
                    source,
                    1,
                    format!("column {} must be '{}', found '{}'", i + 1, expected, c),
                )
                .into())
            }
            None => {
                return Err(PruneError::parse(
                    source,
                    1,
                    format!("missing required column '{}'", expected),
                )
                .into())
            }
        }
    }
    for (i, c) in columns.iter().enumerate() {
        if columns[..i].contains(c) {
            return Err(PruneError::parse(source, 1, format!("duplicate column '{}'", c)).into());
        }
    }
    metrics
        .iter()
        .map(|m| {
            columns
                .iter()
                .position(|c| *c == m.name)
                .ok_or_else(|| {
                    anyhow::Error::from(PruneError::parse(
                        source,
                        1,
                        format!("metric column '{}' not found", m.name),
                    ))
                })
        })
        .collect()
}

fn parse_position(value: &str, source: &str, line: usize) -> Result<u64, PruneError> {
    match value.parse::<u64>() {
        Ok(pos) if pos >= 1 => Ok(pos),
        _ => Err(PruneError::parse(
            source,
            line,
            format!("invalid position '{}': must be a positive integer", value),
        )),
    }
}

fn parse_allele(
    value: &str,
    column: &str,
    source: &str,
    line: usize,
) -> Result<String, PruneError> {
    let allele = value.to_ascii_uppercase();
    if allele.is_empty() {
        return Err(PruneError::parse(source, line, format!("empty {} allele", column)));
    }
    Ok(allele)
}

fn parse_float(value: &str, column: &str, source: &str, line: usize) -> Result<f64, PruneError> {
    value.parse::<f64>().map_err(|_| {
        PruneError::parse(
            source,
            line,
            format!("invalid value '{}' in column '{}'", value, column),
        )
    })
}

fn parse_flag(value: &str, source: &str, line: usize) -> Result<bool, PruneError> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(PruneError::parse(
            source,
            line,
            format!("forceSelect must be 0 or 1, found '{}'", value),
        )),
    }
}

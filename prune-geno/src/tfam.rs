//! Transposed-pedigree family file (`.tfam`).
//!
//! Six whitespace-separated columns per individual:
//! family ID, individual ID, father, mother, sex, phenotype. Only founders
//! (both parents `0`) are supported.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use prune_core::error::PruneError;
use prune_core::sample::{Founder, Sex};

pub fn read_tfam<P: AsRef<Path>>(path: P) -> Result<Vec<Founder>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tfam file: {}", path.display()))?;
    let founders = parse_tfam(&contents, &path.display().to_string())?;

    let males = founders.iter().filter(|f| f.sex == Sex::Male).count();
    let females = founders.iter().filter(|f| f.sex == Sex::Female).count();
    let unknown = founders.len() - males - females;
    info!(
        "Read {} individuals from {} ({} males, {} females)",
        founders.len(),
        path.display(),
        males,
        females
    );
    if unknown > 0 {
        warn!("{} individuals have unspecified sex and are treated as diploid on X", unknown);
    }
    Ok(founders)
}

pub fn parse_tfam(contents: &str, source: &str) -> Result<Vec<Founder>> {
    let mut founders = Vec::new();
    let mut seen = HashSet::new();

    for (line_idx, line) in contents.lines().enumerate() {
        let line_num = line_idx + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(PruneError::parse(
                source,
                line_num,
                format!("expected 6 columns, found {}", fields.len()),
            )
            .into());
        }
        let (fid, iid) = (fields[0], fields[1]);
        if fields[2] != "0" || fields[3] != "0" {
            return Err(PruneError::parse(
                source,
                line_num,
                format!(
                    "individual {} {} is not a founder; only founders are supported",
                    fid, iid
                ),
            )
            .into());
        }
        let sex = match fields[4] {
            "1" => Sex::Male,
            "2" => Sex::Female,
            "0" | "-9" => Sex::Unknown,
            other => {
                return Err(PruneError::parse(
                    source,
                    line_num,
                    format!("invalid sex code '{}' for individual {} {}", other, fid, iid),
                )
                .into())
            }
        };
        if !seen.insert((fid.to_string(), iid.to_string())) {
            return Err(PruneError::parse(
                source,
                line_num,
                format!("duplicate individual {} {}", fid, iid),
            )
            .into());
        }
        founders.push(Founder::new(fid, iid, sex));
    }

    if founders.is_empty() {
        return Err(PruneError::parse(source, 1, "no individuals found").into());
    }
    Ok(founders)
}

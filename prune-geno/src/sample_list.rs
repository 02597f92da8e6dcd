//! Keep/remove sample lists: one individual per line, family ID and
//! individual ID in the first two columns. Extra columns are ignored.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use prune_core::error::PruneError;
use prune_core::sample::SampleSet;

pub fn read_sample_list<P: AsRef<Path>>(path: P) -> Result<SampleSet> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sample list: {}", path.display()))?;
    let set = parse_sample_list(&contents, &path.display().to_string())?;
    info!("Read {} individuals from {}", set.len(), path.display());
    Ok(set)
}

pub fn parse_sample_list(contents: &str, source: &str) -> Result<SampleSet> {
    let mut set = SampleSet::new();
    for (line_idx, line) in contents.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [] => continue,
            [fid, iid, ..] => {
                if !set.insert(fid, iid) {
                    warn!("{}: individual {} {} listed more than once", source, fid, iid);
                }
            }
            [_] => {
                return Err(PruneError::parse(
                    source,
                    line_idx + 1,
                    "expected family ID and individual ID",
                )
                .into())
            }
        }
    }
    Ok(set)
}

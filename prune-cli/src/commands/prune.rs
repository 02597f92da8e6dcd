//! Select tag SNPs from a candidate table.
//!
//! prioritypruner --tfile data --snp-table snps.txt --r2 0.8 --out results/run

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use prune_core::chrom::Chromosome;
use prune_core::config::PruneConfig;
use prune_core::panel::Panel;
use prune_core::pruner::{NoLdOutput, PruneSummary, Pruner};
use prune_core::sample::{apply_filter, kept_founders, SampleFilter};
use prune_core::threshold::Metric;
use prune_geno::output::{LdFileWriter, ResultsWriter};
use prune_geno::sample_list::read_sample_list;
use prune_geno::snp_table::SnpTable;
use prune_geno::tfam::read_tfam;
use prune_geno::tped::read_tped;

const DEFAULT_OUT: &str = "prioritypruner";

#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Transposed PED genotypes
    #[arg(long, required_unless_present = "tfile")]
    tped: Option<PathBuf>,

    /// Transposed family file
    #[arg(long, required_unless_present = "tfile")]
    tfam: Option<PathBuf>,

    /// Prefix of PREFIX.tped and PREFIX.tfam
    #[arg(long, value_name = "PREFIX", conflicts_with_all = ["tped", "tfam"])]
    tfile: Option<String>,

    /// Candidate SNP table
    #[arg(long, alias = "snp_table")]
    snp_table: PathBuf,

    /// Output prefix; a trailing '/' writes into that directory
    #[arg(long, default_value = DEFAULT_OUT)]
    out: String,

    /// Maximum distance in base pairs between an index SNP and its partners
    #[arg(long, alias = "max_distance", default_value = "500000")]
    max_distance: u64,

    /// Minimum minor allele frequency
    #[arg(long, alias = "min_maf", default_value = "0")]
    min_maf: f64,

    /// Minimum fraction of non-missing genotype calls
    #[arg(long, alias = "min_snp_callrate", default_value = "0.1")]
    min_snp_callrate: f64,

    /// Minimum design score for index and surrogate SNPs
    #[arg(long, alias = "min_design_score", default_value = "0")]
    min_design_score: f64,

    /// Weighted metric column used to rank surrogates (repeatable)
    #[arg(long, num_args = 2, value_names = ["NAME", "WEIGHT"], action = clap::ArgAction::Append)]
    metric: Vec<String>,

    /// Number of surrogates for index SNPs with p below P (repeatable)
    #[arg(long, num_args = 2, value_names = ["P", "N"], action = clap::ArgAction::Append)]
    st: Vec<String>,

    /// r² tagging threshold for index SNPs with p at most P (repeatable)
    #[arg(long, num_args = 2, value_names = ["P", "R2"], action = clap::ArgAction::Append)]
    r2t: Vec<String>,

    /// Single r² tagging threshold for every p-value
    #[arg(long, conflicts_with = "r2t", required_unless_present = "r2t")]
    r2: Option<f64>,

    /// Restrict the run to one chromosome
    #[arg(long, value_name = "LABEL")]
    chr: Option<String>,

    /// Visit force-included SNPs in p-value order instead of first
    #[arg(long, alias = "do_not_pick_force_included_first")]
    do_not_pick_force_included_first: bool,

    /// Do not pick surrogates for force-included index SNPs
    #[arg(long, alias = "no_surrogates_for_force_included_snps")]
    no_surrogates_for_force_included_snps: bool,

    /// Write every evaluated pair to OUT.ld
    #[arg(long)]
    ld: bool,

    /// Keep only the individuals listed in FILE
    #[arg(long, value_name = "FILE", conflicts_with_all = ["remove", "keep_random"])]
    keep: Option<PathBuf>,

    /// Drop the individuals listed in FILE
    #[arg(long, value_name = "FILE", conflicts_with = "keep_random")]
    remove: Option<PathBuf>,

    /// Keep a random fraction of individuals
    #[arg(long, alias = "keep_random", value_name = "F")]
    keep_random: Option<f64>,

    /// Seed for --keep-random
    #[arg(long)]
    seed: Option<u64>,
}

/// Input and output locations resolved from the arguments.
#[derive(Debug, Clone)]
struct Paths {
    tped: PathBuf,
    tfam: PathBuf,
    results: PathBuf,
    ld: PathBuf,
}

impl PruneArgs {
    /// Output prefix with the default file stem appended to directories.
    pub fn out_prefix(&self) -> String {
        if self.out.ends_with('/') {
            format!("{}{}", self.out, DEFAULT_OUT)
        } else {
            self.out.clone()
        }
    }

    fn paths(&self) -> Result<Paths> {
        let (tped, tfam) = match (&self.tfile, &self.tped, &self.tfam) {
            (Some(prefix), _, _) => (
                PathBuf::from(format!("{}.tped", prefix)),
                PathBuf::from(format!("{}.tfam", prefix)),
            ),
            (None, Some(tped), Some(tfam)) => (tped.clone(), tfam.clone()),
            _ => bail!("Must specify --tfile, or both --tped and --tfam"),
        };
        let out = self.out_prefix();
        Ok(Paths {
            tped,
            tfam,
            results: PathBuf::from(format!("{}.results", out)),
            ld: PathBuf::from(format!("{}.ld", out)),
        })
    }

    fn config(&self) -> Result<PruneConfig> {
        let mut config = PruneConfig {
            max_distance: self.max_distance,
            min_maf: self.min_maf,
            min_call_rate: self.min_snp_callrate,
            min_design_score: self.min_design_score,
            force_include_first: !self.do_not_pick_force_included_first,
            surrogates_for_force_included: !self.no_surrogates_for_force_included_snps,
            ..PruneConfig::default()
        };

        for pair in self.metric.chunks_exact(2) {
            let weight = parse_value::<f64>(&pair[1], "--metric weight")?;
            config.metrics.push(Metric::new(pair[0].as_str(), weight));
        }
        for pair in self.st.chunks_exact(2) {
            let p = parse_value::<f64>(&pair[0], "--st p-value")?;
            let n = parse_value::<usize>(&pair[1], "--st surrogate count")?;
            config.surrogate_thresholds.add(p, n);
        }
        for pair in self.r2t.chunks_exact(2) {
            let p = parse_value::<f64>(&pair[0], "--r2t p-value")?;
            let r2 = parse_value::<f64>(&pair[1], "--r2t r^2")?;
            config.r2_thresholds.add(p, r2);
        }
        if let Some(r2) = self.r2 {
            config.r2_thresholds.add(1.0, r2);
        }
        if let Some(label) = &self.chr {
            config.chromosome = Some(Chromosome::parse(label)?);
        }

        config.validate()?;
        Ok(config)
    }

    fn sample_filter(&self) -> Result<SampleFilter> {
        let filter = if let Some(path) = &self.keep {
            SampleFilter::Keep(read_sample_list(path)?)
        } else if let Some(path) = &self.remove {
            SampleFilter::Remove(read_sample_list(path)?)
        } else if let Some(fraction) = self.keep_random {
            SampleFilter::KeepRandom {
                fraction,
                seed: self.seed,
            }
        } else {
            SampleFilter::All
        };
        Ok(filter)
    }
}

fn parse_value<T: std::str::FromStr>(value: &str, what: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("Invalid {}: '{}'", what, value))
}

pub fn run(args: PruneArgs) -> Result<()> {
    info!("=== PriorityPruner: LD pruning ===");
    let start = Instant::now();

    let paths = args.paths()?;
    let config = args.config()?;
    info!(
        "Options in effect:\n{}",
        serde_json::to_string_pretty(&config).context("Failed to serialize options")?
    );
    info!("Genotypes: {} / {}", paths.tped.display(), paths.tfam.display());
    info!("SNP table: {}", args.snp_table.display());

    let individuals = read_tfam(&paths.tfam)?;
    let mask = apply_filter(&individuals, &args.sample_filter()?)?;
    let founders = kept_founders(&individuals, &mask);

    let table = SnpTable::read(&args.snp_table, &config.metrics, config.chromosome.as_ref())?;
    let genotypes = read_tped(&paths.tped, &mask, &table, config.chromosome.as_ref())?;

    let mut panel = Panel::new(table.into_loci(), genotypes, founders)?;
    info!("Computing allele statistics for {} SNPs...", panel.len());
    let filter = panel.compute_statistics(config.min_maf, config.min_call_rate);
    if filter.valid == 0 {
        info!("No SNPs passed the MAF and call-rate filters");
    }

    info!("Pruning...");
    let mut pruner = Pruner::new(&panel, &config);
    let summary: PruneSummary = if args.ld {
        let mut writer = LdFileWriter::create(&paths.ld)?;
        let summary = pruner.run(&mut writer)?;
        let rows = writer.finish()?;
        info!("Wrote {} LD pairs to {}", rows, paths.ld.display());
        summary
    } else {
        pruner.run(&mut NoLdOutput)?
    };

    ResultsWriter::write(&paths.results, &panel, pruner.order(), pruner.states())?;

    info!(
        "Selected {} SNPs ({} index SNPs); {} of {} SNPs tagged",
        summary.picked,
        summary.index_snps,
        summary.tagged,
        panel.len()
    );
    info!("Results written to {}", paths.results.display());
    info!("Finished in {:.2?}", start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: PruneArgs,
    }

    fn parse(argv: &[&str]) -> Result<PruneArgs, clap::Error> {
        let mut full = vec!["prioritypruner"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).map(|c| c.args)
    }

    #[test]
    fn test_tfile_expands_to_both_inputs() {
        let args = parse(&["--tfile", "data/run", "--snp-table", "s.txt", "--r2", "0.8"]).unwrap();
        let paths = args.paths().unwrap();
        assert_eq!(paths.tped, PathBuf::from("data/run.tped"));
        assert_eq!(paths.tfam, PathBuf::from("data/run.tfam"));
        assert_eq!(paths.results, PathBuf::from("prioritypruner.results"));
    }

    #[test]
    fn test_out_directory_gets_default_stem() {
        let args = parse(&[
            "--tfile", "d", "--snp-table", "s", "--r2", "0.8", "--out", "results/",
        ])
        .unwrap();
        assert_eq!(args.out_prefix(), "results/prioritypruner");
        assert_eq!(args.paths().unwrap().ld, PathBuf::from("results/prioritypruner.ld"));
    }

    #[test]
    fn test_conflicting_inputs_rejected() {
        assert!(
            parse(&["--tfile", "d", "--tped", "x.tped", "--snp-table", "s", "--r2", "0.8"]).is_err()
        );
        assert!(parse(&[
            "--tfile", "d", "--snp-table", "s", "--r2", "0.8", "--r2t", "0.01", "0.5",
        ])
        .is_err());
        assert!(parse(&["--tfile", "d", "--snp-table", "s"]).is_err());
        assert!(parse(&[
            "--tfile", "d", "--snp-table", "s", "--r2", "0.8", "--keep", "k", "--remove", "r",
        ])
        .is_err());
        assert!(parse(&["--tped", "x.tped", "--snp-table", "s", "--r2", "0.8"]).is_err());
    }

    #[test]
    fn test_config_from_repeated_options() {
        let args = parse(&[
            "--tfile", "d", "--snp-table", "s",
            "--r2t", "0.01", "0.5", "--r2t", "1", "0.8",
            "--st", "1e-4", "2",
            "--metric", "quality", "2", "--metric", "coverage", "0.5",
            "--chr", "chr23",
            "--do-not-pick-force-included-first",
        ])
        .unwrap();
        let config = args.config().unwrap();
        assert_eq!(config.r2_thresholds.entries(), &[(0.01, 0.5), (1.0, 0.8)]);
        assert_eq!(config.surrogate_thresholds.lookup(1e-5), 2);
        assert_eq!(config.metric_names(), vec!["quality", "coverage"]);
        assert!(config.chromosome.as_ref().unwrap().is_x());
        assert!(!config.force_include_first);
        assert!(config.surrogates_for_force_included);
    }

    #[test]
    fn test_snake_case_option_names_accepted() {
        let args = parse(&[
            "--tfile", "d", "--snp_table", "s.txt", "--r2", "0.8",
            "--max_distance", "1000",
            "--min_maf", "0.05",
            "--min_snp_callrate", "0.9",
            "--min_design_score", "0.5",
            "--do_not_pick_force_included_first",
            "--no_surrogates_for_force_included_snps",
            "--keep_random", "0.5",
        ])
        .unwrap();
        assert_eq!(args.snp_table, PathBuf::from("s.txt"));
        assert_eq!(args.keep_random, Some(0.5));
        let config = args.config().unwrap();
        assert_eq!(config.max_distance, 1000);
        assert_eq!(config.min_maf, 0.05);
        assert_eq!(config.min_call_rate, 0.9);
        assert_eq!(config.min_design_score, 0.5);
        assert!(!config.force_include_first);
        assert!(!config.surrogates_for_force_included);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let bad_maf = parse(&[
            "--tfile", "d", "--snp-table", "s", "--r2", "0.8", "--min-maf", "0.7",
        ])
        .unwrap();
        assert!(bad_maf.config().is_err());
        let reserved = parse(&[
            "--tfile", "d", "--snp-table", "s", "--r2", "0.8", "--metric", "design_score", "1",
        ])
        .unwrap();
        assert!(reserved.config().is_err());
        let bad_weight = parse(&[
            "--tfile", "d", "--snp-table", "s", "--r2", "0.8", "--metric", "q", "heavy",
        ])
        .unwrap();
        assert!(bad_weight.config().is_err());
    }
}

//! prioritypruner: priority-ordered LD pruning of SNP panels.
//!
//! CLI entry point using clap for argument parsing.

mod commands;

use std::fs::File;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "prioritypruner",
    version,
    about = "Select tag SNPs by p-value priority and pairwise LD",
    long_about = "Greedily picks index SNPs in priority order, chooses surrogates among their\n\
                  strongest LD partners and marks every partner above the r² threshold as tagged."
)]
struct Cli {
    /// Number of threads to use
    #[arg(long, default_value = "1", global = true)]
    threads: usize,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    prune: commands::prune::PruneArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging: stderr plus an uncoloured copy in <out>.log
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let log_path = format!("{}.log", cli.prune.out_prefix());
    let log_file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file: {}", log_path))?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    // Set up thread pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()
        .ok();

    tracing::info!("prioritypruner v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Using {} threads", cli.threads);
    tracing::info!("Log written to {}", log_path);

    let result = commands::prune::run(cli.prune);
    if let Err(ref e) = result {
        tracing::error!("{:#}", e);
    }
    result
}

//! CLI for the mailprobe availability checker.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mailprobe_core::config;
use std::path::PathBuf;

use commands::{run_archive, run_filter, run_probe, run_status};

/// Top-level CLI for the mailprobe availability checker.
#[derive(Debug, Parser)]
#[command(name = "mailprobe")]
#[command(about = "mailprobe: concurrent, resumable email availability checker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Probe every identifier in the input file, skipping recorded outcomes.
    Run {
        /// Input file with one identifier per line.
        #[arg(long, default_value = "emails.txt", value_name = "FILE")]
        input: PathBuf,
        /// Concurrent probes (default from config, hard-capped by the engine).
        #[arg(long, value_name = "N")]
        threads: Option<usize>,
        /// Tag result files and archive bundles with this keyword.
        #[arg(long, value_name = "WORD")]
        keyword: Option<String>,
        /// Discard recorded outcomes and probe the whole input again.
        #[arg(long)]
        fresh: bool,
        /// Enable the periodic archive/upload cycle for this run.
        #[arg(long)]
        archive: bool,
        /// Seconds between archive ticks (default from config).
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },

    /// Extract addresses for one domain from a file, in place.
    Filter {
        /// File to filter and rewrite.
        #[arg(long, default_value = "emails.txt", value_name = "FILE")]
        input: PathBuf,
        /// Domain whose addresses to keep.
        #[arg(long, default_value = "hotmail.com", value_name = "DOMAIN")]
        domain: String,
    },

    /// Show how many outcomes are recorded per category.
    Status {
        /// Keyword tag of the result files to inspect.
        #[arg(long, value_name = "WORD")]
        keyword: Option<String>,
    },

    /// Bundle and upload the current result files once, right now.
    Archive {
        /// Input file to include in the bundle.
        #[arg(long, default_value = "emails.txt", value_name = "FILE")]
        input: PathBuf,
        /// Keyword tag of the result files to bundle.
        #[arg(long, value_name = "WORD")]
        keyword: Option<String>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                input,
                threads,
                keyword,
                fresh,
                archive,
                interval,
            } => run_probe(&cfg, input, threads, keyword, fresh, archive, interval).await?,
            CliCommand::Filter { input, domain } => run_filter(&input, &domain)?,
            CliCommand::Status { keyword } => run_status(keyword.as_deref())?,
            CliCommand::Archive { input, keyword } => {
                run_archive(&cfg, input, keyword).await?;
            }
        }

        Ok(())
    }
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use recopress::{SiteBuilder, SiteConfig};

#[derive(Parser)]
#[command(name = "recopress", about = "Static blog and documentation site builder", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site bundle
    Build {
        /// Source directory containing Markdown documents
        #[arg(default_value = ".")]
        source: PathBuf,
        /// Output directory for the published bundle
        #[arg(short, long, default_value = "dist")]
        output: PathBuf,
        /// Site configuration file
        #[arg(short, long, default_value = "site.yaml")]
        config: PathBuf,
        /// Number of parallel jobs (defaults to available cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
    /// Remove the published bundle
    Clean {
        #[arg(short, long, default_value = "dist")]
        output: PathBuf,
    },
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            source,
            output,
            config,
            jobs,
        } => {
            let config = SiteConfig::from_file(&config)?;
            let mut builder = SiteBuilder::new(config, source, output);
            if let Some(jobs) = jobs {
                builder.set_parallel_jobs(jobs);
            }
            let stats = builder.build()?;
            info!(
                "Built {} pages from {} documents in {:?} ({:.2} MB, {} search tokens)",
                stats.pages_built,
                stats.documents_loaded,
                stats.build_time,
                stats.output_size_mb,
                stats.search_tokens
            );
            Ok(())
        }
        Command::Clean { output } => {
            let builder = SiteBuilder::new(SiteConfig::default(), PathBuf::from("."), output);
            builder.clean()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Build failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

// Review Cascade - command line entry point

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use review_cascade::{ConfigOverrides, MergeStrategy, ReviewConfig, ReviewPipeline};

#[derive(Parser, Debug)]
#[command(name = "review-cascade")]
#[command(about = "LLM-assisted code style, DRY and security review for Python and SQL files")]
#[command(version)]
struct Args {
    /// Files or directories to review
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory the JSON report is written to
    #[arg(long, short = 'o')]
    output_dir: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Merge strategy for the code style reports (llm or mechanical)
    #[arg(long)]
    merge: Option<MergeStrategy>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Seconds to wait after a rate-limit response
    #[arg(long)]
    cooldown_secs: Option<u64>,

    /// Give up on a call after this many rate-limited attempts
    #[arg(long)]
    max_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether every file/category succeeded.
async fn run() -> Result<bool> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.parse().unwrap_or_default()),
        )
        .init();

    let mut config = ReviewConfig::load(args.config.as_deref()).context("loading configuration")?;
    config.apply_overrides(ConfigOverrides {
        output_dir: args.output_dir,
        merge_strategy: args.merge,
        model: args.model,
        cooldown_secs: args.cooldown_secs,
        max_attempts: args.max_attempts,
    });

    info!(
        "Starting review-cascade v{} (model {}, merge {:?})",
        env!("CARGO_PKG_VERSION"),
        config.llm.model,
        config.merge_strategy
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling review");
                cancel.cancel();
            }
        });
    }

    let pipeline = ReviewPipeline::from_config(config, cancel)?;
    let summary = pipeline.run(&args.paths).await?;

    println!("Reviewed {} file(s)", summary.files_reviewed);
    for row in &summary.report.outcomes {
        match &row.outcome {
            review_cascade::FileOutcome::Succeeded => {
                println!("  ok      {} [{}]", row.filename, row.category)
            }
            review_cascade::FileOutcome::Failed { reason } => {
                println!("  FAILED  {} [{}]: {}", row.filename, row.category, reason)
            }
        }
    }
    if let Some(overall) = summary.report.repository.last() {
        match overall.ai_review_score {
            Some(score) => println!(
                "Overall: {} violation(s), score {:.2}/8",
                overall.vulnerabilities_flagged, score
            ),
            None => println!(
                "Overall: {} violation(s), no score",
                overall.vulnerabilities_flagged
            ),
        }
    }
    println!("Report: {}", summary.report_path.display());

    if !summary.failed_files.is_empty() {
        warn!(failed = summary.failed_files.len(), "Some files failed review");
    }
    Ok(summary.failed_files.is_empty())
}

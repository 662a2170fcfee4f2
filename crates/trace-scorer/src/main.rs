//! trace-scorer: score recorded generation results with LogTokU and the
//! token-confidence baselines.
//!
//! Each input file is a JSON `GenerationOutput` (`sequences`, `scores`,
//! `prompt_len`) dumped by the generation harness. One JSON report is written
//! to stdout per file.
//!
//! Usage:
//!   trace-scorer --kappa 10 out/answer_01.json out/answer_02.json
//!   trace-scorer --kappa 5 --top-k 3 --parallel --pretty trace.json
//!
//! Settings fall back to LOGTOKU_* environment variables (a `.env` file is
//! honoured) when no flag is given.

use anyhow::{bail, Result};
use token_uncertainty::LogTokU;

mod config;
mod report;

use config::{CliArgs, ScorerConfig};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = CliArgs::parse(&args)?;
    if cli.files.is_empty() {
        print_usage();
        std::process::exit(2);
    }

    let config = ScorerConfig::from_lookup(cli.lookup(|key| std::env::var(key).ok()))?;
    tracing::info!(
        kappa = config.logtoku.kappa,
        top_k_inconfident = ?config.logtoku.top_k_inconfident,
        degenerate_policy = %config.logtoku.degenerate_policy,
        parallel = config.logtoku.parallel,
        files = cli.files.len(),
        "Scoring recorded generations"
    );

    let estimator = LogTokU::new(config.logtoku.clone())?;
    let mut failed = 0usize;
    for path in &cli.files {
        match report::score_file(&estimator, path) {
            Ok(scored) => {
                println!("{}", report::render(&scored, config.pretty)?);
                tracing::info!(
                    source = %scored.source,
                    tokens = scored.generated_tokens,
                    naive = scored.uncertainty.naive,
                    vanilla = scored.uncertainty.vanilla,
                    unreliability = scored.uncertainty.unreliability_total,
                    "Scored"
                );
            }
            Err(e) => {
                failed += 1;
                tracing::warn!("Skipping {}: {:#}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} inputs could not be scored", failed, cli.files.len());
    }
    Ok(())
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Reports own stdout; logs go to stderr
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  trace-scorer [OPTIONS] FILE...");
    eprintln!();
    eprintln!("Options (each falls back to the environment variable shown):");
    eprintln!("  --kappa N             Evidence width κ (LOGTOKU_KAPPA, required)");
    eprintln!("  --top-k N             Average the N most unreliable steps");
    eprintln!("                        (LOGTOKU_TOP_K_INCONFIDENT)");
    eprintln!("  --degenerate POLICY   max_epistemic (alias: fallback) | reject (alias: error)");
    eprintln!("                        (LOGTOKU_DEGENERATE_POLICY)");
    eprintln!("  --parallel            Evaluate steps on all cores (LOGTOKU_PARALLEL)");
    eprintln!("  --pretty              Pretty-print reports (TRACE_SCORER_PRETTY)");
}

//! complaint-zinb - command-line entry point

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use complaint_zinb::comparison::InformationCriterion;
use complaint_zinb::core::{RegressionOptions, SeparationPolicy};
use complaint_zinb::diagnostics::DiagnosticOptions;
use complaint_zinb::pipeline::{AnalysisPipeline, PipelineConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "complaint-zinb")]
#[command(about = "Diagnostics and zero-inflated negative binomial models for complaint counts")]
#[command(version)]
struct Cli {
    /// Tab-separated input with visits, complaints, residency, gender, revenue, hours
    #[arg(default_value = "data/complaints.tsv")]
    path: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Significance level of the diagnostic tests
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,

    /// Iteration cap of the likelihood maximization
    #[arg(long, default_value_t = 1000)]
    max_iterations: usize,

    /// What to do with separating zero-model predictors: drop, fail or ignore
    #[arg(long, default_value = "drop")]
    separation_policy: SeparationPolicy,

    /// Ranking criterion: aic or bic
    #[arg(long, default_value = "aic")]
    criterion: InformationCriterion,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = PipelineConfig {
        diagnostics: DiagnosticOptions::builder()
            .alpha(cli.alpha)
            .build()
            .context("invalid diagnostic options")?,
        regression: RegressionOptions::builder()
            .max_iterations(cli.max_iterations)
            .build()
            .context("invalid regression options")?,
        separation_policy: cli.separation_policy,
        criterion: cli.criterion,
        ..PipelineConfig::default()
    };

    let report = AnalysisPipeline::new(config)
        .run(&cli.path)
        .with_context(|| format!("analysis of {} failed", cli.path.display()))?;

    match cli.format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
            println!("{json}");
        }
    }

    Ok(())
}

//! riskq CLI - Command Line Operations for Risk Quantification
//!
//! This is the operational entry point for the quant_risk engines.
//!
//! # Commands
//!
//! - `riskq summary --scenarios <file>` - Build the executive report for a catalogue
//! - `riskq validate --estimate <file>` - Validate a Hubbard 5-point estimate
//! - `riskq calibrate` - Run a calibration training session
//! - `riskq templates` - List or apply industry scenario templates
//! - `riskq check` - Check the effective configuration
//!
//! # Architecture
//!
//! As part of the **S**ervice layer, this crate wires configuration,
//! logging and file I/O around the L2 engines.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;

use commands::calibrate::{CalibrateArgs, ExpertiseArg};
use commands::summary::ReportLabels;
use commands::OutputFormat;
use config::{build_config, CliArgs};
pub use error::{CliError, Result};

/// Risk quantification CLI
#[derive(Parser)]
#[command(name = "riskq")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (falls back to RISKQ_CONFIG, then ./riskq.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the executive report for a scenario catalogue
    Summary {
        /// Path to scenario catalogue (JSON array)
        #[arg(short, long)]
        scenarios: PathBuf,

        /// Path to an externally computed Monte Carlo result (JSON)
        #[arg(short, long)]
        monte_carlo: Option<PathBuf>,

        /// Organisation named in the report
        #[arg(long, default_value = "")]
        organization: String,

        /// Report type label
        #[arg(short = 't', long, default_value = "executive")]
        report_type: String,

        /// Reporting period label
        #[arg(short, long, default_value = "")]
        period: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a Hubbard 5-point estimate
    Validate {
        /// Path to estimate draft (JSON)
        #[arg(short, long)]
        estimate: PathBuf,

        /// Fit a distribution (beta-pert, lognormal, triangular)
        #[arg(long)]
        fit: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a calibration training session
    Calibrate {
        /// Estimator being trained
        #[arg(short, long, default_value = "trainee")]
        estimator: String,

        /// Number of questions to pose
        #[arg(short = 'n', long, default_value = "10")]
        questions: usize,

        /// Expertise of the simulated estimator
        #[arg(long, value_enum, default_value = "novice")]
        expertise: ExpertiseArg,

        /// Seed for question selection and simulated answers
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Score recorded answers (JSON) instead of simulating
        #[arg(short, long)]
        responses: Option<PathBuf>,

        /// Output format (json or table)
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List industry templates, or apply one to a catalogue
    Templates {
        /// Template id to apply
        #[arg(short, long)]
        apply: Option<String>,

        /// Existing catalogue to extend (JSON array)
        #[arg(short, long, requires = "apply")]
        scenarios: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the effective configuration
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Some("debug".to_string())
    } else {
        cli.log_level.clone()
    };
    let config = build_config(&CliArgs {
        config_file: cli.config.clone(),
        log_level,
    })?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter_str()));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }
    debug!(?config, "Effective configuration");

    let quant = &config.quant;
    match cli.command {
        Commands::Summary {
            scenarios,
            monte_carlo,
            organization,
            report_type,
            period,
            format,
            output,
        } => commands::summary::run(
            quant,
            &scenarios,
            monte_carlo.as_deref(),
            &ReportLabels {
                organization,
                report_type,
                period,
            },
            format,
            output.as_deref(),
        ),
        Commands::Validate {
            estimate,
            fit,
            output,
        } => commands::validate::run(quant, &estimate, fit.as_deref(), output.as_deref()),
        Commands::Calibrate {
            estimator,
            questions,
            expertise,
            seed,
            responses,
            format,
            output,
        } => commands::calibrate::run(
            quant,
            &CalibrateArgs {
                estimator: &estimator,
                questions,
                expertise,
                seed,
                responses: responses.as_deref(),
            },
            format,
            output.as_deref(),
        ),
        Commands::Templates {
            apply,
            scenarios,
            output,
        } => commands::templates::run(apply.as_deref(), scenarios.as_deref(), output.as_deref()),
        Commands::Check => commands::check::run(&config),
    }
}

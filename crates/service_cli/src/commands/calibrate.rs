//! Calibrate command implementation
//!
//! Runs a calibration training session against the built-in question bank,
//! either with a seeded simulated estimator or by scoring recorded answers.

use clap::ValueEnum;
use quant_core::{ClaimedRange, Expertise, QuantConfig};
use quant_risk::estimation::{
    CalibrationQuestion, CalibrationReport, CalibrationTrainer, IntervalAdjustment,
    SimulatedResponder, TrainingRng,
};
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::{open_output, read_json, OutputFormat};
use crate::{CliError, Result};

/// Expertise of the simulated estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExpertiseArg {
    #[default]
    Novice,
    Experienced,
    Expert,
    WorldClass,
}

impl From<ExpertiseArg> for Expertise {
    fn from(arg: ExpertiseArg) -> Self {
        match arg {
            ExpertiseArg::Novice => Expertise::Novice,
            ExpertiseArg::Experienced => Expertise::Experienced,
            ExpertiseArg::Expert => Expertise::Expert,
            ExpertiseArg::WorldClass => Expertise::WorldClass,
        }
    }
}

/// One recorded answer: the question plus the interval the estimator gave
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResponse {
    #[serde(flatten)]
    pub question: CalibrationQuestion,
    pub lower: f64,
    pub upper: f64,
}

/// Session settings from the command line
#[derive(Debug, Clone)]
pub struct CalibrateArgs<'a> {
    pub estimator: &'a str,
    pub questions: usize,
    pub expertise: ExpertiseArg,
    pub seed: u64,
    pub responses: Option<&'a Path>,
}

/// Run the calibrate command
pub fn run(
    config: &QuantConfig,
    args: &CalibrateArgs<'_>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    info!("Starting calibration training...");
    info!("  Estimator: {}", args.estimator);

    let report = match args.responses {
        Some(path) => {
            info!("  Scoring recorded responses: {}", path.display());
            let recorded: Vec<RecordedResponse> = read_json(path)?;
            score_recorded(config, args.estimator, recorded)?
        }
        None => {
            info!("  Simulated expertise: {:?}", args.expertise);
            info!("  Questions: {}", args.questions);
            info!("  Seed: {}", args.seed);
            simulate(config, args)?
        }
    };

    let mut out = open_output(output)?;
    write_report(&report, format, &mut out)?;
    out.flush()?;

    info!("Calibration complete");
    Ok(())
}

/// Simulated session over the built-in bank
pub fn simulate(config: &QuantConfig, args: &CalibrateArgs<'_>) -> Result<CalibrationReport> {
    let trainer = CalibrationTrainer::new(config.calibration);
    let mut rng = TrainingRng::from_seed(args.seed);
    let mut responder = SimulatedResponder::new(args.expertise.into(), args.seed);
    let session = trainer.run(args.estimator, args.questions, &mut responder, &mut rng)?;
    Ok(CalibrationReport::from_session(&session, &config.calibration))
}

/// Score answers collected outside the CLI
pub fn score_recorded(
    config: &QuantConfig,
    estimator: &str,
    recorded: Vec<RecordedResponse>,
) -> Result<CalibrationReport> {
    let trainer = CalibrationTrainer::new(config.calibration);
    let responses: Vec<(CalibrationQuestion, ClaimedRange)> = recorded
        .into_iter()
        .map(|r| (r.question, ClaimedRange::new(r.lower, r.upper)))
        .collect();
    let session = trainer.score(estimator, &responses)?;
    Ok(CalibrationReport::from_session(&session, &config.calibration))
}

fn write_report<W: Write>(
    report: &CalibrationReport,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
        }
        OutputFormat::Csv => {
            return Err(CliError::InvalidArgument(
                "calibration reports support json and table output".to_string(),
            ));
        }
        OutputFormat::Table => {
            writeln!(out, "Estimator:           {}", report.estimator)?;
            writeln!(out, "Questions:           {}", report.questions)?;
            writeln!(out, "Accuracy:            {:.1}%", report.accuracy * 100.0)?;
            writeln!(
                out,
                "Overconfidence rate: {:.1}%",
                report.overconfidence_rate * 100.0
            )?;
            writeln!(
                out,
                "Wide-miss rate:      {:.1}%",
                report.underconfidence_rate * 100.0
            )?;
            writeln!(out, "Calibration gap:     {:+.3}", report.calibration_gap)?;
            writeln!(out, "Calibration level:   {}", report.calibration_level)?;
            let advice = match report.recommended_adjustment {
                Some(IntervalAdjustment::Widen(f)) => format!("widen intervals by x{:.2}", f),
                Some(IntervalAdjustment::Narrow(f)) => format!("narrow intervals by x{:.2}", f),
                None => "keep current interval widths".to_string(),
            };
            writeln!(out, "Adjustment:          {}", advice)?;
        }
    }
    Ok(())
}

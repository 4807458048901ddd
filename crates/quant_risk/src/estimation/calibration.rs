//! Calibration training.
//!
//! A trainer poses questions with known answers, collects the interval an
//! estimator claims contains each answer, and scores the responses into an
//! immutable [`CalibrationSession`].
//!
//! # Scoring
//!
//! For each exercise:
//! - `was_correct`: the true value lies in the claimed (closed) interval
//! - `overconfident`: a miss whose interval was narrower than
//!   `narrow_interval_factor × expected_width`, where
//!   `expected_width = 2·|true − midpoint| / confidence_level`
//!
//! Any other miss counts towards the underconfidence rate.
//!
//! A well-calibrated estimator answering at 90% confidence should score an
//! accuracy of about 0.9 over many sessions. This is an interpretation
//! aid, not a pass/fail gate.

use super::rng::TrainingRng;
use quant_core::calibration::{
    CalibrationExercise, CalibrationLevel, CalibrationSession, ClaimedRange,
};
use quant_core::config::CalibrationConfig;
use quant_core::estimate::Expertise;
use quant_core::{QuantError, QuantResult};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Question with a known answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationQuestion {
    /// Question text
    pub question: String,
    /// Known answer
    pub true_value: f64,
    /// Unit of the answer
    #[serde(default)]
    pub unit: String,
}

impl CalibrationQuestion {
    /// Create a question.
    pub fn new(question: impl Into<String>, true_value: f64, unit: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            true_value,
            unit: unit.into(),
        }
    }
}

/// Built-in general-knowledge question bank.
pub fn question_bank() -> Vec<CalibrationQuestion> {
    vec![
        CalibrationQuestion::new("What is the population of Tokyo?", 13.96, "million people"),
        CalibrationQuestion::new("In what year was the first iPhone released?", 2007.0, "year"),
        CalibrationQuestion::new("What is the speed of light?", 299.79, "million m/s"),
        CalibrationQuestion::new("In what year did the Berlin Wall fall?", 1989.0, "year"),
        CalibrationQuestion::new("How high is Mount Everest?", 8849.0, "m"),
        CalibrationQuestion::new("How many bones are in the adult human body?", 206.0, "bones"),
        CalibrationQuestion::new(
            "What is the mean distance from the Earth to the Moon?",
            384.4,
            "thousand km",
        ),
        CalibrationQuestion::new(
            "In what year did the first crewed Moon landing take place?",
            1969.0,
            "year",
        ),
        CalibrationQuestion::new("What is the equatorial diameter of the Earth?", 12756.0, "km"),
        CalibrationQuestion::new("What is the atomic number of gold?", 79.0, "atomic number"),
        CalibrationQuestion::new("In what year did the Wright brothers first fly?", 1903.0, "year"),
        CalibrationQuestion::new("At what temperature does water boil at sea level?", 212.0, "°F"),
        CalibrationQuestion::new(
            "How many member states does the United Nations have?",
            193.0,
            "states",
        ),
        CalibrationQuestion::new(
            "In what year was the 1.0 version of the Rust language released?",
            2015.0,
            "year",
        ),
    ]
}

/// Source of the intervals an estimator claims.
pub trait CalibrationResponder {
    /// Interval the estimator claims contains the answer with
    /// `confidence_level` probability.
    fn respond(&mut self, question: &CalibrationQuestion, confidence_level: f64) -> ClaimedRange;
}

impl<F> CalibrationResponder for F
where
    F: FnMut(&CalibrationQuestion, f64) -> ClaimedRange,
{
    fn respond(&mut self, question: &CalibrationQuestion, confidence_level: f64) -> ClaimedRange {
        self(question, confidence_level)
    }
}

/// Seeded stand-in for a human estimator.
///
/// The point guess carries normal noise with standard deviation
/// `relative_error × |true value|`. A perfectly calibrated respondent would
/// put `z(confidence) × σ` either side of the guess; the claimed half-width
/// is that figure scaled by an expertise factor below one, so lower
/// expertise gives narrower (overconfident) intervals.
#[derive(Debug, Clone)]
pub struct SimulatedResponder {
    expertise: Expertise,
    relative_error: f64,
    rng: TrainingRng,
}

impl SimulatedResponder {
    /// Default relative error of the point guess.
    pub const DEFAULT_RELATIVE_ERROR: f64 = 0.1;

    /// Create a responder with the given expertise and seed.
    pub fn new(expertise: Expertise, seed: u64) -> Self {
        Self {
            expertise,
            relative_error: Self::DEFAULT_RELATIVE_ERROR,
            rng: TrainingRng::from_seed(seed),
        }
    }

    /// Override the relative error of the point guess.
    pub fn with_relative_error(mut self, relative_error: f64) -> Self {
        self.relative_error = relative_error.abs();
        self
    }

    fn width_factor(&self) -> f64 {
        match self.expertise {
            Expertise::Novice => 0.4,
            Expertise::Experienced => 0.7,
            Expertise::Expert => 0.9,
            Expertise::WorldClass => 1.0,
        }
    }
}

impl CalibrationResponder for SimulatedResponder {
    fn respond(&mut self, question: &CalibrationQuestion, confidence_level: f64) -> ClaimedRange {
        let scale = question.true_value.abs().max(f64::MIN_POSITIVE);
        let sigma = self.relative_error * scale;
        let guess = match Normal::new(question.true_value, sigma) {
            Ok(noise) => self.rng.sample(&noise),
            Err(_) => question.true_value,
        };
        let two_sided = 0.5 + confidence_level.clamp(0.0, 0.999_999) / 2.0;
        let half_width = normal_quantile(two_sided) * sigma * self.width_factor();
        ClaimedRange::new(guess - half_width, guess + half_width)
    }
}

/// Interval adjustment recommended after a session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "direction", content = "factor", rename_all = "snake_case")]
pub enum IntervalAdjustment {
    /// Multiply interval widths by the factor (> 1)
    Widen(f64),
    /// Multiply interval widths by the factor (< 1)
    Narrow(f64),
}

impl IntervalAdjustment {
    /// Width multiplier.
    pub fn factor(&self) -> f64 {
        match self {
            Self::Widen(f) | Self::Narrow(f) => *f,
        }
    }
}

/// Scored summary of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationReport {
    /// Trainee
    pub estimator: String,
    /// Number of exercises
    pub questions: usize,
    /// Share of answers inside the claimed interval
    pub accuracy: f64,
    /// Share of exercises flagged overconfident
    pub overconfidence_rate: f64,
    /// Share of exercises missed with an interval that was not too narrow
    pub underconfidence_rate: f64,
    /// `accuracy - confidence_level`
    pub calibration_gap: f64,
    /// Grade derived from accuracy
    pub calibration_level: CalibrationLevel,
    /// Suggested change to interval widths, if any
    pub recommended_adjustment: Option<IntervalAdjustment>,
}

impl CalibrationReport {
    /// Summarise a session.
    pub fn from_session(session: &CalibrationSession, config: &CalibrationConfig) -> Self {
        Self {
            estimator: session.estimator().to_string(),
            questions: session.len(),
            accuracy: session.accuracy(),
            overconfidence_rate: session.overconfidence_rate(),
            underconfidence_rate: session.underconfidence_rate(),
            calibration_gap: session.calibration_gap(),
            calibration_level: session.calibration_level(),
            recommended_adjustment: recommended_adjustment(session, config),
        }
    }
}

/// Narrow when wide misses exceed the underconfidence trigger; otherwise
/// widen when overconfident misses exceed the adjustment trigger.
///
/// Both rates can exceed their triggers in one session; narrowing wins.
pub fn recommended_adjustment(
    session: &CalibrationSession,
    config: &CalibrationConfig,
) -> Option<IntervalAdjustment> {
    if session.is_empty() {
        return None;
    }
    if session.underconfidence_rate() > config.underconfidence_trigger_rate {
        Some(IntervalAdjustment::Narrow(config.narrow_factor))
    } else if session.overconfidence_rate() > config.adjustment_trigger_rate {
        Some(IntervalAdjustment::Widen(config.widen_factor))
    } else {
        None
    }
}

/// Score one response.
pub fn score_exercise(
    question: &CalibrationQuestion,
    claimed_range: ClaimedRange,
    config: &CalibrationConfig,
) -> CalibrationExercise {
    let was_correct = claimed_range.contains(question.true_value);
    let expected_width =
        2.0 * (question.true_value - claimed_range.midpoint()).abs() / config.confidence_level;
    let narrow = claimed_range.width() < config.narrow_interval_factor * expected_width;
    CalibrationExercise {
        question: question.question.clone(),
        true_value: question.true_value,
        claimed_range,
        was_correct,
        overconfident: !was_correct && narrow,
    }
}

/// Poses questions and scores the answers.
#[derive(Clone, Debug)]
pub struct CalibrationTrainer {
    bank: Vec<CalibrationQuestion>,
    config: CalibrationConfig,
}

impl CalibrationTrainer {
    /// Trainer over the built-in question bank.
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            bank: question_bank(),
            config,
        }
    }

    /// Replace the question bank.
    pub fn with_bank(mut self, bank: Vec<CalibrationQuestion>) -> Self {
        self.bank = bank;
        self
    }

    /// Question bank in use.
    pub fn bank(&self) -> &[CalibrationQuestion] {
        &self.bank
    }

    /// Scoring parameters.
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Pose `num_questions` questions drawn by `rng` and score the answers.
    ///
    /// Questions are drawn without replacement until the bank is exhausted,
    /// then the bank is reshuffled.
    pub fn run<R: CalibrationResponder + ?Sized>(
        &self,
        estimator: &str,
        num_questions: usize,
        responder: &mut R,
        rng: &mut TrainingRng,
    ) -> QuantResult<CalibrationSession> {
        if num_questions == 0 {
            return Err(QuantError::InvalidCalibrationInput(
                "at least one question is required".to_string(),
            ));
        }
        if self.bank.is_empty() {
            return Err(QuantError::InvalidCalibrationInput(
                "question bank is empty".to_string(),
            ));
        }

        let mut order = Vec::with_capacity(num_questions);
        while order.len() < num_questions {
            let wanted = num_questions - order.len();
            order.extend(rng.choose_indices(self.bank.len(), wanted));
        }

        let exercises = order
            .into_iter()
            .map(|i| {
                let question = &self.bank[i];
                let claimed = responder.respond(question, self.config.confidence_level);
                score_exercise(question, claimed, &self.config)
            })
            .collect();

        let session = CalibrationSession::new(estimator, self.config.confidence_level, exercises);
        debug!(
            estimator,
            questions = session.len(),
            accuracy = session.accuracy(),
            seed = rng.seed(),
            "scored calibration session"
        );
        Ok(session)
    }

    /// Score responses collected elsewhere, in the order given.
    pub fn score(
        &self,
        estimator: &str,
        responses: &[(CalibrationQuestion, ClaimedRange)],
    ) -> QuantResult<CalibrationSession> {
        if responses.is_empty() {
            return Err(QuantError::InvalidCalibrationInput(
                "no responses to score".to_string(),
            ));
        }
        let exercises = responses
            .iter()
            .map(|(q, r)| score_exercise(q, *r, &self.config))
            .collect();
        Ok(CalibrationSession::new(
            estimator,
            self.config.confidence_level,
            exercises,
        ))
    }
}

/// Standard normal quantile.
///
/// Acklam's rational approximation, relative error below 1.2e-9 over (0, 1).
pub(crate) fn normal_quantile(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    // lower tail; the upper tail follows by symmetry
    let tail = |q: f64| {
        let t = (-2.0 * q.ln()).sqrt();
        C[0].mul_add(t, C[1])
            .mul_add(t, C[2])
            .mul_add(t, C[3])
            .mul_add(t, C[4])
            .mul_add(t, C[5])
            / D[0].mul_add(t, D[1]).mul_add(t, D[2]).mul_add(t, D[3]).mul_add(t, 1.0)
    };

    if p < P_LOW {
        tail(p)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        A[0].mul_add(r, A[1])
            .mul_add(r, A[2])
            .mul_add(r, A[3])
            .mul_add(r, A[4])
            .mul_add(r, A[5])
            * q
            / B[0]
                .mul_add(r, B[1])
                .mul_add(r, B[2])
                .mul_add(r, B[3])
                .mul_add(r, B[4])
                .mul_add(r, 1.0)
    } else {
        -tail(1.0 - p)
    }
}

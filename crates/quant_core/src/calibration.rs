//! Calibration training records.
//!
//! A [`CalibrationSession`] is the scored outcome of one training run. It is
//! read-only once built and is used only to report how well an estimator's
//! stated intervals match reality.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interval an estimator claims contains the true value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaimedRange {
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

impl ClaimedRange {
    /// Create a range; bounds are swapped if given in reverse.
    pub fn new(lower: f64, upper: f64) -> Self {
        if lower <= upper {
            Self { lower, upper }
        } else {
            Self {
                lower: upper,
                upper: lower,
            }
        }
    }

    /// Whether `value` lies inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// `upper - lower`.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Centre of the interval.
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }
}

/// One scored training question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationExercise {
    /// Question text
    pub question: String,
    /// Known answer
    pub true_value: f64,
    /// Interval given by the estimator
    pub claimed_range: ClaimedRange,
    /// True value fell inside the claimed interval
    pub was_correct: bool,
    /// Missed with an interval narrower than warranted
    pub overconfident: bool,
}

/// Calibration grade derived from session accuracy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationLevel {
    /// Accuracy below 0.6
    Uncalibrated,
    /// Accuracy in [0.6, 0.7)
    Basic,
    /// Accuracy in [0.7, 0.8)
    Intermediate,
    /// Accuracy in [0.8, 0.9)
    Advanced,
    /// Accuracy of 0.9 or better
    Expert,
}

impl CalibrationLevel {
    /// Grade for an accuracy score in [0, 1].
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 0.9 {
            Self::Expert
        } else if accuracy >= 0.8 {
            Self::Advanced
        } else if accuracy >= 0.7 {
            Self::Intermediate
        } else if accuracy >= 0.6 {
            Self::Basic
        } else {
            Self::Uncalibrated
        }
    }
}

impl fmt::Display for CalibrationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uncalibrated => "uncalibrated",
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        };
        f.write_str(s)
    }
}

/// Scored calibration training run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationSession {
    estimator: String,
    confidence_level: f64,
    exercises: Vec<CalibrationExercise>,
}

impl CalibrationSession {
    /// Build a session from already scored exercises.
    pub fn new(
        estimator: impl Into<String>,
        confidence_level: f64,
        exercises: Vec<CalibrationExercise>,
    ) -> Self {
        Self {
            estimator: estimator.into(),
            confidence_level,
            exercises,
        }
    }

    /// Identity of the trainee.
    pub fn estimator(&self) -> &str {
        &self.estimator
    }

    /// Confidence the claimed intervals were meant to carry.
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Exercises in the order they were posed.
    pub fn exercises(&self) -> &[CalibrationExercise] {
        &self.exercises
    }

    /// Number of exercises.
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    /// Whether the session has no exercises.
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// `count(was_correct) / len`, or 0 for an empty session.
    pub fn accuracy(&self) -> f64 {
        self.rate(|e| e.was_correct)
    }

    /// Share of exercises flagged overconfident.
    pub fn overconfidence_rate(&self) -> f64 {
        self.rate(|e| e.overconfident)
    }

    /// Share of exercises missed with an interval that was not too narrow.
    pub fn underconfidence_rate(&self) -> f64 {
        self.rate(|e| !e.was_correct && !e.overconfident)
    }

    /// `accuracy - confidence_level`; positive means intervals were too wide.
    pub fn calibration_gap(&self) -> f64 {
        self.accuracy() - self.confidence_level
    }

    /// Grade derived from accuracy.
    pub fn calibration_level(&self) -> CalibrationLevel {
        CalibrationLevel::from_accuracy(self.accuracy())
    }

    fn rate(&self, pred: impl Fn(&CalibrationExercise) -> bool) -> f64 {
        if self.exercises.is_empty() {
            return 0.0;
        }
        self.exercises.iter().filter(|e| pred(e)).count() as f64 / self.exercises.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn exercise(correct: bool, overconfident: bool) -> CalibrationExercise {
        CalibrationExercise {
            question: "q".to_string(),
            true_value: 1.0,
            claimed_range: ClaimedRange::new(0.0, 2.0),
            was_correct: correct,
            overconfident,
        }
    }

    #[test]
    fn test_claimed_range_normalises_bounds() {
        let r = ClaimedRange::new(10.0, 2.0);
        assert_eq!(r.lower, 2.0);
        assert_eq!(r.upper, 10.0);
        assert!(r.contains(2.0));
        assert!(r.contains(10.0));
        assert!(!r.contains(10.5));
        assert_relative_eq!(r.midpoint(), 6.0);
    }

    #[test]
    fn test_session_rates() {
        let session = CalibrationSession::new(
            "carol",
            0.9,
            vec![
                exercise(true, false),
                exercise(true, false),
                exercise(false, true),
                exercise(false, false),
            ],
        );
        assert_relative_eq!(session.accuracy(), 0.5);
        assert_relative_eq!(session.overconfidence_rate(), 0.25);
        assert_relative_eq!(session.underconfidence_rate(), 0.25);
        assert_relative_eq!(session.calibration_gap(), -0.4);
        assert_eq!(session.calibration_level(), CalibrationLevel::Uncalibrated);
    }

    #[test]
    fn test_empty_session_scores_zero() {
        let session = CalibrationSession::new("dave", 0.9, Vec::new());
        assert!(session.is_empty());
        assert_eq!(session.accuracy(), 0.0);
    }

    #[test]
    fn test_calibration_level_thresholds() {
        assert_eq!(CalibrationLevel::from_accuracy(0.95), CalibrationLevel::Expert);
        assert_eq!(CalibrationLevel::from_accuracy(0.9), CalibrationLevel::Expert);
        assert_eq!(CalibrationLevel::from_accuracy(0.85), CalibrationLevel::Advanced);
        assert_eq!(CalibrationLevel::from_accuracy(0.7), CalibrationLevel::Intermediate);
        assert_eq!(CalibrationLevel::from_accuracy(0.6), CalibrationLevel::Basic);
        assert_eq!(CalibrationLevel::from_accuracy(0.59), CalibrationLevel::Uncalibrated);
    }
}

//! Detection results
//!
//! Everything here is created fresh per call. Evidence is only read by the
//! explanation formatter.

use serde::Serialize;

/// The closed set of recognizable generative models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternKind {
    Arithmetic,
    Geometric,
    Fibonacci,
    Lucas,
    Tribonacci,
    Polynomial { degree: usize },
    Exponential,
    Periodic { period: usize },
}

impl PatternKind {
    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::Arithmetic => "arithmetic",
            PatternKind::Geometric => "geometric",
            PatternKind::Fibonacci => "fibonacci",
            PatternKind::Lucas => "lucas",
            PatternKind::Tribonacci => "tribonacci",
            PatternKind::Polynomial { .. } => "polynomial",
            PatternKind::Exponential => "exponential",
            PatternKind::Periodic { .. } => "periodic",
        }
    }
}

/// Whether a cycle repeats the values themselves or the steps between them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOver {
    Values,
    Steps,
}

/// Parameters a detector found, used for the explanation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Evidence {
    CommonDifference { difference: f64 },
    CommonRatio { ratio: f64 },
    /// `order` preceding terms summed; `seeds` are the first `order` values
    Recurrence { order: usize, seeds: Vec<f64> },
    /// Highest order first
    Polynomial { coefficients: Vec<f64>, r_squared: f64 },
    /// `y = coefficient * base^x` with x counted from 0
    Exponential { coefficient: f64, base: f64, mean_relative_residual: f64 },
    Cycle { over: CycleOver, cycle: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub kind: PatternKind,
    /// None when the prediction would not be a finite number
    pub next_value: Option<f64>,
    pub confidence: f64,
    pub evidence: Evidence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "pattern", rename_all = "snake_case")]
pub enum DetectionOutcome {
    Found(PatternMatch),
    NotFound,
}

impl DetectionOutcome {
    pub fn as_match(&self) -> Option<&PatternMatch> {
        match self {
            DetectionOutcome::Found(m) => Some(m),
            DetectionOutcome::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, DetectionOutcome::Found(_))
    }

    /// 0.0 when nothing was found
    pub fn confidence(&self) -> f64 {
        self.as_match().map_or(0.0, |m| m.confidence)
    }

    pub fn next_value(&self) -> Option<f64> {
        self.as_match().and_then(|m| m.next_value)
    }

    pub fn kind(&self) -> Option<PatternKind> {
        self.as_match().map(|m| m.kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub value: Option<f64>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptionResult {
    pub description: String,
    pub confidence: f64,
}

impl From<&DetectionOutcome> for PredictionResult {
    fn from(outcome: &DetectionOutcome) -> Self {
        Self {
            value: outcome.next_value(),
            confidence: outcome.confidence(),
        }
    }
}

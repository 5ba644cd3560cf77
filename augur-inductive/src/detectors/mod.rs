//! Pattern detectors
//!
//! Each detector is a pure function over a validated sequence. Too-short
//! input, a degenerate fit or a failed tolerance test all yield `Ok(None)`;
//! the only error is an exhausted budget.

mod arithmetic;
mod geometric;
mod recursive;
mod polynomial;
mod exponential;
mod periodic;

pub use arithmetic::Arithmetic;
pub use geometric::Geometric;
pub use recursive::{Fibonacci, Tribonacci};
pub use polynomial::Polynomial;
pub use exponential::Exponential;
pub use periodic::Periodic;

use crate::budget::Budget;
use crate::confidence::ConfidenceModel;
use crate::config::EngineConfig;
use crate::error::TimedOut;
use crate::guard::Sequence;
use crate::pattern::PatternMatch;
use crate::stats::is_close;

/// Everything a detector may read besides the sequence
#[derive(Debug, Clone, Copy)]
pub struct DetectEnv<'a> {
    pub config: &'a EngineConfig,
    pub budget: &'a Budget,
}

impl<'a> DetectEnv<'a> {
    pub fn new(config: &'a EngineConfig, budget: &'a Budget) -> Self {
        Self { config, budget }
    }

    pub fn confidence(&self) -> ConfidenceModel<'a> {
        ConfidenceModel::new(&self.config.confidence)
    }

    /// Tolerance test with the configured rtol/atol
    pub fn close(&self, x: f64, reference: f64) -> bool {
        is_close(x, reference, self.config.rtol, self.config.atol)
    }
}

pub type Detection = Result<Option<PatternMatch>, TimedOut>;

pub trait Detector: Send + Sync {
    /// Stable name used in logs and timeout reports
    fn name(&self) -> &'static str;

    fn detect(&self, seq: Sequence<'_>, env: &DetectEnv<'_>) -> Detection;
}

/// All detectors, simplest family first
pub fn standard_detectors() -> [&'static dyn Detector; 7] {
    [
        &Arithmetic,
        &Geometric,
        &Fibonacci,
        &Tribonacci,
        &Polynomial,
        &Exponential,
        &Periodic,
    ]
}

/// Finite predictions only
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::guard::validate;
    use std::time::Duration;

    pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    /// Run one detector with a generous budget
    pub fn run(detector: &dyn Detector, values: &[f64]) -> Option<PatternMatch> {
        run_with(detector, values, &EngineConfig::default())
    }

    pub fn run_with(detector: &dyn Detector, values: &[f64], config: &EngineConfig) -> Option<PatternMatch> {
        run_within(detector, values, config, Duration::from_secs(60)).unwrap()
    }

    pub fn run_within(detector: &dyn Detector, values: &[f64], config: &EngineConfig, limit: Duration) -> Detection {
        let budget = Budget::start(limit, config.check_interval);
        let seq = validate(values, "test", config).unwrap();
        detector.detect(seq, &DetectEnv::new(config, &budget))
    }
}

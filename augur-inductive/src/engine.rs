//! Orchestrator
//!
//! Stateless per call: validate, then try detectors simplest family first and
//! return the first match at or above the confidence floor.

use crate::budget::Budget;
use crate::config::EngineConfig;
use crate::detectors::{standard_detectors, DetectEnv, Detector};
use crate::error::InductiveError;
use crate::explain::describe;
use crate::guard::validate;
use crate::pattern::{DescriptionResult, DetectionOutcome, PredictionResult};
use tracing::{debug, warn};

/// Pattern detection engine. Holds configuration only.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full detection result
    pub fn detect(&self, values: &[f64]) -> Result<DetectionOutcome, InductiveError> {
        self.detect_with(values, "detect_pattern", &standard_detectors())
    }

    pub fn predict_next(&self, values: &[f64]) -> Result<PredictionResult, InductiveError> {
        let outcome = self.detect_with(values, "predict_next", &standard_detectors())?;
        Ok(PredictionResult::from(&outcome))
    }

    pub fn describe_pattern(&self, values: &[f64]) -> Result<DescriptionResult, InductiveError> {
        let outcome = self.detect_with(values, "describe_pattern", &standard_detectors())?;
        Ok(DescriptionResult {
            description: describe(&outcome),
            confidence: outcome.confidence(),
        })
    }

    /// Run an explicit detector list in order.
    ///
    /// A timed-out detector counts as abstaining. The call itself fails with
    /// `TimedOut` only when no detector ran to completion.
    pub fn detect_with(
        &self,
        values: &[f64],
        caller: &'static str,
        detectors: &[&dyn Detector],
    ) -> Result<DetectionOutcome, InductiveError> {
        let config = &self.config;
        let seq = validate(values, caller, config)?;

        let budget = Budget::start(config.timeout(), config.check_interval);
        budget.check(caller)?;
        let env = DetectEnv::new(config, &budget);

        let mut completed = 0usize;
        let mut last_timeout = None;

        for detector in detectors {
            let result = match budget.check(detector.name()) {
                Ok(()) => detector.detect(seq, &env),
                Err(e) => Err(e),
            };
            match result {
                Ok(Some(m)) if m.confidence >= config.min_confidence => {
                    debug!(detector = detector.name(), confidence = m.confidence, "pattern found");
                    return Ok(DetectionOutcome::Found(m));
                }
                Ok(Some(m)) => {
                    debug!(detector = detector.name(), confidence = m.confidence, "match below confidence floor");
                    completed += 1;
                }
                Ok(None) => {
                    debug!(detector = detector.name(), "no match");
                    completed += 1;
                }
                Err(e) => {
                    warn!(detector = detector.name(), "detector abandoned: {}", e);
                    last_timeout = Some(e);
                }
            }
        }

        match last_timeout {
            Some(e) if completed == 0 => Err(e.into()),
            _ => Ok(DetectionOutcome::NotFound),
        }
    }
}

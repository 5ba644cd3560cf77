//! Engine configuration
//!
//! Every limit, tolerance and confidence constant is a tunable here. The
//! defaults match the values the server ships with; `from_env` overlays the
//! `AUGUR_*` environment variables on top of them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Tunables for guard, budget, detectors and orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest accepted sequence
    pub max_sequence_length: usize,
    /// Largest accepted `|value|`, also the ceiling for recursive sums
    pub value_magnitude_limit: f64,
    /// Wall-clock ceiling for one call, in seconds
    pub timeout_seconds: f64,
    /// Inner-loop iterations between clock reads
    pub check_interval: usize,

    pub rtol: f64,
    pub atol: f64,
    /// Matches scoring below this are discarded
    pub min_confidence: f64,

    pub min_length: MinLengths,

    pub max_degree: usize,
    pub r_squared_threshold: f64,
    /// Relative size under which a leading coefficient counts as zero
    pub coefficient_tolerance: f64,

    /// Largest accepted mean relative residual of the log-linear fit
    pub exponential_tolerance: f64,

    /// Ratios entering the geometric spread estimate are clamped to
    /// `[-ratio_clamp, ratio_clamp]`
    pub ratio_clamp: f64,

    pub max_period: usize,

    pub confidence: ConfidenceConfig,
}

/// Shortest sequence each detector will look at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinLengths {
    pub arithmetic: usize,
    pub geometric: usize,
    pub fibonacci: usize,
    pub tribonacci: usize,
    pub exponential: usize,
    /// Added to the degree: a degree-d fit needs `d + polynomial_extra` points
    pub polynomial_extra: usize,
    /// Multiplied by the period: a value cycle needs `period * periodic_cycles` points
    pub periodic_cycles: usize,
}

/// Constants of the shared confidence formula
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub base_arithmetic: f64,
    pub base_geometric: f64,
    pub base_fibonacci: f64,
    pub base_lucas: f64,
    pub base_tribonacci: f64,
    pub base_polynomial: f64,
    pub base_exponential: f64,
    pub base_periodic: f64,

    /// Length at which data sufficiency saturates
    pub sufficient_arithmetic: f64,
    pub sufficient_geometric: f64,
    pub sufficient_recursive: f64,
    /// Added to the degree
    pub sufficient_polynomial_extra: f64,
    pub sufficient_exponential: f64,
    /// Multiplied by the period
    pub sufficient_periodic_cycles: f64,

    pub complexity_arithmetic: f64,
    pub complexity_geometric: f64,
    pub complexity_recursive: f64,
    pub complexity_per_degree: f64,
    pub complexity_exponential: f64,
    pub complexity_per_period: f64,

    /// `k` in `1 / (1 + k * complexity)`
    pub complexity_weight: f64,
    pub quality_floor: f64,
    /// Quality used when a single residual cannot estimate spread
    pub minimal_data_quality: f64,
    pub epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sequence_length: 5000,
            value_magnitude_limit: 1e15,
            timeout_seconds: 5.0,
            check_interval: 100,
            rtol: 1e-6,
            atol: 1e-9,
            min_confidence: 0.2,
            min_length: MinLengths::default(),
            max_degree: 5,
            r_squared_threshold: 0.9999,
            coefficient_tolerance: 1e-9,
            exponential_tolerance: 0.1,
            ratio_clamp: 1e6,
            max_period: 6,
            confidence: ConfidenceConfig::default(),
        }
    }
}

impl Default for MinLengths {
    fn default() -> Self {
        Self {
            arithmetic: 3,
            geometric: 4,
            fibonacci: 5,
            tribonacci: 6,
            exponential: 4,
            polynomial_extra: 2,
            periodic_cycles: 2,
        }
    }
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base_arithmetic: 0.95,
            base_geometric: 0.9,
            base_fibonacci: 0.9,
            base_lucas: 0.95,
            base_tribonacci: 0.8,
            base_polynomial: 0.85,
            base_exponential: 0.8,
            base_periodic: 0.85,
            sufficient_arithmetic: 3.0,
            sufficient_geometric: 4.0,
            sufficient_recursive: 6.0,
            sufficient_polynomial_extra: 3.0,
            sufficient_exponential: 5.0,
            sufficient_periodic_cycles: 3.0,
            complexity_arithmetic: 0.0,
            complexity_geometric: 0.1,
            complexity_recursive: 0.3,
            complexity_per_degree: 0.2,
            complexity_exponential: 0.25,
            complexity_per_period: 0.1,
            complexity_weight: 1.0,
            quality_floor: 0.1,
            minimal_data_quality: 0.7,
            epsilon: 1e-10,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `AUGUR_*` environment variables
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from any key lookup. Malformed values are skipped.
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var::<usize, _>(&lookup, "AUGUR_MAX_SEQUENCE_LENGTH", |v| *v > 0) {
            self.max_sequence_length = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "AUGUR_VALUE_MAGNITUDE_LIMIT", |v| v.is_finite() && *v > 0.0) {
            self.value_magnitude_limit = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "AUGUR_TIMEOUT_SECONDS", |v| v.is_finite() && *v >= 0.0) {
            self.timeout_seconds = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "AUGUR_RTOL", |v| v.is_finite() && *v >= 0.0) {
            self.rtol = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "AUGUR_ATOL", |v| v.is_finite() && *v >= 0.0) {
            self.atol = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "AUGUR_MIN_CONFIDENCE", |v| (0.0..=1.0).contains(v)) {
            self.min_confidence = v;
        }
        self
    }

    /// Wall-clock ceiling as a `Duration`. Values too large to represent
    /// saturate to `Duration::MAX`; negative or NaN values give zero.
    pub fn timeout(&self) -> Duration {
        match Duration::try_from_secs_f64(self.timeout_seconds) {
            Ok(limit) => limit,
            Err(_) if self.timeout_seconds > 0.0 => Duration::MAX,
            Err(_) => Duration::ZERO,
        }
    }

    /// Builder: replace both tolerances
    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    /// Builder: replace the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_seconds = timeout.as_secs_f64();
        self
    }
}

fn parse_var<T, V>(lookup: &dyn Fn(&str) -> Option<String>, key: &str, valid: V) -> Option<T>
where
    T: FromStr,
    V: Fn(&T) -> bool,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => Some(v),
        _ => {
            warn!(key, value = %raw, "ignoring malformed configuration value");
            None
        }
    }
}

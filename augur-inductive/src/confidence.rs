//! Confidence model
//!
//! `confidence = base * data_sufficiency * pattern_quality * complexity_factor`,
//! clamped to `[0, 1]`. Only the shape is a contract: confidence falls with
//! noise and complexity and rises with data, up to saturation.

use crate::config::ConfidenceConfig;
use crate::pattern::PatternKind;
use crate::stats::{mean_abs, std_dev};

/// What a detector knows about how well its pattern fits
#[derive(Debug, Clone, Copy)]
pub enum QualitySignal<'a> {
    /// Derived quantities that should be constant (differences, ratios)
    Spread(&'a [f64]),
    /// A relative residual already normalised by the detector, 0 for a perfect fit
    Residual(f64),
}

#[derive(Debug, Clone, Copy)]
pub struct ConfidenceModel<'a> {
    config: &'a ConfidenceConfig,
}

impl<'a> ConfidenceModel<'a> {
    pub fn new(config: &'a ConfidenceConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, kind: PatternKind, len: usize, quality: QualitySignal<'_>) -> f64 {
        let confidence = self.base(kind)
            * self.data_sufficiency(len, self.minimum_required(kind))
            * self.pattern_quality(quality)
            * self.complexity_factor(self.complexity(kind));
        if confidence.is_nan() {
            return 0.0;
        }
        confidence.clamp(0.0, 1.0)
    }

    /// `min(1, len / minimum_required)`, 1.0 for a non-positive minimum
    pub fn data_sufficiency(&self, len: usize, minimum_required: f64) -> f64 {
        if minimum_required <= 0.0 {
            return 1.0;
        }
        (len as f64 / minimum_required).min(1.0)
    }

    pub fn pattern_quality(&self, signal: QualitySignal<'_>) -> f64 {
        let cfg = self.config;
        match signal {
            QualitySignal::Spread(values) => {
                if values.len() <= 1 {
                    return cfg.minimal_data_quality;
                }
                let magnitude = mean_abs(values);
                if magnitude < cfg.epsilon {
                    // All (near) zero: perfectly regular
                    return 1.0;
                }
                let cv = std_dev(values) / (magnitude + cfg.epsilon);
                (1.0 - cv).max(cfg.quality_floor).min(1.0)
            }
            QualitySignal::Residual(r) => {
                if !r.is_finite() {
                    return cfg.quality_floor;
                }
                (1.0 - r.abs()).max(cfg.quality_floor).min(1.0)
            }
        }
    }

    pub fn complexity_factor(&self, complexity: f64) -> f64 {
        let denominator = 1.0 + self.config.complexity_weight * complexity;
        1.0 / denominator.max(self.config.epsilon)
    }

    fn base(&self, kind: PatternKind) -> f64 {
        let cfg = self.config;
        match kind {
            PatternKind::Arithmetic => cfg.base_arithmetic,
            PatternKind::Geometric => cfg.base_geometric,
            PatternKind::Fibonacci => cfg.base_fibonacci,
            PatternKind::Lucas => cfg.base_lucas,
            PatternKind::Tribonacci => cfg.base_tribonacci,
            PatternKind::Polynomial { .. } => cfg.base_polynomial,
            PatternKind::Exponential => cfg.base_exponential,
            PatternKind::Periodic { .. } => cfg.base_periodic,
        }
    }

    fn minimum_required(&self, kind: PatternKind) -> f64 {
        let cfg = self.config;
        match kind {
            PatternKind::Arithmetic => cfg.sufficient_arithmetic,
            PatternKind::Geometric => cfg.sufficient_geometric,
            PatternKind::Fibonacci | PatternKind::Lucas | PatternKind::Tribonacci => cfg.sufficient_recursive,
            PatternKind::Polynomial { degree } => degree as f64 + cfg.sufficient_polynomial_extra,
            PatternKind::Exponential => cfg.sufficient_exponential,
            PatternKind::Periodic { period } => period as f64 * cfg.sufficient_periodic_cycles,
        }
    }

    fn complexity(&self, kind: PatternKind) -> f64 {
        let cfg = self.config;
        match kind {
            PatternKind::Arithmetic => cfg.complexity_arithmetic,
            PatternKind::Geometric => cfg.complexity_geometric,
            PatternKind::Fibonacci | PatternKind::Lucas | PatternKind::Tribonacci => cfg.complexity_recursive,
            PatternKind::Polynomial { degree } => degree as f64 * cfg.complexity_per_degree,
            PatternKind::Exponential => cfg.complexity_exponential,
            PatternKind::Periodic { period } => period as f64 * cfg.complexity_per_period,
        }
    }
}

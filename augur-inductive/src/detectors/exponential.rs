use super::{finite, DetectEnv, Detection, Detector};
use crate::confidence::QualitySignal;
use crate::guard::Sequence;
use crate::pattern::{Evidence, PatternKind, PatternMatch};
use crate::stats::linear_fit;
use tracing::debug;

/// `y = a * b^x` fitted on `ln y`; positive sequences only
pub struct Exponential;

impl Detector for Exponential {
    fn name(&self) -> &'static str {
        "exponential"
    }

    fn detect(&self, seq: Sequence<'_>, env: &DetectEnv<'_>) -> Detection {
        let cfg = env.config;
        if seq.len() < cfg.min_length.exponential.max(2) {
            return Ok(None);
        }
        if seq.iter().any(|&v| v <= 0.0) {
            debug!("exponential: non-positive element");
            return Ok(None);
        }

        let xs: Vec<f64> = (0..seq.len()).map(|i| i as f64).collect();
        let logs: Vec<f64> = seq.iter().map(|v| v.ln()).collect();
        let (slope, intercept) = match linear_fit(&xs, &logs) {
            Some(fit) => fit,
            None => return Ok(None),
        };
        let coefficient = intercept.exp();
        let base = slope.exp();

        let eps = cfg.confidence.epsilon;
        let mut total = 0.0;
        for (i, &y) in seq.iter().enumerate() {
            env.budget.tick(i, self.name())?;
            let fitted = (intercept + slope * i as f64).exp();
            total += (y - fitted).abs() / y.abs().max(eps);
        }
        let mean_relative_residual = total / seq.len() as f64;
        if !mean_relative_residual.is_finite() || mean_relative_residual > cfg.exponential_tolerance {
            return Ok(None);
        }

        let kind = PatternKind::Exponential;
        Ok(Some(PatternMatch {
            kind,
            next_value: finite((intercept + slope * seq.len() as f64).exp()),
            confidence: env.confidence().score(kind, seq.len(), QualitySignal::Residual(mean_relative_residual)),
            evidence: Evidence::Exponential {
                coefficient,
                base,
                mean_relative_residual,
            },
        }))
    }
}

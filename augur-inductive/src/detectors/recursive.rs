//! Recursive-sum family: each term is the sum of the preceding 2 or 3

use super::{DetectEnv, Detection, Detector};
use crate::confidence::QualitySignal;
use crate::error::TimedOut;
use crate::guard::Sequence;
use crate::pattern::{Evidence, PatternKind, PatternMatch};
use crate::stats::mean_abs;
use tracing::debug;

const LUCAS_SEEDS: [f64; 2] = [2.0, 1.0];

/// `a(n) = a(n-1) + a(n-2)`, reported as Lucas for seeds (2, 1)
pub struct Fibonacci;

/// `a(n) = a(n-1) + a(n-2) + a(n-3)`
pub struct Tribonacci;

impl Detector for Fibonacci {
    fn name(&self) -> &'static str {
        "fibonacci"
    }

    fn detect(&self, seq: Sequence<'_>, env: &DetectEnv<'_>) -> Detection {
        if seq.len() < env.config.min_length.fibonacci.max(3) {
            return Ok(None);
        }
        let fit = match check_recurrence(seq, 2, env, self.name())? {
            Some(fit) => fit,
            None => return Ok(None),
        };

        let lucas = env.close(seq[0], LUCAS_SEEDS[0]) && env.close(seq[1], LUCAS_SEEDS[1]);
        let kind = if lucas { PatternKind::Lucas } else { PatternKind::Fibonacci };
        Ok(Some(fit.into_match(kind, seq, env)))
    }
}

impl Detector for Tribonacci {
    fn name(&self) -> &'static str {
        "tribonacci"
    }

    fn detect(&self, seq: Sequence<'_>, env: &DetectEnv<'_>) -> Detection {
        if seq.len() < env.config.min_length.tribonacci.max(4) {
            return Ok(None);
        }
        Ok(check_recurrence(seq, 3, env, self.name())?
            .map(|fit| fit.into_match(PatternKind::Tribonacci, seq, env)))
    }
}

struct RecurrenceFit {
    order: usize,
    residuals: Vec<f64>,
    next_value: Option<f64>,
}

impl RecurrenceFit {
    fn into_match(self, kind: PatternKind, seq: Sequence<'_>, env: &DetectEnv<'_>) -> PatternMatch {
        let eps = env.config.confidence.epsilon;
        let relative = mean_abs(&self.residuals) / (mean_abs(&seq) + eps);
        PatternMatch {
            kind,
            next_value: self.next_value,
            confidence: env.confidence().score(kind, seq.len(), QualitySignal::Residual(relative)),
            evidence: Evidence::Recurrence {
                order: self.order,
                seeds: seq[..self.order].to_vec(),
            },
        }
    }
}

/// Every term from `order` on must equal the sum of the `order` before it.
/// A sum beyond the magnitude limit counts as a failed match.
fn check_recurrence(
    seq: Sequence<'_>,
    order: usize,
    env: &DetectEnv<'_>,
    caller: &'static str,
) -> Result<Option<RecurrenceFit>, TimedOut> {
    if seq.len() <= order {
        return Ok(None);
    }
    let limit = env.config.value_magnitude_limit;
    let mut residuals = Vec::with_capacity(seq.len() - order);

    for i in order..seq.len() {
        env.budget.tick(i, caller)?;
        let sum = match guarded_sum(&seq[i - order..i], limit) {
            Some(s) => s,
            None => {
                debug!(caller, index = i, "recurrence sum exceeds magnitude limit");
                return Ok(None);
            }
        };
        if !env.close(seq[i], sum) {
            return Ok(None);
        }
        residuals.push(seq[i] - sum);
    }

    // All-zero input satisfies every recurrence trivially
    if seq.iter().all(|&v| v == 0.0) {
        return Ok(None);
    }

    Ok(Some(RecurrenceFit {
        order,
        residuals,
        next_value: guarded_sum(&seq[seq.len() - order..], limit),
    }))
}

fn guarded_sum(terms: &[f64], limit: f64) -> Option<f64> {
    let mut total = 0.0_f64;
    for &t in terms {
        total += t;
        if !total.is_finite() || total.abs() > limit {
            return None;
        }
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::detectors::test_support::{run, run_with, run_within};
    use std::time::Duration;

    #[test]
    fn test_fibonacci() {
        let m = run(&Fibonacci, &[1.0, 1.0, 2.0, 3.0, 5.0, 8.0]).unwrap();
        assert_eq!(m.kind, PatternKind::Fibonacci);
        assert_eq!(m.next_value, Some(13.0));
        assert_eq!(
            m.evidence,
            Evidence::Recurrence { order: 2, seeds: vec![1.0, 1.0] }
        );
    }

    #[test]
    fn test_lucas() {
        let m = run(&Fibonacci, &[2.0, 1.0, 3.0, 4.0, 7.0, 11.0]).unwrap();
        assert_eq!(m.kind, PatternKind::Lucas);
        assert_eq!(m.next_value, Some(18.0));
    }

    #[test]
    fn test_generic_seeds() {
        let m = run(&Fibonacci, &[3.0, 4.0, 7.0, 11.0, 18.0]).unwrap();
        assert_eq!(m.kind, PatternKind::Fibonacci);
        assert_eq!(m.next_value, Some(29.0));
    }

    #[test]
    fn test_tribonacci() {
        let m = run(&Tribonacci, &[0.0, 0.0, 1.0, 1.0, 2.0, 4.0, 7.0, 13.0]).unwrap();
        assert_eq!(m.kind, PatternKind::Tribonacci);
        assert_eq!(m.next_value, Some(24.0));
    }

    #[test]
    fn test_too_short() {
        assert!(run(&Fibonacci, &[1.0, 1.0, 2.0, 3.0]).is_none());
        assert!(run(&Tribonacci, &[0.0, 0.0, 1.0, 1.0, 2.0]).is_none());
    }

    #[test]
    fn test_rejects_non_recurrence() {
        assert!(run(&Fibonacci, &[1.0, 2.0, 3.0, 4.0, 5.0]).is_none());
    }

    #[test]
    fn test_all_zero_abstains() {
        assert!(run(&Fibonacci, &[0.0; 6]).is_none());
    }

    #[test]
    fn test_overflowing_prediction_is_absent() {
        let m = run(&Fibonacci, &[1e14, 2e14, 3e14, 5e14, 8e14]).unwrap();
        assert_eq!(m.next_value, None);
    }

    #[test]
    fn test_overflowing_sum_abstains() {
        // Loose enough that 1e15 would pass as 5e14 + 8e14
        let values = [1e14, 2e14, 3e14, 5e14, 8e14, 1e15];
        let loose = EngineConfig::default().with_tolerances(0.5, 0.0);
        assert!(run_with(&Fibonacci, &values, &loose).is_none());

        let roomy = EngineConfig {
            value_magnitude_limit: 1e16,
            ..loose
        };
        let m = run_with(&Fibonacci, &values, &roomy).unwrap();
        assert_eq!(m.kind, PatternKind::Fibonacci);
    }

    #[test]
    fn test_exhausted_budget_is_reported() {
        let cfg = EngineConfig {
            check_interval: 1,
            ..EngineConfig::default()
        };
        let err = run_within(&Fibonacci, &[1.0, 1.0, 2.0, 3.0, 5.0, 8.0], &cfg, Duration::ZERO).unwrap_err();
        assert_eq!(err.caller, "fibonacci");
        let err = run_within(&Tribonacci, &[0.0, 0.0, 1.0, 1.0, 2.0, 4.0, 7.0], &cfg, Duration::ZERO).unwrap_err();
        assert_eq!(err.caller, "tribonacci");
    }

    #[test]
    fn test_lowered_minimums_are_floored() {
        let mut cfg = EngineConfig::default();
        cfg.min_length.fibonacci = 0;
        cfg.min_length.tribonacci = 1;
        for values in [&[4.0][..], &[4.0, 5.0], &[4.0, 5.0, 9.0]] {
            assert!(run_with(&Tribonacci, values, &cfg).is_none());
        }
        assert!(run_with(&Fibonacci, &[4.0, 5.0], &cfg).is_none());
        let m = run_with(&Fibonacci, &[4.0, 5.0, 9.0], &cfg).unwrap();
        assert_eq!(m.next_value, Some(14.0));
    }
}

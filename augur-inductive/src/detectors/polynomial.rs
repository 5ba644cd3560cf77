use super::{finite, DetectEnv, Detection, Detector};
use crate::confidence::QualitySignal;
use crate::guard::Sequence;
use crate::pattern::{Evidence, PatternKind, PatternMatch};
use crate::stats::polyfit;
use tracing::debug;

/// Lowest-degree least-squares polynomial in the index that fits almost exactly
pub struct Polynomial;

impl Detector for Polynomial {
    fn name(&self) -> &'static str {
        "polynomial"
    }

    fn detect(&self, seq: Sequence<'_>, env: &DetectEnv<'_>) -> Detection {
        let cfg = env.config;

        for degree in 1..=cfg.max_degree {
            // At least one point more than there are coefficients
            if seq.len() < degree + cfg.min_length.polynomial_extra.max(2) {
                break;
            }
            env.budget.check(self.name())?;

            let fit = match polyfit(&seq, degree, env.budget)? {
                Some(fit) => fit,
                None => {
                    debug!(degree, "polynomial: singular fit");
                    continue;
                }
            };
            if fit.r_squared <= cfg.r_squared_threshold {
                continue;
            }
            if fit.leading_is_degenerate(cfg.coefficient_tolerance) {
                // A lower degree already fitted or failed; higher ones only add noise
                debug!(degree, "polynomial: leading coefficient vanishes");
                continue;
            }

            let kind = PatternKind::Polynomial { degree };
            let residual = 1.0 - fit.r_squared;
            return Ok(Some(PatternMatch {
                kind,
                next_value: finite(fit.next_value),
                confidence: env.confidence().score(kind, seq.len(), QualitySignal::Residual(residual)),
                evidence: Evidence::Polynomial {
                    coefficients: fit.coefficients,
                    r_squared: fit.r_squared,
                },
            }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::test_support::{approx_eq, run};

    fn coefficients(m: &PatternMatch) -> Vec<f64> {
        match &m.evidence {
            Evidence::Polynomial { coefficients, .. } => coefficients.clone(),
            other => panic!("unexpected evidence {:?}", other),
        }
    }

    #[test]
    fn test_squares_are_quadratic() {
        let m = run(&Polynomial, &[1.0, 4.0, 9.0, 16.0, 25.0]).unwrap();
        assert_eq!(m.kind, PatternKind::Polynomial { degree: 2 });
        assert!(approx_eq(m.next_value.unwrap(), 36.0, 1e-6));
        let c = coefficients(&m);
        assert!(approx_eq(c[0], 1.0, 1e-6));
    }

    #[test]
    fn test_cubes() {
        let m = run(&Polynomial, &[1.0, 8.0, 27.0, 64.0, 125.0]).unwrap();
        assert_eq!(m.kind, PatternKind::Polynomial { degree: 3 });
        assert!(approx_eq(m.next_value.unwrap(), 216.0, 1e-6));
    }

    #[test]
    fn test_shifted_quadratic() {
        // 2n^2 - 3n + 1 for n = 1..7
        let values: Vec<f64> = (1..=7).map(|n| {
            let n = n as f64;
            2.0 * n * n - 3.0 * n + 1.0
        }).collect();
        let m = run(&Polynomial, &values).unwrap();
        assert_eq!(m.kind, PatternKind::Polynomial { degree: 2 });
        let c = coefficients(&m);
        assert!(approx_eq(c[0], 2.0, 1e-6));
        assert!(approx_eq(c[1], -3.0, 1e-6));
        assert!(approx_eq(c[2], 1.0, 1e-6));
        assert!(approx_eq(m.next_value.unwrap(), 105.0, 1e-6));
    }

    #[test]
    fn test_too_short_for_any_degree() {
        assert!(run(&Polynomial, &[1.0, 4.0]).is_none());
    }

    #[test]
    fn test_constant_is_not_polynomial() {
        assert!(run(&Polynomial, &[5.0, 5.0, 5.0, 5.0, 5.0]).is_none());
    }

    #[test]
    fn test_rejects_noise() {
        assert!(run(&Polynomial, &[1.0, 7.0, 3.0, 12.0, 9.0]).is_none());
    }
}

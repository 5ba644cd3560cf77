use super::{finite, DetectEnv, Detection, Detector};
use crate::confidence::QualitySignal;
use crate::guard::Sequence;
use crate::pattern::{Evidence, PatternKind, PatternMatch};
use tracing::debug;

/// Constant ratio between neighbours
pub struct Geometric;

impl Detector for Geometric {
    fn name(&self) -> &'static str {
        "geometric"
    }

    fn detect(&self, seq: Sequence<'_>, env: &DetectEnv<'_>) -> Detection {
        // One ratio needs two values
        if seq.len() < env.config.min_length.geometric.max(2) {
            return Ok(None);
        }
        if seq.iter().any(|&v| v == 0.0) {
            debug!("geometric: zero element, ratio undefined");
            return Ok(None);
        }

        let ratios: Vec<f64> = seq.windows(2).map(|w| w[1] / w[0]).collect();
        let reference = ratios[0];
        for (i, &r) in ratios.iter().enumerate() {
            env.budget.tick(i, self.name())?;
            if !env.close(r, reference) {
                return Ok(None);
            }
        }

        // Clamping only bounds the spread estimate; the match and the
        // prediction use the raw ratio
        let clamp = env.config.ratio_clamp;
        let clamped: Vec<f64> = ratios.iter().map(|r| r.max(-clamp).min(clamp)).collect();

        let kind = PatternKind::Geometric;
        Ok(Some(PatternMatch {
            kind,
            next_value: finite(seq.last() * reference),
            confidence: env.confidence().score(kind, seq.len(), QualitySignal::Spread(&clamped)),
            evidence: Evidence::CommonRatio { ratio: reference },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::detectors::test_support::{approx_eq, run, run_with};

    fn geometric(a: f64, r: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| a * r.powi(i as i32)).collect()
    }

    #[test]
    fn test_detects_ratios() {
        for &r in &[2.0, 3.0, -2.0, 0.5] {
            let values = geometric(3.0, r, 6);
            let m = run(&Geometric, &values).unwrap();
            assert_eq!(m.kind, PatternKind::Geometric);
            assert!(approx_eq(m.next_value.unwrap(), 3.0 * r.powi(6), 1e-9));
        }
    }

    #[test]
    fn test_zero_element_abstains() {
        assert!(run(&Geometric, &[0.0, 0.0, 0.0, 0.0]).is_none());
        assert!(run(&Geometric, &[1.0, 2.0, 0.0, 8.0]).is_none());
    }

    #[test]
    fn test_too_short() {
        assert!(run(&Geometric, &[1.0, 2.0, 4.0]).is_none());
    }

    #[test]
    fn test_rejects_arithmetic() {
        assert!(run(&Geometric, &[1.0, 2.0, 3.0, 4.0]).is_none());
    }

    #[test]
    fn test_ratio_beyond_clamp_predicts_exactly() {
        let m = run(&Geometric, &[1e-9, 1e-2, 1e5, 1e12]).unwrap();
        let next = m.next_value.unwrap();
        assert!(((next - 1e19) / 1e19).abs() < 1e-9);
        match m.evidence {
            Evidence::CommonRatio { ratio } => assert!(((ratio - 1e7) / 1e7).abs() < 1e-9),
            other => panic!("unexpected evidence {:?}", other),
        }
        assert!(m.confidence > 0.5);
    }

    #[test]
    fn test_distinct_large_ratios_do_not_match() {
        // Ratios 2e6, 5e6 and 1e8 all lie beyond the clamp
        assert!(run(&Geometric, &[1e-9, 2e-3, 1e4, 1e12]).is_none());
    }

    #[test]
    fn test_single_ratio_with_lowered_minimum() {
        let mut cfg = EngineConfig::default();
        cfg.min_length.geometric = 0;
        assert!(run_with(&Geometric, &[3.0], &cfg).is_none());
        let m = run_with(&Geometric, &[3.0, 6.0], &cfg).unwrap();
        assert_eq!(m.next_value, Some(12.0));
    }
}

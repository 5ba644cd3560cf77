use super::{finite, DetectEnv, Detection, Detector};
use crate::confidence::QualitySignal;
use crate::guard::Sequence;
use crate::pattern::{Evidence, PatternKind, PatternMatch};
use crate::stats::differences;

/// Constant difference between neighbours
pub struct Arithmetic;

impl Detector for Arithmetic {
    fn name(&self) -> &'static str {
        "arithmetic"
    }

    fn detect(&self, seq: Sequence<'_>, env: &DetectEnv<'_>) -> Detection {
        // One difference needs two values
        if seq.len() < env.config.min_length.arithmetic.max(2) {
            return Ok(None);
        }

        let diffs = differences(&seq);
        let reference = diffs[0];
        for (i, &d) in diffs.iter().enumerate() {
            env.budget.tick(i, self.name())?;
            if !env.close(d, reference) {
                return Ok(None);
            }
        }

        let kind = PatternKind::Arithmetic;
        Ok(Some(PatternMatch {
            kind,
            next_value: finite(seq.last() + reference),
            confidence: env.confidence().score(kind, seq.len(), QualitySignal::Spread(&diffs)),
            evidence: Evidence::CommonDifference { difference: reference },
        }))
    }
}

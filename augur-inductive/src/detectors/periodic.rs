use super::{finite, DetectEnv, Detection, Detector};
use crate::confidence::QualitySignal;
use crate::error::TimedOut;
use crate::guard::Sequence;
use crate::pattern::{CycleOver, Evidence, PatternKind, PatternMatch};
use crate::stats::{differences, mean_abs};

/// Repeating cycle of values, or failing that, of steps between values
pub struct Periodic;

impl Detector for Periodic {
    fn name(&self) -> &'static str {
        "periodic"
    }

    fn detect(&self, seq: Sequence<'_>, env: &DetectEnv<'_>) -> Detection {
        let n = seq.len();

        if let Some(period) = smallest_period(&seq, env, self.name())? {
            let cycle = seq[..period].to_vec();
            let residual = cycle_residual(&seq, &cycle, env);
            return Ok(Some(self.matched(n, period, seq[n % period], residual, CycleOver::Values, cycle, env)));
        }

        // A step cycle of period p needs p repeats of 2 steps, so 2p + 1 values
        let steps = differences(&seq);
        if let Some(period) = smallest_period(&steps, env, self.name())? {
            let cycle = steps[..period].to_vec();
            let residual = cycle_residual(&steps, &cycle, env);
            let next = seq.last() + steps[steps.len() % period];
            return Ok(Some(self.matched(n, period, next, residual, CycleOver::Steps, cycle, env)));
        }

        Ok(None)
    }
}

impl Periodic {
    #[allow(clippy::too_many_arguments)]
    fn matched(
        &self,
        len: usize,
        period: usize,
        next: f64,
        residual: f64,
        over: CycleOver,
        cycle: Vec<f64>,
        env: &DetectEnv<'_>,
    ) -> PatternMatch {
        let kind = PatternKind::Periodic { period };
        PatternMatch {
            kind,
            next_value: finite(next),
            confidence: env.confidence().score(kind, len, QualitySignal::Residual(residual)),
            evidence: Evidence::Cycle { over, cycle },
        }
    }
}

/// Smallest period in `2..=min(len / cycles, max_period)` whose cycle repeats
/// and is not constant
fn smallest_period(values: &[f64], env: &DetectEnv<'_>, caller: &'static str) -> Result<Option<usize>, TimedOut> {
    let cycles = env.config.min_length.periodic_cycles.max(1);
    let max_period = (values.len() / cycles).min(env.config.max_period);

    let mut iteration = 0;
    for period in 2..=max_period {
        let cycle = &values[..period];
        if cycle.iter().all(|&v| env.close(v, cycle[0])) {
            continue;
        }
        let mut repeats = true;
        for (i, &v) in values.iter().enumerate().skip(period) {
            env.budget.tick(iteration, caller)?;
            iteration += 1;
            if !env.close(v, cycle[i % period]) {
                repeats = false;
                break;
            }
        }
        if repeats {
            return Ok(Some(period));
        }
    }
    Ok(None)
}

fn cycle_residual(values: &[f64], cycle: &[f64], env: &DetectEnv<'_>) -> f64 {
    let deviations: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(i, v)| v - cycle[i % cycle.len()])
        .collect();
    mean_abs(&deviations) / (mean_abs(values) + env.config.confidence.epsilon)
}

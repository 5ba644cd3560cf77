//! Explanation formatter: one short sentence per outcome

use crate::pattern::{CycleOver, DetectionOutcome, Evidence, PatternKind, PatternMatch};

pub const NO_PATTERN: &str = "no discernible pattern";

/// Tolerance for recognising n^2 and n^3 from fitted coefficients
const NAMED_FORM_TOLERANCE: f64 = 1e-6;

pub fn describe(outcome: &DetectionOutcome) -> String {
    match outcome {
        DetectionOutcome::Found(m) => describe_match(m),
        DetectionOutcome::NotFound => NO_PATTERN.to_string(),
    }
}

pub fn describe_match(m: &PatternMatch) -> String {
    match (&m.kind, &m.evidence) {
        (PatternKind::Arithmetic, Evidence::CommonDifference { difference }) => {
            format!("arithmetic progression with common difference {}", format_number(*difference))
        }
        (PatternKind::Geometric, Evidence::CommonRatio { ratio }) => {
            format!("geometric progression with common ratio {}", format_number(*ratio))
        }
        (PatternKind::Lucas, _) => {
            "Lucas sequence: each term is the sum of the two preceding terms, starting 2, 1".to_string()
        }
        (PatternKind::Fibonacci, Evidence::Recurrence { seeds, .. }) => format!(
            "Fibonacci-like sequence: each term is the sum of the two preceding terms, starting {}",
            format_list(seeds)
        ),
        (PatternKind::Tribonacci, Evidence::Recurrence { seeds, .. }) => format!(
            "Tribonacci-like sequence: each term is the sum of the three preceding terms, starting {}",
            format_list(seeds)
        ),
        (PatternKind::Polynomial { degree }, Evidence::Polynomial { coefficients, .. }) => {
            describe_polynomial(*degree, coefficients)
        }
        (PatternKind::Exponential, Evidence::Exponential { coefficient, base, .. }) => format!(
            "exponential growth y = {} * {}^n",
            format_number(*coefficient),
            format_number(*base)
        ),
        (PatternKind::Periodic { period }, Evidence::Cycle { over: CycleOver::Values, cycle }) => {
            format!("periodic sequence with period {} repeating {}", period, format_list(cycle))
        }
        (PatternKind::Periodic { period }, Evidence::Cycle { over: CycleOver::Steps, cycle }) => format!(
            "alternating steps with period {}: differences cycle through {}",
            period,
            format_list(cycle)
        ),
        // Kind and evidence always come from the same detector
        (kind, _) => format!("{} pattern", kind.name()),
    }
}

fn describe_polynomial(degree: usize, coefficients: &[f64]) -> String {
    let is_pure_power = coefficients.len() == degree + 1
        && (coefficients[0] - 1.0).abs() <= NAMED_FORM_TOLERANCE
        && coefficients[1..].iter().all(|c| c.abs() <= NAMED_FORM_TOLERANCE);

    match degree {
        2 if is_pure_power => "perfect squares n^2".to_string(),
        3 if is_pure_power => "perfect cubes n^3".to_string(),
        2 => format!("quadratic sequence with coefficients {}", format_list(coefficients)),
        3 => format!("cubic sequence with coefficients {}", format_list(coefficients)),
        d => format!("polynomial of degree {} with coefficients {}", d, format_list(coefficients)),
    }
}

/// Integral values without a decimal point, others with up to 4 decimals
pub fn format_number(x: f64) -> String {
    if !x.is_finite() {
        return x.to_string();
    }
    let rounded = x.round();
    if (x - rounded).abs() < 1e-9 && rounded.abs() < 1e15 {
        // The cast also drops the sign of -0
        return format!("{}", rounded as i64);
    }
    let s = format!("{:.4}", x);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn format_list(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format_number(*v)).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(kind: PatternKind, evidence: Evidence) -> DetectionOutcome {
        DetectionOutcome::Found(PatternMatch {
            kind,
            next_value: None,
            confidence: 0.9,
            evidence,
        })
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(2.0 / 3.0), "0.6667");
        assert_eq!(format_number(1e-7), "0");
    }

    #[test]
    fn test_arithmetic_sentence() {
        let o = found(PatternKind::Arithmetic, Evidence::CommonDifference { difference: 3.0 });
        assert_eq!(describe(&o), "arithmetic progression with common difference 3");
    }

    #[test]
    fn test_no_pattern_sentence() {
        assert_eq!(describe(&DetectionOutcome::NotFound), NO_PATTERN);
    }

    #[test]
    fn test_named_polynomials() {
        let squares = found(
            PatternKind::Polynomial { degree: 2 },
            Evidence::Polynomial { coefficients: vec![1.0, 1e-9, -1e-9], r_squared: 1.0 },
        );
        assert_eq!(describe(&squares), "perfect squares n^2");

        let quadratic = found(
            PatternKind::Polynomial { degree: 2 },
            Evidence::Polynomial { coefficients: vec![2.0, -3.0, 1.0], r_squared: 1.0 },
        );
        assert_eq!(describe(&quadratic), "quadratic sequence with coefficients [2, -3, 1]");

        let quartic = found(
            PatternKind::Polynomial { degree: 4 },
            Evidence::Polynomial { coefficients: vec![1.0, 0.0, 0.0, 0.0, 0.0], r_squared: 1.0 },
        );
        assert!(describe(&quartic).starts_with("polynomial of degree 4"));
    }

    #[test]
    fn test_step_cycle_sentence() {
        let o = found(
            PatternKind::Periodic { period: 2 },
            Evidence::Cycle { over: CycleOver::Steps, cycle: vec![2.0, 3.0] },
        );
        assert_eq!(describe(&o), "alternating steps with period 2: differences cycle through [2, 3]");
    }

    #[test]
    fn test_lucas_sentence() {
        let o = found(PatternKind::Lucas, Evidence::Recurrence { order: 2, seeds: vec![2.0, 1.0] });
        assert!(describe(&o).starts_with("Lucas sequence"));
    }
}

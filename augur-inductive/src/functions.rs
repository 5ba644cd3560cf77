//! Inductive reasoning functions
//!
//! predict_next, describe_pattern, detect_pattern

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::InductiveError;
use crate::explain::describe;
use crate::guard::numbers_from_value;
use crate::pattern::DetectionOutcome;
use augur_plugin::prelude::*;
use std::collections::HashMap;

const STAGE: &str = "Inductive Reasoning";
const CATEGORY: &str = "inductive";

static SEQUENCE_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("sequence", "List<Number>", "Numbers in order, e.g. [2, 4, 6, 8]"),
    ArgMeta::optional(
        "options",
        "Object",
        "Per-call overrides: rtol, atol, min_confidence",
        "server configuration",
    ),
];

// ============ PredictNext ============

pub struct PredictNext {
    engine: Engine,
}

impl PredictNext {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

static PREDICT_NEXT_EXAMPLES: [&str; 3] = [
    "predict_next([2, 4, 6, 8]) → {value: 10, confidence: 0.95}",
    "predict_next([1, 1, 2, 3, 5, 8]) → {value: 13, ...}",
    "predict_next([1, 7, 3, 12, 9]) → {value: null, confidence: 0}",
];

static PREDICT_NEXT_RELATED: [&str; 2] = ["describe_pattern", "detect_pattern"];

impl FunctionPlugin for PredictNext {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "predict_next",
            description: "Predict the next value of a numeric sequence with a confidence score",
            usage: "predict_next(sequence, [options])",
            args: &SEQUENCE_ARGS,
            returns: "Object",
            examples: &PREDICT_NEXT_EXAMPLES,
            category: CATEGORY,
            related: &PREDICT_NEXT_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &mut CallContext) -> Value {
        let (values, engine) = match prepare("predict_next", args, &self.engine) {
            Ok(p) => p,
            Err(e) => return Value::Error(e),
        };
        let prediction = match engine.predict_next(&values) {
            Ok(p) => p,
            Err(e) => return Value::Error(to_error("predict_next", e)),
        };

        let mut result = HashMap::new();
        result.insert("value".to_string(), Value::from(prediction.value));
        result.insert("confidence".to_string(), Value::Number(prediction.confidence));
        let result = Value::Object(result);

        let description = match prediction.value {
            Some(v) => format!("Predicted next value {} for a sequence of {}", v, values.len()),
            None => format!("No prediction for a sequence of {}", values.len()),
        };
        ctx.record_step(STAGE, description, result.clone(), prediction.confidence, None);
        result
    }
}

// ============ DescribePattern ============

pub struct DescribePattern {
    engine: Engine,
}

impl DescribePattern {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

static DESCRIBE_PATTERN_EXAMPLES: [&str; 2] = [
    "describe_pattern([5, 8, 11, 14]) → {description: \"arithmetic progression with common difference 3\", ...}",
    "describe_pattern([1, 4, 9, 16, 25]) → {description: \"perfect squares n^2\", ...}",
];

static DESCRIBE_PATTERN_RELATED: [&str; 2] = ["predict_next", "detect_pattern"];

impl FunctionPlugin for DescribePattern {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "describe_pattern",
            description: "Describe the pattern a numeric sequence follows in one sentence",
            usage: "describe_pattern(sequence, [options])",
            args: &SEQUENCE_ARGS,
            returns: "Object",
            examples: &DESCRIBE_PATTERN_EXAMPLES,
            category: CATEGORY,
            related: &DESCRIBE_PATTERN_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &mut CallContext) -> Value {
        let (values, engine) = match prepare("describe_pattern", args, &self.engine) {
            Ok(p) => p,
            Err(e) => return Value::Error(e),
        };
        let description = match engine.describe_pattern(&values) {
            Ok(d) => d,
            Err(e) => return Value::Error(to_error("describe_pattern", e)),
        };

        let mut result = HashMap::new();
        result.insert("description".to_string(), Value::Text(description.description.clone()));
        result.insert("confidence".to_string(), Value::Number(description.confidence));
        let result = Value::Object(result);

        ctx.record_step(
            STAGE,
            format!("Described a sequence of {}", values.len()),
            result.clone(),
            description.confidence,
            Some(description.description),
        );
        result
    }
}

// ============ DetectPattern ============

pub struct DetectPattern {
    engine: Engine,
}

impl DetectPattern {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

static DETECT_PATTERN_EXAMPLES: [&str; 2] = [
    "detect_pattern([3, 6, 12, 24]) → {found: true, kind: \"geometric\", next_value: 48, ...}",
    "detect_pattern([1, 3, 6, 8, 11]) → {found: true, kind: \"periodic\", period: 2, ...}",
];

static DETECT_PATTERN_RELATED: [&str; 2] = ["predict_next", "describe_pattern"];

impl FunctionPlugin for DetectPattern {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "detect_pattern",
            description: "Detect the pattern of a numeric sequence with prediction, confidence and evidence",
            usage: "detect_pattern(sequence, [options])",
            args: &SEQUENCE_ARGS,
            returns: "Object",
            examples: &DETECT_PATTERN_EXAMPLES,
            category: CATEGORY,
            related: &DETECT_PATTERN_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &mut CallContext) -> Value {
        let (values, engine) = match prepare("detect_pattern", args, &self.engine) {
            Ok(p) => p,
            Err(e) => return Value::Error(e),
        };
        let outcome = match engine.detect(&values) {
            Ok(o) => o,
            Err(e) => return Value::Error(to_error("detect_pattern", e)),
        };

        let result = match outcome_to_value(&outcome) {
            Ok(v) => v,
            Err(e) => return Value::Error(e),
        };
        let evidence = outcome
            .as_match()
            .and_then(|m| serde_json::to_string(&m.evidence).ok());
        ctx.record_step(
            STAGE,
            describe(&outcome),
            result.clone(),
            outcome.confidence(),
            evidence,
        );
        result
    }
}

// ============ Helpers ============

/// Validate arguments and apply per-call option overrides
fn prepare(func: &str, args: &[Value], engine: &Engine) -> Result<(Vec<f64>, Engine), AugurError> {
    if args.is_empty() || args.len() > 2 {
        return Err(AugurError::arg_count(func, 1, args.len()));
    }
    if let Value::Error(e) = &args[0] {
        return Err(e.clone().with_note(format!("from {}() argument 'sequence'", func)));
    }

    let engine = match args.get(1) {
        None | Some(Value::Null) => engine.clone(),
        Some(options) => Engine::new(apply_options(func, options, engine.config())?),
    };

    let values = numbers_from_value(&args[0], engine.config())
        .map_err(|e| AugurError::from(e).in_function(func).for_argument("sequence"))?;
    Ok((values, engine))
}

fn apply_options(func: &str, options: &Value, base: &EngineConfig) -> Result<EngineConfig, AugurError> {
    let map = match options.as_object() {
        Some(m) => m,
        None => return Err(AugurError::arg_type(func, "options", "Object", options.type_name())),
    };

    let mut config = base.clone();
    // Same ranges as the AUGUR_* environment overlay
    for (key, target, max, expected) in [
        ("rtol", &mut config.rtol, f64::INFINITY, "non-negative Number"),
        ("atol", &mut config.atol, f64::INFINITY, "non-negative Number"),
        ("min_confidence", &mut config.min_confidence, 1.0, "Number in [0, 1]"),
    ] {
        match map.get(key) {
            None | Some(Value::Null) => {}
            Some(Value::Number(n)) if n.is_finite() && (0.0..=max).contains(n) => *target = *n,
            Some(other) => {
                return Err(AugurError::arg_type(func, "options", expected, &other.to_string())
                    .with_note(format!("option '{}'", key)))
            }
        }
    }
    Ok(config)
}

fn to_error(func: &str, err: InductiveError) -> AugurError {
    match err {
        InductiveError::Invalid(e) => AugurError::from(e).in_function(func).for_argument("sequence"),
        InductiveError::TimedOut(e) => AugurError::from(e).in_function(func),
    }
}

fn outcome_to_value(outcome: &DetectionOutcome) -> Result<Value, AugurError> {
    let mut result = HashMap::new();
    result.insert("description".to_string(), Value::Text(describe(outcome)));
    result.insert("confidence".to_string(), Value::Number(outcome.confidence()));
    result.insert("next_value".to_string(), Value::from(outcome.next_value()));

    match outcome {
        DetectionOutcome::Found(m) => {
            let evidence = serde_json::to_value(&m.evidence)
                .map_err(|e| AugurError::internal(format!("evidence serialization: {}", e)))?;
            let kind = serde_json::to_value(m.kind)
                .map_err(|e| AugurError::internal(format!("kind serialization: {}", e)))?;
            // Flatten {kind, degree|period} into the result
            if let Value::Object(fields) = Value::from_json(&kind) {
                result.extend(fields);
            }
            result.insert("found".to_string(), Value::Bool(true));
            result.insert("evidence".to_string(), Value::from_json(&evidence));
        }
        DetectionOutcome::NotFound => {
            result.insert("found".to_string(), Value::Bool(false));
            result.insert("kind".to_string(), Value::Null);
            result.insert("evidence".to_string(), Value::Null);
        }
    }
    Ok(Value::Object(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use augur_core::codes;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn seq(values: &[f64]) -> Value {
        Value::from(values.to_vec())
    }

    fn options(pairs: &[(&str, Value)]) -> Value {
        Value::Object(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    #[test]
    fn test_predict_next() {
        let f = PredictNext::new(Engine::default());
        let mut ctx = CallContext::new();
        let result = f.call(&[seq(&[2.0, 4.0, 6.0, 8.0])], &mut ctx);
        assert!(approx_eq(result.get("value").as_number().unwrap(), 10.0, 1e-9));
        assert!(result.get("confidence").as_number().unwrap() >= 0.8);
        assert!(ctx.chain.is_empty());
    }

    #[test]
    fn test_predict_next_no_pattern() {
        let f = PredictNext::new(Engine::default());
        let result = f.call(&[seq(&[1.0, 7.0, 3.0, 12.0, 9.0])], &mut CallContext::new());
        assert!(result.get("value").is_null());
        assert_eq!(result.get("confidence").as_number(), Some(0.0));
    }

    #[test]
    fn test_describe_pattern() {
        let f = DescribePattern::new(Engine::default());
        let result = f.call(&[seq(&[5.0, 8.0, 11.0, 14.0])], &mut CallContext::new());
        assert_eq!(
            result.get("description").as_text(),
            Some("arithmetic progression with common difference 3")
        );
    }

    #[test]
    fn test_detect_pattern_fields() {
        let f = DetectPattern::new(Engine::default());
        let result = f.call(&[seq(&[1.0, 3.0, 6.0, 8.0, 11.0, 13.0, 16.0])], &mut CallContext::new());
        assert_eq!(result.get("found").as_bool(), Some(true));
        assert_eq!(result.get("kind").as_text(), Some("periodic"));
        assert_eq!(result.get("period").as_number(), Some(2.0));
        assert_eq!(result.get("evidence").get("over").as_text(), Some("steps"));
        assert_eq!(result.get("next_value").as_number(), Some(18.0));
    }

    #[test]
    fn test_detect_pattern_not_found() {
        let f = DetectPattern::new(Engine::default());
        let result = f.call(&[seq(&[1.0, 7.0, 3.0, 12.0, 9.0])], &mut CallContext::new());
        assert_eq!(result.get("found").as_bool(), Some(false));
        assert_eq!(result.get("description").as_text(), Some("no discernible pattern"));
    }

    #[test]
    fn test_tracing_records_step() {
        let f = DescribePattern::new(Engine::default());
        let mut ctx = CallContext::new().with_tracing(true);
        f.call(&[seq(&[1.0, 4.0, 9.0, 16.0, 25.0])], &mut ctx);
        assert_eq!(ctx.chain.len(), 1);
        let step = &ctx.chain.steps()[0];
        assert_eq!(step.stage, STAGE);
        assert_eq!(step.evidence.as_deref(), Some("perfect squares n^2"));
    }

    #[test]
    fn test_wrong_arg_count() {
        let f = PredictNext::new(Engine::default());
        let result = f.call(&[], &mut CallContext::new());
        assert_eq!(result.as_error().map(|e| e.code.as_str()), Some(codes::ARG_COUNT));
    }

    #[test]
    fn test_wrong_shape() {
        let f = PredictNext::new(Engine::default());
        let nested = Value::List(vec![Value::Number(1.0), seq(&[2.0, 3.0])]);
        let result = f.call(&[nested], &mut CallContext::new());
        let err = result.as_error().unwrap();
        assert_eq!(err.code, codes::WRONG_SHAPE);
        assert_eq!(err.context.as_ref().and_then(|c| c.function.as_deref()), Some("predict_next"));
    }

    #[test]
    fn test_too_long() {
        let engine = Engine::new(EngineConfig { max_sequence_length: 4, ..Default::default() });
        let f = PredictNext::new(engine);
        let result = f.call(&[seq(&[1.0, 2.0, 3.0, 4.0, 5.0])], &mut CallContext::new());
        assert_eq!(result.as_error().map(|e| e.code.as_str()), Some(codes::SEQUENCE_TOO_LONG));
    }

    #[test]
    fn test_options_override_tolerance() {
        let f = DescribePattern::new(Engine::default());
        let noisy = seq(&[0.0, 10.5, 20.0, 30.5, 40.0]);
        let strict = f.call(&[noisy.clone()], &mut CallContext::new());
        assert!(strict.get("description").as_text().unwrap().starts_with("alternating steps"));
        let loose = f.call(
            &[noisy, options(&[("rtol", Value::Number(0.2))])],
            &mut CallContext::new(),
        );
        assert_eq!(
            loose.get("description").as_text(),
            Some("arithmetic progression with common difference 10.5")
        );
    }

    #[test]
    fn test_bad_option_type() {
        let f = PredictNext::new(Engine::default());
        let result = f.call(
            &[seq(&[1.0, 2.0, 3.0]), options(&[("rtol", Value::from("loose"))])],
            &mut CallContext::new(),
        );
        assert_eq!(result.as_error().map(|e| e.code.as_str()), Some(codes::ARG_TYPE));
    }

    #[test]
    fn test_min_confidence_above_one_is_rejected() {
        let f = PredictNext::new(Engine::default());
        let result = f.call(
            &[seq(&[1.0, 2.0, 3.0]), options(&[("min_confidence", Value::Number(5.0))])],
            &mut CallContext::new(),
        );
        let err = result.as_error().unwrap();
        assert_eq!(err.code, codes::ARG_TYPE);
        assert!(err.message.contains("[0, 1]"));

        let result = f.call(
            &[seq(&[1.0, 2.0, 3.0]), options(&[("min_confidence", Value::Number(1.0))])],
            &mut CallContext::new(),
        );
        assert!(result.as_error().is_none());
    }
}

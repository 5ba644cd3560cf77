//! Augur Inductive
//!
//! Pattern detection and confidence scoring for numeric sequences:
//! - Input guard and wall-clock budget
//! - Detectors: arithmetic, geometric, Fibonacci/Lucas/Tribonacci,
//!   polynomial, exponential, periodic
//! - Shared confidence model and explanation formatter
//! - `predict_next`, `describe_pattern` and `detect_pattern` as plugins
//!
//! All functions follow the never-panic philosophy: bad input is a typed
//! error, and "no pattern" is an ordinary result.

mod budget;
mod confidence;
mod config;
mod engine;
mod error;
mod explain;
mod functions;
mod guard;
mod pattern;
mod stats;

pub mod detectors;

use augur_plugin::PluginRegistry;

pub use budget::Budget;
pub use confidence::{ConfidenceModel, QualitySignal};
pub use config::{ConfidenceConfig, EngineConfig, MinLengths};
pub use engine::Engine;
pub use error::{InductiveError, InvalidInput, TimedOut};
pub use explain::{describe, describe_match, format_number, NO_PATTERN};
pub use functions::{DescribePattern, DetectPattern, PredictNext};
pub use guard::{numbers_from_value, validate, Sequence};
pub use pattern::{
    CycleOver, DescriptionResult, DetectionOutcome, Evidence, PatternKind, PatternMatch, PredictionResult,
};

/// Load inductive functions into registry
pub fn load_inductive_library(registry: PluginRegistry, config: EngineConfig) -> PluginRegistry {
    let engine = Engine::new(config);
    registry
        .with_function(functions::PredictNext::new(engine.clone()))
        .with_function(functions::DescribePattern::new(engine.clone()))
        .with_function(functions::DetectPattern::new(engine))
}

/// Predict the next value with the default configuration
pub fn predict_next(sequence: &[f64]) -> Result<PredictionResult, InductiveError> {
    Engine::default().predict_next(sequence)
}

/// Describe the pattern with the default configuration
pub fn describe_pattern(sequence: &[f64]) -> Result<DescriptionResult, InductiveError> {
    Engine::default().describe_pattern(sequence)
}

/// Full detection with the default configuration
pub fn detect_pattern(sequence: &[f64]) -> Result<DetectionOutcome, InductiveError> {
    Engine::default().detect(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use augur_plugin::CallContext;
    use augur_core::Value;

    fn registry() -> PluginRegistry {
        load_inductive_library(PluginRegistry::new(), EngineConfig::default())
    }

    #[test]
    fn test_registry_has_functions() {
        let r = registry();
        assert_eq!(r.function_names(), vec!["describe_pattern", "detect_pattern", "predict_next"]);
    }

    #[test]
    fn test_call_through_registry() {
        let result = registry().call_function(
            "predict_next",
            &[Value::from(vec![1.0, 1.0, 2.0, 3.0, 5.0, 8.0])],
            &mut CallContext::new(),
        );
        assert_eq!(result.get("value").as_number(), Some(13.0));
    }

    #[test]
    fn test_tool_schemas() {
        let schemas = registry().tool_schemas();
        assert_eq!(schemas.len(), 3);
        let predict = schemas.iter().find(|s| s["name"] == "predict_next").unwrap();
        assert_eq!(predict["inputSchema"]["properties"]["sequence"]["type"], "array");
        assert_eq!(predict["inputSchema"]["required"], serde_json::json!(["sequence"]));
    }

    #[test]
    fn test_free_functions() {
        let p = predict_next(&[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(p.value, Some(40.0));
        let d = describe_pattern(&[3.0, 6.0, 12.0, 24.0]).unwrap();
        assert_eq!(d.description, "geometric progression with common ratio 2");
        assert!(!detect_pattern(&[1.0, 7.0, 3.0, 12.0, 9.0]).unwrap().is_found());
    }

    #[test]
    fn test_describe_lucas_and_squares() {
        let d = describe_pattern(&[2.0, 1.0, 3.0, 4.0, 7.0, 11.0]).unwrap();
        assert!(d.description.starts_with("Lucas sequence"));
        let d = describe_pattern(&[1.0, 4.0, 9.0, 16.0, 25.0]).unwrap();
        assert_eq!(d.description, "perfect squares n^2");
    }
}

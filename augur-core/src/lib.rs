//! Augur Core - Fundamental types
//!
//! This crate provides the core types used throughout Augur:
//! - `Value`: Runtime values (numbers, text, objects, errors)
//! - `AugurError`: Structured errors for LLM consumption

mod value;
mod error;

pub use value::Value;
pub use error::{AugurError, ErrorContext, Severity, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Value, AugurError, Severity};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod value_tests {
        use super::*;
        use serde_json::json;

        #[test]
        fn test_from_f64() {
            let v: Value = 42.5.into();
            assert!(matches!(v, Value::Number(_)));
            assert_eq!(v.as_number(), Some(42.5));
        }

        #[test]
        fn test_from_str() {
            let v: Value = "hello".into();
            assert!(matches!(v, Value::Text(_)));
            assert_eq!(v.as_text(), Some("hello"));
        }

        #[test]
        fn test_from_option() {
            assert!(Value::from(None::<f64>).is_null());
            assert_eq!(Value::from(Some(3.0)).as_number(), Some(3.0));
        }

        #[test]
        fn test_type_name() {
            assert_eq!(Value::Number(0.0).type_name(), "Number");
            assert_eq!(Value::Text("".to_string()).type_name(), "Text");
            assert_eq!(Value::Bool(true).type_name(), "Bool");
            assert_eq!(Value::Null.type_name(), "Null");
        }

        #[test]
        fn test_is_error() {
            let err = Value::Error(AugurError::timeout("too slow"));
            assert!(err.is_error());
            assert!(!Value::Null.is_error());
        }

        #[test]
        fn test_get_missing_field_is_null() {
            let v = Value::Object(Default::default());
            assert!(v.get("missing").is_null());
        }

        #[test]
        fn test_json_bridge() {
            let json = json!([1, 2.5, "x", null, {"k": true}]);
            let v = Value::from_json(&json);
            let list = v.as_list().unwrap();
            assert_eq!(list[0].as_number(), Some(1.0));
            assert_eq!(list[1].as_number(), Some(2.5));
            assert_eq!(list[2].as_text(), Some("x"));
            assert!(list[3].is_null());
            assert_eq!(list[4].get("k").as_bool(), Some(true));
            assert_eq!(v.to_json(), json!([1.0, 2.5, "x", null, {"k": true}]));
        }

        #[test]
        fn test_non_finite_to_json_is_null() {
            assert_eq!(Value::Number(f64::NAN).to_json(), serde_json::Value::Null);
        }

        #[test]
        fn test_display_small_list() {
            let v = Value::from(vec![1.0, 2.0, 3.5]);
            assert_eq!(v.to_string(), "[1, 2, 3.5]");
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_error_construction() {
            let err = AugurError::wrong_shape("nested list");
            assert_eq!(err.code, codes::WRONG_SHAPE);
            assert!(err.suggestion.is_some());
        }

        #[test]
        fn test_error_with_context() {
            let err = AugurError::arg_type("predict_next", "sequence", "List", "Text")
                .at_index(3);
            let ctx = err.context.unwrap();
            assert_eq!(ctx.function, Some("predict_next".to_string()));
            assert_eq!(ctx.argument, Some("sequence".to_string()));
            assert_eq!(ctx.index, Some(3));
        }

        #[test]
        fn test_error_with_note() {
            let err = AugurError::timeout("budget exhausted")
                .with_note("polynomial detector");
            let ctx = err.context.unwrap();
            assert_eq!(ctx.notes.len(), 1);
            assert_eq!(ctx.notes[0], "polynomial detector");
        }

        #[test]
        fn test_error_display() {
            let err = AugurError::undefined_func("predcit_next");
            let display = format!("{}", err);
            assert!(display.contains("UNDEFINED_FUNC"));
            assert!(display.contains("suggestion"));
        }

        #[test]
        fn test_internal_is_fatal() {
            assert_eq!(AugurError::internal("x").severity, Severity::Fatal);
        }

        #[test]
        fn test_severity_serialization() {
            let err = AugurError::not_found("x");
            assert_eq!(err.severity, Severity::Error);
            let json = serde_json::to_value(&err).unwrap();
            assert_eq!(json["severity"], "error");
            assert_eq!(json["code"], codes::NOT_FOUND);
            assert_eq!(serde_json::to_value(Severity::Fatal).unwrap(), "fatal");
        }
    }
}

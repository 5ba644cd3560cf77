//! Input guard
//!
//! Runs once per call before any detector. A `Sequence` can only be built
//! through `validate`, so detectors may rely on its invariants: non-empty,
//! bounded length, every value finite and within the magnitude limit.

use crate::config::EngineConfig;
use crate::error::InvalidInput;
use augur_core::Value;
use std::ops::Deref;
use tracing::warn;

/// A validated, read-only view of the caller's numbers
#[derive(Debug, Clone, Copy)]
pub struct Sequence<'a>(&'a [f64]);

impl<'a> Sequence<'a> {
    pub fn values(&self) -> &'a [f64] {
        self.0
    }

    pub fn last(&self) -> f64 {
        // Non-empty by construction
        self.0[self.0.len() - 1]
    }
}

impl Deref for Sequence<'_> {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        self.0
    }
}

/// Check length first (O(1)), then every element
pub fn validate<'a>(values: &'a [f64], caller: &str, config: &EngineConfig) -> Result<Sequence<'a>, InvalidInput> {
    if values.is_empty() {
        warn!(caller, "rejected empty sequence");
        return Err(InvalidInput::Empty);
    }
    if values.len() > config.max_sequence_length {
        warn!(caller, len = values.len(), max = config.max_sequence_length, "rejected oversized sequence");
        return Err(InvalidInput::TooLong {
            len: values.len(),
            max: config.max_sequence_length,
        });
    }

    let limit = config.value_magnitude_limit;
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            warn!(caller, index, "rejected non-finite element");
            return Err(InvalidInput::NonFinite { index });
        }
        if value.abs() > limit {
            warn!(caller, index, value, "rejected over-magnitude element");
            return Err(InvalidInput::Overflowing { index, value, limit });
        }
    }

    Ok(Sequence(values))
}

/// Turn a tool argument into numbers, rejecting anything but a flat numeric list
pub fn numbers_from_value(value: &Value, config: &EngineConfig) -> Result<Vec<f64>, InvalidInput> {
    let items = match value {
        Value::List(items) => items,
        other => {
            return Err(InvalidInput::WrongShape {
                details: format!("expected a list of numbers, got {}", other.type_name()),
            })
        }
    };

    // Length before conversion so oversized input costs nothing
    if items.len() > config.max_sequence_length {
        return Err(InvalidInput::TooLong {
            len: items.len(),
            max: config.max_sequence_length,
        });
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Number(n) => Ok(*n),
            // JSON cannot carry NaN; from_json turns it into Null
            Value::Null => Err(InvalidInput::NonFinite { index: i }),
            Value::List(_) => Err(InvalidInput::WrongShape {
                details: format!("element {} is a nested list; the sequence must be 1-D", i),
            }),
            other => Err(InvalidInput::WrongShape {
                details: format!("element {} is {}, expected Number", i, other.type_name()),
            }),
        })
        .collect()
}

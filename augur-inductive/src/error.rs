//! Typed errors for the inductive engine
//!
//! `ArithmeticDegenerate` conditions never appear here: a detector that hits
//! a zero ratio or a singular fit simply abstains with `Ok(None)`.

use augur_core::{codes, AugurError};
use std::time::Duration;
use thiserror::Error;

/// Rejected input. Always fatal for the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("sequence is empty")]
    Empty,

    #[error("sequence has {len} elements, maximum is {max}")]
    TooLong { len: usize, max: usize },

    #[error("element {index} is NaN or infinite")]
    NonFinite { index: usize },

    #[error("element {index} has magnitude {value:e}, limit is {limit:e}")]
    Overflowing { index: usize, value: f64, limit: f64 },

    #[error("wrong shape: {details}")]
    WrongShape { details: String },
}

/// Wall-clock budget exhausted
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{caller} exceeded the {limit:?} budget after {elapsed:?}")]
pub struct TimedOut {
    pub caller: &'static str,
    pub elapsed: Duration,
    pub limit: Duration,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InductiveError {
    #[error("invalid input: {0}")]
    Invalid(#[from] InvalidInput),

    #[error("timed out: {0}")]
    TimedOut(#[from] TimedOut),
}

impl From<InvalidInput> for AugurError {
    fn from(err: InvalidInput) -> Self {
        let message = err.to_string();
        match err {
            InvalidInput::Empty => AugurError::new(codes::EMPTY_SEQUENCE, message)
                .with_suggestion("Pass at least one number"),
            InvalidInput::TooLong { max, .. } => AugurError::new(codes::SEQUENCE_TOO_LONG, message)
                .with_suggestion(format!("Trim the sequence to at most {} elements", max)),
            InvalidInput::NonFinite { index } => AugurError::new(codes::NON_FINITE, message)
                .with_suggestion("Remove NaN and infinite values")
                .at_index(index),
            InvalidInput::Overflowing { index, .. } => AugurError::new(codes::OVERFLOW, message)
                .with_suggestion("Rescale the sequence to smaller magnitudes")
                .at_index(index),
            InvalidInput::WrongShape { details } => AugurError::wrong_shape(details),
        }
    }
}

impl From<TimedOut> for AugurError {
    fn from(err: TimedOut) -> Self {
        AugurError::timeout(err.to_string()).with_note(err.caller)
    }
}

impl From<InductiveError> for AugurError {
    fn from(err: InductiveError) -> Self {
        match err {
            InductiveError::Invalid(e) => e.into(),
            InductiveError::TimedOut(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_long_maps_to_code() {
        let err: AugurError = InductiveError::from(InvalidInput::TooLong { len: 6, max: 5 }).into();
        assert_eq!(err.code, codes::SEQUENCE_TOO_LONG);
        assert!(err.message.contains("6 elements"));
    }

    #[test]
    fn test_non_finite_carries_index() {
        let err: AugurError = InvalidInput::NonFinite { index: 2 }.into();
        assert_eq!(err.code, codes::NON_FINITE);
        assert_eq!(err.context.and_then(|c| c.index), Some(2));
    }

    #[test]
    fn test_timeout_maps_to_code() {
        let err: AugurError = InductiveError::from(TimedOut {
            caller: "polynomial",
            elapsed: Duration::from_millis(7),
            limit: Duration::from_millis(5),
        })
        .into();
        assert_eq!(err.code, codes::TIMEOUT);
        assert!(err.message.contains("polynomial"));
    }
}

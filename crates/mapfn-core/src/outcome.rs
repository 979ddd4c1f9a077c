use crate::error::{Error, Result};

/// Result of validating one tag attribute.
///
/// `Clamped` and `Defaulted` still produce a usable value: out-of-range but well-typed input
/// degrades gracefully, only `Rejected` replaces the map with an error.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome<T> {
    Valid(T),
    Clamped(T),
    Defaulted(T),
    Rejected(Error),
}

impl<T> FieldOutcome<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            FieldOutcome::Valid(v) | FieldOutcome::Clamped(v) | FieldOutcome::Defaulted(v) => {
                Some(v)
            }
            FieldOutcome::Rejected(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            FieldOutcome::Valid(v) | FieldOutcome::Clamped(v) | FieldOutcome::Defaulted(v) => {
                Ok(v)
            }
            FieldOutcome::Rejected(err) => Err(err),
        }
    }
}

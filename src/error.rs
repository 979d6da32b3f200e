use thiserror::Error;

use crate::validate::FieldErrors;

/// Why a calculation produced no result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// One or more inputs failed their range/type checks; nothing was computed.
    #[error("invalid input: {0}")]
    Invalid(FieldErrors),

    /// Inputs were individually valid but the combination cannot be satisfied.
    #[error("{field}: {message}")]
    Constraint {
        field: &'static str,
        message: String,
    },

    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    #[error("unknown wire gauge: {0} AWG")]
    UnknownGauge(i32),

    #[error("unknown battery: {0}")]
    UnknownBattery(String),

    #[error("no suitable gauge found")]
    NoSuitableGauge,
}

impl CalcError {
    pub fn constraint(field: &'static str, message: impl Into<String>) -> Self {
        CalcError::Constraint {
            field,
            message: message.into(),
        }
    }

    /// Field the error should be shown against, if it belongs to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CalcError::Constraint { field, .. } => Some(*field),
            CalcError::Invalid(errors) => errors.iter().next().map(|e| e.field),
            _ => None,
        }
    }
}

pub type CalcResult<T> = Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_display() {
        let err = CalcError::constraint("batchVg", "The selected VG/PG ratio cannot be achieved");
        assert_eq!(
            err.to_string(),
            "batchVg: The selected VG/PG ratio cannot be achieved"
        );
        assert_eq!(err.field(), Some("batchVg"));
    }

    #[test]
    fn test_lookup_errors_have_no_field() {
        assert_eq!(CalcError::UnknownGauge(99).field(), None);
        assert_eq!(
            CalcError::UnknownMaterial("unobtainium".into()).to_string(),
            "unknown material: unobtainium"
        );
    }
}

//! Field-level input validation
//!
//! Every calculator checks its raw inputs here before computing anything. The
//! checks mirror the form schema: a value is either in range or it produces a
//! message against the field name the form uses.

use std::fmt;

use thiserror::Error;

use crate::error::{CalcError, CalcResult};

/// A single rejected field
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Ordered collection of field errors for one form submission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Reject NaN and infinities. Returns false if the value was rejected.
    pub fn number(&mut self, field: &'static str, value: f64) -> bool {
        if value.is_finite() {
            true
        } else {
            self.push(field, format!("{} must be a number.", label(field)));
            false
        }
    }

    /// `value >= min`
    pub fn at_least(&mut self, field: &'static str, value: f64, min: f64, message: &str) {
        if self.number(field, value) && value < min {
            self.push(field, message);
        }
    }

    /// `value <= max`
    pub fn at_most(&mut self, field: &'static str, value: f64, max: f64, message: &str) {
        if self.number(field, value) && value > max {
            self.push(field, message);
        }
    }

    /// `value > 0`
    pub fn positive(&mut self, field: &'static str, value: f64, message: &str) {
        if self.number(field, value) && value <= 0.0 {
            self.push(field, message);
        }
    }

    /// `min <= value <= max`
    pub fn within(&mut self, field: &'static str, value: f64, min: f64, max: f64) {
        if self.number(field, value) && !(min..=max).contains(&value) {
            self.push(
                field,
                format!("{} must be between {} and {}.", label(field), min, max),
            );
        }
    }

    /// Percentage on the 0..=100 scale.
    pub fn percent(&mut self, field: &'static str, value: f64) {
        if !self.number(field, value) {
            return;
        }
        if value < 0.0 {
            self.push(field, "Percentage must be greater than zero.");
        } else if value > 100.0 {
            self.push(field, "Percentage must be less than 100.");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// First message recorded against `field`
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(())` when nothing was rejected, otherwise `CalcError::Invalid`.
    pub fn finish(self) -> CalcResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CalcError::Invalid(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

// camelCase field name -> "Camel case" for generated messages
fn label(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for (i, c) in field.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else if c.is_uppercase() {
            out.push(' ');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_finishes_ok() {
        assert!(FieldErrors::new().finish().is_ok());
    }

    #[test]
    fn test_range_helpers() {
        let mut errors = FieldErrors::new();
        errors.at_least("strands", 0.0, 1.0, "Strands cannot be less than one.");
        errors.at_least("wraps", 5.0, 1.0, "Wraps cannot be less than one.");
        errors.percent("vgRatio", 120.0);
        errors.positive("batchMl", 0.0, "Batch size must be greater than zero.");

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("strands"), Some("Strands cannot be less than one."));
        assert_eq!(errors.get("wraps"), None);
        assert_eq!(errors.get("vgRatio"), Some("Percentage must be less than 100."));
    }

    #[test]
    fn test_non_finite_rejected_once() {
        let mut errors = FieldErrors::new();
        errors.within("maxTempRise", f64::NAN, 0.0, 250.0);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("maxTempRise"), Some("Max temp rise must be a number."));
    }

    #[test]
    fn test_finish_wraps_errors() {
        let mut errors = FieldErrors::new();
        errors.push("series", "Series count must be at least one.");
        match errors.finish() {
            Err(CalcError::Invalid(e)) => {
                assert_eq!(e.to_string(), "series: Series count must be at least one.")
            }
            other => panic!("expected invalid input, got {:?}", other),
        }
    }
}

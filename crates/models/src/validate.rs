//! Field validators shared by all entities.

use sea_orm::prelude::DateTimeWithTimeZone;

use crate::errors::ModelError;

fn invalid(msg: impl Into<String>) -> ModelError {
    ModelError::Validation(msg.into())
}

/// Required free text: non-blank and at most `max` characters.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} required")));
    }
    if value.chars().count() > max {
        return Err(invalid(format!("{field} longer than {max} characters")));
    }
    Ok(())
}

pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<(), ModelError> {
    match value {
        Some(v) => require_text(field, v, max),
        None => Ok(()),
    }
}

/// Money-like amounts: finite and not negative.
pub fn non_negative(field: &str, value: f64) -> Result<(), ModelError> {
    if !value.is_finite() {
        return Err(invalid(format!("{field} must be a finite number")));
    }
    if value < 0.0 {
        return Err(invalid(format!("{field} must be >= 0")));
    }
    Ok(())
}

/// Closed date range: `start <= end`.
pub fn date_range(
    start_field: &str,
    start: &DateTimeWithTimeZone,
    end_field: &str,
    end: &DateTimeWithTimeZone,
) -> Result<(), ModelError> {
    if start > end {
        return Err(invalid(format!("{start_field} must not be after {end_field}")));
    }
    Ok(())
}

/// Half-open window `[start, end)`; must be non-empty.
pub fn time_window(start: &DateTimeWithTimeZone, end: &DateTimeWithTimeZone) -> Result<(), ModelError> {
    if start >= end {
        return Err(invalid("start_time must be before end_time"));
    }
    Ok(())
}

/// Two half-open windows intersect iff each starts before the other ends.
pub fn windows_overlap(
    a_start: &DateTimeWithTimeZone,
    a_end: &DateTimeWithTimeZone,
    b_start: &DateTimeWithTimeZone,
    b_end: &DateTimeWithTimeZone,
) -> bool {
    a_start < b_end && b_start < a_end
}

//! Validation utilities shared across inventory services

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Validate a per-material conversion factor (purchase unit -> base unit)
pub fn validate_conversion_factor(factor: Decimal) -> Result<(), &'static str> {
    if factor <= Decimal::ZERO {
        return Err("Conversion factor must be greater than 0");
    }
    Ok(())
}

/// Validate a low-stock threshold in base units
pub fn validate_threshold(threshold: Decimal) -> Result<(), &'static str> {
    if threshold < Decimal::ZERO {
        return Err("Low-stock threshold cannot be negative");
    }
    Ok(())
}

/// Validate an optional report date window
///
/// Bounds are inclusive calendar dates; the window must not start after it
/// ends and neither bound may lie in the future.
pub fn validate_report_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), &'static str> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err("Report window must start on or before its end date");
        }
    }
    if from.is_some_and(|d| d > today) || to.is_some_and(|d| d > today) {
        return Err("Report window cannot extend into the future");
    }
    Ok(())
}

/// Validate a raw material code (2-20 uppercase alphanumeric, dashes allowed)
pub fn validate_material_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 2 {
        return Err("Material code must be at least 2 characters");
    }
    if code.len() > 20 {
        return Err("Material code must be at most 20 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Material code must be uppercase alphanumeric");
    }
    Ok(())
}

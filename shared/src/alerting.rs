//! Low-stock crossing decisions
//!
//! Alerts are raised on the transition from above-threshold to
//! at-or-below-threshold, never on every read while already below. The
//! decision is pure; the service layer owns persistence and the
//! one-open-alert-per-material rule.

use rust_decimal::Decimal;

/// What the reconciler should do to the open alert state of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTransition {
    /// Open a new alert if none is currently open
    Raise,
    /// Resolve the open alert if one exists
    Resolve,
    /// Leave alert state untouched
    Hold,
}

/// Decide the transition after a known ledger delta has been applied.
///
/// `previous` is the stock before the delta (`current - delta`). A material
/// without a configured threshold never holds an open alert.
pub fn evaluate_after_delta(
    previous: Decimal,
    current: Decimal,
    threshold: Option<Decimal>,
) -> AlertTransition {
    let Some(threshold) = threshold else {
        return AlertTransition::Resolve;
    };
    if current > threshold {
        AlertTransition::Resolve
    } else if previous > threshold {
        // Genuine downward crossing
        AlertTransition::Raise
    } else {
        // Still below threshold; the existing alert already covers it
        AlertTransition::Hold
    }
}

/// Decide the transition from the current level alone.
///
/// Used when the threshold itself changes and there is no delta to reason
/// about: resolve if above the threshold, raise if at or below it.
pub fn evaluate_level(current: Decimal, threshold: Option<Decimal>) -> AlertTransition {
    let Some(threshold) = threshold else {
        return AlertTransition::Resolve;
    };
    if current > threshold {
        AlertTransition::Resolve
    } else {
        AlertTransition::Raise
    }
}

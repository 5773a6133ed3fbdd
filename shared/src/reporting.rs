//! Variance arithmetic for inventory reports
//!
//! Variance is the unexplained difference between expected and actual
//! closing stock after accounting for every recorded transaction type in a
//! window. Opening stock counts entries strictly before the window start;
//! closing stock counts entries through the window end.

use rust_decimal::Decimal;
use serde::Serialize;

/// Per-material inputs to the variance computation, all in base units.
///
/// `consumed` and `wasted` are absolute (positive) quantities;
/// `adjustments` keeps its sign.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct VarianceInputs {
    pub opening_stock: Decimal,
    pub purchased: Decimal,
    pub consumed: Decimal,
    pub wasted: Decimal,
    pub adjustments: Decimal,
    pub closing_stock: Decimal,
}

/// `opening + purchased - consumed - wasted + adjustments - closing`
///
/// Zero when every quantity change in the window is explained by the four
/// tracked transaction types; non-zero signals shrinkage or excess.
pub fn compute_variance(inputs: &VarianceInputs) -> Decimal {
    inputs.opening_stock + inputs.purchased - inputs.consumed - inputs.wasted
        + inputs.adjustments
        - inputs.closing_stock
}

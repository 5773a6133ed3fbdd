//! Weighted-average costing
//!
//! A raw material's average cost per base unit is recomputed on every
//! purchase as a quantity-weighted blend of the cost of stock already on
//! hand and the cost of the incoming quantity. Consumption, wastage and
//! adjustments never change the average.

use rust_decimal::Decimal;

/// Blend an existing average cost with a new purchase.
///
/// `existing_qty` is clamped to zero before blending: a material that is net
/// negative in the ledger (oversold before restock) carries no value on hand
/// for averaging purposes. When the combined quantity is zero the average
/// degenerates to the new unit cost.
pub fn weighted_average_cost(
    existing_qty: Decimal,
    existing_avg: Decimal,
    new_qty: Decimal,
    new_unit_cost: Decimal,
) -> Decimal {
    let on_hand = existing_qty.max(Decimal::ZERO);
    let combined = on_hand + new_qty;
    if combined.is_zero() {
        return new_unit_cost;
    }
    (on_hand * existing_avg + new_qty * new_unit_cost) / combined
}

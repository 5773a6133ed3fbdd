//! Goods-receipt tests
//!
//! Per-line conversion math and the all-or-nothing contract: a GRN whose
//! validation fails on any line leaves no trace of any line.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{convert_to_base, weighted_average_cost, BaseUnit, PurchaseUnit};
use std::collections::HashSet;
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// One registered material in the simulation
#[derive(Debug, Clone)]
struct Material {
    id: u32,
    purchase_unit: PurchaseUnit,
    base_unit: BaseUnit,
    conversion_factor: Decimal,
    average_cost: Decimal,
    last_purchase_cost: Decimal,
    is_active: bool,
    stock: Decimal,
}

/// One input line of a simulated GRN
#[derive(Debug, Clone, Copy)]
struct GrnLine {
    material_id: u32,
    purchase_quantity: Decimal,
    unit_cost: Decimal,
}

/// Apply a GRN to a set of materials with the same validate-everything-first
/// discipline as the service: any failure returns the materials untouched.
fn apply_grn(
    materials: &[Material],
    lines: &[GrnLine],
) -> Result<Vec<Material>, &'static str> {
    if lines.is_empty() {
        return Err("GRN must contain at least one line item");
    }

    let mut seen = HashSet::new();
    struct Prepared {
        idx: usize,
        base_quantity: Decimal,
        cost_per_base_unit: Decimal,
        prior_stock: Decimal,
    }
    let mut prepared = Vec::with_capacity(lines.len());

    for line in lines {
        if !seen.insert(line.material_id) {
            return Err("Duplicate material in GRN");
        }
        if line.purchase_quantity <= Decimal::ZERO {
            return Err("Purchase quantity must be positive");
        }
        if line.unit_cost <= Decimal::ZERO {
            return Err("Unit cost must be positive");
        }

        let idx = materials
            .iter()
            .position(|m| m.id == line.material_id)
            .ok_or("Raw material not found")?;
        let material = &materials[idx];
        if !material.is_active {
            return Err("Raw material is inactive");
        }

        let base_quantity = convert_to_base(
            line.purchase_quantity,
            material.purchase_unit,
            material.base_unit,
            material.conversion_factor,
        )
        .map_err(|_| "Incompatible units")?;

        prepared.push(Prepared {
            idx,
            base_quantity,
            cost_per_base_unit: line.unit_cost / material.conversion_factor,
            prior_stock: material.stock,
        });
    }

    // All lines validated; apply ledger, costing and stock together
    let mut updated = materials.to_vec();
    for p in &prepared {
        let material = &mut updated[p.idx];
        material.average_cost = weighted_average_cost(
            p.prior_stock,
            material.average_cost,
            p.base_quantity,
            p.cost_per_base_unit,
        );
        material.last_purchase_cost = p.cost_per_base_unit;
        material.stock += p.base_quantity;
    }
    Ok(updated)
}

fn tomato(stock: &str, avg: &str) -> Material {
    Material {
        id: 1,
        purchase_unit: PurchaseUnit::Kg,
        base_unit: BaseUnit::Gm,
        conversion_factor: dec("1000"),
        average_cost: dec(avg),
        last_purchase_cost: dec(avg),
        is_active: true,
        stock: dec(stock),
    }
}

fn napkins(stock: &str) -> Material {
    Material {
        id: 2,
        purchase_unit: PurchaseUnit::Pack,
        base_unit: BaseUnit::Pcs,
        conversion_factor: dec("50"),
        average_cost: dec("0.4"),
        last_purchase_cost: dec("0.4"),
        is_active: true,
        stock: dec(stock),
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_line_conversion_math() {
        // 2 KG at 12000 per KG with factor 1000: 2000 GM at 12 per GM
        let material = tomato("0", "0");
        let base_qty = convert_to_base(
            dec("2"),
            material.purchase_unit,
            material.base_unit,
            material.conversion_factor,
        )
        .unwrap();
        let cost_per_base = dec("12000") / material.conversion_factor;
        let line_total = base_qty * cost_per_base;

        assert_eq!(base_qty, dec("2000"));
        assert_eq!(cost_per_base, dec("12"));
        assert_eq!(line_total, dec("24000"));
    }

    #[test]
    fn test_costing_updates_from_pre_grn_snapshot() {
        // 100 @ 10 on hand, receive 50 @ 16 per base unit
        let materials = [tomato("100", "10")];
        let updated = apply_grn(
            &materials,
            &[GrnLine {
                material_id: 1,
                purchase_quantity: dec("0.05"), // 50 GM
                unit_cost: dec("16000"),        // 16 per GM
            }],
        )
        .unwrap();

        assert_eq!(updated[0].average_cost, dec("12"));
        assert_eq!(updated[0].last_purchase_cost, dec("16"));
        assert_eq!(updated[0].stock, dec("150"));
    }

    #[test]
    fn test_multi_line_grn_applies_all_lines() {
        let materials = [tomato("0", "0"), napkins("10")];
        let updated = apply_grn(
            &materials,
            &[
                GrnLine {
                    material_id: 1,
                    purchase_quantity: dec("3"),
                    unit_cost: dec("9000"),
                },
                GrnLine {
                    material_id: 2,
                    purchase_quantity: dec("2"),
                    unit_cost: dec("25"),
                },
            ],
        )
        .unwrap();

        assert_eq!(updated[0].stock, dec("3000"));
        assert_eq!(updated[0].average_cost, dec("9"));
        assert_eq!(updated[1].stock, dec("110"));
        assert_eq!(updated[1].last_purchase_cost, dec("0.5"));
    }

    #[test]
    fn test_failing_line_aborts_whole_grn() {
        let materials = [tomato("100", "10"), napkins("10")];
        let result = apply_grn(
            &materials,
            &[
                GrnLine {
                    material_id: 1,
                    purchase_quantity: dec("5"),
                    unit_cost: dec("11000"),
                },
                // Second line invalid: non-positive cost
                GrnLine {
                    material_id: 2,
                    purchase_quantity: dec("2"),
                    unit_cost: Decimal::ZERO,
                },
            ],
        );

        assert!(result.is_err());
        // Nothing changed for the valid first line either
        assert_eq!(materials[0].stock, dec("100"));
        assert_eq!(materials[0].average_cost, dec("10"));
    }

    #[test]
    fn test_duplicate_material_rejected() {
        let materials = [tomato("0", "0")];
        let line = GrnLine {
            material_id: 1,
            purchase_quantity: dec("1"),
            unit_cost: dec("100"),
        };
        assert_eq!(
            apply_grn(&materials, &[line, line]).unwrap_err(),
            "Duplicate material in GRN"
        );
    }

    #[test]
    fn test_inactive_material_rejected() {
        let mut material = tomato("0", "0");
        material.is_active = false;
        let result = apply_grn(
            &[material],
            &[GrnLine {
                material_id: 1,
                purchase_quantity: dec("1"),
                unit_cost: dec("100"),
            }],
        );
        assert_eq!(result.unwrap_err(), "Raw material is inactive");
    }

    #[test]
    fn test_unknown_material_rejected() {
        let result = apply_grn(
            &[tomato("0", "0")],
            &[GrnLine {
                material_id: 99,
                purchase_quantity: dec("1"),
                unit_cost: dec("100"),
            }],
        );
        assert_eq!(result.unwrap_err(), "Raw material not found");
    }

    #[test]
    fn test_empty_grn_rejected() {
        assert!(apply_grn(&[tomato("0", "0")], &[]).is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    fn qty_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn cost_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// line_total always equals purchase_quantity * unit_cost: the
        /// base-unit detour must not change the invoiced amount
        #[test]
        fn prop_line_total_preserves_invoice_amount(
            qty in qty_strategy(),
            cost in cost_strategy(),
            factor in (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 1)),
        ) {
            let base_qty = convert_to_base(qty, PurchaseUnit::Kg, BaseUnit::Gm, factor).unwrap();
            let cost_per_base = cost / factor;
            let line_total = base_qty * cost_per_base;
            let diff = (line_total - qty * cost).abs();
            prop_assert!(diff < Decimal::new(1, 10));
        }

        /// A rejected GRN never mutates any material
        #[test]
        fn prop_rejection_leaves_no_partial_state(
            good_qty in qty_strategy(),
            good_cost in cost_strategy(),
        ) {
            let materials = [tomato("500", "8"), napkins("20")];
            let result = apply_grn(
                &materials,
                &[
                    GrnLine { material_id: 1, purchase_quantity: good_qty, unit_cost: good_cost },
                    GrnLine { material_id: 2, purchase_quantity: Decimal::ZERO, unit_cost: good_cost },
                ],
            );
            prop_assert!(result.is_err());
            prop_assert_eq!(materials[0].stock, dec("500"));
            prop_assert_eq!(materials[0].average_cost, dec("8"));
            prop_assert_eq!(materials[1].stock, dec("20"));
        }
    }
}

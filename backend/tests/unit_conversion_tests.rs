//! Unit conversion tests
//!
//! Purchase units convert to base units linearly via a per-material factor;
//! the fixed compatibility map is the only thing that can fail.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{convert_to_base, validate_compatibility, BaseUnit, PurchaseUnit, UnitError};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

const COMPATIBLE: [(PurchaseUnit, BaseUnit); 5] = [
    (PurchaseUnit::Kg, BaseUnit::Gm),
    (PurchaseUnit::Ltr, BaseUnit::Ml),
    (PurchaseUnit::Box, BaseUnit::Pcs),
    (PurchaseUnit::Pack, BaseUnit::Pcs),
    (PurchaseUnit::Pcs, BaseUnit::Pcs),
];

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_fixed_compatibility_map() {
        for (pu, bu) in COMPATIBLE {
            assert!(validate_compatibility(pu, bu).is_ok());
        }
    }

    #[test]
    fn test_every_other_pairing_is_rejected() {
        let all_base = [BaseUnit::Gm, BaseUnit::Ml, BaseUnit::Pcs];
        let all_purchase = [
            PurchaseUnit::Kg,
            PurchaseUnit::Ltr,
            PurchaseUnit::Box,
            PurchaseUnit::Pack,
            PurchaseUnit::Pcs,
        ];
        for pu in all_purchase {
            for bu in all_base {
                let expected_ok = COMPATIBLE.contains(&(pu, bu));
                assert_eq!(validate_compatibility(pu, bu).is_ok(), expected_ok);
            }
        }
    }

    #[test]
    fn test_error_names_expected_base_unit() {
        let err = validate_compatibility(PurchaseUnit::Ltr, BaseUnit::Pcs).unwrap_err();
        match err {
            UnitError::Incompatible { expected, .. } => assert_eq!(expected, BaseUnit::Ml),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_kg_to_gm_conversion() {
        let base = convert_to_base(dec("1.5"), PurchaseUnit::Kg, BaseUnit::Gm, dec("1000")).unwrap();
        assert_eq!(base, dec("1500"));
    }

    #[test]
    fn test_box_to_pcs_conversion() {
        let base = convert_to_base(dec("4"), PurchaseUnit::Box, BaseUnit::Pcs, dec("24")).unwrap();
        assert_eq!(base, dec("96"));
    }

    #[test]
    fn test_zero_quantity_converts_to_zero() {
        let base =
            convert_to_base(Decimal::ZERO, PurchaseUnit::Pack, BaseUnit::Pcs, dec("6")).unwrap();
        assert_eq!(base, Decimal::ZERO);
    }

    #[test]
    fn test_negative_quantity_supports_returns() {
        let base = convert_to_base(dec("-0.5"), PurchaseUnit::Kg, BaseUnit::Gm, dec("1000")).unwrap();
        assert_eq!(base, dec("-500"));
    }

    #[test]
    fn test_invalid_pair_fails_for_every_quantity() {
        for qty in [dec("0"), dec("-10"), dec("3.2")] {
            assert!(convert_to_base(qty, PurchaseUnit::Kg, BaseUnit::Pcs, dec("1000")).is_err());
        }
    }

    #[test]
    fn test_no_rounding_applied() {
        // 0.3333 KG at factor 1000 keeps full precision
        let base =
            convert_to_base(dec("0.3333"), PurchaseUnit::Kg, BaseUnit::Gm, dec("1000")).unwrap();
        assert_eq!(base, dec("333.3000"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (-1_000_000i64..=1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn factor_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=100_000i64).prop_map(|n| Decimal::new(n, 1))
    }

    fn compatible_pair_strategy() -> impl Strategy<Value = (PurchaseUnit, BaseUnit)> {
        prop_oneof![
            Just((PurchaseUnit::Kg, BaseUnit::Gm)),
            Just((PurchaseUnit::Ltr, BaseUnit::Ml)),
            Just((PurchaseUnit::Box, BaseUnit::Pcs)),
            Just((PurchaseUnit::Pack, BaseUnit::Pcs)),
            Just((PurchaseUnit::Pcs, BaseUnit::Pcs)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// convert_to_base(q, PU, BU, f) == q * f for every validated pair
        #[test]
        fn prop_conversion_equals_product(
            qty in quantity_strategy(),
            factor in factor_strategy(),
            (pu, bu) in compatible_pair_strategy(),
        ) {
            let base = convert_to_base(qty, pu, bu, factor).unwrap();
            prop_assert_eq!(base, qty * factor);
        }

        /// Conversion distributes over addition
        #[test]
        fn prop_conversion_is_additive(
            a in quantity_strategy(),
            b in quantity_strategy(),
            factor in factor_strategy(),
            (pu, bu) in compatible_pair_strategy(),
        ) {
            let sum = convert_to_base(a + b, pu, bu, factor).unwrap();
            let parts = convert_to_base(a, pu, bu, factor).unwrap()
                + convert_to_base(b, pu, bu, factor).unwrap();
            prop_assert_eq!(sum, parts);
        }

        /// Invalid pairs raise before multiplying, for every quantity
        #[test]
        fn prop_invalid_pair_always_fails(
            qty in quantity_strategy(),
            factor in factor_strategy(),
        ) {
            prop_assert!(convert_to_base(qty, PurchaseUnit::Kg, BaseUnit::Ml, factor).is_err());
            prop_assert!(convert_to_base(qty, PurchaseUnit::Box, BaseUnit::Gm, factor).is_err());
        }
    }
}

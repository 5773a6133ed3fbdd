//! Measurement units for raw materials
//!
//! Every raw material is bought in a purchase unit (KG, LTR, BOX, PACK, PCS)
//! and accounted for internally in a base unit (GM, ML, PCS). The mapping
//! between the two is fixed; the conversion factor is per material.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Internal unit of account for stock and costing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaseUnit {
    Gm,
    Ml,
    Pcs,
}

impl BaseUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseUnit::Gm => "GM",
            BaseUnit::Ml => "ML",
            BaseUnit::Pcs => "PCS",
        }
    }
}

impl fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaseUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GM" => Ok(BaseUnit::Gm),
            "ML" => Ok(BaseUnit::Ml),
            "PCS" => Ok(BaseUnit::Pcs),
            other => Err(UnitError::UnknownBaseUnit(other.to_string())),
        }
    }
}

/// Unit in which a raw material is bought from a vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseUnit {
    Kg,
    Ltr,
    Box,
    Pack,
    Pcs,
}

impl PurchaseUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseUnit::Kg => "KG",
            PurchaseUnit::Ltr => "LTR",
            PurchaseUnit::Box => "BOX",
            PurchaseUnit::Pack => "PACK",
            PurchaseUnit::Pcs => "PCS",
        }
    }

    /// The base unit this purchase unit is required to map to
    pub fn expected_base_unit(&self) -> BaseUnit {
        match self {
            PurchaseUnit::Kg => BaseUnit::Gm,
            PurchaseUnit::Ltr => BaseUnit::Ml,
            PurchaseUnit::Box | PurchaseUnit::Pack | PurchaseUnit::Pcs => BaseUnit::Pcs,
        }
    }
}

impl fmt::Display for PurchaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KG" => Ok(PurchaseUnit::Kg),
            "LTR" => Ok(PurchaseUnit::Ltr),
            "BOX" => Ok(PurchaseUnit::Box),
            "PACK" => Ok(PurchaseUnit::Pack),
            "PCS" => Ok(PurchaseUnit::Pcs),
            other => Err(UnitError::UnknownPurchaseUnit(other.to_string())),
        }
    }
}

/// Unit validation and conversion errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    #[error("purchase unit {purchase} must use base unit {expected}, not {actual}")]
    Incompatible {
        purchase: PurchaseUnit,
        expected: BaseUnit,
        actual: BaseUnit,
    },

    #[error("unknown base unit: {0}")]
    UnknownBaseUnit(String),

    #[error("unknown purchase unit: {0}")]
    UnknownPurchaseUnit(String),
}

/// Validate that a purchase unit maps to the given base unit
pub fn validate_compatibility(purchase: PurchaseUnit, base: BaseUnit) -> Result<(), UnitError> {
    let expected = purchase.expected_base_unit();
    if expected != base {
        return Err(UnitError::Incompatible {
            purchase,
            expected,
            actual: base,
        });
    }
    Ok(())
}

/// Convert a purchase-unit quantity to its base-unit quantity
///
/// Linear and deterministic: `quantity * conversion_factor`, with no rounding.
/// Zero and negative quantities are allowed (returns and corrections flow
/// through the same conversion); only the compatibility check can fail.
pub fn convert_to_base(
    quantity: Decimal,
    purchase: PurchaseUnit,
    base: BaseUnit,
    conversion_factor: Decimal,
) -> Result<Decimal, UnitError> {
    validate_compatibility(purchase, base)?;
    Ok(quantity * conversion_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn compatible_pairs_pass() {
        let pairs = [
            (PurchaseUnit::Kg, BaseUnit::Gm),
            (PurchaseUnit::Ltr, BaseUnit::Ml),
            (PurchaseUnit::Box, BaseUnit::Pcs),
            (PurchaseUnit::Pack, BaseUnit::Pcs),
            (PurchaseUnit::Pcs, BaseUnit::Pcs),
        ];
        for (pu, bu) in pairs {
            assert!(validate_compatibility(pu, bu).is_ok());
        }
    }

    #[test]
    fn incompatible_pair_names_expected_base_unit() {
        let err = validate_compatibility(PurchaseUnit::Kg, BaseUnit::Ml).unwrap_err();
        assert_eq!(
            err,
            UnitError::Incompatible {
                purchase: PurchaseUnit::Kg,
                expected: BaseUnit::Gm,
                actual: BaseUnit::Ml,
            }
        );
        assert!(err.to_string().contains("GM"));
    }

    #[test]
    fn conversion_is_linear() {
        let qty = convert_to_base(dec("2.5"), PurchaseUnit::Kg, BaseUnit::Gm, dec("1000")).unwrap();
        assert_eq!(qty, dec("2500"));
    }

    #[test]
    fn conversion_allows_zero_and_negative() {
        assert_eq!(
            convert_to_base(Decimal::ZERO, PurchaseUnit::Ltr, BaseUnit::Ml, dec("1000")).unwrap(),
            Decimal::ZERO
        );
        assert_eq!(
            convert_to_base(dec("-3"), PurchaseUnit::Box, BaseUnit::Pcs, dec("12")).unwrap(),
            dec("-36")
        );
    }

    #[test]
    fn conversion_fails_before_multiplying_for_invalid_pairs() {
        for qty in [dec("0"), dec("-1"), dec("7.25")] {
            let err = convert_to_base(qty, PurchaseUnit::Ltr, BaseUnit::Gm, dec("1000"));
            assert!(err.is_err());
        }
    }

    #[test]
    fn unit_round_trip_through_strings() {
        for pu in [
            PurchaseUnit::Kg,
            PurchaseUnit::Ltr,
            PurchaseUnit::Box,
            PurchaseUnit::Pack,
            PurchaseUnit::Pcs,
        ] {
            assert_eq!(PurchaseUnit::from_str(pu.as_str()).unwrap(), pu);
        }
        for bu in [BaseUnit::Gm, BaseUnit::Ml, BaseUnit::Pcs] {
            assert_eq!(BaseUnit::from_str(bu.as_str()).unwrap(), bu);
        }
    }
}

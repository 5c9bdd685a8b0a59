use crate::error::SettleError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits kept at persistence boundaries.
pub const MONEY_SCALE: u32 = 6;

/// Truncates a monetary value to [`MONEY_SCALE`] fractional digits,
/// rounding toward zero. Applied whenever a computed amount is persisted
/// or handed to the transfer capability.
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero)
}

/// A strictly positive monetary amount.
///
/// Wraps `rust_decimal::Decimal` so call sites that require a positive
/// value (payouts, transfers) cannot receive zero or negative input.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, SettleError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(SettleError::Validation(format!(
                "amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = SettleError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quantize_truncates_toward_zero() {
        assert_eq!(quantize(dec!(1.23456789)), dec!(1.234567));
        assert_eq!(quantize(dec!(1.9999999)), dec!(1.999999));
        assert_eq!(quantize(dec!(10)), dec!(10));
    }

    #[test]
    fn test_amount_rejects_non_positive() {
        assert!(Amount::new(dec!(0.000001)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0)),
            Err(SettleError::Validation(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-5)),
            Err(SettleError::Validation(_))
        ));
    }
}

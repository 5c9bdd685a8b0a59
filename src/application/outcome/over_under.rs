use super::Outcome;
use crate::domain::variant::Variant;
use rust_decimal::Decimal;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Over,
    Under,
    /// Digits 0 and 5 settle LOSE for both sides.
    Neither,
}

pub fn classify(digit: u32) -> Zone {
    match digit {
        6..=9 => Zone::Over,
        1..=4 => Zone::Under,
        _ => Zone::Neither,
    }
}

/// Over/Under: the last identifier digit picks the winning zone.
pub fn evaluate(variant: Variant, amount: Decimal, digits: &str, multiplier: Decimal) -> Outcome {
    let digit = digits
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .unwrap_or(0);
    let zone = classify(digit);

    let metadata = json!({
        "digit": digit,
        "zone": match zone {
            Zone::Over => "over",
            Zone::Under => "under",
            Zone::Neither => "neither",
        },
    });

    let won = matches!(
        (variant, zone),
        (Variant::Over, Zone::Over) | (Variant::Under, Zone::Under)
    );
    if won {
        Outcome::win(amount * multiplier, metadata)
    } else {
        Outcome::lose(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deposit::GameResult;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zone_classification() {
        assert_eq!(classify(6), Zone::Over);
        assert_eq!(classify(9), Zone::Over);
        assert_eq!(classify(1), Zone::Under);
        assert_eq!(classify(4), Zone::Under);
        assert_eq!(classify(0), Zone::Neither);
        assert_eq!(classify(5), Zone::Neither);
    }

    #[test]
    fn test_seven_pays_over_only() {
        assert_eq!(
            evaluate(Variant::Over, dec!(10), "7", dec!(1.95)).result,
            GameResult::Win
        );
        assert_eq!(
            evaluate(Variant::Under, dec!(10), "7", dec!(1.95)).result,
            GameResult::Lose
        );
    }

    #[test]
    fn test_five_loses_for_both_sides() {
        assert_eq!(
            evaluate(Variant::Over, dec!(10), "5", dec!(1.95)).result,
            GameResult::Lose
        );
        assert_eq!(
            evaluate(Variant::Under, dec!(10), "5", dec!(1.95)).result,
            GameResult::Lose
        );
    }
}

use super::Outcome;
use rust_decimal::Decimal;
use serde_json::json;

/// Lucky: a win is an identifier ending in the digit 7, nothing else.
pub fn evaluate(amount: Decimal, digits: &str, multiplier: Decimal) -> Outcome {
    let digit = digits
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .unwrap_or(0);
    let metadata = json!({ "digit": digit });

    if digit == 7 {
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
    fn test_seven_always_wins() {
        let outcome = evaluate(dec!(10), "7", dec!(7));
        assert_eq!(outcome.result, GameResult::Win);
        assert_eq!(outcome.payout, dec!(70));
    }

    #[test]
    fn test_anything_else_loses() {
        for digits in ["3", "0", "8"] {
            assert_eq!(evaluate(dec!(10), digits, dec!(7)).result, GameResult::Lose);
        }
    }
}

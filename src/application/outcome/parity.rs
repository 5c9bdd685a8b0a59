use super::Outcome;
use crate::domain::variant::Variant;
use rust_decimal::Decimal;
use serde_json::json;

/// Sum of the decimal digits in a digit string.
pub fn digit_sum(digits: &str) -> u32 {
    digits.chars().filter_map(|c| c.to_digit(10)).sum()
}

/// Odd/Even: the parity of the sum of the last 3 identifier digits wins
/// for whichever side matches it.
pub fn evaluate(variant: Variant, amount: Decimal, digits: &str, multiplier: Decimal) -> Outcome {
    let sum = digit_sum(digits);
    let sum_is_even = sum % 2 == 0;
    let chose_even = variant == Variant::Even;

    let metadata = json!({
        "digits": digits,
        "sum": sum,
        "parity": if sum_is_even { "even" } else { "odd" },
    });

    if chose_even == sum_is_even {
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
    fn test_digit_sum() {
        assert_eq!(digit_sum("123"), 6);
        assert_eq!(digit_sum("000"), 0);
        assert_eq!(digit_sum("999"), 27);
    }

    #[test]
    fn test_even_sum_pays_even_side() {
        // ...123 → 1+2+3 = 6, even.
        let win = evaluate(Variant::Even, dec!(10), "123", dec!(1.95));
        assert_eq!(win.result, GameResult::Win);
        assert_eq!(win.payout, dec!(19.5));

        let lose = evaluate(Variant::Odd, dec!(10), "123", dec!(1.95));
        assert_eq!(lose.result, GameResult::Lose);
        assert_eq!(lose.payout, dec!(0));
    }

    #[test]
    fn test_odd_sum_pays_odd_side() {
        // 1+2+4 = 7, odd.
        let win = evaluate(Variant::Odd, dec!(10), "124", dec!(1.95));
        assert_eq!(win.result, GameResult::Win);
        assert_eq!(evaluate(Variant::Even, dec!(10), "124", dec!(1.95)).result, GameResult::Lose);
    }
}

//! Deterministic outcome evaluation.
//!
//! One strategy per game family, all sharing the same gate: a disabled
//! game or an out-of-range amount settles VOID before any digits are
//! looked at. The only entropy source is the trailing digits of the
//! gateway transaction identifier, trusted exactly as far as the
//! exchange's own identifier generation is and no further.

mod lottery;
mod lucky;
mod over_under;
mod parity;

use crate::domain::deposit::GameResult;
use crate::domain::money::quantize;
use crate::domain::ports::{JackpotStoreRef, SettingsStoreRef};
use crate::domain::variant::{Variant, VariantGroup};
use crate::error::Result;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

pub use lottery::SidePrize;

/// Result of one evaluation: outcome class, payout, and free-form
/// metadata describing which digits decided it.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub result: GameResult,
    pub payout: Decimal,
    pub metadata: Option<serde_json::Value>,
}

impl Outcome {
    pub fn win(payout: Decimal, metadata: serde_json::Value) -> Self {
        Self {
            result: GameResult::Win,
            payout: quantize(payout),
            metadata: Some(metadata),
        }
    }

    pub fn lose(metadata: serde_json::Value) -> Self {
        Self {
            result: GameResult::Lose,
            payout: Decimal::ZERO,
            metadata: Some(metadata),
        }
    }

    pub fn void(reason: &str) -> Self {
        Self {
            result: GameResult::Void,
            payout: Decimal::ZERO,
            metadata: Some(json!({ "void_reason": reason })),
        }
    }
}

/// The last `n` decimal digits found in an identifier, in order.
/// `None` when the identifier does not carry that many digits.
pub fn trailing_digits(id: &str, n: usize) -> Option<String> {
    let digits: Vec<char> = id.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < n {
        return None;
    }
    Some(digits[digits.len() - n..].iter().collect())
}

fn default_multiplier(group: VariantGroup) -> Decimal {
    match group {
        VariantGroup::OddEven | VariantGroup::OverUnder => dec!(1.95),
        VariantGroup::Lucky => dec!(7),
        VariantGroup::Lottery(1) => dec!(9),
        VariantGroup::Lottery(2) => dec!(90),
        VariantGroup::Lottery(_) => dec!(900),
    }
}

/// Evaluates payments into outcomes. Configuration is read fresh on every
/// call so operators can change odds without a deploy.
pub struct OutcomeEngine {
    settings: SettingsStoreRef,
    jackpots: JackpotStoreRef,
}

impl OutcomeEngine {
    pub fn new(settings: SettingsStoreRef, jackpots: JackpotStoreRef) -> Self {
        Self { settings, jackpots }
    }

    pub async fn evaluate(
        &self,
        variant: Variant,
        amount: Decimal,
        tx_id: &str,
    ) -> Result<Outcome> {
        let group = variant.group();
        let gk = group.key();

        let enabled = self
            .settings
            .get(&format!("game.{gk}.enabled"), "true")
            .await;
        if enabled != "true" {
            return Ok(Outcome::void("game disabled"));
        }

        let min_bet = self
            .settings
            .get_decimal(&format!("game.{gk}.min_bet"), dec!(1))
            .await;
        let max_bet = self
            .settings
            .get_decimal(&format!("game.{gk}.max_bet"), dec!(1000))
            .await;
        if amount < min_bet || amount > max_bet {
            return Ok(Outcome::void("amount outside bet range"));
        }

        let Some(digits) = trailing_digits(tx_id, group.digits_needed()) else {
            return Ok(Outcome::void("identifier has too few digits"));
        };

        let multiplier = self
            .settings
            .get_decimal(&format!("game.{gk}.multiplier"), default_multiplier(group))
            .await;

        match group {
            VariantGroup::OddEven => Ok(parity::evaluate(variant, amount, &digits, multiplier)),
            VariantGroup::OverUnder => {
                Ok(over_under::evaluate(variant, amount, &digits, multiplier))
            }
            VariantGroup::Lucky => Ok(lucky::evaluate(amount, &digits, multiplier)),
            VariantGroup::Lottery(tier) => {
                lottery::evaluate(
                    self.settings.as_ref(),
                    self.jackpots.as_ref(),
                    tier,
                    amount,
                    &digits,
                    multiplier,
                )
                .await
            }
        }
    }
}

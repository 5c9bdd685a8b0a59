use super::{Outcome, trailing_digits};
use crate::domain::ports::{JackpotStore, SettingsStore};
use crate::error::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

/// Settings key holding the JSON side-prize table.
pub const SIDE_PRIZES_KEY: &str = "lottery.side_prizes";

/// One side-prize row: a digit suffix and the multiplier it pays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidePrize {
    pub suffix: String,
    pub multiplier: Decimal,
}

async fn side_prizes(settings: &dyn SettingsStore) -> Vec<SidePrize> {
    let raw = settings.get(SIDE_PRIZES_KEY, "[]").await;
    let mut prizes: Vec<SidePrize> = match serde_json::from_str(&raw) {
        Ok(prizes) => prizes,
        Err(error) => {
            warn!(%error, "unparsable lottery side-prize table, treating as empty");
            Vec::new()
        }
    };
    // Best prize first; the first suffix match wins.
    prizes.sort_by(|a, b| b.multiplier.cmp(&a.multiplier));
    prizes
}

/// Lottery tier `tier`: the last `tier` identifier digits against the
/// daily jackpot number's suffix, falling back to the side-prize table.
/// No jackpot row for today means the jackpot is never hit but
/// side-prizes still apply.
pub async fn evaluate(
    settings: &dyn SettingsStore,
    jackpots: &dyn JackpotStore,
    tier: u8,
    amount: Decimal,
    digits: &str,
    jackpot_multiplier: Decimal,
) -> Result<Outcome> {
    let today = Utc::now().date_naive();
    let jackpot_number = jackpots.for_date(today).await?;
    let jackpot_suffix =
        jackpot_number.and_then(|number| trailing_digits(&number, tier as usize));

    if let Some(suffix) = &jackpot_suffix
        && suffix == digits
    {
        return Ok(Outcome::win(
            amount * jackpot_multiplier,
            json!({
                "tier": tier,
                "digits": digits,
                "jackpot": suffix,
                "hit": "jackpot",
            }),
        ));
    }

    for prize in side_prizes(settings).await {
        if digits.ends_with(&prize.suffix) {
            return Ok(Outcome::win(
                amount * prize.multiplier,
                json!({
                    "tier": tier,
                    "digits": digits,
                    "jackpot": jackpot_suffix,
                    "hit": { "side": prize.suffix },
                }),
            ));
        }
    }

    Ok(Outcome::lose(json!({
        "tier": tier,
        "digits": digits,
        "jackpot": jackpot_suffix,
        "hit": null,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deposit::GameResult;
    use crate::infrastructure::in_memory::InMemoryJackpotStore;
    use crate::infrastructure::settings::InMemorySettings;
    use rust_decimal_macros::dec;

    async fn jackpot_today(number: &str) -> InMemoryJackpotStore {
        let store = InMemoryJackpotStore::new();
        store
            .set_for_date(Utc::now().date_naive(), number)
            .await;
        store
    }

    #[tokio::test]
    async fn test_jackpot_suffix_match_pays_jackpot() {
        let settings = InMemorySettings::new();
        let jackpots = jackpot_today("48291").await;

        let outcome = evaluate(&settings, &jackpots, 2, dec!(10), "91", dec!(90))
            .await
            .unwrap();
        assert_eq!(outcome.result, GameResult::Win);
        assert_eq!(outcome.payout, dec!(900));
    }

    #[tokio::test]
    async fn test_side_prize_applies_without_jackpot_hit() {
        let settings = InMemorySettings::new();
        settings
            .set(
                SIDE_PRIZES_KEY,
                r#"[{"suffix":"8","multiplier":"3"},{"suffix":"88","multiplier":"20"}]"#,
            )
            .await;
        let jackpots = jackpot_today("48291").await;

        // "88" matches both rows; the 20x row must win despite its
        // position in the stored table.
        let outcome = evaluate(&settings, &jackpots, 2, dec!(10), "88", dec!(90))
            .await
            .unwrap();
        assert_eq!(outcome.result, GameResult::Win);
        assert_eq!(outcome.payout, dec!(200));
    }

    #[tokio::test]
    async fn test_missing_jackpot_row_still_pays_side_prizes() {
        let settings = InMemorySettings::new();
        settings
            .set(SIDE_PRIZES_KEY, r#"[{"suffix":"7","multiplier":"2"}]"#)
            .await;
        let jackpots = InMemoryJackpotStore::new();

        let outcome = evaluate(&settings, &jackpots, 1, dec!(10), "7", dec!(9))
            .await
            .unwrap();
        assert_eq!(outcome.result, GameResult::Win);
        assert_eq!(outcome.payout, dec!(20));
    }

    #[tokio::test]
    async fn test_no_match_loses() {
        let settings = InMemorySettings::new();
        let jackpots = jackpot_today("48291").await;

        let outcome = evaluate(&settings, &jackpots, 3, dec!(10), "000", dec!(900))
            .await
            .unwrap();
        assert_eq!(outcome.result, GameResult::Lose);
        assert_eq!(outcome.payout, dec!(0));
    }
}

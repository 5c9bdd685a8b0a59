use betsettle::application::outcome::OutcomeEngine;
use betsettle::domain::deposit::GameResult;
use betsettle::domain::ports::SettingsStore;
use betsettle::domain::variant::Variant;
use betsettle::infrastructure::in_memory::InMemoryJackpotStore;
use betsettle::infrastructure::settings::InMemorySettings;
use chrono::Utc;
use rust_decimal_macros::dec;
use std::sync::Arc;

async fn engine() -> (OutcomeEngine, Arc<InMemorySettings>, Arc<InMemoryJackpotStore>) {
    let settings = Arc::new(InMemorySettings::new());
    let jackpots = Arc::new(InMemoryJackpotStore::new());
    (
        OutcomeEngine::new(settings.clone(), jackpots.clone()),
        settings,
        jackpots,
    )
}

#[tokio::test]
async fn odd_even_sums_last_three_digits() {
    let (engine, _, _) = engine().await;

    // ...123 → 1+2+3 = 6 → even.
    let even = engine
        .evaluate(Variant::Even, dec!(10), "tx-123")
        .await
        .unwrap();
    assert_eq!(even.result, GameResult::Win);
    assert_eq!(even.payout, dec!(19.5));

    let odd = engine
        .evaluate(Variant::Odd, dec!(10), "tx-123")
        .await
        .unwrap();
    assert_eq!(odd.result, GameResult::Lose);
    assert_eq!(odd.payout, dec!(0));
}

#[tokio::test]
async fn over_under_split_and_dead_digits() {
    let (engine, _, _) = engine().await;

    // Ends in 7 → over wins, under loses.
    assert_eq!(
        engine
            .evaluate(Variant::Over, dec!(10), "tx-007")
            .await
            .unwrap()
            .result,
        GameResult::Win
    );
    assert_eq!(
        engine
            .evaluate(Variant::Under, dec!(10), "tx-007")
            .await
            .unwrap()
            .result,
        GameResult::Lose
    );

    // Ends in 5 → both sides lose.
    for variant in [Variant::Over, Variant::Under] {
        assert_eq!(
            engine
                .evaluate(variant, dec!(10), "tx-005")
                .await
                .unwrap()
                .result,
            GameResult::Lose
        );
    }
}

#[tokio::test]
async fn lucky_is_decided_by_final_digit_alone() {
    let (engine, _, _) = engine().await;

    let win = engine
        .evaluate(Variant::Lucky, dec!(10), "99999997")
        .await
        .unwrap();
    assert_eq!(win.result, GameResult::Win);
    assert_eq!(win.payout, dec!(70));

    let lose = engine
        .evaluate(Variant::Lucky, dec!(10), "77777773")
        .await
        .unwrap();
    assert_eq!(lose.result, GameResult::Lose);
}

#[tokio::test]
async fn bet_range_boundaries_are_inclusive() {
    let (engine, settings, _) = engine().await;
    settings.set("game.lucky.min_bet", "1").await;
    settings.set("game.lucky.max_bet", "1000").await;

    for amount in [dec!(1), dec!(1000)] {
        let outcome = engine.evaluate(Variant::Lucky, amount, "tx7").await.unwrap();
        assert_ne!(outcome.result, GameResult::Void, "amount {amount} in range");
    }
    for amount in [dec!(0.9999999), dec!(1000.0000001)] {
        let outcome = engine.evaluate(Variant::Lucky, amount, "tx7").await.unwrap();
        assert_eq!(outcome.result, GameResult::Void, "amount {amount} out of range");
        assert_eq!(outcome.payout, dec!(0));
    }
}

#[tokio::test]
async fn disabled_game_settles_void() {
    let (engine, settings, _) = engine().await;
    settings.set("game.odd_even.enabled", "false").await;

    let outcome = engine
        .evaluate(Variant::Odd, dec!(10), "tx-123")
        .await
        .unwrap();
    assert_eq!(outcome.result, GameResult::Void);

    // The other families are unaffected.
    assert_ne!(
        engine
            .evaluate(Variant::Lucky, dec!(10), "tx7")
            .await
            .unwrap()
            .result,
        GameResult::Void
    );
}

#[tokio::test]
async fn identifier_without_enough_digits_settles_void() {
    let (engine, _, _) = engine().await;

    let outcome = engine
        .evaluate(Variant::Odd, dec!(10), "tx-12")
        .await
        .unwrap();
    assert_eq!(outcome.result, GameResult::Void);

    let outcome = engine
        .evaluate(Variant::Lucky, dec!(10), "no-digits")
        .await
        .unwrap();
    assert_eq!(outcome.result, GameResult::Void);
}

#[tokio::test]
async fn multiplier_changes_apply_without_restart() {
    let (engine, settings, _) = engine().await;

    let before = engine
        .evaluate(Variant::Lucky, dec!(10), "tx7")
        .await
        .unwrap();
    assert_eq!(before.payout, dec!(70));

    settings.set("game.lucky.multiplier", "9.5").await;
    let after = engine
        .evaluate(Variant::Lucky, dec!(10), "tx7")
        .await
        .unwrap();
    assert_eq!(after.payout, dec!(95));
}

#[tokio::test]
async fn evaluation_is_deterministic() {
    let (engine, _, jackpots) = engine().await;
    jackpots
        .set_for_date(Utc::now().date_naive(), "4829177")
        .await;

    for variant in Variant::ALL {
        let first = engine
            .evaluate(variant, dec!(25), "tx-8675309")
            .await
            .unwrap();
        for _ in 0..5 {
            let again = engine
                .evaluate(variant, dec!(25), "tx-8675309")
                .await
                .unwrap();
            assert_eq!(first.result, again.result, "variant {variant}");
            assert_eq!(first.payout, again.payout, "variant {variant}");
        }
    }
}

#[tokio::test]
async fn lottery_tiers_match_jackpot_suffix() {
    let (engine, _, jackpots) = engine().await;
    jackpots
        .set_for_date(Utc::now().date_naive(), "4829177")
        .await;

    // Tier 1: last digit 7 matches jackpot suffix "7".
    let tier1 = engine
        .evaluate(Variant::Lottery1, dec!(10), "tx-907")
        .await
        .unwrap();
    assert_eq!(tier1.result, GameResult::Win);
    assert_eq!(tier1.payout, dec!(90));

    // Tier 3: needs "177".
    let tier3 = engine
        .evaluate(Variant::Lottery3, dec!(10), "tx-90177")
        .await
        .unwrap();
    assert_eq!(tier3.result, GameResult::Win);
    assert_eq!(tier3.payout, dec!(9000));

    let miss = engine
        .evaluate(Variant::Lottery3, dec!(10), "tx-90178")
        .await
        .unwrap();
    assert_eq!(miss.result, GameResult::Lose);
}

#[tokio::test]
async fn lottery_without_jackpot_row_still_pays_side_prizes() {
    let (engine, settings, _) = engine().await;
    settings
        .set(
            "lottery.side_prizes",
            r#"[{"suffix":"9","multiplier":"2.5"}]"#,
        )
        .await;

    let side = engine
        .evaluate(Variant::Lottery1, dec!(10), "tx-9")
        .await
        .unwrap();
    assert_eq!(side.result, GameResult::Win);
    assert_eq!(side.payout, dec!(25));

    let miss = engine
        .evaluate(Variant::Lottery1, dec!(10), "tx-4")
        .await
        .unwrap();
    assert_eq!(miss.result, GameResult::Lose);
}

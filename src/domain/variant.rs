use serde::{Deserialize, Serialize};
use std::fmt;

/// A specific game side a collection account settles for.
///
/// The side the bettor played is implied by which account the payment
/// arrived on, so the variant carries the bettor's choice (odd vs. even,
/// over vs. under) rather than just the game family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Odd,
    Even,
    Over,
    Under,
    Lucky,
    Lottery1,
    Lottery2,
    Lottery3,
}

/// Game family a variant belongs to. Bet ranges, multipliers, and the
/// enabled switch are configured per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantGroup {
    OddEven,
    OverUnder,
    Lucky,
    Lottery(u8),
}

impl Variant {
    pub const ALL: [Variant; 8] = [
        Variant::Odd,
        Variant::Even,
        Variant::Over,
        Variant::Under,
        Variant::Lucky,
        Variant::Lottery1,
        Variant::Lottery2,
        Variant::Lottery3,
    ];

    pub fn group(&self) -> VariantGroup {
        match self {
            Variant::Odd | Variant::Even => VariantGroup::OddEven,
            Variant::Over | Variant::Under => VariantGroup::OverUnder,
            Variant::Lucky => VariantGroup::Lucky,
            Variant::Lottery1 => VariantGroup::Lottery(1),
            Variant::Lottery2 => VariantGroup::Lottery(2),
            Variant::Lottery3 => VariantGroup::Lottery(3),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Odd => "odd",
            Variant::Even => "even",
            Variant::Over => "over",
            Variant::Under => "under",
            Variant::Lucky => "lucky",
            Variant::Lottery1 => "lottery1",
            Variant::Lottery2 => "lottery2",
            Variant::Lottery3 => "lottery3",
        }
    }
}

impl VariantGroup {
    /// Settings key segment for this group, e.g. `game.odd_even.min_bet`.
    pub fn key(&self) -> &'static str {
        match self {
            VariantGroup::OddEven => "odd_even",
            VariantGroup::OverUnder => "over_under",
            VariantGroup::Lucky => "lucky",
            VariantGroup::Lottery(1) => "lottery1",
            VariantGroup::Lottery(2) => "lottery2",
            VariantGroup::Lottery(_) => "lottery3",
        }
    }

    /// Number of trailing identifier digits this group consumes.
    pub fn digits_needed(&self) -> usize {
        match self {
            VariantGroup::OddEven => 3,
            VariantGroup::OverUnder | VariantGroup::Lucky => 1,
            VariantGroup::Lottery(k) => *k as usize,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

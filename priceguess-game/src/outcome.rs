//! Guess evaluation and scoring shared by every mode.
use serde::{Deserialize, Serialize};

use crate::catalog::Price;
use crate::constants::{
    TIER_ACCEPTABLE_MAX_PCT, TIER_ACCEPTABLE_POINTS, TIER_EXCELLENT_MAX_PCT,
    TIER_EXCELLENT_POINTS, TIER_GOOD_MAX_PCT, TIER_GOOD_POINTS, TIER_POOR_POINTS,
    UNUSED_ATTEMPT_BONUS,
};
use crate::numbers::{percent_error, price_to_cents, round_to_cents};

/// Result of a single price guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Exact,
    TooLow,
    TooHigh,
    OutOfAttempts,
}

impl Outcome {
    /// Whether the round is over after this outcome.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exact | Self::OutOfAttempts)
    }

    #[must_use]
    pub const fn cue(self) -> Cue {
        match self {
            Self::Exact => Cue {
                icon: CueIcon::Check,
                tone: CueTone::Success,
            },
            Self::TooLow => Cue {
                icon: CueIcon::ArrowUp,
                tone: CueTone::Danger,
            },
            Self::TooHigh => Cue {
                icon: CueIcon::ArrowDown,
                tone: CueTone::Danger,
            },
            Self::OutOfAttempts => Cue {
                icon: CueIcon::Cross,
                tone: CueTone::Danger,
            },
        }
    }
}

/// How a guess is compared against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Raw value equality.
    #[default]
    Exact,
    /// Equality after rounding both sides to cents.
    RoundedCents,
}

/// Icon hint handed to the presenter for an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueIcon {
    Check,
    /// The price is above the guess.
    ArrowUp,
    /// The price is below the guess.
    ArrowDown,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueTone {
    Success,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub icon: CueIcon,
    pub tone: CueTone,
}

/// Classify `guess` against `target`.
///
/// `attempts` counts the guess being evaluated. An exact match wins even on
/// the final attempt; running out of attempts takes precedence over the
/// direction hint.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn evaluate(
    guess: f64,
    target: Price,
    attempts: u32,
    max_attempts: u32,
    policy: MatchPolicy,
) -> Outcome {
    let target_value = target.as_f64();
    let exact = match policy {
        MatchPolicy::Exact => guess == target_value,
        MatchPolicy::RoundedCents => price_to_cents(guess) == Some(target.cents()),
    };
    if exact {
        Outcome::Exact
    } else if attempts >= max_attempts {
        Outcome::OutOfAttempts
    } else if guess < target_value {
        Outcome::TooLow
    } else {
        Outcome::TooHigh
    }
}

/// Side of a pairwise comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    /// Side holding the strictly greater price; `None` on a tie.
    #[must_use]
    pub fn more_expensive(a: Price, b: Price) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Some(Self::A),
            std::cmp::Ordering::Less => Some(Self::B),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Higher/lower call on the mystery product relative to the visible one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Higher,
    Lower,
}

impl Direction {
    /// Direction of `mystery` relative to `visible`; ties read as lower.
    #[must_use]
    pub fn between(visible: Price, mystery: Price) -> Self {
        if mystery > visible {
            Self::Higher
        } else {
            Self::Lower
        }
    }
}

/// Basket accuracy bracket derived from the percentage error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyTier {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl AccuracyTier {
    #[must_use]
    pub fn from_percent_error(pct: f64) -> Self {
        if pct <= TIER_EXCELLENT_MAX_PCT {
            Self::Excellent
        } else if pct <= TIER_GOOD_MAX_PCT {
            Self::Good
        } else if pct <= TIER_ACCEPTABLE_MAX_PCT {
            Self::Acceptable
        } else {
            Self::Poor
        }
    }

    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Excellent => TIER_EXCELLENT_POINTS,
            Self::Good => TIER_GOOD_POINTS,
            Self::Acceptable => TIER_ACCEPTABLE_POINTS,
            Self::Poor => TIER_POOR_POINTS,
        }
    }
}

/// Informational basket score for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasketScore {
    pub tier: AccuracyTier,
    pub percent_error: f64,
    pub points: u32,
}

/// Score a basket guess: tier points plus a bonus per unused attempt.
#[must_use]
pub fn basket_score(guess: f64, total: Price, attempts: u32, max_attempts: u32) -> BasketScore {
    let pct = percent_error(guess, total.as_f64());
    let tier = AccuracyTier::from_percent_error(pct);
    let bonus = max_attempts.saturating_sub(attempts) * UNUSED_ATTEMPT_BONUS;
    BasketScore {
        tier,
        percent_error: round_to_cents(pct),
        points: tier.points() + bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(units: i64) -> Price {
        Price::from_cents(units * 100)
    }

    #[test]
    fn direction_before_exhaustion() {
        let target = price(10);
        assert_eq!(evaluate(10.0, target, 1, 6, MatchPolicy::Exact), Outcome::Exact);
        assert_eq!(evaluate(5.0, target, 1, 6, MatchPolicy::Exact), Outcome::TooLow);
        assert_eq!(evaluate(15.0, target, 5, 6, MatchPolicy::Exact), Outcome::TooHigh);
    }

    #[test]
    fn exhaustion_beats_direction_but_not_exact() {
        let target = price(10);
        assert_eq!(
            evaluate(5.0, target, 6, 6, MatchPolicy::Exact),
            Outcome::OutOfAttempts
        );
        assert_eq!(
            evaluate(50.0, target, 7, 6, MatchPolicy::Exact),
            Outcome::OutOfAttempts
        );
        assert_eq!(evaluate(10.0, target, 6, 6, MatchPolicy::Exact), Outcome::Exact);
    }

    #[test]
    fn rounded_policy_tolerates_sub_cent_noise() {
        let total = Price::from_cents(8_145);
        let noisy = 38.95 + 42.5 + 1e-9;
        assert_eq!(
            evaluate(noisy, total, 1, 6, MatchPolicy::RoundedCents),
            Outcome::Exact
        );
        assert_eq!(evaluate(noisy, total, 1, 6, MatchPolicy::Exact), Outcome::TooHigh);
    }

    #[test]
    fn tiers_follow_brackets() {
        assert_eq!(AccuracyTier::from_percent_error(5.0), AccuracyTier::Excellent);
        assert_eq!(AccuracyTier::from_percent_error(5.1), AccuracyTier::Good);
        assert_eq!(AccuracyTier::from_percent_error(15.0), AccuracyTier::Good);
        assert_eq!(AccuracyTier::from_percent_error(30.0), AccuracyTier::Acceptable);
        assert_eq!(AccuracyTier::from_percent_error(30.5), AccuracyTier::Poor);
    }

    #[test]
    fn basket_score_adds_unused_attempt_bonus() {
        let total = price(200);
        let score = basket_score(205.0, total, 2, 6);
        assert_eq!(score.tier, AccuracyTier::Excellent);
        assert_eq!(score.points, 100 + 40);

        let last = basket_score(400.0, total, 6, 6);
        assert_eq!(last.tier, AccuracyTier::Poor);
        assert_eq!(last.points, 25);

        let rough = basket_score(10.0, price(3), 1, 6);
        assert_eq!(rough.tier, AccuracyTier::Poor);
        assert!((rough.percent_error - 233.33).abs() < 1e-9);
    }

    #[test]
    fn cue_mapping_is_consistent() {
        assert_eq!(Outcome::TooLow.cue().icon, CueIcon::ArrowUp);
        assert_eq!(Outcome::TooHigh.cue().icon, CueIcon::ArrowDown);
        assert_eq!(Outcome::TooLow.cue().tone, Outcome::TooHigh.cue().tone);
        assert_eq!(Outcome::Exact.cue().tone, CueTone::Success);
    }

    #[test]
    fn comparison_helpers() {
        assert_eq!(Side::more_expensive(price(9), price(5)), Some(Side::A));
        assert_eq!(Side::more_expensive(price(5), price(9)), Some(Side::B));
        assert_eq!(Side::more_expensive(price(5), price(5)), None);
        assert_eq!(Direction::between(price(5), price(9)), Direction::Higher);
        assert_eq!(Direction::between(price(9), price(5)), Direction::Lower);
    }
}

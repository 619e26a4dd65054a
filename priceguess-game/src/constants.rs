//! Centralized tuning constants for the price-guessing rules.
//!
//! Mode defaults live here so the serde config layer and the controllers
//! agree on the same numbers. Scoring brackets are not configurable.

// Classic / category -------------------------------------------------------
pub(crate) const CLASSIC_MAX_ATTEMPTS: u32 = 6;
pub(crate) const CLASSIC_RECENCY_WINDOW: usize = 20;

// Timed ----------------------------------------------------------------------
pub(crate) const TIMED_DURATION_SECS: u32 = 60;
pub(crate) const TIMED_TICK_MS: u64 = 1_000;
pub(crate) const TIMED_MAX_ATTEMPTS: u32 = 6;
pub(crate) const TIMED_RECENCY_WINDOW: usize = 25;
pub(crate) const TIMED_NEXT_PRODUCT_DELAY_MS: u64 = 1_000;

// Comparison / higher-lower --------------------------------------------------
pub(crate) const COMPARISON_MAX_ROUNDS: u32 = 10;
pub(crate) const COMPARISON_RECENCY_WINDOW: usize = 15;
pub(crate) const COMPARISON_REVEAL_DELAY_MS: u64 = 1_000;
pub(crate) const HIGHER_LOWER_MAX_ROUNDS: u32 = 10;
pub(crate) const HIGHER_LOWER_RECENCY_WINDOW: usize = 15;
pub(crate) const HIGHER_LOWER_NEXT_MYSTERY_DELAY_MS: u64 = 1_500;
/// Resample budget per catalog entry before falling back to a linear scan.
pub(crate) const PAIR_RETRIES_PER_PRODUCT: usize = 2;

// Memory match ---------------------------------------------------------------
pub(crate) const MEMORY_PAIRS: usize = 6;
pub(crate) const MEMORY_MATCH_DELAY_MS: u64 = 1_000;
pub(crate) const MEMORY_FLIP_BACK_DELAY_MS: u64 = 500;
pub(crate) const MEMORY_MATCH_POINTS: u32 = 100;
pub(crate) const MEMORY_EFFICIENCY_BONUS: u32 = 50;

// Basket ---------------------------------------------------------------------
pub(crate) const BASKET_MIN_ITEMS: usize = 3;
pub(crate) const BASKET_MAX_ITEMS: usize = 6;
pub(crate) const BASKET_MAX_ATTEMPTS: u32 = 6;
pub(crate) const BASKET_RECENCY_WINDOW: usize = 20;
pub(crate) const BASKET_VISIBLE_GUESSES: usize = 3;
pub(crate) const BASKET_END_DELAY_MS: u64 = 1_000;

// Basket accuracy brackets (percentage error upper bounds, inclusive).
pub(crate) const TIER_EXCELLENT_MAX_PCT: f64 = 5.0;
pub(crate) const TIER_GOOD_MAX_PCT: f64 = 15.0;
pub(crate) const TIER_ACCEPTABLE_MAX_PCT: f64 = 30.0;
pub(crate) const TIER_EXCELLENT_POINTS: u32 = 100;
pub(crate) const TIER_GOOD_POINTS: u32 = 75;
pub(crate) const TIER_ACCEPTABLE_POINTS: u32 = 50;
pub(crate) const TIER_POOR_POINTS: u32 = 25;
pub(crate) const UNUSED_ATTEMPT_BONUS: u32 = 10;

// Session --------------------------------------------------------------------
pub(crate) const SESSION_FALLBACK_DELAY_MS: u64 = 3_000;

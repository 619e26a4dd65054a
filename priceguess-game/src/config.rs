//! Mode tuning loaded from JSON with per-field defaults.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BASKET_END_DELAY_MS, BASKET_MAX_ATTEMPTS, BASKET_MAX_ITEMS, BASKET_MIN_ITEMS,
    BASKET_RECENCY_WINDOW, BASKET_VISIBLE_GUESSES, CLASSIC_MAX_ATTEMPTS, CLASSIC_RECENCY_WINDOW,
    COMPARISON_MAX_ROUNDS, COMPARISON_RECENCY_WINDOW, COMPARISON_REVEAL_DELAY_MS,
    HIGHER_LOWER_MAX_ROUNDS, HIGHER_LOWER_NEXT_MYSTERY_DELAY_MS, HIGHER_LOWER_RECENCY_WINDOW,
    MEMORY_EFFICIENCY_BONUS, MEMORY_FLIP_BACK_DELAY_MS, MEMORY_MATCH_DELAY_MS,
    MEMORY_MATCH_POINTS, MEMORY_PAIRS, SESSION_FALLBACK_DELAY_MS, TIMED_DURATION_SECS,
    TIMED_MAX_ATTEMPTS, TIMED_NEXT_PRODUCT_DELAY_MS, TIMED_RECENCY_WINDOW, TIMED_TICK_MS,
};

/// Configuration for the classic and category modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassicCfg {
    pub max_attempts: u32,
    pub recency_window: usize,
}

impl Default for ClassicCfg {
    fn default() -> Self {
        Self {
            max_attempts: CLASSIC_MAX_ATTEMPTS,
            recency_window: CLASSIC_RECENCY_WINDOW,
        }
    }
}

/// Countdown mode configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimedCfg {
    pub duration_secs: u32,
    pub tick_ms: u64,
    pub max_attempts: u32,
    pub recency_window: usize,
    /// Pause between a resolved product and the next one.
    pub next_product_delay_ms: u64,
}

impl Default for TimedCfg {
    fn default() -> Self {
        Self {
            duration_secs: TIMED_DURATION_SECS,
            tick_ms: TIMED_TICK_MS,
            max_attempts: TIMED_MAX_ATTEMPTS,
            recency_window: TIMED_RECENCY_WINDOW,
            next_product_delay_ms: TIMED_NEXT_PRODUCT_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonCfg {
    pub max_rounds: u32,
    pub recency_window: usize,
    pub reveal_delay_ms: u64,
}

impl Default for ComparisonCfg {
    fn default() -> Self {
        Self {
            max_rounds: COMPARISON_MAX_ROUNDS,
            recency_window: COMPARISON_RECENCY_WINDOW,
            reveal_delay_ms: COMPARISON_REVEAL_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HigherLowerCfg {
    pub max_rounds: u32,
    pub recency_window: usize,
    pub next_mystery_delay_ms: u64,
}

impl Default for HigherLowerCfg {
    fn default() -> Self {
        Self {
            max_rounds: HIGHER_LOWER_MAX_ROUNDS,
            recency_window: HIGHER_LOWER_RECENCY_WINDOW,
            next_mystery_delay_ms: HIGHER_LOWER_NEXT_MYSTERY_DELAY_MS,
        }
    }
}

/// Memory-match board size and scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryCfg {
    pub pairs: usize,
    pub match_delay_ms: u64,
    pub flip_back_delay_ms: u64,
    pub match_points: u32,
    /// Awarded when cumulative attempts stay at or below cumulative matches.
    pub efficiency_bonus: u32,
}

impl Default for MemoryCfg {
    fn default() -> Self {
        Self {
            pairs: MEMORY_PAIRS,
            match_delay_ms: MEMORY_MATCH_DELAY_MS,
            flip_back_delay_ms: MEMORY_FLIP_BACK_DELAY_MS,
            match_points: MEMORY_MATCH_POINTS,
            efficiency_bonus: MEMORY_EFFICIENCY_BONUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasketCfg {
    pub min_items: usize,
    pub max_items: usize,
    pub max_attempts: u32,
    pub recency_window: usize,
    /// Guesses kept in the visible log.
    pub visible_guesses: usize,
    pub end_delay_ms: u64,
}

impl Default for BasketCfg {
    fn default() -> Self {
        Self {
            min_items: BASKET_MIN_ITEMS,
            max_items: BASKET_MAX_ITEMS,
            max_attempts: BASKET_MAX_ATTEMPTS,
            recency_window: BASKET_RECENCY_WINDOW,
            visible_guesses: BASKET_VISIBLE_GUESSES,
            end_delay_ms: BASKET_END_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionCfg {
    /// Delay before returning to mode selection after a fatal mode error.
    pub fallback_delay_ms: u64,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            fallback_delay_ms: SESSION_FALLBACK_DELAY_MS,
        }
    }
}

/// Complete game configuration; missing sections and fields use defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub classic: ClassicCfg,
    pub timed: TimedCfg,
    pub comparison: ComparisonCfg,
    pub higher_lower: HigherLowerCfg,
    pub memory: MemoryCfg,
    pub basket: BasketCfg,
    pub session: SessionCfg,
}

impl GameConfig {
    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and a range error when
    /// any field violates its bounds.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate all tunables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_min("classic.max_attempts", u64::from(self.classic.max_attempts), 1)?;
        require_min("timed.duration_secs", u64::from(self.timed.duration_secs), 1)?;
        require_min("timed.tick_ms", self.timed.tick_ms, 1)?;
        require_min("timed.max_attempts", u64::from(self.timed.max_attempts), 1)?;
        require_min("comparison.max_rounds", u64::from(self.comparison.max_rounds), 1)?;
        require_min(
            "higher_lower.max_rounds",
            u64::from(self.higher_lower.max_rounds),
            1,
        )?;
        require_min("memory.pairs", as_u64(self.memory.pairs), 1)?;
        require_min("basket.min_items", as_u64(self.basket.min_items), 1)?;
        require_min("basket.max_attempts", u64::from(self.basket.max_attempts), 1)?;
        require_min("basket.visible_guesses", as_u64(self.basket.visible_guesses), 1)?;
        if self.basket.min_items > self.basket.max_items {
            return Err(ConfigError::RangeInverted {
                field: "basket.items",
                min: as_u64(self.basket.min_items),
                max: as_u64(self.basket.max_items),
            });
        }
        Ok(())
    }
}

fn as_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn require_min(field: &'static str, value: u64, min: u64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::MinViolation { field, min, value });
    }
    Ok(())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("configuration could not be parsed: {message}")]
    Parse { message: String },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("{field} bounds invalid (min {min} > max {max})")]
    RangeInverted {
        field: &'static str,
        min: u64,
        max: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let cfg = GameConfig::from_json("{}").expect("deserialize");
        assert_eq!(cfg, GameConfig::default());
        assert_eq!(cfg.classic.max_attempts, 6);
        assert_eq!(cfg.timed.duration_secs, 60);
        assert_eq!(cfg.memory.pairs, 6);
        assert_eq!(cfg.basket.visible_guesses, 3);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = GameConfig::from_json(r#"{ "timed": { "duration_secs": 20 } }"#).unwrap();
        assert_eq!(cfg.timed.duration_secs, 20);
        assert_eq!(cfg.timed.tick_ms, 1_000);
        assert_eq!(cfg.comparison.max_rounds, 10);
    }

    #[test]
    fn rejects_zero_rounds() {
        let err = GameConfig::from_json(r#"{ "comparison": { "max_rounds": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MinViolation { field, .. } if field == "comparison.max_rounds"
        ));
    }

    #[test]
    fn rejects_inverted_basket_bounds() {
        let cfg = GameConfig {
            basket: BasketCfg {
                min_items: 5,
                max_items: 4,
                ..BasketCfg::default()
            },
            ..GameConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::RangeInverted {
                field: "basket.items",
                min: 5,
                max: 4
            })
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse { .. })
        ));
    }
}

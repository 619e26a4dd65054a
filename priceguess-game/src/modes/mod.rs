//! Per-mode controllers. Each owns its round state, RNG streams and timers.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::CategoryFilter;

pub mod basket;
pub mod classic;
pub mod comparison;
pub mod higher_lower;
pub mod memory;
pub mod timed;

pub use basket::{BasketController, BasketEvent, BasketFeedback, BasketReport};
pub use classic::{ClassicController, GuessFeedback};
pub use comparison::{ChoiceResult, ComparisonController, ComparisonPhase, ComparisonRound};
pub use higher_lower::{HigherLowerController, HigherLowerRecord, HigherLowerResult};
pub use memory::{Card, CardFace, CardKind, MemoryController, MemoryEvent, MemoryReport};
pub use timed::{TimedController, TimedEvent, TimedReport, TimedStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeKind {
    Classic,
    Category,
    Timed,
    Comparison,
    HigherLower,
    MemoryMatch,
    Basket,
}

impl ModeKind {
    pub const ALL: [Self; 7] = [
        Self::Classic,
        Self::Category,
        Self::Timed,
        Self::Comparison,
        Self::HigherLower,
        Self::MemoryMatch,
        Self::Basket,
    ];

    /// Stable key used by hosts for mode buttons and routes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Category => "category",
            Self::Timed => "timed",
            Self::Comparison => "comparison",
            Self::HigherLower => "higher-lower",
            Self::MemoryMatch => "memory-match",
            Self::Basket => "basket",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Category => "category",
            Self::Timed => "timed",
            Self::Comparison => "comparison",
            Self::HigherLower => "higher/lower",
            Self::MemoryMatch => "memory match",
            Self::Basket => "basket",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// Mode selection made by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeRequest {
    Classic,
    Category(CategoryFilter),
    Timed,
    Comparison,
    HigherLower,
    MemoryMatch,
    Basket,
}

impl ModeRequest {
    #[must_use]
    pub const fn kind(&self) -> ModeKind {
        match self {
            Self::Classic => ModeKind::Classic,
            Self::Category(_) => ModeKind::Category,
            Self::Timed => ModeKind::Timed,
            Self::Comparison => ModeKind::Comparison,
            Self::HigherLower => ModeKind::HigherLower,
            Self::MemoryMatch => ModeKind::MemoryMatch,
            Self::Basket => ModeKind::Basket,
        }
    }
}

//! Error taxonomy for mode entry and round generation.
use thiserror::Error;

use crate::config::ConfigError;
use crate::modes::ModeKind;

/// Failures that end a mode and send the player back to mode selection.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("no products are available for this mode")]
    EmptyCatalog,
    #[error("could not find two products with different prices")]
    NoDistinctPrices,
    #[error("{mode} mode requires at least {required} products (have {available})")]
    InsufficientProducts {
        mode: ModeKind,
        required: usize,
        available: usize,
    },
    #[error("invalid product catalog: {0}")]
    Catalog(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GameError {
    /// Whether the error should return the player to mode selection rather than abort startup.
    #[must_use]
    pub const fn is_mode_fatal(&self) -> bool {
        matches!(
            self,
            Self::EmptyCatalog | Self::NoDistinctPrices | Self::InsufficientProducts { .. }
        )
    }
}

/// Check a mode's minimum catalog size at entry.
///
/// # Errors
///
/// Returns `EmptyCatalog` for an empty candidate set and `InsufficientProducts`
/// when fewer than `required` products are available.
pub fn ensure_min_products(
    mode: ModeKind,
    available: usize,
    required: usize,
) -> Result<(), GameError> {
    if available == 0 {
        return Err(GameError::EmptyCatalog);
    }
    if available < required {
        return Err(GameError::InsufficientProducts {
            mode,
            required,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_products_distinguishes_empty_from_short() {
        assert!(matches!(
            ensure_min_products(ModeKind::MemoryMatch, 0, 6),
            Err(GameError::EmptyCatalog)
        ));
        let err = ensure_min_products(ModeKind::MemoryMatch, 4, 6).unwrap_err();
        assert_eq!(
            err.to_string(),
            "memory match mode requires at least 6 products (have 4)"
        );
        assert!(err.is_mode_fatal());
        assert!(ensure_min_products(ModeKind::Comparison, 2, 2).is_ok());
    }
}

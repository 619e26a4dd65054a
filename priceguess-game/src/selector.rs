//! Random product selection that avoids recently shown catalog entries.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::GameError;

/// Sliding FIFO of recently shown product indices.
///
/// The window only discourages immediate repeats; it is not a shuffle and
/// guarantees no uniqueness beyond its capacity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecencyWindow {
    capacity: usize,
    entries: VecDeque<usize>,
}

impl RecencyWindow {
    /// A capacity of zero disables recency tracking entirely.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.saturating_add(1)),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains(&index)
    }

    /// Oldest remembered index, the next one to be evicted.
    #[must_use]
    pub fn oldest(&self) -> Option<usize> {
        self.entries.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().copied()
    }

    /// Remember `index`, evicting the oldest entries beyond capacity.
    pub fn push(&mut self, index: usize) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_back(index);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Pick a product index in `0..len`, preferring indices outside `recent`.
///
/// When every index is recent the window is cleared and the pick falls back
/// to the full range, so small catalogs never starve. The chosen index is
/// always recorded in `recent`.
///
/// # Errors
///
/// Returns `GameError::EmptyCatalog` when `len` is zero.
pub fn select_index<R>(
    len: usize,
    recent: &mut RecencyWindow,
    rng: &mut R,
) -> Result<usize, GameError>
where
    R: Rng + ?Sized,
{
    if len == 0 {
        return Err(GameError::EmptyCatalog);
    }

    let available = (0..len)
        .filter(|index| !recent.contains(*index))
        .collect::<Vec<_>>();

    let picked = if available.is_empty() {
        log::debug!("recency window covers all {len} products; resetting");
        recent.clear();
        rng.gen_range(0..len)
    } else {
        available[rng.gen_range(0..available.len())]
    };

    recent.push(picked);
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn empty_catalog_is_an_error() {
        let mut recent = RecencyWindow::new(5);
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(matches!(
            select_index(0, &mut recent, &mut rng),
            Err(GameError::EmptyCatalog)
        ));
        assert!(recent.is_empty());
    }

    #[test]
    fn never_repeats_inside_window() {
        let mut recent = RecencyWindow::new(4);
        let mut rng = SmallRng::seed_from_u64(99);
        let mut picks = Vec::new();
        for _ in 0..5 {
            picks.push(select_index(5, &mut recent, &mut rng).unwrap());
        }
        let mut sorted = picks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 5, "five picks from five products: {picks:?}");
    }

    #[test]
    fn exhausted_window_resets() {
        let mut recent = RecencyWindow::new(10);
        let mut rng = SmallRng::seed_from_u64(3);
        let first = select_index(2, &mut recent, &mut rng).unwrap();
        let second = select_index(2, &mut recent, &mut rng).unwrap();
        assert_ne!(first, second);
        assert_eq!(recent.len(), 2);

        let third = select_index(2, &mut recent, &mut rng).unwrap();
        assert!(third < 2);
        assert_eq!(recent.iter().collect::<Vec<_>>(), vec![third]);
    }

    #[test]
    fn window_evicts_oldest() {
        let mut recent = RecencyWindow::new(3);
        for index in [7, 8, 9] {
            recent.push(index);
        }
        assert_eq!(recent.oldest(), Some(7));
        recent.push(10);
        assert!(!recent.contains(7));
        assert_eq!(recent.oldest(), Some(8));
        assert_eq!(recent.len(), 3);
    }

    #[test]
    fn zero_capacity_disables_tracking() {
        let mut recent = RecencyWindow::new(0);
        recent.push(1);
        assert!(recent.is_empty());
    }
}

//! Per-round guess ledger and score tallies.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Price;
use crate::error::GameError;
use crate::numbers::len_to_u32;
use crate::outcome::{MatchPolicy, Outcome, evaluate};
use crate::selector::{RecencyWindow, select_index};

/// One logged guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuessRecord {
    pub value: f64,
    pub outcome: Outcome,
}

/// Guess-by-guess state for the product currently on screen.
///
/// Attempts are derived from the guess log, so `attempts == guesses.len()`
/// holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    current_product: Option<usize>,
    guesses: Vec<GuessRecord>,
    max_attempts: u32,
    recent: RecencyWindow,
}

impl RoundState {
    #[must_use]
    pub fn new(max_attempts: u32, recency_capacity: usize) -> Self {
        Self {
            current_product: None,
            guesses: Vec::new(),
            max_attempts,
            recent: RecencyWindow::new(recency_capacity),
        }
    }

    #[must_use]
    pub const fn current_product(&self) -> Option<usize> {
        self.current_product
    }

    #[must_use]
    pub fn guesses(&self) -> &[GuessRecord] {
        &self.guesses
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        len_to_u32(self.guesses.len())
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn remaining_attempts(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts())
    }

    #[must_use]
    pub const fn recent(&self) -> &RecencyWindow {
        &self.recent
    }

    /// Last recorded outcome, if any.
    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.guesses.last().map(|record| record.outcome)
    }

    /// Whether the round has been won or lost.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.last_outcome().is_some_and(Outcome::is_terminal)
    }

    /// Show `index` next, clearing guesses but keeping the recency window.
    pub fn reset_for_product(&mut self, index: usize) {
        self.current_product = Some(index);
        self.guesses.clear();
    }

    /// Draw the next product from `0..len` via the recency-aware selector.
    ///
    /// # Errors
    ///
    /// Returns `GameError::EmptyCatalog` when `len` is zero.
    pub fn select_next<R>(&mut self, len: usize, rng: &mut R) -> Result<usize, GameError>
    where
        R: Rng + ?Sized,
    {
        let index = select_index(len, &mut self.recent, rng)?;
        self.reset_for_product(index);
        Ok(index)
    }

    /// Record a guess against `target`. Returns `None` once the round is
    /// resolved or before any product was selected.
    pub fn record(&mut self, guess: f64, target: Price, policy: MatchPolicy) -> Option<Outcome> {
        if self.current_product.is_none() || self.is_resolved() {
            return None;
        }
        let attempts = self.attempts().saturating_add(1);
        let outcome = evaluate(guess, target, attempts, self.max_attempts, policy);
        self.guesses.push(GuessRecord {
            value: guess,
            outcome,
        });
        Some(outcome)
    }

    /// Forget everything, including the recency window.
    pub fn reset(&mut self) {
        self.current_product = None;
        self.guesses.clear();
        self.recent.clear();
    }
}

/// Running score for round-based modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTally {
    pub correct_count: u32,
    pub round: u32,
    pub max_rounds: u32,
}

impl ScoreTally {
    #[must_use]
    pub const fn new(max_rounds: u32) -> Self {
        Self {
            correct_count: 0,
            round: 0,
            max_rounds,
        }
    }

    /// Count one resolved round; returns true when the game is complete.
    pub fn record(&mut self, correct: bool) -> bool {
        self.round = self.round.saturating_add(1);
        if correct {
            self.correct_count = self.correct_count.saturating_add(1);
        }
        self.is_complete()
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.round >= self.max_rounds
    }
}

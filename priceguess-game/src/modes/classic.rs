//! Classic and category modes: guess one product's price within a fixed
//! number of attempts.
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::catalog::{Catalog, Price, Product};
use crate::config::ClassicCfg;
use crate::error::{GameError, ensure_min_products};
use crate::modes::ModeKind;
use crate::outcome::{Cue, MatchPolicy, Outcome};
use crate::rng::RngBundle;
use crate::round::RoundState;

/// Presenter-facing summary of one evaluated guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuessFeedback {
    pub guess: f64,
    pub outcome: Outcome,
    pub cue: Cue,
    pub attempts: u32,
    pub remaining_attempts: u32,
    /// Actual price, revealed once the round is over.
    pub revealed: Option<Price>,
}

impl GuessFeedback {
    pub(crate) fn from_round(
        guess: f64,
        outcome: Outcome,
        round: &RoundState,
        price: Price,
    ) -> Self {
        Self {
            guess,
            outcome,
            cue: outcome.cue(),
            attempts: round.attempts(),
            remaining_attempts: round.remaining_attempts(),
            revealed: outcome.is_terminal().then_some(price),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassicController {
    kind: ModeKind,
    catalog: Rc<Catalog>,
    round: RoundState,
    rng: RngBundle,
    rounds_played: u32,
    rounds_won: u32,
}

impl ClassicController {
    /// Start a classic (or category) game over `catalog` and show the first product.
    ///
    /// # Errors
    ///
    /// Returns `GameError::EmptyCatalog` when `catalog` has no products.
    pub fn new(
        kind: ModeKind,
        catalog: Rc<Catalog>,
        cfg: &ClassicCfg,
        seed: u64,
    ) -> Result<Self, GameError> {
        ensure_min_products(kind, catalog.len(), 1)?;
        let mut controller = Self {
            kind,
            catalog,
            round: RoundState::new(cfg.max_attempts, cfg.recency_window),
            rng: RngBundle::from_user_seed(seed),
            rounds_played: 0,
            rounds_won: 0,
        };
        controller.next_round()?;
        Ok(controller)
    }

    #[must_use]
    pub const fn kind(&self) -> ModeKind {
        self.kind
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn round(&self) -> &RoundState {
        &self.round
    }

    #[must_use]
    pub fn current_product(&self) -> Option<&Product> {
        self.round
            .current_product()
            .and_then(|index| self.catalog.get(index))
    }

    #[must_use]
    pub const fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    #[must_use]
    pub const fn rounds_won(&self) -> u32 {
        self.rounds_won
    }

    /// Evaluate a guess. Returns `None` once the round is resolved.
    pub fn submit(&mut self, guess: f64) -> Option<GuessFeedback> {
        let price = self.current_product()?.price;
        let outcome = self.round.record(guess, price, MatchPolicy::Exact)?;
        if outcome.is_terminal() {
            self.rounds_played = self.rounds_played.saturating_add(1);
            if outcome == Outcome::Exact {
                self.rounds_won = self.rounds_won.saturating_add(1);
            }
            log::info!(
                "{} round over: {outcome:?} after {} guesses",
                self.kind,
                self.round.attempts()
            );
        }
        Some(GuessFeedback::from_round(guess, outcome, &self.round, price))
    }

    /// Move to a fresh product, clearing the guess log.
    ///
    /// # Errors
    ///
    /// Returns `GameError::EmptyCatalog` when the catalog is empty.
    pub fn next_round(&mut self) -> Result<usize, GameError> {
        let index = self
            .round
            .select_next(self.catalog.len(), self.rng.selection())?;
        log::debug!("{} showing product {index}", self.kind);
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryFilter;

    fn single(units: i64) -> Rc<Catalog> {
        Rc::new(Catalog::from_products(vec![Product::new(
            "Kettle",
            Price::from_cents(units * 100),
            "home",
        )]))
    }

    #[test]
    fn guesses_walk_to_exact() {
        let mut game =
            ClassicController::new(ModeKind::Classic, single(10), &ClassicCfg::default(), 5)
                .unwrap();
        let outcomes = [5.0, 15.0, 25.0, 10.0]
            .into_iter()
            .filter_map(|guess| game.submit(guess))
            .map(|feedback| feedback.outcome)
            .collect::<Vec<_>>();
        assert_eq!(
            outcomes,
            vec![
                Outcome::TooLow,
                Outcome::TooHigh,
                Outcome::TooHigh,
                Outcome::Exact
            ]
        );
        assert!(game.submit(10.0).is_none());
        assert_eq!(game.rounds_won(), 1);
    }

    #[test]
    fn exhaustion_reveals_price() {
        let cfg = ClassicCfg {
            max_attempts: 2,
            ..ClassicCfg::default()
        };
        let mut game = ClassicController::new(ModeKind::Classic, single(10), &cfg, 1).unwrap();
        let first = game.submit(1.0).unwrap();
        assert_eq!(first.revealed, None);
        assert_eq!(first.remaining_attempts, 1);
        let last = game.submit(2.0).unwrap();
        assert_eq!(last.outcome, Outcome::OutOfAttempts);
        assert_eq!(last.revealed, Some(Price::from_cents(1_000)));
        assert!(game.submit(10.0).is_none());

        game.next_round().unwrap();
        assert_eq!(game.round().attempts(), 0);
        assert!(game.submit(10.0).is_some());
    }

    #[test]
    fn empty_category_is_rejected() {
        let filtered =
            Catalog::load_from_static().filter_by_category(&CategoryFilter::parse("toys"));
        let result = ClassicController::new(
            ModeKind::Category,
            Rc::new(filtered),
            &ClassicCfg::default(),
            3,
        );
        assert!(matches!(result, Err(GameError::EmptyCatalog)));
    }
}

//! Higher/lower mode: call whether a hidden product costs more than the one on show.
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::catalog::{Catalog, Price, Product};
use crate::config::HigherLowerCfg;
use crate::error::{GameError, ensure_min_products};
use crate::modes::ModeKind;
use crate::outcome::Direction;
use crate::pairing::sample_distinct_from;
use crate::rng::RngBundle;
use crate::round::ScoreTally;
use crate::selector::{RecencyWindow, select_index};
use crate::timer::{Scheduler, TimerToken};

/// One resolved call, kept for the end-of-game history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HigherLowerRecord {
    pub round: u32,
    pub visible: usize,
    pub mystery: usize,
    pub guess: Direction,
    pub actual: Direction,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HigherLowerResult {
    pub record: HigherLowerRecord,
    pub visible_price: Price,
    pub mystery_price: Price,
    pub round: u32,
    pub score: u32,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HigherLowerAction {
    NextMystery,
}

#[derive(Debug, Clone)]
pub struct HigherLowerController {
    catalog: Rc<Catalog>,
    visible: usize,
    mystery: Option<usize>,
    tally: ScoreTally,
    history: Vec<HigherLowerRecord>,
    recent: RecencyWindow,
    rng: RngBundle,
    timers: Scheduler<HigherLowerAction>,
    next_mystery_delay_ms: u64,
    mystery_token: Option<TimerToken>,
}

impl HigherLowerController {
    /// Enter the mode with a visible product and its first mystery.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientProducts` with fewer than two products and
    /// `NoDistinctPrices` when the catalog holds a single price.
    pub fn new(catalog: Rc<Catalog>, cfg: &HigherLowerCfg, seed: u64) -> Result<Self, GameError> {
        ensure_min_products(ModeKind::HigherLower, catalog.len(), 2)?;
        if catalog.distinct_price_count() < 2 {
            return Err(GameError::NoDistinctPrices);
        }
        let mut recent = RecencyWindow::new(cfg.recency_window);
        let mut rng = RngBundle::from_user_seed(seed);
        let visible = select_index(catalog.len(), &mut recent, rng.selection())?;
        let mut controller = Self {
            catalog,
            visible,
            mystery: None,
            tally: ScoreTally::new(cfg.max_rounds),
            history: Vec::new(),
            recent,
            rng,
            timers: Scheduler::new(),
            next_mystery_delay_ms: cfg.next_mystery_delay_ms,
            mystery_token: None,
        };
        controller.generate_next_mystery()?;
        Ok(controller)
    }

    #[must_use]
    pub fn visible(&self) -> Option<&Product> {
        self.catalog.get(self.visible)
    }

    #[must_use]
    pub fn mystery(&self) -> Option<&Product> {
        self.mystery.and_then(|index| self.catalog.get(index))
    }

    #[must_use]
    pub const fn tally(&self) -> ScoreTally {
        self.tally
    }

    #[must_use]
    pub fn history(&self) -> &[HigherLowerRecord] {
        &self.history
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.tally.is_complete()
    }

    /// Call the mystery product's direction. Ignored while no mystery is shown.
    pub fn choose(&mut self, guess: Direction) -> Option<HigherLowerResult> {
        if self.is_complete() {
            return None;
        }
        let Some(mystery) = self.mystery else {
            log::debug!("higher/lower choice ignored: no mystery product");
            return None;
        };
        let visible_price = self.catalog.get(self.visible)?.price;
        let mystery_price = self.catalog.get(mystery)?.price;
        let actual = Direction::between(visible_price, mystery_price);
        let record = HigherLowerRecord {
            round: self.tally.round.saturating_add(1),
            visible: self.visible,
            mystery,
            guess,
            actual,
            correct: guess == actual,
        };
        self.history.push(record);
        self.visible = mystery;
        self.mystery = None;

        let complete = self.tally.record(record.correct);
        if complete {
            self.timers.cancel_all();
            log::info!(
                "higher/lower complete: {}/{}",
                self.tally.correct_count,
                self.tally.max_rounds
            );
        } else {
            self.mystery_token = Some(
                self.timers
                    .schedule(self.next_mystery_delay_ms, HigherLowerAction::NextMystery),
            );
        }
        Some(HigherLowerResult {
            record,
            visible_price,
            mystery_price,
            round: self.tally.round,
            score: self.tally.correct_count,
            complete,
        })
    }

    /// Deal a new mystery product now, cancelling the scheduled one.
    ///
    /// Returns `Ok(None)` when a mystery is already shown or the game is over.
    ///
    /// # Errors
    ///
    /// Returns `NoDistinctPrices` when no product differs in price from the visible one.
    pub fn generate_next_mystery(&mut self) -> Result<Option<usize>, GameError> {
        if self.mystery.is_some() || self.is_complete() {
            return Ok(None);
        }
        if let Some(token) = self.mystery_token.take() {
            self.timers.cancel(token);
        }
        let mystery = sample_distinct_from(
            self.catalog.products(),
            self.visible,
            &mut self.recent,
            self.rng.selection(),
        )?;
        self.mystery = Some(mystery);
        Ok(Some(mystery))
    }

    /// Run due continuations, returning any mystery products dealt.
    ///
    /// # Errors
    ///
    /// Returns `NoDistinctPrices` when a scheduled mystery cannot be dealt.
    pub fn advance(&mut self, elapsed_ms: u64) -> Result<Vec<usize>, GameError> {
        let mut dealt = Vec::new();
        let deadline = self.timers.deadline_after(elapsed_ms);
        while let Some(action) = self.timers.poll(deadline) {
            match action {
                HigherLowerAction::NextMystery => {
                    self.mystery_token = None;
                    dealt.extend(self.generate_next_mystery()?);
                }
            }
        }
        self.timers.settle(deadline);
        Ok(dealt)
    }

    pub fn stop(&mut self) {
        self.timers.cancel_all();
        log::debug!("higher/lower stopped after {} rng draws", self.rng.total_draws());
        self.mystery_token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(units: &[i64]) -> Rc<Catalog> {
        Rc::new(Catalog::from_products(
            units
                .iter()
                .enumerate()
                .map(|(i, units)| {
                    Product::new(&format!("item {i}"), Price::from_cents(units * 100), "misc")
                })
                .collect(),
        ))
    }

    #[test]
    fn single_price_catalog_fails() {
        let result = HigherLowerController::new(catalog(&[3, 3, 3]), &HigherLowerCfg::default(), 1);
        assert!(matches!(result, Err(GameError::NoDistinctPrices)));
    }

    #[test]
    fn mystery_becomes_visible_after_choice() {
        let mut game =
            HigherLowerController::new(catalog(&[1, 2, 3, 4, 5]), &HigherLowerCfg::default(), 11)
                .unwrap();
        let visible = game.visible().unwrap().price;
        let mystery = game.mystery().unwrap().price;
        assert_ne!(visible, mystery);

        let call = Direction::between(visible, mystery);
        let result = game.choose(call).unwrap();
        assert!(result.record.correct);
        assert_eq!(game.visible().unwrap().price, mystery);
        assert!(game.mystery().is_none());
        assert!(game.choose(Direction::Higher).is_none());

        assert!(game.advance(1_499).unwrap().is_empty());
        assert_eq!(game.advance(1).unwrap().len(), 1);
        assert!(game.mystery().is_some());
    }

    #[test]
    fn explicit_generation_cancels_pending() {
        let mut game =
            HigherLowerController::new(catalog(&[1, 2, 3]), &HigherLowerCfg::default(), 5)
                .unwrap();
        game.choose(Direction::Lower).unwrap();
        assert!(game.generate_next_mystery().unwrap().is_some());
        assert!(game.generate_next_mystery().unwrap().is_none());
        assert!(game.advance(10_000).unwrap().is_empty());
    }

    #[test]
    fn history_fills_to_max_rounds() {
        let cfg = HigherLowerCfg {
            max_rounds: 3,
            ..HigherLowerCfg::default()
        };
        let mut game = HigherLowerController::new(catalog(&[10, 20, 30, 40]), &cfg, 8).unwrap();
        for _ in 0..3 {
            game.generate_next_mystery().unwrap();
            game.choose(Direction::Higher).unwrap();
        }
        assert!(game.is_complete());
        assert_eq!(game.history().len(), 3);
        assert!(game.history().windows(2).all(|w| w[0].mystery == w[1].visible));
        assert!(game.choose(Direction::Higher).is_none());
        assert!(game.generate_next_mystery().unwrap().is_none());
    }
}

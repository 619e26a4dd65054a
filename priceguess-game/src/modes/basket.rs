//! Basket mode: guess the combined price of several products.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::rc::Rc;

use crate::catalog::{Catalog, Price, Product};
use crate::config::BasketCfg;
use crate::error::{GameError, ensure_min_products};
use crate::modes::ModeKind;
use crate::outcome::{BasketScore, Cue, MatchPolicy, Outcome, basket_score, evaluate};
use crate::rng::RngBundle;
use crate::round::GuessRecord;
use crate::selector::{RecencyWindow, select_index};
use crate::timer::Scheduler;

/// Presenter-facing summary of one basket guess.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasketFeedback {
    pub guess: f64,
    pub outcome: Outcome,
    pub cue: Cue,
    pub score: BasketScore,
    pub attempts: u32,
    pub remaining_attempts: u32,
    /// Basket total, revealed once the basket is over.
    pub revealed: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketReport {
    pub items: Vec<usize>,
    pub total: Price,
    pub attempts: u32,
    pub won: bool,
    /// Score of the last attempt.
    pub score: Option<BasketScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BasketEvent {
    Finished(BasketReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BasketAction {
    Report,
}

#[derive(Debug, Clone)]
pub struct BasketController {
    catalog: Rc<Catalog>,
    cfg: BasketCfg,
    rng: RngBundle,
    recent: RecencyWindow,
    items: Vec<usize>,
    total: Price,
    attempts: u32,
    score: Option<BasketScore>,
    visible: SmallVec<[GuessRecord; 3]>,
    overflowed: bool,
    complete: bool,
    won: bool,
    timers: Scheduler<BasketAction>,
}

impl BasketController {
    /// Fill the first basket.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientProducts` when the catalog holds fewer than
    /// `cfg.min_items` products.
    pub fn new(catalog: Rc<Catalog>, cfg: &BasketCfg, seed: u64) -> Result<Self, GameError> {
        ensure_min_products(ModeKind::Basket, catalog.len(), cfg.min_items)?;
        let mut controller = Self {
            catalog,
            cfg: cfg.clone(),
            rng: RngBundle::from_user_seed(seed),
            recent: RecencyWindow::new(cfg.recency_window),
            items: Vec::new(),
            total: Price::ZERO,
            attempts: 0,
            score: None,
            visible: SmallVec::new(),
            overflowed: false,
            complete: false,
            won: false,
            timers: Scheduler::new(),
        };
        controller.new_basket()?;
        Ok(controller)
    }

    /// Replace the basket with a fresh random selection.
    ///
    /// # Errors
    ///
    /// Returns `GameError::EmptyCatalog` when the catalog is empty.
    pub fn new_basket(&mut self) -> Result<(), GameError> {
        let len = self.catalog.len();
        let max_items = self.cfg.max_items.min(len);
        let min_items = self.cfg.min_items.min(max_items);
        let size = self.rng.sizing().gen_range(min_items..=max_items);

        let mut items = Vec::with_capacity(size);
        let mut draws = 0_usize;
        let draw_limit = len.saturating_mul(4).max(size);
        while items.len() < size && draws < draw_limit {
            draws += 1;
            let index = select_index(len, &mut self.recent, self.rng.selection())?;
            if !items.contains(&index) {
                items.push(index);
            }
        }
        // Top up in catalog order if sampling kept hitting duplicates.
        for index in 0..len {
            if items.len() >= size {
                break;
            }
            if !items.contains(&index) {
                items.push(index);
            }
        }

        self.total = items
            .iter()
            .filter_map(|&index| self.catalog.get(index))
            .map(|product| product.price)
            .sum();
        self.items = items;
        self.timers.cancel_all();
        self.attempts = 0;
        self.score = None;
        self.visible.clear();
        self.overflowed = false;
        self.complete = false;
        self.won = false;
        log::debug!("basket of {size} items totals {}", self.total);
        Ok(())
    }

    #[must_use]
    pub fn items(&self) -> Vec<&Product> {
        self.items
            .iter()
            .filter_map(|&index| self.catalog.get(index))
            .collect()
    }

    #[must_use]
    pub fn item_indices(&self) -> &[usize] {
        &self.items
    }

    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn remaining_attempts(&self) -> u32 {
        self.cfg.max_attempts.saturating_sub(self.attempts)
    }

    #[must_use]
    pub const fn score(&self) -> Option<BasketScore> {
        self.score
    }

    /// Most recent guesses, oldest first, capped at the configured size.
    #[must_use]
    pub fn visible_guesses(&self) -> &[GuessRecord] {
        &self.visible
    }

    /// Whether older guesses were dropped from the visible log.
    #[must_use]
    pub const fn overflowed(&self) -> bool {
        self.overflowed
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    #[must_use]
    pub fn report(&self) -> BasketReport {
        BasketReport {
            items: self.items.clone(),
            total: self.total,
            attempts: self.attempts,
            won: self.won,
            score: self.score,
        }
    }

    /// Evaluate a guess at the basket total. Returns `None` once the basket is over.
    pub fn submit(&mut self, guess: f64) -> Option<BasketFeedback> {
        if self.complete || self.attempts >= self.cfg.max_attempts {
            return None;
        }
        self.attempts = self.attempts.saturating_add(1);
        let outcome = evaluate(
            guess,
            self.total,
            self.attempts,
            self.cfg.max_attempts,
            MatchPolicy::RoundedCents,
        );
        let score = basket_score(guess, self.total, self.attempts, self.cfg.max_attempts);
        self.score = Some(score);

        if self.visible.len() >= self.cfg.visible_guesses {
            self.visible.remove(0);
            self.overflowed = true;
        }
        self.visible.push(GuessRecord {
            value: guess,
            outcome,
        });

        if outcome.is_terminal() {
            self.complete = true;
            self.won = outcome == Outcome::Exact;
            self.timers.schedule(self.cfg.end_delay_ms, BasketAction::Report);
            log::info!(
                "basket over after {} attempts (won: {})",
                self.attempts,
                self.won
            );
        }
        Some(BasketFeedback {
            guess,
            outcome,
            cue: outcome.cue(),
            score,
            attempts: self.attempts,
            remaining_attempts: self.remaining_attempts(),
            revealed: outcome.is_terminal().then_some(self.total),
        })
    }

    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<BasketEvent> {
        let mut events = Vec::new();
        let deadline = self.timers.deadline_after(elapsed_ms);
        while let Some(action) = self.timers.poll(deadline) {
            match action {
                BasketAction::Report => events.push(BasketEvent::Finished(self.report())),
            }
        }
        self.timers.settle(deadline);
        events
    }

    pub fn stop(&mut self) {
        self.timers.cancel_all();
        log::debug!("basket stopped after {} rng draws", self.rng.total_draws());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(cents: &[i64]) -> Rc<Catalog> {
        Rc::new(Catalog::from_products(
            cents
                .iter()
                .enumerate()
                .map(|(i, cents)| {
                    Product::new(&format!("item {i}"), Price::from_cents(*cents), "misc")
                })
                .collect(),
        ))
    }

    fn fixed_size(items: usize) -> BasketCfg {
        BasketCfg {
            min_items: items,
            max_items: items,
            ..BasketCfg::default()
        }
    }

    #[test]
    fn total_is_exact_sum_of_distinct_items() {
        let shop = catalog(&[3_895, 4_250, 12_999, 100, 65]);
        let game = BasketController::new(shop, &fixed_size(5), 3).unwrap();
        let mut items = game.item_indices().to_vec();
        items.sort_unstable();
        assert_eq!(items, vec![0, 1, 2, 3, 4]);
        assert_eq!(game.total(), Price::from_cents(3_895 + 4_250 + 12_999 + 100 + 65));
    }

    #[test]
    fn size_stays_within_bounds() {
        let shop = catalog(&[100, 200, 300, 400, 500, 600, 700, 800]);
        for seed in 0..20 {
            let game =
                BasketController::new(Rc::clone(&shop), &BasketCfg::default(), seed).unwrap();
            assert!((3..=6).contains(&game.item_indices().len()));
        }
    }

    #[test]
    fn rejects_small_catalog() {
        assert!(matches!(
            BasketController::new(catalog(&[100, 200]), &BasketCfg::default(), 1),
            Err(GameError::InsufficientProducts { required: 3, .. })
        ));
    }

    #[test]
    fn float_noise_still_matches_total() {
        let mut game = BasketController::new(catalog(&[3_895, 4_250, 1_000]), &fixed_size(3), 1)
            .unwrap();
        let feedback = game.submit(38.95 + 42.5 + 10.0).unwrap();
        assert_eq!(feedback.outcome, Outcome::Exact);
        assert_eq!(feedback.revealed, Some(Price::from_cents(9_145)));
        assert!(game.is_complete());
        assert!(game.submit(1.0).is_none());

        let events = game.advance(1_000);
        assert!(matches!(&events[..], [BasketEvent::Finished(report)] if report.won));
    }

    #[test]
    fn visible_log_keeps_latest_guesses() {
        let mut game = BasketController::new(catalog(&[100, 200, 300]), &fixed_size(3), 1).unwrap();
        for guess in [1.0, 2.0, 3.0] {
            game.submit(guess);
        }
        assert!(!game.overflowed());
        game.submit(4.0);
        assert!(game.overflowed());
        let values = game.visible_guesses().iter().map(|g| g.value).collect::<Vec<_>>();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn exhausting_attempts_ends_basket() {
        let mut game = BasketController::new(catalog(&[100, 200, 300]), &fixed_size(3), 1).unwrap();
        let outcomes = (1..=6)
            .filter_map(|_| game.submit(1.0))
            .map(|feedback| feedback.outcome)
            .collect::<Vec<_>>();
        assert_eq!(outcomes.len(), 6);
        assert_eq!(outcomes[5], Outcome::OutOfAttempts);
        assert!(game.submit(6.0).is_none());
        assert_eq!(game.score().map(|s| s.points), Some(25));
        assert!(!game.report().won);

        game.new_basket().unwrap();
        assert_eq!(game.attempts(), 0);
        assert!(game.visible_guesses().is_empty());
        assert!(game.advance(5_000).is_empty());
    }
}

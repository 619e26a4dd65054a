//! Memory match: pair each product card with its price card.
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::rc::Rc;

use crate::catalog::{Catalog, Price, Product};
use crate::config::MemoryCfg;
use crate::error::{GameError, ensure_min_products};
use crate::modes::ModeKind;
use crate::numbers::ratio_percent;
use crate::rng::RngBundle;
use crate::timer::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Product,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardFace {
    Hidden,
    Revealed,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Catalog index of the product this card belongs to.
    pub product: usize,
    pub kind: CardKind,
    pub face: CardFace,
}

impl Card {
    fn matches(&self, other: &Self) -> bool {
        self.product == other.product && self.kind != other.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryReport {
    pub score: u32,
    pub attempts: u32,
    pub matched_pairs: u32,
    pub elapsed_ms: u64,
    /// Matched pairs per attempt, as a rounded percentage.
    pub accuracy: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryEvent {
    Flipped { index: usize },
    Matched {
        first: usize,
        second: usize,
        points: u32,
        score: u32,
    },
    Mismatched { first: usize, second: usize },
    FlippedBack { first: usize, second: usize },
    Completed(MemoryReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryAction {
    Evaluate,
    FlipBack(usize, usize),
}

#[derive(Debug, Clone)]
pub struct MemoryController {
    catalog: Rc<Catalog>,
    cfg: MemoryCfg,
    rng: RngBundle,
    cards: Vec<Card>,
    flipped: SmallVec<[usize; 2]>,
    attempts: u32,
    matched_pairs: u32,
    score: u32,
    started_ms: u64,
    finished_ms: Option<u64>,
    timers: Scheduler<MemoryAction>,
}

impl MemoryController {
    /// Deal a shuffled board of `cfg.pairs` product/price pairs.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientProducts` when the catalog holds fewer products
    /// than the board needs.
    pub fn new(catalog: Rc<Catalog>, cfg: &MemoryCfg, seed: u64) -> Result<Self, GameError> {
        ensure_min_products(ModeKind::MemoryMatch, catalog.len(), cfg.pairs)?;
        let mut controller = Self {
            catalog,
            cfg: cfg.clone(),
            rng: RngBundle::from_user_seed(seed),
            cards: Vec::new(),
            flipped: SmallVec::new(),
            attempts: 0,
            matched_pairs: 0,
            score: 0,
            started_ms: 0,
            finished_ms: None,
            timers: Scheduler::new(),
        };
        controller.deal();
        Ok(controller)
    }

    fn deal(&mut self) {
        let mut indices = (0..self.catalog.len()).collect::<Vec<_>>();
        indices.shuffle(self.rng.shuffle());
        indices.truncate(self.cfg.pairs);

        let mut cards = indices
            .iter()
            .flat_map(|&product| {
                [CardKind::Product, CardKind::Price].map(|kind| Card {
                    product,
                    kind,
                    face: CardFace::Hidden,
                })
            })
            .collect::<Vec<_>>();
        cards.shuffle(self.rng.shuffle());
        self.cards = cards;
        log::debug!("memory board dealt with {} cards", self.cards.len());
    }

    /// Deal a fresh board and reset every counter.
    pub fn restart(&mut self) {
        self.timers.cancel_all();
        self.flipped.clear();
        self.attempts = 0;
        self.matched_pairs = 0;
        self.score = 0;
        self.started_ms = self.timers.now_ms();
        self.finished_ms = None;
        self.deal();
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Product behind a card, used to render either face.
    #[must_use]
    pub fn product_for(&self, card: &Card) -> Option<&Product> {
        self.catalog.get(card.product)
    }

    /// Price shown on a price card.
    #[must_use]
    pub fn price_for(&self, card: &Card) -> Option<Price> {
        self.product_for(card).map(|product| product.price)
    }

    #[must_use]
    pub fn flipped(&self) -> &[usize] {
        &self.flipped
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn matched_pairs(&self) -> u32 {
        self.matched_pairs
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.finished_ms.is_some()
    }

    /// Time on the board so far; frozen once the game completes.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.finished_ms
            .unwrap_or_else(|| self.timers.now_ms())
            .saturating_sub(self.started_ms)
    }

    #[must_use]
    pub fn report(&self) -> MemoryReport {
        MemoryReport {
            score: self.score,
            attempts: self.attempts,
            matched_pairs: self.matched_pairs,
            elapsed_ms: self.elapsed_ms(),
            accuracy: ratio_percent(self.matched_pairs, self.attempts),
        }
    }

    /// Turn a hidden card face up. No-op for invalid or locked cards.
    pub fn flip(&mut self, index: usize) -> Option<MemoryEvent> {
        if self.is_complete() || self.flipped.len() >= 2 {
            return None;
        }
        let card = self.cards.get_mut(index)?;
        if card.face != CardFace::Hidden {
            return None;
        }
        card.face = CardFace::Revealed;
        self.flipped.push(index);
        if self.flipped.len() == 2 {
            self.attempts = self.attempts.saturating_add(1);
            self.timers
                .schedule(self.cfg.match_delay_ms, MemoryAction::Evaluate);
        }
        Some(MemoryEvent::Flipped { index })
    }

    /// Run due continuations and advance the elapsed clock.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<MemoryEvent> {
        let mut events = Vec::new();
        let deadline = self.timers.deadline_after(elapsed_ms);
        while let Some(action) = self.timers.poll(deadline) {
            match action {
                MemoryAction::Evaluate => self.evaluate(&mut events),
                MemoryAction::FlipBack(first, second) => {
                    for index in [first, second] {
                        if let Some(card) = self.cards.get_mut(index)
                            && card.face == CardFace::Revealed
                        {
                            card.face = CardFace::Hidden;
                        }
                    }
                    events.push(MemoryEvent::FlippedBack { first, second });
                }
            }
        }
        self.timers.settle(deadline);
        events
    }

    fn evaluate(&mut self, events: &mut Vec<MemoryEvent>) {
        let [first, second] = match self.flipped.as_slice() {
            [first, second] => [*first, *second],
            _ => return,
        };
        self.flipped.clear();
        let (Some(a), Some(b)) = (self.cards.get(first), self.cards.get(second)) else {
            return;
        };
        if !a.matches(b) {
            self.timers.schedule(
                self.cfg.flip_back_delay_ms,
                MemoryAction::FlipBack(first, second),
            );
            events.push(MemoryEvent::Mismatched { first, second });
            return;
        }

        for index in [first, second] {
            if let Some(card) = self.cards.get_mut(index) {
                card.face = CardFace::Matched;
            }
        }
        self.matched_pairs = self.matched_pairs.saturating_add(1);
        let mut points = self.cfg.match_points;
        if self.attempts <= self.matched_pairs {
            points = points.saturating_add(self.cfg.efficiency_bonus);
        }
        self.score = self.score.saturating_add(points);
        events.push(MemoryEvent::Matched {
            first,
            second,
            points,
            score: self.score,
        });

        if self.finished_ms.is_none()
            && usize::try_from(self.matched_pairs).is_ok_and(|pairs| pairs >= self.cfg.pairs)
        {
            self.finished_ms = Some(self.timers.now_ms());
            self.timers.cancel_all();
            let report = self.report();
            log::info!(
                "memory match complete: {} points in {} attempts",
                report.score,
                report.attempts
            );
            events.push(MemoryEvent::Completed(report));
        }
    }

    pub fn stop(&mut self) {
        self.timers.cancel_all();
        log::debug!("memory match stopped after {} rng draws", self.rng.total_draws());
        self.flipped.clear();
    }
}

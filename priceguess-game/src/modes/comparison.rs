//! Comparison mode: pick the more expensive of two products.
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::catalog::{Catalog, Price, Product};
use crate::config::ComparisonCfg;
use crate::error::{GameError, ensure_min_products};
use crate::modes::ModeKind;
use crate::outcome::Side;
use crate::pairing::sample_distinct_pair;
use crate::rng::RngBundle;
use crate::round::ScoreTally;
use crate::selector::RecencyWindow;
use crate::timer::{Scheduler, TimerToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonPhase {
    Idle,
    RoundActive,
    RoundResolved,
    Complete,
}

/// Two catalog indices on display and the side holding the higher price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRound {
    pub product_a: usize,
    pub product_b: usize,
    pub correct_answer: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceResult {
    pub chosen: Side,
    pub correct: Side,
    pub is_correct: bool,
    pub price_a: Price,
    pub price_b: Price,
    pub round: u32,
    pub score: u32,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComparisonAction {
    Reveal,
}

#[derive(Debug, Clone)]
pub struct ComparisonController {
    catalog: Rc<Catalog>,
    phase: ComparisonPhase,
    current: Option<ComparisonRound>,
    tally: ScoreTally,
    recent: RecencyWindow,
    rng: RngBundle,
    timers: Scheduler<ComparisonAction>,
    reveal_delay_ms: u64,
    reveal_token: Option<TimerToken>,
}

impl ComparisonController {
    /// Enter comparison mode and deal the first pair.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientProducts` with fewer than two products and
    /// `NoDistinctPrices` when every product shares one price.
    pub fn new(catalog: Rc<Catalog>, cfg: &ComparisonCfg, seed: u64) -> Result<Self, GameError> {
        ensure_min_products(ModeKind::Comparison, catalog.len(), 2)?;
        if catalog.distinct_price_count() < 2 {
            return Err(GameError::NoDistinctPrices);
        }
        let mut controller = Self {
            catalog,
            phase: ComparisonPhase::Idle,
            current: None,
            tally: ScoreTally::new(cfg.max_rounds),
            recent: RecencyWindow::new(cfg.recency_window),
            rng: RngBundle::from_user_seed(seed),
            timers: Scheduler::new(),
            reveal_delay_ms: cfg.reveal_delay_ms,
            reveal_token: None,
        };
        controller.start_round()?;
        Ok(controller)
    }

    #[must_use]
    pub const fn phase(&self) -> ComparisonPhase {
        self.phase
    }

    #[must_use]
    pub const fn current(&self) -> Option<ComparisonRound> {
        self.current
    }

    #[must_use]
    pub const fn tally(&self) -> ScoreTally {
        self.tally
    }

    /// Products currently on display, side A first.
    #[must_use]
    pub fn pair(&self) -> Option<(&Product, &Product)> {
        let round = self.current?;
        Some((
            self.catalog.get(round.product_a)?,
            self.catalog.get(round.product_b)?,
        ))
    }

    fn start_round(&mut self) -> Result<ComparisonRound, GameError> {
        let (a, b) = sample_distinct_pair(
            self.catalog.products(),
            &mut self.recent,
            self.rng.selection(),
        )?;
        let price_a = self.catalog.products()[a].price;
        let price_b = self.catalog.products()[b].price;
        let correct_answer =
            Side::more_expensive(price_a, price_b).ok_or(GameError::NoDistinctPrices)?;
        let round = ComparisonRound {
            product_a: a,
            product_b: b,
            correct_answer,
        };
        self.current = Some(round);
        self.phase = ComparisonPhase::RoundActive;
        log::debug!("comparison round {} pairs {a} and {b}", self.tally.round + 1);
        Ok(round)
    }

    /// Lock in a choice for the active round; ignored in any other phase.
    pub fn choose(&mut self, chosen: Side) -> Option<ChoiceResult> {
        if self.phase != ComparisonPhase::RoundActive {
            log::debug!("comparison choice ignored in {:?}", self.phase);
            return None;
        }
        let round = self.current?;
        let (price_a, price_b) = {
            let (a, b) = self.pair()?;
            (a.price, b.price)
        };
        let is_correct = chosen == round.correct_answer;
        let complete = self.tally.record(is_correct);
        if complete {
            self.phase = ComparisonPhase::Complete;
            self.timers.cancel_all();
            log::info!(
                "comparison complete: {}/{}",
                self.tally.correct_count,
                self.tally.max_rounds
            );
        } else {
            self.phase = ComparisonPhase::RoundResolved;
            self.reveal_token = Some(
                self.timers
                    .schedule(self.reveal_delay_ms, ComparisonAction::Reveal),
            );
        }
        Some(ChoiceResult {
            chosen,
            correct: round.correct_answer,
            is_correct,
            price_a,
            price_b,
            round: self.tally.round,
            score: self.tally.correct_count,
            complete,
        })
    }

    /// Skip the reveal delay and deal the next pair now.
    ///
    /// # Errors
    ///
    /// Returns `NoDistinctPrices` when a new pair cannot be formed.
    pub fn next_round(&mut self) -> Result<Option<ComparisonRound>, GameError> {
        if self.phase != ComparisonPhase::RoundResolved {
            return Ok(None);
        }
        if let Some(token) = self.reveal_token.take() {
            self.timers.cancel(token);
        }
        self.start_round().map(Some)
    }

    /// Run due continuations, returning any rounds dealt.
    ///
    /// # Errors
    ///
    /// Returns `NoDistinctPrices` when a scheduled round cannot be dealt.
    pub fn advance(&mut self, elapsed_ms: u64) -> Result<Vec<ComparisonRound>, GameError> {
        let mut dealt = Vec::new();
        let deadline = self.timers.deadline_after(elapsed_ms);
        while let Some(action) = self.timers.poll(deadline) {
            match action {
                ComparisonAction::Reveal => {
                    self.reveal_token = None;
                    dealt.push(self.start_round()?);
                }
            }
        }
        self.timers.settle(deadline);
        Ok(dealt)
    }

    pub fn stop(&mut self) {
        self.timers.cancel_all();
        log::debug!("comparison stopped after {} rng draws", self.rng.total_draws());
        self.reveal_token = None;
    }
}

//! Countdown mode: guess as many prices as possible before time runs out.
use serde::{Deserialize, Serialize};
use std::rc::Rc;

use crate::catalog::{Catalog, Product};
use crate::config::TimedCfg;
use crate::error::{GameError, ensure_min_products};
use crate::modes::ModeKind;
use crate::modes::classic::GuessFeedback;
use crate::outcome::{MatchPolicy, Outcome};
use crate::rng::RngBundle;
use crate::round::RoundState;
use crate::timer::{Scheduler, TimerToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimedStatus {
    Running,
    Paused,
    /// Countdown reached zero.
    Finished,
    /// Abandoned by the player; no report is produced.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedReport {
    pub score: u32,
    pub products_seen: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimedEvent {
    Tick { remaining_secs: u32 },
    NextProduct { index: usize },
    Finished(TimedReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimedAction {
    Tick,
    NextProduct,
}

#[derive(Debug, Clone)]
pub struct TimedController {
    catalog: Rc<Catalog>,
    round: RoundState,
    rng: RngBundle,
    timers: Scheduler<TimedAction>,
    tick_ms: u64,
    next_product_delay_ms: u64,
    remaining_secs: u32,
    score: u32,
    products_seen: u32,
    status: TimedStatus,
    tick_token: Option<TimerToken>,
    next_token: Option<TimerToken>,
    // Set when a pause interrupted a pending next-product continuation.
    next_deferred: bool,
}

impl TimedController {
    /// Start the countdown and show the first product.
    ///
    /// # Errors
    ///
    /// Returns `GameError::EmptyCatalog` when `catalog` has no products.
    pub fn new(catalog: Rc<Catalog>, cfg: &TimedCfg, seed: u64) -> Result<Self, GameError> {
        ensure_min_products(ModeKind::Timed, catalog.len(), 1)?;
        let mut controller = Self {
            catalog,
            round: RoundState::new(cfg.max_attempts, cfg.recency_window),
            rng: RngBundle::from_user_seed(seed),
            timers: Scheduler::new(),
            tick_ms: cfg.tick_ms,
            next_product_delay_ms: cfg.next_product_delay_ms,
            remaining_secs: cfg.duration_secs,
            score: 0,
            products_seen: 0,
            status: TimedStatus::Running,
            tick_token: None,
            next_token: None,
            next_deferred: false,
        };
        controller.show_next_product()?;
        controller.tick_token = Some(
            controller
                .timers
                .schedule(controller.tick_ms, TimedAction::Tick),
        );
        log::info!("timed mode started with {}s on the clock", controller.remaining_secs);
        Ok(controller)
    }

    #[must_use]
    pub const fn status(&self) -> TimedStatus {
        self.status
    }

    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
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

    /// Whether a resolved product is waiting to be replaced.
    #[must_use]
    pub const fn awaiting_next_product(&self) -> bool {
        self.next_token.is_some() || self.next_deferred
    }

    #[must_use]
    pub const fn report(&self) -> TimedReport {
        TimedReport {
            score: self.score,
            products_seen: self.products_seen,
        }
    }

    /// Evaluate a guess against the current product.
    ///
    /// Ignored unless the countdown is running and the current product is
    /// still unresolved.
    pub fn submit(&mut self, guess: f64) -> Option<GuessFeedback> {
        if self.status != TimedStatus::Running || self.awaiting_next_product() {
            log::debug!("timed guess ignored while {:?}", self.status);
            return None;
        }
        let price = self.current_product()?.price;
        let outcome = self.round.record(guess, price, MatchPolicy::Exact)?;
        if outcome == Outcome::Exact {
            self.score = self.score.saturating_add(1);
        }
        if outcome.is_terminal() {
            self.next_token = Some(
                self.timers
                    .schedule(self.next_product_delay_ms, TimedAction::NextProduct),
            );
        }
        Some(GuessFeedback::from_round(guess, outcome, &self.round, price))
    }

    /// Run continuations that fall due within `elapsed_ms`.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<TimedEvent> {
        let mut events = Vec::new();
        let deadline = self.timers.deadline_after(elapsed_ms);
        while let Some(action) = self.timers.poll(deadline) {
            match action {
                TimedAction::Tick => self.on_tick(&mut events),
                TimedAction::NextProduct => {
                    self.next_token = None;
                    match self.show_next_product() {
                        Ok(index) => events.push(TimedEvent::NextProduct { index }),
                        Err(err) => log::warn!("timed mode could not pick a product: {err}"),
                    }
                }
            }
        }
        self.timers.settle(deadline);
        events
    }

    fn on_tick(&mut self, events: &mut Vec<TimedEvent>) {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.timers.cancel_all();
            self.tick_token = None;
            self.next_token = None;
            self.next_deferred = false;
            self.status = TimedStatus::Finished;
            log::info!("timed mode finished with score {}", self.score);
            events.push(TimedEvent::Finished(self.report()));
        } else {
            self.tick_token = Some(self.timers.schedule(self.tick_ms, TimedAction::Tick));
            events.push(TimedEvent::Tick {
                remaining_secs: self.remaining_secs,
            });
        }
    }

    fn show_next_product(&mut self) -> Result<usize, GameError> {
        let index = self
            .round
            .select_next(self.catalog.len(), self.rng.selection())?;
        self.products_seen = self.products_seen.saturating_add(1);
        Ok(index)
    }

    /// Freeze the countdown. A pending product change resumes with the clock.
    pub fn pause(&mut self) {
        if self.status != TimedStatus::Running {
            return;
        }
        if let Some(token) = self.tick_token.take() {
            self.timers.cancel(token);
        }
        if let Some(token) = self.next_token.take() {
            self.timers.cancel(token);
            self.next_deferred = true;
        }
        self.status = TimedStatus::Paused;
    }

    pub fn resume(&mut self) {
        if self.status != TimedStatus::Paused || self.remaining_secs == 0 {
            return;
        }
        self.status = TimedStatus::Running;
        self.tick_token = Some(self.timers.schedule(self.tick_ms, TimedAction::Tick));
        if std::mem::take(&mut self.next_deferred) {
            self.next_token = Some(
                self.timers
                    .schedule(self.next_product_delay_ms, TimedAction::NextProduct),
            );
        }
    }

    /// Abandon the run without producing a report.
    pub fn stop(&mut self) {
        self.timers.cancel_all();
        log::debug!("timed stopped after {} rng draws", self.rng.total_draws());
        self.tick_token = None;
        self.next_token = None;
        self.next_deferred = false;
        self.status = TimedStatus::Stopped;
    }
}

//! Mode routing: one active controller at a time behind a presenter.
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::rc::Rc;

use crate::Presenter;
use crate::catalog::{Catalog, CategoryFilter};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::input::parse_guess;
use crate::modes::{
    BasketController, BasketEvent, BasketFeedback, BasketReport, ChoiceResult,
    ClassicController, ComparisonController, GuessFeedback, HigherLowerController,
    HigherLowerResult, MemoryController, MemoryEvent, ModeKind, ModeRequest, TimedController,
    TimedEvent,
};
use crate::outcome::{Direction, Side};
use crate::timer::{Scheduler, TimerToken};

/// What the presenter should draw.
#[derive(Debug, Clone, Copy)]
pub enum ModeView<'a> {
    Menu { catalog: &'a Catalog },
    /// A mode stopped on an error and is waiting to return to the menu.
    Halted { mode: ModeKind },
    Classic(&'a ClassicController),
    Timed(&'a TimedController),
    Comparison(&'a ComparisonController),
    HigherLower(&'a HigherLowerController),
    Memory(&'a MemoryController),
    Basket(&'a BasketController),
}

/// Outcome of a player action or continuation, handed to the presenter.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundResult {
    Guess(GuessFeedback),
    Timed(TimedEvent),
    Comparison(ChoiceResult),
    HigherLower(HigherLowerResult),
    Memory(MemoryEvent),
    Basket(BasketFeedback),
    BasketFinished(BasketReport),
}

#[derive(Debug, Clone)]
pub enum ActiveMode {
    Menu,
    Halted(ModeKind),
    Classic(ClassicController),
    Timed(TimedController),
    Comparison(ComparisonController),
    HigherLower(HigherLowerController),
    Memory(MemoryController),
    Basket(BasketController),
}

impl ActiveMode {
    #[must_use]
    pub const fn kind(&self) -> Option<ModeKind> {
        match self {
            Self::Menu => None,
            Self::Halted(kind) => Some(*kind),
            Self::Classic(game) => Some(game.kind()),
            Self::Timed(_) => Some(ModeKind::Timed),
            Self::Comparison(_) => Some(ModeKind::Comparison),
            Self::HigherLower(_) => Some(ModeKind::HigherLower),
            Self::Memory(_) => Some(ModeKind::MemoryMatch),
            Self::Basket(_) => Some(ModeKind::Basket),
        }
    }

    fn stop(&mut self) {
        match self {
            Self::Timed(game) => game.stop(),
            Self::Comparison(game) => game.stop(),
            Self::HigherLower(game) => game.stop(),
            Self::Memory(game) => game.stop(),
            Self::Basket(game) => game.stop(),
            Self::Menu | Self::Halted(_) | Self::Classic(_) => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionAction {
    ReturnToMenu,
}

/// Player session: shared catalog, configuration, presenter and the active mode.
pub struct GameSession<P: Presenter> {
    catalog: Rc<Catalog>,
    config: GameConfig,
    presenter: P,
    seed: u64,
    master: ChaCha20Rng,
    mode: ActiveMode,
    timers: Scheduler<SessionAction>,
    fallback_token: Option<TimerToken>,
}

impl<P: Presenter> GameSession<P> {
    /// Create a session showing mode selection.
    ///
    /// # Errors
    ///
    /// Returns `GameError::Config` when `config` fails validation.
    pub fn new(
        catalog: Rc<Catalog>,
        config: GameConfig,
        seed: u64,
        presenter: P,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let mut session = Self {
            catalog,
            config,
            presenter,
            seed,
            master: ChaCha20Rng::seed_from_u64(seed),
            mode: ActiveMode::Menu,
            timers: Scheduler::new(),
            fallback_token: None,
        };
        session.render();
        Ok(session)
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn mode(&self) -> &ActiveMode {
        &self.mode
    }

    #[must_use]
    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    pub const fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Enter a mode, stopping whatever was active.
    ///
    /// # Errors
    ///
    /// Returns the mode-entry error after reporting it to the presenter and
    /// scheduling the return to mode selection.
    pub fn start(&mut self, request: ModeRequest) -> Result<(), GameError> {
        self.mode.stop();
        self.cancel_fallback();
        let kind = request.kind();
        let mode_seed = self.master.next_u64();
        log::info!("starting {kind} mode");
        match self.build_mode(request, mode_seed) {
            Ok(mode) => {
                self.mode = mode;
                self.render();
                Ok(())
            }
            Err(err) => {
                self.fail(kind, &err);
                Err(err)
            }
        }
    }

    fn build_mode(&self, request: ModeRequest, seed: u64) -> Result<ActiveMode, GameError> {
        let catalog = Rc::clone(&self.catalog);
        let cfg = &self.config;
        Ok(match request {
            ModeRequest::Classic => ActiveMode::Classic(ClassicController::new(
                ModeKind::Classic,
                catalog,
                &cfg.classic,
                seed,
            )?),
            ModeRequest::Category(filter) => {
                let filtered = match filter {
                    CategoryFilter::All => catalog,
                    CategoryFilter::Named(_) => Rc::new(catalog.filter_by_category(&filter)),
                };
                ActiveMode::Classic(ClassicController::new(
                    ModeKind::Category,
                    filtered,
                    &cfg.classic,
                    seed,
                )?)
            }
            ModeRequest::Timed => {
                ActiveMode::Timed(TimedController::new(catalog, &cfg.timed, seed)?)
            }
            ModeRequest::Comparison => {
                ActiveMode::Comparison(ComparisonController::new(catalog, &cfg.comparison, seed)?)
            }
            ModeRequest::HigherLower => ActiveMode::HigherLower(HigherLowerController::new(
                catalog,
                &cfg.higher_lower,
                seed,
            )?),
            ModeRequest::MemoryMatch => {
                ActiveMode::Memory(MemoryController::new(catalog, &cfg.memory, seed)?)
            }
            ModeRequest::Basket => {
                ActiveMode::Basket(BasketController::new(catalog, &cfg.basket, seed)?)
            }
        })
    }

    /// Route typed text to the active guessing mode. Invalid text is dropped.
    pub fn submit_guess(&mut self, raw: &str) {
        let Some(guess) = parse_guess(raw) else {
            log::debug!("ignoring invalid guess {raw:?}");
            return;
        };
        let result = match &mut self.mode {
            ActiveMode::Classic(game) => game.submit(guess).map(RoundResult::Guess),
            ActiveMode::Timed(game) => game.submit(guess).map(RoundResult::Guess),
            ActiveMode::Basket(game) => game.submit(guess).map(RoundResult::Basket),
            _ => None,
        };
        self.publish(result);
    }

    pub fn select_comparison(&mut self, side: Side) {
        let result = match &mut self.mode {
            ActiveMode::Comparison(game) => game.choose(side).map(RoundResult::Comparison),
            _ => None,
        };
        self.publish(result);
    }

    pub fn select_higher_lower(&mut self, direction: Direction) {
        let result = match &mut self.mode {
            ActiveMode::HigherLower(game) => game.choose(direction).map(RoundResult::HigherLower),
            _ => None,
        };
        self.publish(result);
    }

    pub fn flip_card(&mut self, index: usize) {
        let result = match &mut self.mode {
            ActiveMode::Memory(game) => game.flip(index).map(RoundResult::Memory),
            _ => None,
        };
        self.publish(result);
    }

    /// Move the active mode on without waiting for its scheduled continuation.
    ///
    /// # Errors
    ///
    /// Returns a mode error after it has been reported to the presenter.
    pub fn next_round(&mut self) -> Result<(), GameError> {
        let outcome = match &mut self.mode {
            ActiveMode::Classic(game) => game.next_round().map(|_| ()),
            ActiveMode::Comparison(game) => game.next_round().map(|_| ()),
            ActiveMode::HigherLower(game) => game.generate_next_mystery().map(|_| ()),
            ActiveMode::Memory(game) => {
                game.restart();
                Ok(())
            }
            ActiveMode::Basket(game) => game.new_basket(),
            ActiveMode::Menu | ActiveMode::Halted(_) | ActiveMode::Timed(_) => Ok(()),
        };
        self.settle(outcome)
    }

    pub fn pause(&mut self) {
        if let ActiveMode::Timed(game) = &mut self.mode {
            game.pause();
            self.render();
        }
    }

    pub fn resume(&mut self) {
        if let ActiveMode::Timed(game) = &mut self.mode {
            game.resume();
            self.render();
        }
    }

    /// Abandon the active mode and show mode selection.
    pub fn leave(&mut self) {
        self.mode.stop();
        self.cancel_fallback();
        self.mode = ActiveMode::Menu;
        self.render();
    }

    /// Advance the host clock, running every continuation that falls due.
    ///
    /// # Errors
    ///
    /// Returns a mode error raised by a continuation after it has been
    /// reported to the presenter.
    pub fn advance(&mut self, elapsed_ms: u64) -> Result<(), GameError> {
        let mut results = Vec::new();
        let outcome = match &mut self.mode {
            ActiveMode::Timed(game) => {
                results.extend(game.advance(elapsed_ms).into_iter().map(RoundResult::Timed));
                Ok(())
            }
            ActiveMode::Comparison(game) => game.advance(elapsed_ms).map(|_| ()),
            ActiveMode::HigherLower(game) => game.advance(elapsed_ms).map(|_| ()),
            ActiveMode::Memory(game) => {
                results.extend(game.advance(elapsed_ms).into_iter().map(RoundResult::Memory));
                Ok(())
            }
            ActiveMode::Basket(game) => {
                results.extend(game.advance(elapsed_ms).into_iter().map(|event| match event {
                    BasketEvent::Finished(report) => RoundResult::BasketFinished(report),
                }));
                Ok(())
            }
            ActiveMode::Menu | ActiveMode::Halted(_) | ActiveMode::Classic(_) => Ok(()),
        };
        for result in &results {
            self.presenter.show_result(result);
        }
        let settled = self.settle(outcome);

        let deadline = self.timers.deadline_after(elapsed_ms);
        while let Some(action) = self.timers.poll(deadline) {
            match action {
                SessionAction::ReturnToMenu => {
                    self.fallback_token = None;
                    log::info!("returning to mode selection");
                    self.mode = ActiveMode::Menu;
                    self.render();
                }
            }
        }
        self.timers.settle(deadline);
        settled
    }

    fn publish(&mut self, result: Option<RoundResult>) {
        if let Some(result) = result {
            self.presenter.show_result(&result);
            self.render();
        }
    }

    fn settle(&mut self, outcome: Result<(), GameError>) -> Result<(), GameError> {
        match outcome {
            Ok(()) => {
                self.render();
                Ok(())
            }
            Err(err) => {
                let kind = self.mode.kind().unwrap_or(ModeKind::Classic);
                self.fail(kind, &err);
                Err(err)
            }
        }
    }

    fn fail(&mut self, kind: ModeKind, err: &GameError) {
        log::warn!("{kind} mode stopped: {err}");
        self.mode.stop();
        self.mode = ActiveMode::Halted(kind);
        self.presenter.show_error(&err.to_string());
        self.cancel_fallback();
        self.fallback_token = Some(self.timers.schedule(
            self.config.session.fallback_delay_ms,
            SessionAction::ReturnToMenu,
        ));
        self.render();
    }

    fn cancel_fallback(&mut self) {
        if let Some(token) = self.fallback_token.take() {
            self.timers.cancel(token);
        }
    }

    fn render(&mut self) {
        let view = match &self.mode {
            ActiveMode::Menu => ModeView::Menu {
                catalog: &self.catalog,
            },
            ActiveMode::Halted(mode) => ModeView::Halted { mode: *mode },
            ActiveMode::Classic(game) => ModeView::Classic(game),
            ActiveMode::Timed(game) => ModeView::Timed(game),
            ActiveMode::Comparison(game) => ModeView::Comparison(game),
            ActiveMode::HigherLower(game) => ModeView::HigherLower(game),
            ActiveMode::Memory(game) => ModeView::Memory(game),
            ActiveMode::Basket(game) => ModeView::Basket(game),
        };
        self.presenter.render(&view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Price, Product};

    #[derive(Default)]
    struct Recorder {
        views: Vec<String>,
        results: Vec<RoundResult>,
        errors: Vec<String>,
    }

    impl Presenter for Recorder {
        fn render(&mut self, view: &ModeView<'_>) {
            let label = match view {
                ModeView::Menu { .. } => "menu",
                ModeView::Halted { .. } => "halted",
                ModeView::Classic(_) => "classic",
                ModeView::Timed(_) => "timed",
                ModeView::Comparison(_) => "comparison",
                ModeView::HigherLower(_) => "higher-lower",
                ModeView::Memory(_) => "memory",
                ModeView::Basket(_) => "basket",
            };
            self.views.push(label.to_string());
        }

        fn show_result(&mut self, result: &RoundResult) {
            self.results.push(result.clone());
        }

        fn show_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    fn session(products: Vec<Product>) -> GameSession<Recorder> {
        GameSession::new(
            Rc::new(Catalog::from_products(products)),
            GameConfig::default(),
            42,
            Recorder::default(),
        )
        .unwrap()
    }

    fn flat(count: usize) -> Vec<Product> {
        (0..count)
            .map(|i| Product::new(&format!("item {i}"), Price::from_cents(500), "misc"))
            .collect()
    }

    #[test]
    fn starts_on_menu() {
        let game = session(flat(2));
        assert!(matches!(game.mode(), ActiveMode::Menu));
        assert_eq!(game.presenter().views, vec!["menu"]);
    }

    #[test]
    fn fatal_error_falls_back_to_menu() {
        let mut game = session(flat(3));
        let err = game.start(ModeRequest::Comparison).unwrap_err();
        assert!(matches!(err, GameError::NoDistinctPrices));
        assert!(matches!(game.mode(), ActiveMode::Halted(ModeKind::Comparison)));
        assert_eq!(game.presenter().errors.len(), 1);

        game.advance(2_999).unwrap();
        assert!(matches!(game.mode(), ActiveMode::Halted(_)));
        game.advance(1).unwrap();
        assert!(matches!(game.mode(), ActiveMode::Menu));
    }

    #[test]
    fn starting_a_mode_cancels_fallback() {
        let mut game = session(flat(3));
        assert!(game.start(ModeRequest::MemoryMatch).is_err());
        game.start(ModeRequest::Classic).unwrap();
        game.advance(5_000).unwrap();
        assert!(matches!(game.mode(), ActiveMode::Classic(_)));
    }

    #[test]
    fn invalid_guesses_are_silent() {
        let mut game = session(flat(2));
        game.start(ModeRequest::Classic).unwrap();
        let renders = game.presenter().views.len();
        game.submit_guess("");
        game.submit_guess("abc");
        game.submit_guess("-4");
        assert!(game.presenter().results.is_empty());
        assert_eq!(game.presenter().views.len(), renders);

        game.submit_guess("5");
        assert!(matches!(
            game.presenter().results.as_slice(),
            [RoundResult::Guess(feedback)] if feedback.revealed.is_some()
        ));
    }

    #[test]
    fn leave_stops_timers() {
        let mut game = session(flat(2));
        game.start(ModeRequest::Timed).unwrap();
        game.leave();
        game.advance(120_000).unwrap();
        assert!(matches!(game.mode(), ActiveMode::Menu));
        assert!(game.presenter().results.is_empty());
    }
}

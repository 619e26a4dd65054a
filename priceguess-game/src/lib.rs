//! Price Guess Game Engine
//!
//! Platform-agnostic core for a retail price-guessing game: product selection,
//! guess evaluation, scoring and the timed continuations of every game mode.
//! Rendering and input capture belong to the host, which drives the engine
//! through [`GameSession`] and a [`Presenter`].

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod modes;
pub mod numbers;
pub mod outcome;
pub mod pairing;
pub mod rng;
pub mod round;
pub mod selector;
pub mod session;
pub mod timer;

use anyhow::Context;
use std::rc::Rc;

// Re-export commonly used types
pub use catalog::{Catalog, CategoryFilter, InvalidPrice, Price, Product};
pub use config::{
    BasketCfg, ClassicCfg, ComparisonCfg, ConfigError, GameConfig, HigherLowerCfg, MemoryCfg,
    SessionCfg, TimedCfg,
};
pub use error::GameError;
pub use input::parse_guess;
pub use modes::{
    BasketController, BasketEvent, BasketFeedback, BasketReport, Card, CardFace, CardKind,
    ChoiceResult, ClassicController, ComparisonController, ComparisonPhase, ComparisonRound,
    GuessFeedback, HigherLowerController, HigherLowerRecord, HigherLowerResult, MemoryController,
    MemoryEvent, MemoryReport, ModeKind, ModeRequest, TimedController, TimedEvent, TimedReport,
    TimedStatus,
};
pub use outcome::{
    AccuracyTier, BasketScore, Cue, CueIcon, CueTone, Direction, MatchPolicy, Outcome, Side,
    basket_score, evaluate,
};
pub use pairing::{sample_distinct_from, sample_distinct_pair};
pub use rng::{CountingRng, RngBundle};
pub use round::{GuessRecord, RoundState, ScoreTally};
pub use selector::{RecencyWindow, select_index};
pub use session::{ActiveMode, GameSession, ModeView, RoundResult};
pub use timer::{Scheduler, TimerToken};

/// Trait for abstracting catalog loading
/// Platform-specific implementations should provide this
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the product list from the platform-specific source
    ///
    /// # Errors
    ///
    /// Returns an error if the products cannot be fetched or parsed.
    fn load_catalog(&self) -> Result<Vec<Product>, Self::Error>;
}

/// Rendering boundary implemented by the host UI.
pub trait Presenter {
    /// Draw the current screen.
    fn render(&mut self, view: &ModeView<'_>);

    /// Announce the result of a guess, choice or continuation.
    fn show_result(&mut self, result: &RoundResult);

    /// Show a user-facing error message.
    fn show_error(&mut self, message: &str);
}

/// Main game engine: loads the catalog once and opens sessions over it
pub struct GameEngine<L>
where
    L: CatalogLoader,
{
    loader: L,
    config: GameConfig,
}

impl<L> GameEngine<L>
where
    L: CatalogLoader,
{
    /// Create a new game engine with the provided loader and default tuning
    pub fn new(loader: L) -> Self {
        Self::with_config(loader, GameConfig::default())
    }

    pub const fn with_config(loader: L, config: GameConfig) -> Self {
        Self { loader, config }
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Load the shared catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the loader fails or yields no products.
    pub fn load_catalog(&self) -> anyhow::Result<Rc<Catalog>> {
        let products = self
            .loader
            .load_catalog()
            .context("failed to load product catalog")?;
        if products.is_empty() {
            return Err(GameError::EmptyCatalog).context("product catalog is empty");
        }
        log::info!("loaded {} products", products.len());
        Ok(Rc::new(Catalog::from_products(products)))
    }

    /// Load the catalog and open a session showing mode selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the configuration is invalid.
    pub fn create_session<P>(&self, seed: u64, presenter: P) -> anyhow::Result<GameSession<P>>
    where
        P: Presenter,
    {
        let catalog = self.load_catalog()?;
        GameSession::new(catalog, self.config.clone(), seed, presenter)
            .context("failed to open game session")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl CatalogLoader for FixtureLoader {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<Vec<Product>, Self::Error> {
            Ok(Catalog::load_from_static().products().to_vec())
        }
    }

    struct EmptyLoader;

    impl CatalogLoader for EmptyLoader {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<Vec<Product>, Self::Error> {
            Ok(Vec::new())
        }
    }

    struct BrokenLoader;

    impl CatalogLoader for BrokenLoader {
        type Error = serde_json::Error;

        fn load_catalog(&self) -> Result<Vec<Product>, Self::Error> {
            Catalog::from_json("{ nope").map(|catalog| catalog.products().to_vec())
        }
    }

    #[derive(Default)]
    struct CountingPresenter {
        renders: usize,
        results: usize,
        errors: Vec<String>,
    }

    impl Presenter for CountingPresenter {
        fn render(&mut self, _view: &ModeView<'_>) {
            self.renders += 1;
        }

        fn show_result(&mut self, _result: &RoundResult) {
            self.results += 1;
        }

        fn show_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    #[test]
    fn engine_opens_session_over_bundled_catalog() {
        let engine = GameEngine::new(FixtureLoader);
        let mut session = engine
            .create_session(0xABCD, CountingPresenter::default())
            .unwrap();
        assert_eq!(session.catalog().len(), 14);
        session.start(ModeRequest::MemoryMatch).unwrap();
        assert_eq!(session.mode().kind(), Some(ModeKind::MemoryMatch));
        assert!(session.presenter().errors.is_empty());
    }

    #[test]
    fn empty_catalog_is_reported() {
        let engine = GameEngine::new(EmptyLoader);
        let err = engine.load_catalog().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GameError>(),
            Some(GameError::EmptyCatalog)
        ));
    }

    #[test]
    fn loader_failures_carry_context() {
        let engine = GameEngine::new(BrokenLoader);
        let err = engine.load_catalog().unwrap_err();
        assert_eq!(err.to_string(), "failed to load product catalog");
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = GameConfig::default();
        config.memory.pairs = 0;
        let engine = GameEngine::with_config(FixtureLoader, config);
        assert!(engine.create_session(1, CountingPresenter::default()).is_err());
    }
}

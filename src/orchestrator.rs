//! Strategy dispatch.
//!
//! [`MatchingOrchestrator`] is the engine's single entry point: it picks the
//! strategy registered for the requested [`MatchingMode`] and returns its
//! result unchanged.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use u_matching::cancel::CancellationToken;
//! use u_matching::config::MatchingConfig;
//! use u_matching::models::{MatchingMode, SchedulingRequest};
//! use u_matching::orchestrator::MatchingOrchestrator;
//! use u_matching::store::{InMemoryStore, MatchingStores};
//! use uuid::Uuid;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let stores = MatchingStores::in_memory(Arc::new(InMemoryStore::new()));
//! let config = MatchingConfig::default().with_seed(1);
//! let orchestrator = MatchingOrchestrator::standard(stores, config).unwrap();
//!
//! let request = SchedulingRequest::period(Uuid::new_v4(), Uuid::new_v4());
//! let result = orchestrator
//!     .execute(&request, MatchingMode::Ranking, &CancellationToken::new())
//!     .await
//!     .unwrap();
//! assert!(result.success);
//! # }
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::cancel::CancellationToken;
use crate::config::MatchingConfig;
use crate::constraints::{ConstraintProcessor, ValidatorRegistry};
use crate::error::{MatchingError, Result};
use crate::models::{MatchingMode, SchedulingRequest, SchedulingResult};
use crate::random::SeededRandom;
use crate::ranking::PreferenceRanker;
use crate::store::MatchingStores;
use crate::strategy::{MatchingStrategy, OnlineRematchStrategy, RankingStrategy};

/// Dispatches requests to the strategy registered for a mode.
#[derive(Debug, Default)]
pub struct MatchingOrchestrator {
    strategies: Vec<Arc<dyn MatchingStrategy>>,
}

impl MatchingOrchestrator {
    /// Creates an orchestrator with no strategies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a strategy. A later registration for the same mode wins.
    pub fn with_strategy(mut self, strategy: Arc<dyn MatchingStrategy>) -> Self {
        self.strategies.retain(|s| s.mode() != strategy.mode());
        self.strategies.push(strategy);
        self
    }

    /// Both built-in strategies over one set of stores, sharing a
    /// processor with the default validators and one random source.
    pub fn standard(stores: MatchingStores, config: MatchingConfig) -> Result<Self> {
        config.validate()?;
        let rng = Arc::new(SeededRandom::from_optional_seed(config.seed));
        let processor =
            ConstraintProcessor::new(stores.clone(), Arc::new(ValidatorRegistry::with_defaults()));
        let ranker = PreferenceRanker::new(stores.preferences.clone(), rng);

        Ok(Self::new()
            .with_strategy(Arc::new(RankingStrategy::new(
                stores.clone(),
                processor.clone(),
                ranker.clone(),
                config.clone(),
            )))
            .with_strategy(Arc::new(OnlineRematchStrategy::new(
                stores, processor, ranker, config,
            ))))
    }

    /// Registered modes, in registration order.
    pub fn modes(&self) -> Vec<MatchingMode> {
        self.strategies.iter().map(|s| s.mode()).collect()
    }

    /// Runs `request` with the strategy registered for `mode`.
    ///
    /// # Errors
    /// [`MatchingError::NoStrategyForMode`] when nothing serves `mode`.
    /// Strategy failures are reported in the returned result, not as errors.
    pub async fn execute(
        &self,
        request: &SchedulingRequest,
        mode: MatchingMode,
        cancel: &CancellationToken,
    ) -> Result<SchedulingResult> {
        let Some(strategy) = self.strategies.iter().find(|s| s.mode() == mode) else {
            error!(%mode, "No strategy registered");
            return Err(MatchingError::NoStrategyForMode(mode));
        };

        info!(
            %mode,
            organization_id = %request.organization_id(),
            subject_id = %request.subject_id(),
            "Dispatching matching request"
        );
        Ok(strategy.execute(request, cancel).await)
    }
}

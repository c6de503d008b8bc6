//! High-level scheduling operations.
//!
//! Thin orchestration over the engine: resolves defaults (strategy,
//! attempt budget, base date, RNG) and hands the repository through. HTTP
//! handlers and embedders call these functions rather than the engine
//! directly.

use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::api::{
    BatchOutcome, CandidateEvent, EventRequest, ScheduleOutcome, Strategy, ValidationReport,
};
use crate::config::EngineConfig;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::scheduler::{self, RuleCatalog, SearchBudget};

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Validate a candidate placement and return the full report.
pub async fn check_constraints(
    repo: &dyn FullRepository,
    config: &EngineConfig,
    candidate: &CandidateEvent,
) -> RepositoryResult<ValidationReport> {
    let catalog = RuleCatalog::from_weights(&config.scoring);
    scheduler::validate_event(repo, &catalog, candidate).await
}

/// Schedule one event. `strategy` and `max_attempts` default from the
/// request shape and the engine configuration when not supplied.
pub async fn schedule_event(
    repo: &dyn FullRepository,
    config: &EngineConfig,
    request: &EventRequest,
    strategy: Option<Strategy>,
    max_attempts: Option<u32>,
) -> RepositoryResult<ScheduleOutcome> {
    let catalog = RuleCatalog::from_weights(&config.scoring);
    let strategy = strategy.unwrap_or_else(|| scheduler::default_strategy(request));
    let budget =
        SearchBudget::attempts(max_attempts.unwrap_or(config.search.first_pass_attempts));
    let mut rng = SmallRng::from_os_rng();

    scheduler::schedule_event(
        repo,
        &catalog,
        request,
        strategy,
        budget,
        config,
        today(),
        &mut rng,
    )
    .await
}

/// Schedule a batch of events with priority ordering and one retry pass.
pub async fn schedule_batch(
    repo: &dyn FullRepository,
    config: &EngineConfig,
    requests: Vec<EventRequest>,
) -> RepositoryResult<BatchOutcome> {
    let catalog = RuleCatalog::from_weights(&config.scoring);
    let mut rng = SmallRng::from_os_rng();
    scheduler::schedule_batch(repo, &catalog, requests, config, today(), &mut rng).await
}

//! Two-pass batch scheduling.
//!
//! Requests are ordered by a priority heuristic, scheduled one at a time
//! (each success commits before the next request is attempted, so no two
//! requests can double-book a resource), and failures get exactly one
//! retry with a larger attempt budget.

use chrono::NaiveDate;
use log::info;
use rand::Rng;

use crate::api::{BatchEntry, BatchOutcome, EventRequest, ScheduleOutcome};
use crate::config::EngineConfig;
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::scheduler::rules::RuleCatalog;
use crate::scheduler::single::{self, SearchBudget};

/// Priority heuristic: bigger classes first, a preferred room breaking
/// ties upward.
pub fn priority_score(request: &EventRequest) -> u32 {
    let preference_bump = if request.preferred_room_ids.is_empty() {
        0
    } else {
        1
    };
    2 * request.required_capacity + preference_bump
}

/// Sort requests by descending priority. The sort is stable, so requests
/// with equal scores keep their original relative order.
pub fn order_by_priority(mut requests: Vec<EventRequest>) -> Vec<EventRequest> {
    requests.sort_by_key(|request| std::cmp::Reverse(priority_score(request)));
    requests
}

fn entry(request: EventRequest, outcome: ScheduleOutcome) -> BatchEntry {
    BatchEntry {
        request,
        success: outcome.success,
        event: outcome.event,
        message: outcome.message,
        warnings: outcome.warnings,
    }
}

/// Schedule a list of requests: priority order, one pass with the default
/// attempt budget, then one bounded retry pass over the failures. Never
/// recursive; a request that fails its retry is a terminal failure.
pub async fn schedule_batch<R: Rng + ?Sized>(
    repo: &dyn FullRepository,
    catalog: &RuleCatalog,
    requests: Vec<EventRequest>,
    config: &EngineConfig,
    today: NaiveDate,
    rng: &mut R,
) -> RepositoryResult<BatchOutcome> {
    let ordered = order_by_priority(requests);
    let total = ordered.len();

    let mut results: Vec<BatchEntry> = Vec::with_capacity(total);
    let mut retries: Vec<EventRequest> = Vec::new();

    for request in ordered {
        let strategy = single::default_strategy(&request);
        let budget = SearchBudget::attempts(config.search.first_pass_attempts);
        let outcome =
            single::schedule_event(repo, catalog, &request, strategy, budget, config, today, rng)
                .await?;
        if outcome.success {
            results.push(entry(request, outcome));
        } else {
            retries.push(request);
        }
    }

    let retry_count = retries.len();
    for request in retries {
        let strategy = single::default_strategy(&request);
        let budget = SearchBudget::attempts(config.search.retry_attempts);
        let outcome =
            single::schedule_event(repo, catalog, &request, strategy, budget, config, today, rng)
                .await?;
        results.push(entry(request, outcome));
    }

    let total_success = results.iter().filter(|result| result.success).count();
    let total_failure = results.len() - total_success;
    info!(
        "batch complete: {} scheduled, {} failed ({} retried)",
        total_success, total_failure, retry_count
    );

    Ok(BatchOutcome {
        total_success,
        total_failure,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ModuleId, RoomId};

    fn request(capacity: u32, preferred_rooms: Vec<RoomId>) -> EventRequest {
        EventRequest {
            title: format!("event-{}", capacity),
            description: None,
            module_id: ModuleId::new(1),
            required_capacity: capacity,
            duration_minutes: 60,
            preferred_room_ids: preferred_rooms,
            preferred_staff_ids: vec![],
            preferred_window: None,
            category: Default::default(),
            students: vec![],
        }
    }

    #[test]
    fn test_priority_score() {
        assert_eq!(priority_score(&request(50, vec![])), 100);
        assert_eq!(priority_score(&request(20, vec![])), 40);
        assert_eq!(priority_score(&request(5, vec![])), 10);
        assert_eq!(priority_score(&request(5, vec![RoomId::new(1)])), 11);
    }

    #[test]
    fn test_order_by_priority() {
        let ordered = order_by_priority(vec![
            request(5, vec![]),
            request(50, vec![]),
            request(20, vec![]),
        ]);
        let capacities: Vec<u32> = ordered.iter().map(|r| r.required_capacity).collect();
        assert_eq!(capacities, vec![50, 20, 5]);
    }

    #[test]
    fn test_order_is_stable_for_ties() {
        let mut first = request(10, vec![]);
        first.title = "first".to_string();
        let mut second = request(10, vec![]);
        second.title = "second".to_string();

        let ordered = order_by_priority(vec![first, second]);
        assert_eq!(ordered[0].title, "first");
        assert_eq!(ordered[1].title, "second");
    }

    #[test]
    fn test_preferred_room_breaks_capacity_tie() {
        let plain = request(10, vec![]);
        let with_preference = request(10, vec![RoomId::new(3)]);

        let ordered = order_by_priority(vec![plain, with_preference]);
        assert!(!ordered[0].preferred_room_ids.is_empty());
    }
}

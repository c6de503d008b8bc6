//! Constraint validation for candidate placements.
//!
//! The single source of truth for "can this event be placed here". Every
//! hard rule runs even when an earlier one already failed: callers get the
//! complete violation list, not just the first.

use log::debug;

use crate::api::{CandidateEvent, ConstraintCode, ValidationReport};
use crate::db::repository::{FullRepository, RepositoryResult, TimeslotRepository};
use crate::scheduler::rules::{self, RuleCatalog};

/// Validate one candidate placement against the full rule catalog.
///
/// A nonexistent timeslot short-circuits with a single hard violation; no
/// further rules can be evaluated without the slot's boundaries.
pub async fn validate_event(
    repo: &dyn FullRepository,
    catalog: &RuleCatalog,
    candidate: &CandidateEvent,
) -> RepositoryResult<ValidationReport> {
    let mut report = ValidationReport::default();

    let Some(slot) = repo.timeslot_by_id(candidate.timeslot_id).await? else {
        report.push_hard(
            ConstraintCode::InvalidTimeslot,
            format!("Timeslot {} does not exist", candidate.timeslot_id),
        );
        return Ok(report);
    };

    // Hard rules, all evaluated unconditionally.
    if let Some(violation) = rules::room_conflict(repo, candidate).await? {
        report.hard_violations.push(violation);
    }
    if let Some(violation) = rules::staff_conflict(repo, candidate).await? {
        report.hard_violations.push(violation);
    }
    if let Some(violation) = rules::room_capacity(repo, candidate).await? {
        report.hard_violations.push(violation);
    }

    // Soft rules, subject to catalog toggles.
    if let Some(warning) = rules::preferred_hours(slot.start_time) {
        if catalog.enabled(warning.constraint) {
            report.soft_warnings.push(warning);
        }
    }
    if catalog.enabled(ConstraintCode::BackToBack) {
        let scan = rules::back_to_back(repo, repo, candidate, &slot).await?;
        if let Some(warning) = scan.warning {
            report.soft_warnings.push(warning);
        }
        report.positive_signals.extend(scan.signals);
    }

    debug!(
        "validated candidate room={} staff={} date={} slot={}: {} hard, {} soft",
        candidate.room_id,
        candidate.staff_id,
        candidate.date,
        candidate.timeslot_id,
        report.hard_violations.len(),
        report.soft_warnings.len()
    );

    Ok(report)
}

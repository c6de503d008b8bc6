//! The fixed rule catalog and its evaluators.
//!
//! Three hard rules (room conflict, staff conflict, room capacity) block
//! placement; two soft rules (preferred hours, back-to-back spacing) only
//! warn and feed the scoring function. Hard rules are structurally fixed;
//! soft rules carry a configurable weight and can be disabled through the
//! catalog.

use chrono::NaiveTime;
use std::collections::HashMap;

use crate::api::{CandidateEvent, ConstraintCode, ConstraintId, RuleSignal, RuleViolation};
use crate::config::ScoringWeights;
use crate::db::repository::{
    EventRepository, RepositoryResult, RoomRepository, TimeslotRepository,
};
use crate::models::{Constraint, ConstraintKind, Timeslot};
use crate::scheduler::availability::AvailabilityChecker;

/// Longest gap (minutes) still counted as an optimal back-to-back booking.
pub const OPTIMAL_GAP_MAX_MINUTES: i64 = 30;
/// Gaps strictly between the optimal maximum and this bound are
/// inefficient.
pub const INEFFICIENT_GAP_MAX_MINUTES: i64 = 120;

fn ideal_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 30, 0).expect("valid literal time")
}

fn ideal_end() -> NaiveTime {
    NaiveTime::from_hms_opt(16, 30, 0).expect("valid literal time")
}

fn lunch_start() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).expect("valid literal time")
}

fn lunch_end() -> NaiveTime {
    NaiveTime::from_hms_opt(13, 0, 0).expect("valid literal time")
}

/// Runtime view of the constraint catalog: per-rule metadata, weights and
/// enabled flags.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    entries: HashMap<ConstraintCode, Constraint>,
}

impl RuleCatalog {
    /// Build the catalog from configured scoring weights. Hard rules get a
    /// zero weight; their effect is blocking, not scoring.
    pub fn from_weights(weights: &ScoringWeights) -> Self {
        let mut entries = HashMap::new();
        let mut define = |code: ConstraintCode,
                          id: i64,
                          name: &str,
                          description: &str,
                          kind: ConstraintKind,
                          weight: f64| {
            entries.insert(
                code,
                Constraint {
                    id: ConstraintId::new(id),
                    name: name.to_string(),
                    description: description.to_string(),
                    kind,
                    category: code.to_string(),
                    weight,
                    enabled: true,
                },
            );
        };

        define(
            ConstraintCode::RoomConflict,
            1,
            "Room conflict",
            "A room can host at most one event per (date, timeslot)",
            ConstraintKind::Hard,
            0.0,
        );
        define(
            ConstraintCode::StaffConflict,
            2,
            "Staff conflict",
            "A staff member can teach at most one event per (date, timeslot)",
            ConstraintKind::Hard,
            0.0,
        );
        define(
            ConstraintCode::RoomCapacity,
            3,
            "Room capacity",
            "A room must seat every enrolled student",
            ConstraintKind::Hard,
            0.0,
        );
        define(
            ConstraintCode::InvalidTimeslot,
            4,
            "Invalid timeslot",
            "An event must reference a timeslot from the catalog",
            ConstraintKind::Hard,
            0.0,
        );
        define(
            ConstraintCode::PreferredHours,
            5,
            "Staff preferred hours",
            "Teaching ideally starts between 09:30 and 16:30",
            ConstraintKind::Soft,
            weights.preferred_hours_penalty,
        );
        define(
            ConstraintCode::LunchHour,
            6,
            "Lunch hour",
            "Teaching ideally does not start between 12:00 and 13:00",
            ConstraintKind::Soft,
            weights.lunch_penalty,
        );
        define(
            ConstraintCode::BackToBack,
            7,
            "Back-to-back spacing",
            "Short gaps between a staff member's events are good, medium gaps waste time",
            ConstraintKind::Soft,
            weights.back_to_back_penalty,
        );

        Self { entries }
    }

    pub fn enabled(&self, code: ConstraintCode) -> bool {
        self.entries.get(&code).map_or(true, |c| c.enabled)
    }

    /// Disable or re-enable a soft rule. Hard rules stay structurally
    /// enforced and ignore this flag.
    pub fn set_enabled(&mut self, code: ConstraintCode, enabled: bool) {
        if let Some(entry) = self.entries.get_mut(&code) {
            if entry.kind == ConstraintKind::Soft {
                entry.enabled = enabled;
            }
        }
    }

    /// Scoring penalty for a soft warning; unknown codes fall back to the
    /// unclassified weight.
    pub fn penalty(&self, code: ConstraintCode, weights: &ScoringWeights) -> f64 {
        match self.entries.get(&code) {
            Some(entry) if entry.kind == ConstraintKind::Soft => entry.weight,
            _ => weights.unclassified_penalty,
        }
    }

    /// Catalog entries ordered by id, for API listings.
    pub fn constraints(&self) -> Vec<Constraint> {
        let mut all: Vec<Constraint> = self.entries.values().cloned().collect();
        all.sort_by_key(|c| c.id);
        all
    }
}

/// Room conflict (hard): violated iff the room is not free at the
/// candidate's grid slot.
pub async fn room_conflict(
    events: &dyn EventRepository,
    candidate: &CandidateEvent,
) -> RepositoryResult<Option<RuleViolation>> {
    let checker = AvailabilityChecker::new(events);
    let free = checker
        .room_is_free(
            candidate.room_id,
            candidate.date,
            candidate.timeslot_id,
            candidate.exclude_event_id,
        )
        .await?;
    Ok((!free).then(|| {
        RuleViolation::new(
            ConstraintCode::RoomConflict,
            format!(
                "Room {} is already booked on {} in timeslot {}",
                candidate.room_id, candidate.date, candidate.timeslot_id
            ),
        )
    }))
}

/// Staff conflict (hard): violated iff the staff member is not free at the
/// candidate's grid slot.
pub async fn staff_conflict(
    events: &dyn EventRepository,
    candidate: &CandidateEvent,
) -> RepositoryResult<Option<RuleViolation>> {
    let checker = AvailabilityChecker::new(events);
    let free = checker
        .staff_is_free(
            candidate.staff_id,
            candidate.date,
            candidate.timeslot_id,
            candidate.exclude_event_id,
        )
        .await?;
    Ok((!free).then(|| {
        RuleViolation::new(
            ConstraintCode::StaffConflict,
            format!(
                "Staff {} is already teaching on {} in timeslot {}",
                candidate.staff_id, candidate.date, candidate.timeslot_id
            ),
        )
    }))
}

/// Room capacity (hard): violated iff the room seats fewer students than
/// the candidate brings. A nonexistent room is reported as a violation of
/// this rule rather than an error.
pub async fn room_capacity(
    rooms: &dyn RoomRepository,
    candidate: &CandidateEvent,
) -> RepositoryResult<Option<RuleViolation>> {
    let Some(room) = rooms.room_by_id(candidate.room_id).await? else {
        return Ok(Some(RuleViolation::new(
            ConstraintCode::RoomCapacity,
            format!("Room {} does not exist", candidate.room_id),
        )));
    };

    if room.capacity < candidate.student_count {
        return Ok(Some(RuleViolation::new(
            ConstraintCode::RoomCapacity,
            format!(
                "Room capacity {} is insufficient for {} students",
                room.capacity, candidate.student_count
            ),
        )));
    }
    Ok(None)
}

/// Staff preferred hours (soft). The lunch-hour message takes precedence
/// when a start falls inside the lunch window.
pub fn preferred_hours(start: NaiveTime) -> Option<RuleViolation> {
    if start >= lunch_start() && start < lunch_end() {
        return Some(RuleViolation::new(
            ConstraintCode::LunchHour,
            format!(
                "Start time {} falls within the lunch hour (12:00-13:00)",
                start.format("%H:%M")
            ),
        ));
    }
    if start < ideal_start() || start > ideal_end() {
        return Some(RuleViolation::new(
            ConstraintCode::PreferredHours,
            format!(
                "Start time {} is outside preferred teaching hours (09:30-16:30)",
                start.format("%H:%M")
            ),
        ));
    }
    None
}

/// Classification of one gap between two of a staff member's bookings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GapClass {
    /// (0, 30] minutes: an optimal back-to-back booking.
    Optimal,
    /// (30, 120) minutes: wastes staff time between bookings.
    Inefficient,
    /// Overlapping, adjacent-at-zero, or far enough apart not to matter.
    Neutral,
}

/// Classify a signed gap in minutes between a candidate's end and another
/// event's start (or vice versa).
pub fn classify_gap(minutes: i64) -> GapClass {
    if minutes > 0 && minutes <= OPTIMAL_GAP_MAX_MINUTES {
        GapClass::Optimal
    } else if minutes > OPTIMAL_GAP_MAX_MINUTES && minutes < INEFFICIENT_GAP_MAX_MINUTES {
        GapClass::Inefficient
    } else {
        GapClass::Neutral
    }
}

/// Outcome of scanning a staff member's same-day bookings for gaps.
#[derive(Debug, Clone, Default)]
pub struct GapScan {
    pub warning: Option<RuleViolation>,
    pub signals: Vec<RuleSignal>,
}

/// Back-to-back spacing (soft): scan every other event the staff member
/// has on the candidate's date. Any inefficient gap raises the warning and
/// suppresses positive signals; optimal gaps only surface when no
/// inefficiency was found.
pub async fn back_to_back(
    events: &dyn EventRepository,
    timeslots: &dyn TimeslotRepository,
    candidate: &CandidateEvent,
    candidate_slot: &Timeslot,
) -> RepositoryResult<GapScan> {
    let same_day = events
        .events_by_staff_on_date(candidate.staff_id, candidate.date)
        .await?;

    let mut inefficient: Vec<i64> = Vec::new();
    let mut optimal: Vec<i64> = Vec::new();

    for other in same_day {
        if Some(other.id) == candidate.exclude_event_id {
            continue;
        }
        // Events on unknown timeslots cannot contribute a gap.
        let Some(other_slot) = timeslots.timeslot_by_id(other.timeslot_id).await? else {
            continue;
        };

        let after = (other_slot.start_time - candidate_slot.end_time).num_minutes();
        let before = (candidate_slot.start_time - other_slot.end_time).num_minutes();
        for gap in [after, before] {
            match classify_gap(gap) {
                GapClass::Optimal => optimal.push(gap),
                GapClass::Inefficient => inefficient.push(gap),
                GapClass::Neutral => {}
            }
        }
    }

    let mut scan = GapScan::default();
    if let Some(worst) = inefficient.iter().max() {
        scan.warning = Some(RuleViolation::new(
            ConstraintCode::BackToBack,
            format!(
                "Gap of {} minutes to another booking creates inefficient gaps for staff",
                worst
            ),
        ));
    } else {
        for gap in optimal {
            scan.signals.push(RuleSignal {
                constraint: ConstraintCode::BackToBack,
                message: format!("Optimal back-to-back booking with a {} minute gap", gap),
            });
        }
    }
    Ok(scan)
}

//! Single-event placement.
//!
//! Two strategies, selectable by caller intent: greedy placement into a
//! requested (or sampled fallback) window, and an exhaustive backtracking
//! search over the room × staff × window cross-product. Both end in the
//! constraint validator; a kept assignment is committed to the repository
//! before the outcome is returned, so the next availability check sees it.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, info};
use rand::Rng;
use std::collections::HashMap;
use std::time::Instant;

use crate::api::{CandidateEvent, EventRequest, RuleViolation, ScheduleOutcome, Strategy};
use crate::config::{EngineConfig, ScoringWeights};
use crate::db::repository::{
    EventRepository, FullRepository, ModuleRepository, RepositoryResult, RoomRepository,
    StaffRepository, TimeslotRepository,
};
use crate::models::{EventDraft, Module, Room, Staff, Timeslot};
use crate::scheduler::availability::AvailabilityChecker;
use crate::scheduler::rules::RuleCatalog;
use crate::scheduler::validator;
use crate::scheduler::windows::{window_end, CandidateWindow, WindowGenerator, TEACHING_WEEK};

/// Bound on one placement attempt: a candidate-count budget and an
/// optional wall-clock deadline, both checked inside the search loop.
#[derive(Debug, Clone, Copy)]
pub struct SearchBudget {
    /// Complete candidate assignments the search may evaluate (greedy:
    /// fallback windows it may sample).
    pub max_attempts: u32,
    pub deadline: Option<Instant>,
}

impl SearchBudget {
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// A complete, hard-valid assignment kept by the search.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub room: Room,
    pub staff: Staff,
    pub module: Module,
    pub date: NaiveDate,
    pub timeslot: Timeslot,
    pub score: f64,
    pub warnings: Vec<RuleViolation>,
}

/// How a placement attempt resolved. Expected no-slot-found conditions are
/// variants here, never errors.
#[derive(Debug)]
pub enum Resolution {
    Placed(Box<Assignment>),
    ModuleNotFound,
    NoRooms,
    NoStaff,
    Exhausted,
    TimedOut,
}

impl Resolution {
    /// Failure message for the outcome DTO.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Resolution::Placed(_) => "scheduled",
            Resolution::ModuleNotFound => "module not found",
            Resolution::NoRooms => "no rooms with sufficient capacity",
            Resolution::NoStaff => "no staff available",
            Resolution::Exhausted => "exhausted search without a feasible assignment",
            Resolution::TimedOut => "search deadline expired before a feasible assignment was found",
        }
    }
}

/// Score a complete, hard-valid assignment.
///
/// Starts from the base score, subtracts the per-category penalty for each
/// soft warning, adds the bonus for each positive signal, and subtracts
/// the drift penalty per hour between the chosen start and the caller's
/// preferred start.
pub fn score_assignment(
    report_warnings: &[RuleViolation],
    positive_signals: usize,
    catalog: &RuleCatalog,
    weights: &ScoringWeights,
    chosen_start: NaiveDateTime,
    preferred_start: Option<NaiveDateTime>,
) -> f64 {
    let mut score = weights.base;
    for warning in report_warnings {
        score -= catalog.penalty(warning.constraint, weights);
    }
    score += weights.positive_bonus * positive_signals as f64;
    if let Some(preferred) = preferred_start {
        let hours = (chosen_start - preferred).num_minutes().abs() as f64 / 60.0;
        score -= weights.drift_penalty_per_hour * hours;
    }
    score
}

/// Candidate domains for one placement attempt, loaded once per request.
struct Domains {
    module: Module,
    rooms: Vec<Room>,
    staff: Vec<Staff>,
    slots_by_window: HashMap<(NaiveTime, NaiveTime), Timeslot>,
}

enum DomainsOutcome {
    Ready(Domains),
    Failed(Resolution),
}

async fn load_domains(
    repo: &dyn FullRepository,
    request: &EventRequest,
) -> RepositoryResult<DomainsOutcome> {
    let Some(module) = repo.module_by_id(request.module_id).await? else {
        return Ok(DomainsOutcome::Failed(Resolution::ModuleNotFound));
    };

    let rooms = repo
        .rooms_with_min_capacity(request.required_capacity)
        .await?;
    if rooms.is_empty() {
        return Ok(DomainsOutcome::Failed(Resolution::NoRooms));
    }

    // Narrow staff to the module's department; when the department has
    // nobody, widen to the whole staff pool.
    let mut staff = repo
        .staff_by_department(Some(module.department_id))
        .await?;
    if staff.is_empty() {
        staff = repo.staff_by_department(None).await?;
    }
    if staff.is_empty() {
        return Ok(DomainsOutcome::Failed(Resolution::NoStaff));
    }

    let slots_by_window = repo
        .list_timeslots()
        .await?
        .into_iter()
        .map(|slot| ((slot.start_time, slot.end_time), slot))
        .collect();

    Ok(DomainsOutcome::Ready(Domains {
        module,
        rooms,
        staff,
        slots_by_window,
    }))
}

fn preferred_start_datetime(request: &EventRequest) -> Option<NaiveDateTime> {
    request
        .preferred_window
        .as_ref()
        .map(|window| window.start_datetime())
}

/// Pick the first preferred id present in the available set, else the
/// first available entry.
fn pick_preferred<'a, T, I: PartialEq + Copy>(
    available: &'a [T],
    preferred: &[I],
    id_of: impl Fn(&T) -> I,
) -> Option<&'a T> {
    for wanted in preferred {
        if let Some(found) = available.iter().find(|item| id_of(item) == *wanted) {
            return Some(found);
        }
    }
    available.first()
}

/// Exhaustive backtracking search in fixed Room → Staff → Window order.
///
/// Capacity is pruned first (a cheap, room-only filter); temporal
/// conflicts, the most expensive check, are deferred to the window level.
/// The search keeps exploring after the first valid assignment because a
/// later candidate may score higher; it stops early only when the attempt
/// budget or the deadline expires, returning the best assignment found so
/// far if any.
pub async fn search_assignment(
    repo: &dyn FullRepository,
    catalog: &RuleCatalog,
    request: &EventRequest,
    budget: SearchBudget,
    config: &EngineConfig,
    today: NaiveDate,
) -> RepositoryResult<Resolution> {
    let domains = match load_domains(repo, request).await? {
        DomainsOutcome::Ready(domains) => domains,
        DomainsOutcome::Failed(resolution) => return Ok(resolution),
    };

    let start_date = request
        .preferred_window
        .as_ref()
        .map(|window| window.date)
        .unwrap_or(today);
    let end_date = start_date
        .checked_add_days(Days::new(config.search.horizon_days.max(0) as u64))
        .unwrap_or(NaiveDate::MAX);

    // Resolve generated windows against the timeslot catalog up front;
    // windows without a catalog slot can never be placed.
    let placements: Vec<(NaiveDate, Timeslot)> = WindowGenerator::with_settings(
        start_date,
        end_date,
        request.duration_minutes,
        &TEACHING_WEEK,
        &config.search,
    )
    .filter_map(|window: CandidateWindow| {
        domains
            .slots_by_window
            .get(&(window.start, window.end))
            .map(|slot| (window.date, slot.clone()))
    })
    .collect();

    let preferred_start = preferred_start_datetime(request);
    let checker = AvailabilityChecker::new(repo);
    let mut best: Option<Assignment> = None;
    let mut evaluated: u32 = 0;
    let mut timed_out = false;

    'search: for room in &domains.rooms {
        if budget.expired() {
            timed_out = true;
            break;
        }
        // Promising-check after Room: capacity. The domain is already
        // capacity-filtered; this guards against a stale filter.
        if room.capacity < request.required_capacity {
            continue;
        }
        for staff in &domains.staff {
            if budget.expired() {
                timed_out = true;
                break 'search;
            }
            // No promising-check after Staff: no room/staff correlation
            // exists to prune on.
            for (date, slot) in &placements {
                if budget.expired() {
                    timed_out = true;
                    break 'search;
                }
                // Promising-check after Window: conflicts in the working
                // event set.
                if !checker.room_is_free(room.id, *date, slot.id, None).await? {
                    continue;
                }
                if !checker
                    .staff_is_free(staff.id, *date, slot.id, None)
                    .await?
                {
                    continue;
                }

                let candidate = CandidateEvent {
                    room_id: room.id,
                    staff_id: staff.id,
                    module_id: Some(domains.module.id),
                    date: *date,
                    timeslot_id: slot.id,
                    student_count: request.required_capacity,
                    exclude_event_id: None,
                };
                let report = validator::validate_event(repo, catalog, &candidate).await?;
                evaluated += 1;
                if report.can_schedule() {
                    let score = score_assignment(
                        &report.soft_warnings,
                        report.positive_signals.len(),
                        catalog,
                        &config.scoring,
                        date.and_time(slot.start_time),
                        preferred_start,
                    );
                    // Strict improvement only: ties break to the first
                    // assignment found in search order.
                    if best.as_ref().is_none_or(|kept| score > kept.score) {
                        best = Some(Assignment {
                            room: room.clone(),
                            staff: staff.clone(),
                            module: domains.module.clone(),
                            date: *date,
                            timeslot: slot.clone(),
                            score,
                            warnings: report.soft_warnings,
                        });
                    }
                }
                if evaluated >= budget.max_attempts {
                    debug!(
                        "search budget of {} candidates spent for '{}'",
                        budget.max_attempts, request.title
                    );
                    break 'search;
                }
            }
        }
    }

    Ok(match best {
        Some(assignment) => Resolution::Placed(Box::new(assignment)),
        None if timed_out => Resolution::TimedOut,
        None => Resolution::Exhausted,
    })
}

/// Sample one fallback window: weekday uniform over the teaching week, a
/// start hour biased toward core hours, minutes biased toward standard
/// slot boundaries, with the requested duration preserved.
fn sample_fallback_window<R: Rng + ?Sized>(
    rng: &mut R,
    base_date: NaiveDate,
    duration_minutes: i64,
) -> Option<CandidateWindow> {
    let weekday = TEACHING_WEEK[rng.random_range(0..TEACHING_WEEK.len())];
    let mut date = base_date;
    while date.weekday() != weekday {
        date = date.checked_add_days(Days::new(1))?;
    }

    let hour: u32 = if rng.random_bool(0.7) {
        rng.random_range(10..15)
    } else if rng.random_bool(0.5) {
        9
    } else {
        rng.random_range(15..17)
    };
    let minute: u32 = if rng.random_bool(0.7) {
        if rng.random_bool(0.5) {
            0
        } else {
            30
        }
    } else if rng.random_bool(0.5) {
        15
    } else {
        45
    };

    let start = NaiveTime::from_hms_opt(hour, minute, 0)?;
    let end = window_end(start, duration_minutes)?;
    Some(CandidateWindow { date, start, end })
}

/// Greedy placement: try the caller's requested window first, then up to
/// `max_attempts` sampled fallback windows, stopping at the first try
/// whose room and staff availability sets are both non-empty.
pub async fn place_direct<R: Rng + ?Sized>(
    repo: &dyn FullRepository,
    catalog: &RuleCatalog,
    request: &EventRequest,
    budget: SearchBudget,
    config: &EngineConfig,
    today: NaiveDate,
    rng: &mut R,
) -> RepositoryResult<Resolution> {
    let domains = match load_domains(repo, request).await? {
        DomainsOutcome::Ready(domains) => domains,
        DomainsOutcome::Failed(resolution) => return Ok(resolution),
    };

    let base_date = request
        .preferred_window
        .as_ref()
        .map(|window| window.date)
        .unwrap_or(today);
    let preferred_start = preferred_start_datetime(request);

    // The explicitly requested window always gets the first try.
    let mut tries: Vec<CandidateWindow> = Vec::new();
    if let Some(window) = &request.preferred_window {
        let end = match window.end {
            Some(end) => Some(end),
            None => window_end(window.start, request.duration_minutes),
        };
        if let Some(end) = end {
            tries.push(CandidateWindow {
                date: window.date,
                start: window.start,
                end,
            });
        }
    }
    for _ in 0..budget.max_attempts {
        if let Some(window) = sample_fallback_window(rng, base_date, request.duration_minutes) {
            tries.push(window);
        }
    }

    let checker = AvailabilityChecker::new(repo);
    let mut last_failure = Resolution::Exhausted;

    for window in tries {
        if budget.expired() {
            return Ok(match last_failure {
                Resolution::Exhausted => Resolution::TimedOut,
                other => other,
            });
        }
        let Some(slot) = domains.slots_by_window.get(&(window.start, window.end)) else {
            continue;
        };

        let mut free_rooms: Vec<Room> = Vec::new();
        for room in &domains.rooms {
            if checker
                .room_is_free(room.id, window.date, slot.id, None)
                .await?
            {
                free_rooms.push(room.clone());
            }
        }
        if free_rooms.is_empty() {
            last_failure = Resolution::NoRooms;
            continue;
        }

        let mut free_staff: Vec<Staff> = Vec::new();
        for staff in &domains.staff {
            if checker
                .staff_is_free(staff.id, window.date, slot.id, None)
                .await?
            {
                free_staff.push(staff.clone());
            }
        }
        if free_staff.is_empty() {
            last_failure = Resolution::NoStaff;
            continue;
        }

        let Some(room) = pick_preferred(&free_rooms, &request.preferred_room_ids, |r| r.id).cloned()
        else {
            continue;
        };
        let Some(staff) =
            pick_preferred(&free_staff, &request.preferred_staff_ids, |s| s.id).cloned()
        else {
            continue;
        };

        let candidate = CandidateEvent {
            room_id: room.id,
            staff_id: staff.id,
            module_id: Some(domains.module.id),
            date: window.date,
            timeslot_id: slot.id,
            student_count: request.required_capacity,
            exclude_event_id: None,
        };
        let report = validator::validate_event(repo, catalog, &candidate).await?;
        if !report.can_schedule() {
            continue;
        }

        let score = score_assignment(
            &report.soft_warnings,
            report.positive_signals.len(),
            catalog,
            &config.scoring,
            window.date.and_time(slot.start_time),
            preferred_start,
        );
        return Ok(Resolution::Placed(Box::new(Assignment {
            room,
            staff,
            module: domains.module,
            date: window.date,
            timeslot: slot.clone(),
            score,
            warnings: report.soft_warnings,
        })));
    }

    Ok(last_failure)
}

/// Resolve one event request end to end: run the chosen strategy and
/// commit the kept assignment as a new event.
#[allow(clippy::too_many_arguments)]
pub async fn schedule_event<R: Rng + ?Sized>(
    repo: &dyn FullRepository,
    catalog: &RuleCatalog,
    request: &EventRequest,
    strategy: Strategy,
    budget: SearchBudget,
    config: &EngineConfig,
    today: NaiveDate,
    rng: &mut R,
) -> RepositoryResult<ScheduleOutcome> {
    let resolution = match strategy {
        Strategy::Direct => {
            place_direct(repo, catalog, request, budget, config, today, rng).await?
        }
        Strategy::Search => {
            search_assignment(repo, catalog, request, budget, config, today).await?
        }
    };

    let assignment = match resolution {
        Resolution::Placed(assignment) => assignment,
        failure => {
            debug!(
                "could not schedule '{}': {}",
                request.title,
                failure.failure_message()
            );
            return Ok(ScheduleOutcome::failed(failure.failure_message()));
        }
    };

    let event = repo
        .create_event(EventDraft {
            title: request.title.clone(),
            description: request.description.clone(),
            date: assignment.date,
            timeslot_id: assignment.timeslot.id,
            module_id: assignment.module.id,
            course_id: assignment.module.course_id,
            room_id: assignment.room.id,
            staff_id: assignment.staff.id,
            students: request.students.clone(),
            student_count: request.required_capacity,
            category: request.category,
        })
        .await?;

    info!(
        "scheduled '{}' on {} slot {} (room {}, staff {}, score {:.1})",
        event.title,
        event.date,
        event.timeslot_id,
        event.room_id,
        event.staff_id,
        assignment.score
    );

    Ok(ScheduleOutcome::placed(
        event,
        assignment.warnings,
        format!(
            "scheduled in room {} with staff {} on {}",
            assignment.room.name, assignment.staff.name, assignment.date
        ),
    ))
}

/// Strategy defaulting: an explicit window means the caller wants the
/// greedy path; otherwise run the full search.
pub fn default_strategy(request: &EventRequest) -> Strategy {
    if request.preferred_window.is_some() {
        Strategy::Direct
    } else {
        Strategy::Search
    }
}

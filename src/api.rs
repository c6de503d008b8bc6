//! Public API surface for the scheduling engine.
//!
//! This file consolidates the identifier newtypes and the DTO types shared
//! between the engine, the service layer, and the HTTP API. All types derive
//! Serialize/Deserialize for JSON serialization.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::define_id_type;
use crate::models::{Event, EventCategory};

define_id_type!(i64, EventId);
define_id_type!(i64, RoomId);
define_id_type!(i64, StaffId);
define_id_type!(i64, ModuleId);
define_id_type!(i64, CourseId);
define_id_type!(i64, StudentId);
define_id_type!(i64, TimeslotId);
define_id_type!(i64, DepartmentId);
define_id_type!(i64, BuildingId);
define_id_type!(i64, ConstraintId);

/// Stable codes for the fixed rule catalog.
///
/// The first four are hard rules (a violation blocks placement); the rest
/// are soft rules used for warnings and scoring.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintCode {
    RoomConflict,
    StaffConflict,
    RoomCapacity,
    InvalidTimeslot,
    PreferredHours,
    LunchHour,
    BackToBack,
}

impl ConstraintCode {
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            ConstraintCode::RoomConflict
                | ConstraintCode::StaffConflict
                | ConstraintCode::RoomCapacity
                | ConstraintCode::InvalidTimeslot
        )
    }
}

impl std::fmt::Display for ConstraintCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConstraintCode::RoomConflict => "room_conflict",
            ConstraintCode::StaffConflict => "staff_conflict",
            ConstraintCode::RoomCapacity => "room_capacity",
            ConstraintCode::InvalidTimeslot => "invalid_timeslot",
            ConstraintCode::PreferredHours => "preferred_hours",
            ConstraintCode::LunchHour => "lunch_hour",
            ConstraintCode::BackToBack => "back_to_back",
        };
        write!(f, "{}", name)
    }
}

/// One broken rule: which constraint, and a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub constraint: ConstraintCode,
    pub message: String,
}

impl RuleViolation {
    pub fn new(constraint: ConstraintCode, message: impl Into<String>) -> Self {
        Self {
            constraint,
            message: message.into(),
        }
    }
}

/// A positive soft signal (e.g. an optimal back-to-back gap). Signals never
/// block or warn; they only raise an assignment's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSignal {
    pub constraint: ConstraintCode,
    pub message: String,
}

/// Full validation result for one candidate placement.
///
/// Produced per validation call and never persisted. Hard violations and
/// soft warnings are kept in rule-evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub hard_violations: Vec<RuleViolation>,
    pub soft_warnings: Vec<RuleViolation>,
    /// Positive signals used only for scoring; not exposed as warnings.
    #[serde(default)]
    pub positive_signals: Vec<RuleSignal>,
}

impl ValidationReport {
    /// A placement is schedulable iff it has no hard violations.
    pub fn can_schedule(&self) -> bool {
        self.hard_violations.is_empty()
    }

    pub fn push_hard(&mut self, constraint: ConstraintCode, message: impl Into<String>) {
        self.hard_violations
            .push(RuleViolation::new(constraint, message));
    }

    pub fn push_soft(&mut self, constraint: ConstraintCode, message: impl Into<String>) {
        self.soft_warnings
            .push(RuleViolation::new(constraint, message));
    }
}

/// A candidate placement to validate: which resources at which grid slot.
///
/// `exclude_event_id` supports re-validating an event being edited in place
/// without it conflicting with itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvent {
    pub room_id: RoomId,
    pub staff_id: StaffId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<ModuleId>,
    pub date: NaiveDate,
    pub timeslot_id: TimeslotId,
    pub student_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_event_id: Option<EventId>,
}

/// Preferred placement window for an event request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferredWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    /// When absent, the end is derived from the requested duration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveTime>,
}

impl PreferredWindow {
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }
}

/// A fully-typed scheduling request, resolved once at the boundary.
///
/// Optional fields have documented defaults: no preferred resources, no
/// preferred window, `Class` category, empty roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub module_id: ModuleId,
    /// Seats the event needs; doubles as the student count for batch
    /// priority ordering.
    pub required_capacity: u32,
    pub duration_minutes: i64,
    #[serde(default)]
    pub preferred_room_ids: Vec<RoomId>,
    #[serde(default)]
    pub preferred_staff_ids: Vec<StaffId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_window: Option<PreferredWindow>,
    #[serde(default)]
    pub category: EventCategory,
    #[serde(default)]
    pub students: Vec<StudentId>,
}

/// Placement strategy for a single event request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Greedy placement into the requested (or sampled fallback) window.
    Direct,
    /// Exhaustive backtracking search over rooms, staff, and windows.
    Search,
}

/// Outcome of scheduling one event. Expected "no slot found" conditions are
/// structured failures here, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
    pub message: String,
    /// Soft warnings accepted at placement time.
    #[serde(default)]
    pub warnings: Vec<RuleViolation>,
}

impl ScheduleOutcome {
    pub fn placed(event: Event, warnings: Vec<RuleViolation>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            event: Some(event),
            message: message.into(),
            warnings,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            event: None,
            message: message.into(),
            warnings: Vec::new(),
        }
    }
}

/// Per-request entry in a batch outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub request: EventRequest,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
    pub message: String,
    #[serde(default)]
    pub warnings: Vec<RuleViolation>,
}

/// Aggregated result of a batch scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub total_success: usize,
    pub total_failure: usize,
    pub results: Vec<BatchEntry>,
}

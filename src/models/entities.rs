//! Domain entities for the timetabling engine.
//!
//! These are the records the engine reads from (and writes to) the
//! repository layer: rooms, staff, modules, courses, the timeslot grid,
//! placed events, and the constraint catalog metadata.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::api::{
    BuildingId, ConstraintId, CourseId, DepartmentId, EventId, ModuleId, RoomId, StaffId,
    StudentId, TimeslotId,
};

/// Tag describing what kind of timetabled event a record is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Class,
    Exam,
    Meeting,
}

impl Default for EventCategory {
    fn default() -> Self {
        EventCategory::Class
    }
}

/// A teaching room. Immutable for scheduling purposes except by explicit
/// administrative edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub category: String,
    pub building_id: BuildingId,
}

/// A staff member. The engine only uses identity and department membership;
/// the remaining profile fields ride along for API completeness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub department_id: DepartmentId,
}

/// A course of study, owning a set of modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub department_id: DepartmentId,
}

/// A taught module. The department association narrows candidate staff
/// during scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    pub course_id: CourseId,
    pub department_id: DepartmentId,
}

/// One entry of the placeable time grid. The catalog is small and mostly
/// static; conflict detection is keyed on (date, timeslot id), never on raw
/// time ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeslot {
    pub id: TimeslotId,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: i64,
}

impl Timeslot {
    /// Minutes between this slot's start and end.
    pub fn span_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// A placed timetable event.
///
/// Invariant: `student_count` never exceeds the assigned room's capacity
/// once placed; the constraint validator enforces this at placement and
/// re-validation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub timeslot_id: TimeslotId,
    pub module_id: ModuleId,
    pub course_id: CourseId,
    pub room_id: RoomId,
    pub staff_id: StaffId,
    /// Student roster. Deleting the event removes these associations.
    pub students: Vec<StudentId>,
    pub student_count: u32,
    #[serde(default)]
    pub category: EventCategory,
}

/// Payload for creating an event. The repository assigns the id and derives
/// `student_count` from the roster (or the explicit seat count when the
/// roster is not yet known).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub timeslot_id: TimeslotId,
    pub module_id: ModuleId,
    pub course_id: CourseId,
    pub room_id: RoomId,
    pub staff_id: StaffId,
    #[serde(default)]
    pub students: Vec<StudentId>,
    /// Seat count used when the roster is empty (batch requests schedule
    /// before enrolment closes).
    #[serde(default)]
    pub student_count: u32,
    #[serde(default)]
    pub category: EventCategory,
}

impl EventDraft {
    /// Effective seat count: roster size when known, otherwise the
    /// requested capacity.
    pub fn effective_student_count(&self) -> u32 {
        if self.students.is_empty() {
            self.student_count
        } else {
            self.students.len() as u32
        }
    }
}

/// Partial update applied to an existing event on reschedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeslot_id: Option<TimeslotId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<StaffId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<StudentId>>,
}

/// Whether violating a rule blocks placement or only lowers its score.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Hard,
    Soft,
}

/// Catalog metadata for one scheduling rule. Hard rules are structurally
/// fixed in the evaluator; soft rules carry a configurable weight and can
/// be switched off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: ConstraintId,
    pub name: String,
    pub description: String,
    pub kind: ConstraintKind,
    pub category: String,
    pub weight: f64,
    pub enabled: bool,
}

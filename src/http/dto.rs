//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies arrive with every identifier optional; `resolve`
//! methods reject missing required fields once, at the boundary, before
//! any rule runs. Response types reuse the engine's serializable outcome
//! types directly.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::api::{
    CandidateEvent, EventId, EventRequest, ModuleId, PreferredWindow, RoomId, RuleViolation,
    StaffId, StudentId, Strategy, TimeslotId, ValidationReport,
};
use crate::models::EventCategory;

/// Request body for `POST /v1/constraints/check`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConstraintsRequest {
    pub room_id: Option<i64>,
    pub staff_id: Option<i64>,
    #[serde(default)]
    pub module_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub timeslot_id: Option<i64>,
    #[serde(default)]
    pub student_count: Option<u32>,
    /// Event id to ignore during conflict checks (re-validating an edit).
    #[serde(default)]
    pub exclude_event_id: Option<i64>,
}

impl CheckConstraintsRequest {
    /// Reject missing required identifiers before any rule runs.
    pub fn resolve(self) -> Result<CandidateEvent, String> {
        let room_id = self.room_id.ok_or("room_id is required")?;
        let staff_id = self.staff_id.ok_or("staff_id is required")?;
        let date = self.date.ok_or("date is required")?;
        let timeslot_id = self.timeslot_id.ok_or("timeslot_id is required")?;

        Ok(CandidateEvent {
            room_id: RoomId::new(room_id),
            staff_id: StaffId::new(staff_id),
            module_id: self.module_id.map(ModuleId::new),
            date,
            timeslot_id: TimeslotId::new(timeslot_id),
            student_count: self.student_count.unwrap_or(0),
            exclude_event_id: self.exclude_event_id.map(EventId::new),
        })
    }
}

/// Response body for `POST /v1/constraints/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConstraintsResponse {
    pub hard_violations: Vec<RuleViolation>,
    pub soft_warnings: Vec<RuleViolation>,
    pub can_schedule: bool,
}

impl From<ValidationReport> for CheckConstraintsResponse {
    fn from(report: ValidationReport) -> Self {
        let can_schedule = report.can_schedule();
        Self {
            hard_violations: report.hard_violations,
            soft_warnings: report.soft_warnings,
            can_schedule,
        }
    }
}

/// Request body for `POST /v1/scheduler/event`, also the per-entry shape
/// inside a batch request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleEventRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub module_id: Option<i64>,
    /// Seats needed; accepted under either name.
    #[serde(default, alias = "student_count")]
    pub required_capacity: Option<u32>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub preferred_room_ids: Vec<i64>,
    #[serde(default)]
    pub preferred_staff_ids: Vec<i64>,
    #[serde(default)]
    pub preferred_date: Option<NaiveDate>,
    #[serde(default)]
    pub preferred_start: Option<NaiveTime>,
    #[serde(default)]
    pub preferred_end: Option<NaiveTime>,
    #[serde(default)]
    pub category: Option<EventCategory>,
    #[serde(default)]
    pub students: Vec<i64>,
    /// Placement strategy override; defaults from the request shape.
    #[serde(default)]
    pub strategy: Option<Strategy>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

/// Batch-level preferences applied to entries that leave the matching
/// field unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchPreferences {
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub category: Option<EventCategory>,
    #[serde(default)]
    pub strategy: Option<Strategy>,
}

impl ScheduleEventRequest {
    /// Resolve into a fully-typed engine request plus per-call overrides.
    pub fn resolve(
        self,
        preferences: Option<&BatchPreferences>,
    ) -> Result<(EventRequest, Option<Strategy>, Option<u32>), String> {
        let module_id = self.module_id.ok_or("module_id is required")?;
        let required_capacity = self.required_capacity.ok_or("required_capacity is required")?;

        let duration_minutes = self
            .duration_minutes
            .or_else(|| preferences.and_then(|p| p.duration_minutes))
            .unwrap_or(60);
        if duration_minutes <= 0 {
            return Err("duration_minutes must be positive".to_string());
        }

        let preferred_window = match (self.preferred_date, self.preferred_start) {
            (Some(date), Some(start)) => Some(PreferredWindow {
                date,
                start,
                end: self.preferred_end,
            }),
            (None, None) => None,
            _ => return Err("preferred_date and preferred_start must be supplied together".into()),
        };

        let category = self
            .category
            .or_else(|| preferences.and_then(|p| p.category))
            .unwrap_or_default();
        let strategy = self.strategy.or_else(|| preferences.and_then(|p| p.strategy));

        let request = EventRequest {
            title: self.title.unwrap_or_else(|| "Untitled event".to_string()),
            description: self.description,
            module_id: ModuleId::new(module_id),
            required_capacity,
            duration_minutes,
            preferred_room_ids: self.preferred_room_ids.into_iter().map(RoomId::new).collect(),
            preferred_staff_ids: self
                .preferred_staff_ids
                .into_iter()
                .map(StaffId::new)
                .collect(),
            preferred_window,
            category,
            students: self.students.into_iter().map(StudentId::new).collect(),
        };

        Ok((request, strategy, self.max_attempts))
    }
}

/// Request body for `POST /v1/scheduler/batch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchScheduleRequest {
    pub events: Vec<ScheduleEventRequest>,
    #[serde(default)]
    pub preferences: Option<BatchPreferences>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Repository connection status
    pub repository: String,
}

/// Timeslot catalog listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeslotListResponse {
    pub timeslots: Vec<crate::models::Timeslot>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_request_requires_identifiers() {
        let err = CheckConstraintsRequest::default().resolve().unwrap_err();
        assert!(err.contains("room_id"));

        let partial = CheckConstraintsRequest {
            room_id: Some(1),
            staff_id: Some(2),
            date: Some(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
            ..Default::default()
        };
        let err = partial.resolve().unwrap_err();
        assert!(err.contains("timeslot_id"));
    }

    #[test]
    fn test_check_request_resolves_defaults() {
        let request = CheckConstraintsRequest {
            room_id: Some(1),
            staff_id: Some(2),
            date: Some(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
            timeslot_id: Some(3),
            ..Default::default()
        };
        let candidate = request.resolve().unwrap();
        assert_eq!(candidate.student_count, 0);
        assert!(candidate.exclude_event_id.is_none());
        assert!(candidate.module_id.is_none());
    }

    #[test]
    fn test_schedule_request_window_needs_both_parts() {
        let request = ScheduleEventRequest {
            module_id: Some(1),
            required_capacity: Some(10),
            preferred_start: Some(NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(request.resolve(None).is_err());
    }

    #[test]
    fn test_schedule_request_defaults_and_preferences() {
        let request = ScheduleEventRequest {
            module_id: Some(1),
            required_capacity: Some(10),
            ..Default::default()
        };
        let preferences = BatchPreferences {
            duration_minutes: Some(90),
            category: Some(EventCategory::Exam),
            strategy: Some(Strategy::Search),
        };

        let (resolved, strategy, max_attempts) = request.resolve(Some(&preferences)).unwrap();
        assert_eq!(resolved.duration_minutes, 90);
        assert_eq!(resolved.category, EventCategory::Exam);
        assert_eq!(resolved.title, "Untitled event");
        assert_eq!(strategy, Some(Strategy::Search));
        assert!(max_attempts.is_none());
    }

    #[test]
    fn test_student_count_alias() {
        let json = r#"{"module_id": 1, "student_count": 25}"#;
        let request: ScheduleEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.required_capacity, Some(25));
    }
}

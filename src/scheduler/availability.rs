//! Resource availability checks.
//!
//! Availability is keyed on the composite (date, timeslot id) plus a room
//! or staff id; the timetable grid is built from the fixed timeslot
//! catalog, so raw time ranges never enter conflict detection.

use chrono::NaiveDate;

use crate::api::{EventId, RoomId, StaffId, TimeslotId};
use crate::db::repository::{EventRepository, RepositoryResult};

/// Read-only view over existing events answering "is this resource free
/// at this grid slot". No side effects; storage errors propagate.
pub struct AvailabilityChecker<'a> {
    events: &'a dyn EventRepository,
}

impl<'a> AvailabilityChecker<'a> {
    pub fn new(events: &'a dyn EventRepository) -> Self {
        Self { events }
    }

    /// True when no event other than `exclude` occupies the room at
    /// (date, timeslot). `exclude` supports re-validating an event being
    /// edited in place.
    pub async fn room_is_free(
        &self,
        room_id: RoomId,
        date: NaiveDate,
        timeslot_id: TimeslotId,
        exclude: Option<EventId>,
    ) -> RepositoryResult<bool> {
        let occupants = self
            .events
            .events_by_room_slot(room_id, date, timeslot_id)
            .await?;
        Ok(occupants.iter().all(|event| Some(event.id) == exclude))
    }

    /// True when no event other than `exclude` occupies the staff member
    /// at (date, timeslot).
    pub async fn staff_is_free(
        &self,
        staff_id: StaffId,
        date: NaiveDate,
        timeslot_id: TimeslotId,
        exclude: Option<EventId>,
    ) -> RepositoryResult<bool> {
        let occupants = self
            .events
            .events_by_staff_slot(staff_id, date, timeslot_id)
            .await?;
        Ok(occupants.iter().all(|event| Some(event.id) == exclude))
    }
}

//! Repository trait definitions.
//!
//! These traits are the narrow read/write contracts the scheduling engine
//! consumes. The engine never touches storage directly: availability
//! checks, candidate domain construction, and event commits all go through
//! these ports, so tests can supply an in-memory implementation with
//! controlled contents.

mod error;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use crate::api::{
    DepartmentId, EventId, ModuleId, RoomId, StaffId, TimeslotId,
};
use crate::models::{Event, EventDraft, EventPatch, Module, Room, Staff, Timeslot};

/// Room lookups used to build candidate domains.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// All rooms whose capacity is at least `min_capacity`.
    async fn rooms_with_min_capacity(&self, min_capacity: u32) -> RepositoryResult<Vec<Room>>;

    /// Fetch one room, `None` when absent.
    async fn room_by_id(&self, id: RoomId) -> RepositoryResult<Option<Room>>;

    /// Insert a room, assigning its id.
    async fn insert_room(
        &self,
        name: &str,
        capacity: u32,
        category: &str,
        building_id: crate::api::BuildingId,
    ) -> RepositoryResult<Room>;
}

/// Staff lookups used to build candidate domains.
#[async_trait]
pub trait StaffRepository: Send + Sync {
    /// Staff narrowed to a department; all staff when `department_id` is
    /// `None`.
    async fn staff_by_department(
        &self,
        department_id: Option<DepartmentId>,
    ) -> RepositoryResult<Vec<Staff>>;

    /// Fetch one staff member, `None` when absent.
    async fn staff_by_id(&self, id: StaffId) -> RepositoryResult<Option<Staff>>;

    /// Insert a staff member, assigning their id.
    async fn insert_staff(
        &self,
        name: &str,
        department_id: DepartmentId,
    ) -> RepositoryResult<Staff>;
}

/// Module lookups; a module resolves the department used to narrow staff.
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Fetch one module, `None` when absent.
    async fn module_by_id(&self, id: ModuleId) -> RepositoryResult<Option<Module>>;

    /// Insert a module, assigning its id.
    async fn insert_module(
        &self,
        name: &str,
        course_id: crate::api::CourseId,
        department_id: DepartmentId,
    ) -> RepositoryResult<Module>;
}

/// Timeslot catalog access. The catalog is the grid of placeable windows;
/// generated candidate windows are resolved against it by exact
/// (start, end) match.
#[async_trait]
pub trait TimeslotRepository: Send + Sync {
    /// Fetch one timeslot, `None` when absent.
    async fn timeslot_by_id(&self, id: TimeslotId) -> RepositoryResult<Option<Timeslot>>;

    /// The whole catalog.
    async fn list_timeslots(&self) -> RepositoryResult<Vec<Timeslot>>;

    /// Catalog entry with exactly this start and end, `None` when the grid
    /// has no such slot.
    async fn timeslot_by_window(
        &self,
        start: NaiveTime,
        end: NaiveTime,
    ) -> RepositoryResult<Option<Timeslot>>;

    /// Insert a catalog entry, assigning its id.
    async fn insert_timeslot(
        &self,
        start: NaiveTime,
        end: NaiveTime,
    ) -> RepositoryResult<Timeslot>;
}

/// Event storage: conflict queries plus the write operations the engine
/// commits successful placements through.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Events occupying a room at (date, timeslot).
    async fn events_by_room_slot(
        &self,
        room_id: RoomId,
        date: NaiveDate,
        timeslot_id: TimeslotId,
    ) -> RepositoryResult<Vec<Event>>;

    /// Events occupying a staff member at (date, timeslot).
    async fn events_by_staff_slot(
        &self,
        staff_id: StaffId,
        date: NaiveDate,
        timeslot_id: TimeslotId,
    ) -> RepositoryResult<Vec<Event>>;

    /// All events a staff member has on a date, across timeslots.
    async fn events_by_staff_on_date(
        &self,
        staff_id: StaffId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Event>>;

    /// Fetch one event, `None` when absent.
    async fn event_by_id(&self, id: EventId) -> RepositoryResult<Option<Event>>;

    /// Persist a new event from a draft; assigns the id and derives the
    /// student count.
    async fn create_event(&self, draft: EventDraft) -> RepositoryResult<Event>;

    /// Apply a partial update to an existing event.
    async fn update_event(&self, id: EventId, patch: EventPatch) -> RepositoryResult<Event>;

    /// Delete an event together with its student-roster associations.
    async fn delete_event(&self, id: EventId) -> RepositoryResult<()>;
}

/// Everything the scheduling engine needs from storage, in one object-safe
/// trait.
#[async_trait]
pub trait FullRepository:
    RoomRepository + StaffRepository + ModuleRepository + TimeslotRepository + EventRepository
{
    /// Backend liveness probe for the health endpoint.
    async fn health_check(&self) -> RepositoryResult<bool>;
}

//! In-memory repository implementation.
//!
//! Backs unit tests and local development. All state lives behind a single
//! `parking_lot::RwLock`; lock scopes stay short because every operation
//! copies out the data it returns.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::api::{
    BuildingId, CourseId, DepartmentId, EventId, ModuleId, RoomId, StaffId, TimeslotId,
};
use crate::db::repository::{
    ErrorContext, EventRepository, FullRepository, ModuleRepository, RepositoryError,
    RepositoryResult, RoomRepository, StaffRepository, TimeslotRepository,
};
use crate::models::{Course, Event, EventDraft, EventPatch, Module, Room, Staff, Timeslot};

#[derive(Default)]
struct Inner {
    rooms: HashMap<i64, Room>,
    staff: HashMap<i64, Staff>,
    modules: HashMap<i64, Module>,
    courses: HashMap<i64, Course>,
    timeslots: HashMap<i64, Timeslot>,
    events: HashMap<i64, Event>,
    next_id: i64,
}

impl Inner {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory repository for unit testing and local development.
#[derive(Default)]
pub struct LocalRepository {
    inner: RwLock<Inner>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a course directly; courses are reference data the engine
    /// never writes, so this stays off the trait surface.
    pub fn insert_course(&self, name: &str, department_id: DepartmentId) -> Course {
        let mut inner = self.inner.write();
        let id = inner.allocate_id();
        let course = Course {
            id: CourseId::new(id),
            name: name.to_string(),
            department_id,
        };
        inner.courses.insert(id, course.clone());
        course
    }

    /// Number of stored events; test helper.
    pub fn event_count(&self) -> usize {
        self.inner.read().events.len()
    }
}

#[async_trait]
impl RoomRepository for LocalRepository {
    async fn rooms_with_min_capacity(&self, min_capacity: u32) -> RepositoryResult<Vec<Room>> {
        let inner = self.inner.read();
        let mut rooms: Vec<Room> = inner
            .rooms
            .values()
            .filter(|room| room.capacity >= min_capacity)
            .cloned()
            .collect();
        // Deterministic ordering; HashMap iteration order is not.
        rooms.sort_by_key(|room| room.id);
        Ok(rooms)
    }

    async fn room_by_id(&self, id: RoomId) -> RepositoryResult<Option<Room>> {
        Ok(self.inner.read().rooms.get(&id.value()).cloned())
    }

    async fn insert_room(
        &self,
        name: &str,
        capacity: u32,
        category: &str,
        building_id: BuildingId,
    ) -> RepositoryResult<Room> {
        let mut inner = self.inner.write();
        let id = inner.allocate_id();
        let room = Room {
            id: RoomId::new(id),
            name: name.to_string(),
            capacity,
            category: category.to_string(),
            building_id,
        };
        inner.rooms.insert(id, room.clone());
        Ok(room)
    }
}

#[async_trait]
impl StaffRepository for LocalRepository {
    async fn staff_by_department(
        &self,
        department_id: Option<DepartmentId>,
    ) -> RepositoryResult<Vec<Staff>> {
        let inner = self.inner.read();
        let mut staff: Vec<Staff> = inner
            .staff
            .values()
            .filter(|member| department_id.is_none_or(|dept| member.department_id == dept))
            .cloned()
            .collect();
        staff.sort_by_key(|member| member.id);
        Ok(staff)
    }

    async fn staff_by_id(&self, id: StaffId) -> RepositoryResult<Option<Staff>> {
        Ok(self.inner.read().staff.get(&id.value()).cloned())
    }

    async fn insert_staff(
        &self,
        name: &str,
        department_id: DepartmentId,
    ) -> RepositoryResult<Staff> {
        let mut inner = self.inner.write();
        let id = inner.allocate_id();
        let staff = Staff {
            id: StaffId::new(id),
            name: name.to_string(),
            email: None,
            department_id,
        };
        inner.staff.insert(id, staff.clone());
        Ok(staff)
    }
}

#[async_trait]
impl ModuleRepository for LocalRepository {
    async fn module_by_id(&self, id: ModuleId) -> RepositoryResult<Option<Module>> {
        Ok(self.inner.read().modules.get(&id.value()).cloned())
    }

    async fn insert_module(
        &self,
        name: &str,
        course_id: CourseId,
        department_id: DepartmentId,
    ) -> RepositoryResult<Module> {
        let mut inner = self.inner.write();
        if !inner.courses.contains_key(&course_id.value()) {
            return Err(RepositoryError::validation_with_context(
                "Module references an unknown course",
                ErrorContext::new("insert_module")
                    .with_entity("course")
                    .with_entity_id(course_id),
            ));
        }
        let id = inner.allocate_id();
        let module = Module {
            id: ModuleId::new(id),
            name: name.to_string(),
            course_id,
            department_id,
        };
        inner.modules.insert(id, module.clone());
        Ok(module)
    }
}

#[async_trait]
impl TimeslotRepository for LocalRepository {
    async fn timeslot_by_id(&self, id: TimeslotId) -> RepositoryResult<Option<Timeslot>> {
        Ok(self.inner.read().timeslots.get(&id.value()).cloned())
    }

    async fn list_timeslots(&self) -> RepositoryResult<Vec<Timeslot>> {
        let inner = self.inner.read();
        let mut slots: Vec<Timeslot> = inner.timeslots.values().cloned().collect();
        slots.sort_by_key(|slot| (slot.start_time, slot.id));
        Ok(slots)
    }

    async fn timeslot_by_window(
        &self,
        start: NaiveTime,
        end: NaiveTime,
    ) -> RepositoryResult<Option<Timeslot>> {
        let inner = self.inner.read();
        Ok(inner
            .timeslots
            .values()
            .find(|slot| slot.start_time == start && slot.end_time == end)
            .cloned())
    }

    async fn insert_timeslot(
        &self,
        start: NaiveTime,
        end: NaiveTime,
    ) -> RepositoryResult<Timeslot> {
        if end <= start {
            return Err(RepositoryError::validation_with_context(
                "Timeslot end must be after its start",
                ErrorContext::new("insert_timeslot").with_entity("timeslot"),
            ));
        }
        let mut inner = self.inner.write();
        let id = inner.allocate_id();
        let slot = Timeslot {
            id: TimeslotId::new(id),
            start_time: start,
            end_time: end,
            duration_minutes: (end - start).num_minutes(),
        };
        inner.timeslots.insert(id, slot.clone());
        Ok(slot)
    }
}

#[async_trait]
impl EventRepository for LocalRepository {
    async fn events_by_room_slot(
        &self,
        room_id: RoomId,
        date: NaiveDate,
        timeslot_id: TimeslotId,
    ) -> RepositoryResult<Vec<Event>> {
        let inner = self.inner.read();
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|event| {
                event.room_id == room_id && event.date == date && event.timeslot_id == timeslot_id
            })
            .cloned()
            .collect();
        events.sort_by_key(|event| event.id);
        Ok(events)
    }

    async fn events_by_staff_slot(
        &self,
        staff_id: StaffId,
        date: NaiveDate,
        timeslot_id: TimeslotId,
    ) -> RepositoryResult<Vec<Event>> {
        let inner = self.inner.read();
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|event| {
                event.staff_id == staff_id && event.date == date && event.timeslot_id == timeslot_id
            })
            .cloned()
            .collect();
        events.sort_by_key(|event| event.id);
        Ok(events)
    }

    async fn events_by_staff_on_date(
        &self,
        staff_id: StaffId,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<Event>> {
        let inner = self.inner.read();
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|event| event.staff_id == staff_id && event.date == date)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.id);
        Ok(events)
    }

    async fn event_by_id(&self, id: EventId) -> RepositoryResult<Option<Event>> {
        Ok(self.inner.read().events.get(&id.value()).cloned())
    }

    async fn create_event(&self, draft: EventDraft) -> RepositoryResult<Event> {
        let mut inner = self.inner.write();
        if !inner.timeslots.contains_key(&draft.timeslot_id.value()) {
            return Err(RepositoryError::validation_with_context(
                "Event references an unknown timeslot",
                ErrorContext::new("create_event")
                    .with_entity("timeslot")
                    .with_entity_id(draft.timeslot_id),
            ));
        }
        let student_count = draft.effective_student_count();
        let id = inner.allocate_id();
        let event = Event {
            id: EventId::new(id),
            title: draft.title,
            description: draft.description,
            date: draft.date,
            timeslot_id: draft.timeslot_id,
            module_id: draft.module_id,
            course_id: draft.course_id,
            room_id: draft.room_id,
            staff_id: draft.staff_id,
            students: draft.students,
            student_count,
            category: draft.category,
        };
        inner.events.insert(id, event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: EventId, patch: EventPatch) -> RepositoryResult<Event> {
        let mut inner = self.inner.write();
        let event = inner.events.get_mut(&id.value()).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Event does not exist",
                ErrorContext::new("update_event")
                    .with_entity("event")
                    .with_entity_id(id),
            )
        })?;

        if let Some(title) = patch.title {
            event.title = title;
        }
        if let Some(description) = patch.description {
            event.description = Some(description);
        }
        if let Some(date) = patch.date {
            event.date = date;
        }
        if let Some(timeslot_id) = patch.timeslot_id {
            event.timeslot_id = timeslot_id;
        }
        if let Some(room_id) = patch.room_id {
            event.room_id = room_id;
        }
        if let Some(staff_id) = patch.staff_id {
            event.staff_id = staff_id;
        }
        if let Some(students) = patch.students {
            event.student_count = students.len() as u32;
            event.students = students;
        }

        Ok(event.clone())
    }

    async fn delete_event(&self, id: EventId) -> RepositoryResult<()> {
        let mut inner = self.inner.write();
        // Removing the event drops its roster associations with it.
        match inner.events.remove(&id.value()) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::not_found_with_context(
                "Event does not exist",
                ErrorContext::new("delete_event")
                    .with_entity("event")
                    .with_entity_id(id),
            )),
        }
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

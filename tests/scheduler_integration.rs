//! Integration tests for single-event placement: the backtracking search
//! and the greedy direct strategy.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Instant;

use cts_rust::api::{EventRequest, PreferredWindow, Strategy};
use cts_rust::config::EngineConfig;
use cts_rust::db::repositories::LocalRepository;
use cts_rust::db::repository::{
    EventRepository, ModuleRepository, RoomRepository, StaffRepository, TimeslotRepository,
};
use cts_rust::models::{Module, Room, Staff};
use cts_rust::scheduler::{self, RuleCatalog, SearchBudget};

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn config() -> EngineConfig {
    EngineConfig::default()
}

fn catalog(config: &EngineConfig) -> RuleCatalog {
    RuleCatalog::from_weights(&config.scoring)
}

fn request(module: &Module, capacity: u32) -> EventRequest {
    EventRequest {
        title: "Algorithms lecture".to_string(),
        description: None,
        module_id: module.id,
        required_capacity: capacity,
        duration_minutes: 60,
        preferred_room_ids: vec![],
        preferred_staff_ids: vec![],
        preferred_window: None,
        category: Default::default(),
        students: vec![],
    }
}

/// Seed a department with one module, one staff member, and the given
/// room capacities.
async fn seed_department(repo: &LocalRepository, capacities: &[u32]) -> (Module, Staff, Vec<Room>) {
    let dept = cts_rust::api::DepartmentId::new(1);
    let course = repo.insert_course("Computer Science", dept);
    let module = repo
        .insert_module("Algorithms", course.id, dept)
        .await
        .unwrap();
    let staff = repo.insert_staff("Dr. Frost", dept).await.unwrap();

    let mut rooms = Vec::new();
    for (i, capacity) in capacities.iter().enumerate() {
        rooms.push(
            repo.insert_room(
                &format!("R{}", i + 1),
                *capacity,
                "lecture",
                cts_rust::api::BuildingId::new(1),
            )
            .await
            .unwrap(),
        );
    }
    (module, staff, rooms)
}

#[tokio::test]
async fn test_search_only_considers_sufficient_rooms() {
    let repo = LocalRepository::new();
    let config = config();
    let catalog = catalog(&config);
    // Room A seats 20, Room B seats 10; the event needs 15.
    let (module, _, rooms) = seed_department(&repo, &[20, 10]).await;
    repo.insert_timeslot(time(10, 0), time(11, 0)).await.unwrap();

    let mut rng = SmallRng::seed_from_u64(1);
    let outcome = scheduler::schedule_event(
        &repo,
        &catalog,
        &request(&module, 15),
        Strategy::Search,
        SearchBudget::attempts(10),
        &config,
        monday(),
        &mut rng,
    )
    .await
    .unwrap();

    assert!(outcome.success, "{}", outcome.message);
    let event = outcome.event.unwrap();
    assert_eq!(event.room_id, rooms[0].id, "must resolve to the 20-seat room");
}

#[tokio::test]
async fn test_search_keeps_the_better_scoring_slot() {
    let repo = LocalRepository::new();
    let config = config();
    let catalog = catalog(&config);
    let (module, _, _) = seed_department(&repo, &[30]).await;
    // 09:00 draws a preferred-hours warning; 10:00 is clean.
    let early = repo.insert_timeslot(time(9, 0), time(10, 0)).await.unwrap();
    let clean = repo.insert_timeslot(time(10, 0), time(11, 0)).await.unwrap();

    let mut rng = SmallRng::seed_from_u64(1);
    let outcome = scheduler::schedule_event(
        &repo,
        &catalog,
        &request(&module, 10),
        Strategy::Search,
        SearchBudget::attempts(2),
        &config,
        monday(),
        &mut rng,
    )
    .await
    .unwrap();

    assert!(outcome.success);
    let event = outcome.event.unwrap();
    assert_eq!(event.timeslot_id, clean.id);
    assert_ne!(event.timeslot_id, early.id);
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn test_search_terminates_and_reports_exhaustion() {
    let repo = LocalRepository::new();
    let config = config();
    let catalog = catalog(&config);
    let (module, staff, rooms) = seed_department(&repo, &[30]).await;
    let slot = repo.insert_timeslot(time(10, 0), time(11, 0)).await.unwrap();

    // Occupy the only (room, slot) combination on every weekday of the
    // horizon by blocking the room for the whole horizon.
    let mut date = monday();
    for _ in 0..=config.search.horizon_days {
        repo.create_event(cts_rust::models::EventDraft {
            title: "Blocker".to_string(),
            description: None,
            date,
            timeslot_id: slot.id,
            module_id: module.id,
            course_id: module.course_id,
            room_id: rooms[0].id,
            staff_id: staff.id,
            students: vec![],
            student_count: 1,
            category: Default::default(),
        })
        .await
        .unwrap();
        date = date.succ_opt().unwrap();
    }

    let mut rng = SmallRng::seed_from_u64(1);
    let outcome = scheduler::schedule_event(
        &repo,
        &catalog,
        &request(&module, 10),
        Strategy::Search,
        SearchBudget::attempts(100),
        &config,
        monday(),
        &mut rng,
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert!(outcome.message.contains("exhausted search"), "{}", outcome.message);
}

#[tokio::test]
async fn test_no_rooms_with_sufficient_capacity() {
    let repo = LocalRepository::new();
    let config = config();
    let catalog = catalog(&config);
    let (module, _, _) = seed_department(&repo, &[20]).await;
    repo.insert_timeslot(time(10, 0), time(11, 0)).await.unwrap();

    let mut rng = SmallRng::seed_from_u64(1);
    let outcome = scheduler::schedule_event(
        &repo,
        &catalog,
        &request(&module, 500),
        Strategy::Search,
        SearchBudget::attempts(10),
        &config,
        monday(),
        &mut rng,
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, "no rooms with sufficient capacity");
}

#[tokio::test]
async fn test_no_staff_available() {
    let repo = LocalRepository::new();
    let config = config();
    let catalog = catalog(&config);
    // Module and room exist, but nobody teaches.
    let dept = cts_rust::api::DepartmentId::new(1);
    let course = repo.insert_course("Computer Science", dept);
    let module = repo
        .insert_module("Algorithms", course.id, dept)
        .await
        .unwrap();
    repo.insert_room("R1", 30, "lecture", cts_rust::api::BuildingId::new(1))
        .await
        .unwrap();
    repo.insert_timeslot(time(10, 0), time(11, 0)).await.unwrap();

    let mut rng = SmallRng::seed_from_u64(1);
    let outcome = scheduler::schedule_event(
        &repo,
        &catalog,
        &request(&module, 10),
        Strategy::Search,
        SearchBudget::attempts(10),
        &config,
        monday(),
        &mut rng,
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, "no staff available");
}

#[tokio::test]
async fn test_module_not_found() {
    let repo = LocalRepository::new();
    let config = config();
    let catalog = catalog(&config);
    seed_department(&repo, &[20]).await;
    repo.insert_timeslot(time(10, 0), time(11, 0)).await.unwrap();

    let mut bad_request = EventRequest {
        module_id: cts_rust::api::ModuleId::new(999),
        ..request(
            &Module {
                id: cts_rust::api::ModuleId::new(999),
                name: "ghost".to_string(),
                course_id: cts_rust::api::CourseId::new(1),
                department_id: cts_rust::api::DepartmentId::new(1),
            },
            10,
        )
    };
    bad_request.title = "Ghost module".to_string();

    let mut rng = SmallRng::seed_from_u64(1);
    let outcome = scheduler::schedule_event(
        &repo,
        &catalog,
        &bad_request,
        Strategy::Search,
        SearchBudget::attempts(10),
        &config,
        monday(),
        &mut rng,
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.message, "module not found");
}

#[tokio::test]
async fn test_direct_places_in_the_requested_window() {
    let repo = LocalRepository::new();
    let config = config();
    let catalog = catalog(&config);
    let (module, staff, rooms) = seed_department(&repo, &[20, 40]).await;
    let slot = repo.insert_timeslot(time(11, 0), time(12, 0)).await.unwrap();

    let mut wanted = request(&module, 10);
    wanted.preferred_window = Some(PreferredWindow {
        date: monday(),
        start: time(11, 0),
        end: None,
    });
    // Prefer the second (bigger) room even though the first is free too.
    wanted.preferred_room_ids = vec![rooms[1].id];
    wanted.preferred_staff_ids = vec![staff.id];

    let mut rng = SmallRng::seed_from_u64(1);
    let outcome = scheduler::schedule_event(
        &repo,
        &catalog,
        &wanted,
        Strategy::Direct,
        SearchBudget::attempts(5),
        &config,
        monday(),
        &mut rng,
    )
    .await
    .unwrap();

    assert!(outcome.success, "{}", outcome.message);
    let event = outcome.event.unwrap();
    assert_eq!(event.date, monday());
    assert_eq!(event.timeslot_id, slot.id);
    assert_eq!(event.room_id, rooms[1].id);
    assert_eq!(event.staff_id, staff.id);
}

#[tokio::test]
async fn test_direct_falls_back_to_sampled_windows() {
    let repo = LocalRepository::new();
    let config = config();
    let catalog = catalog(&config);
    let (module, staff, rooms) = seed_department(&repo, &[20]).await;
    // Full standard grid so sampled fallback windows resolve to slots.
    cts_rust::services::seed_timeslot_grid(&repo, &config.search)
        .await
        .unwrap();

    // Occupy the requested window so the first try fails.
    let slot = repo
        .timeslot_by_window(time(11, 0), time(12, 0))
        .await
        .unwrap()
        .unwrap();
    repo.create_event(cts_rust::models::EventDraft {
        title: "Blocker".to_string(),
        description: None,
        date: monday(),
        timeslot_id: slot.id,
        module_id: module.id,
        course_id: module.course_id,
        room_id: rooms[0].id,
        staff_id: staff.id,
        students: vec![],
        student_count: 1,
        category: Default::default(),
    })
    .await
    .unwrap();

    let mut wanted = request(&module, 10);
    wanted.preferred_window = Some(PreferredWindow {
        date: monday(),
        start: time(11, 0),
        end: None,
    });

    let mut rng = SmallRng::seed_from_u64(42);
    let outcome = scheduler::schedule_event(
        &repo,
        &catalog,
        &wanted,
        Strategy::Direct,
        SearchBudget::attempts(20),
        &config,
        monday(),
        &mut rng,
    )
    .await
    .unwrap();

    assert!(outcome.success, "{}", outcome.message);
    let event = outcome.event.unwrap();
    // The fallback stays on the teaching week and on standard slot
    // boundaries.
    assert!(event.date.weekday().num_days_from_monday() < 5);
    let placed_slot = repo.timeslot_by_id(event.timeslot_id).await.unwrap().unwrap();
    assert!(matches!(placed_slot.start_time.minute(), 0 | 15 | 30 | 45));
    assert_eq!(placed_slot.duration_minutes, 60);
    // The occupied requested window was not double-booked.
    assert!(
        !(event.date == monday() && event.timeslot_id == slot.id),
        "fallback must not reuse the blocked window"
    );
}

#[tokio::test]
async fn test_expired_deadline_reports_timeout() {
    let repo = LocalRepository::new();
    let config = config();
    let catalog = catalog(&config);
    let (module, _, _) = seed_department(&repo, &[20]).await;
    repo.insert_timeslot(time(10, 0), time(11, 0)).await.unwrap();

    let mut rng = SmallRng::seed_from_u64(1);
    let outcome = scheduler::schedule_event(
        &repo,
        &catalog,
        &request(&module, 10),
        Strategy::Search,
        SearchBudget::attempts(10).with_deadline(Instant::now()),
        &config,
        monday(),
        &mut rng,
    )
    .await
    .unwrap();

    assert!(!outcome.success);
    assert!(outcome.message.contains("deadline"), "{}", outcome.message);
}

#[tokio::test]
async fn test_committed_event_is_seen_by_the_next_search() {
    let repo = LocalRepository::new();
    let config = config();
    let catalog = catalog(&config);
    let (module, _, _) = seed_department(&repo, &[30]).await;
    repo.insert_timeslot(time(10, 0), time(11, 0)).await.unwrap();
    repo.insert_timeslot(time(14, 0), time(15, 0)).await.unwrap();

    let mut rng = SmallRng::seed_from_u64(1);
    let mut placements = Vec::new();
    for _ in 0..2 {
        let outcome = scheduler::schedule_event(
            &repo,
            &catalog,
            &request(&module, 10),
            Strategy::Search,
            SearchBudget::attempts(10),
            &config,
            monday(),
            &mut rng,
        )
        .await
        .unwrap();
        assert!(outcome.success, "{}", outcome.message);
        let event = outcome.event.unwrap();
        placements.push((event.date, event.timeslot_id));
    }

    // One room and one staff member: the second event must land on a
    // different (date, timeslot).
    assert_ne!(placements[0], placements[1]);
    assert_eq!(repo.event_count(), 2);
}

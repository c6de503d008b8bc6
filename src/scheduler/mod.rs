//! The constraint-based event scheduling engine.
//!
//! Data flows batch → single-event → validator → rules → availability →
//! repository, and structured outcomes flow back up; an expected "no slot
//! found" is a value, never an error.
//!
//! - [`availability`]: is a room/staff member free at a (date, timeslot)
//! - [`rules`]: the fixed hard/soft rule catalog and its evaluators
//! - [`validator`]: full validation report for one candidate placement
//! - [`windows`]: deterministic candidate window enumeration
//! - [`single`]: greedy and backtracking placement for one event
//! - [`batch`]: priority ordering and the two-pass batch run

pub mod availability;
pub mod batch;
pub mod rules;
pub mod single;
pub mod validator;
pub mod windows;

pub use availability::AvailabilityChecker;
pub use batch::{order_by_priority, priority_score, schedule_batch};
pub use rules::RuleCatalog;
pub use single::{
    default_strategy, place_direct, schedule_event, score_assignment, search_assignment,
    Assignment, Resolution, SearchBudget,
};
pub use validator::validate_event;
pub use windows::{CandidateWindow, WindowGenerator, TEACHING_WEEK};

//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP layer and the scheduling engine: they
//! resolve defaults, thread the repository through, and own startup
//! concerns like catalog seeding.

pub mod bootstrap;
pub mod scheduling;

pub use bootstrap::seed_timeslot_grid;
pub use scheduling::{check_constraints, schedule_batch, schedule_event};

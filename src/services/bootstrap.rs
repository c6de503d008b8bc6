//! Startup seeding for the timeslot catalog.
//!
//! The catalog is the grid of placeable windows and is mostly static; a
//! fresh repository gets the standard teaching-day grid so the engine has
//! windows to resolve against.

use chrono::NaiveTime;
use log::info;

use crate::config::SearchSettings;
use crate::db::repository::{FullRepository, RepositoryResult, TimeslotRepository};

/// Durations (minutes) the standard grid offers per start time.
const GRID_DURATIONS: [i64; 4] = [30, 60, 90, 120];

fn time_from_minutes(minutes: i64) -> Option<NaiveTime> {
    if !(0..24 * 60).contains(&minutes) {
        return None;
    }
    NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
}

/// Seed the standard timeslot grid when the catalog is empty: one slot per
/// (grid start, duration) pair whose end stays within the teaching day.
/// Idempotent; an already-populated catalog is left untouched.
pub async fn seed_timeslot_grid(
    repo: &dyn FullRepository,
    settings: &SearchSettings,
) -> RepositoryResult<usize> {
    if !repo.list_timeslots().await?.is_empty() {
        return Ok(0);
    }

    let first = i64::from(settings.grid_start_hour) * 60;
    let last = i64::from(settings.grid_end_hour) * 60;
    let latest_end = i64::from(settings.latest_end_hour) * 60;
    let step = settings.step_minutes.max(1);

    let mut inserted = 0usize;
    let mut start_minutes = first;
    while start_minutes <= last {
        for duration in GRID_DURATIONS {
            let end_minutes = start_minutes + duration;
            if end_minutes > latest_end {
                continue;
            }
            let (Some(start), Some(end)) = (
                time_from_minutes(start_minutes),
                time_from_minutes(end_minutes),
            ) else {
                continue;
            };
            repo.insert_timeslot(start, end).await?;
            inserted += 1;
        }
        start_minutes += step;
    }

    info!("seeded {} timeslots into an empty catalog", inserted);
    Ok(inserted)
}

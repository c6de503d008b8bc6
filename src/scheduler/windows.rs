//! Candidate window enumeration for the placement search.
//!
//! Produces the finite, deterministic sequence of (date, start, end)
//! windows the backtracking search ranges over. The sequence has no state
//! beyond the iteration cursor, so rebuilding the generator restarts it.

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveTime, Weekday};

use crate::config::SearchSettings;

/// Weekdays scheduling defaults to: the teaching week.
pub const TEACHING_WEEK: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// One concrete (start, end) pair on a calendar day considered for
/// placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Enumerates candidate windows over a date range: one window per grid
/// step for every allowed weekday, keeping only windows whose end stays
/// strictly before the configured day end.
///
/// The end is always `start + duration`.
pub struct WindowGenerator {
    current_date: NaiveDate,
    end_date: NaiveDate,
    allowed_weekdays: Vec<Weekday>,
    duration_minutes: i64,
    // Grid bounds in minutes from midnight.
    first_start: i64,
    last_start: i64,
    latest_end: i64,
    step: i64,
    cursor: i64,
}

impl WindowGenerator {
    /// Generator over the default grid: starts every 30 minutes from 08:00
    /// through 17:00, windows ending before 18:00.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        duration_minutes: i64,
        allowed_weekdays: &[Weekday],
    ) -> Self {
        Self::with_settings(
            start_date,
            end_date,
            duration_minutes,
            allowed_weekdays,
            &SearchSettings::default(),
        )
    }

    /// Generator over a configured grid.
    pub fn with_settings(
        start_date: NaiveDate,
        end_date: NaiveDate,
        duration_minutes: i64,
        allowed_weekdays: &[Weekday],
        settings: &SearchSettings,
    ) -> Self {
        let first_start = i64::from(settings.grid_start_hour) * 60;
        let last_start = i64::from(settings.grid_end_hour) * 60;
        // Clamp to one day so a misconfigured grid cannot yield times past
        // midnight.
        let latest_end = (i64::from(settings.latest_end_hour) * 60).min(24 * 60);
        let step = settings.step_minutes.max(1);

        Self {
            current_date: start_date,
            end_date,
            allowed_weekdays: allowed_weekdays.to_vec(),
            duration_minutes,
            first_start,
            last_start,
            latest_end,
            step,
            cursor: first_start,
        }
    }

    fn advance_day(&mut self) {
        self.current_date = self
            .current_date
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX);
        self.cursor = self.first_start;
    }
}

fn time_from_minutes(minutes: i64) -> Option<NaiveTime> {
    if !(0..24 * 60).contains(&minutes) {
        return None;
    }
    NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
}

impl Iterator for WindowGenerator {
    type Item = CandidateWindow;

    fn next(&mut self) -> Option<CandidateWindow> {
        if self.duration_minutes <= 0 {
            return None;
        }

        loop {
            if self.current_date > self.end_date {
                return None;
            }
            if !self.allowed_weekdays.contains(&self.current_date.weekday()) {
                self.advance_day();
                continue;
            }
            if self.cursor > self.last_start {
                self.advance_day();
                continue;
            }

            let start_minutes = self.cursor;
            self.cursor += self.step;

            let end_minutes = start_minutes + self.duration_minutes;
            if end_minutes >= self.latest_end {
                continue;
            }
            let (Some(start), Some(end)) = (
                time_from_minutes(start_minutes),
                time_from_minutes(end_minutes),
            ) else {
                continue;
            };

            return Some(CandidateWindow {
                date: self.current_date,
                start,
                end,
            });
        }
    }
}

/// The end a window with this start and duration would have. Shared by the
/// generator and the greedy fallback so both compute ends the same way.
pub fn window_end(start: NaiveTime, duration_minutes: i64) -> Option<NaiveTime> {
    let (end, wrapped) = start.overflowing_add_signed(Duration::minutes(duration_minutes));
    (wrapped == 0).then_some(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_single_day_grid() {
        // 2026-03-02 is a Monday.
        let windows: Vec<CandidateWindow> = WindowGenerator::new(
            date(2026, 3, 2),
            date(2026, 3, 2),
            60,
            &TEACHING_WEEK,
        )
        .collect();

        // Starts 08:00..=16:30 (17:00 would end at 18:00, not before it).
        assert_eq!(windows.len(), 18);
        assert_eq!(windows[0].start, time(8, 0));
        assert_eq!(windows[0].end, time(9, 0));
        assert_eq!(windows.last().unwrap().start, time(16, 30));
        assert_eq!(windows.last().unwrap().end, time(17, 30));
    }

    #[test]
    fn test_end_is_start_plus_duration() {
        let windows: Vec<CandidateWindow> = WindowGenerator::new(
            date(2026, 3, 2),
            date(2026, 3, 2),
            90,
            &TEACHING_WEEK,
        )
        .collect();

        for window in &windows {
            assert_eq!((window.end - window.start).num_minutes(), 90);
        }
        // Last 90-minute start keeping the end before 18:00 is 16:00.
        assert_eq!(windows.last().unwrap().start, time(16, 0));
    }

    #[test]
    fn test_weekday_filter_skips_weekend() {
        // 2026-03-06 is a Friday; the range runs through Monday.
        let windows: Vec<CandidateWindow> = WindowGenerator::new(
            date(2026, 3, 6),
            date(2026, 3, 9),
            60,
            &TEACHING_WEEK,
        )
        .collect();

        let dates: Vec<NaiveDate> = {
            let mut d: Vec<NaiveDate> = windows.iter().map(|w| w.date).collect();
            d.dedup();
            d
        };
        assert_eq!(dates, vec![date(2026, 3, 6), date(2026, 3, 9)]);
    }

    #[test]
    fn test_restartable_and_deterministic() {
        let build = || {
            WindowGenerator::new(date(2026, 3, 2), date(2026, 3, 4), 30, &TEACHING_WEEK)
                .collect::<Vec<CandidateWindow>>()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_oversized_duration_yields_nothing_that_day() {
        // A 10-hour event cannot end before 18:00 from any grid start.
        let windows: Vec<CandidateWindow> = WindowGenerator::new(
            date(2026, 3, 2),
            date(2026, 3, 2),
            600,
            &TEACHING_WEEK,
        )
        .collect();
        assert!(windows.is_empty());
    }

    #[test]
    fn test_non_positive_duration_is_empty() {
        let mut generator =
            WindowGenerator::new(date(2026, 3, 2), date(2026, 3, 6), 0, &TEACHING_WEEK);
        assert!(generator.next().is_none());
    }

    #[test]
    fn test_window_end_helper() {
        assert_eq!(window_end(time(9, 0), 60), Some(time(10, 0)));
        assert_eq!(window_end(time(17, 30), 45), Some(time(18, 15)));
        // Wrapping past midnight is rejected.
        assert_eq!(window_end(time(23, 30), 60), None);
    }
}

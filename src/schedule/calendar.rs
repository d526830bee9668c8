use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Schedule;
use crate::task::round_days;

/// A scheduled task projected onto calendar days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub start_date: NaiveDate,
    pub finish_date: NaiveDate,
    /// Start date recorded on the task itself, if any.
    pub planned_start: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub overdue: bool,
}

pub(super) fn project_dates(schedule: &Schedule, project_start: NaiveDate) -> Vec<CalendarEntry> {
    schedule
        .tasks
        .iter()
        .map(|task| {
            let start_date = offset_date(project_start, task.start);
            let finish_date = offset_date(project_start, task.finish);
            CalendarEntry {
                id: task.id.clone(),
                start_date,
                finish_date,
                planned_start: task.start_date,
                deadline: task.deadline,
                overdue: task.deadline.is_some_and(|deadline| finish_date > deadline),
            }
        })
        .collect()
}

fn offset_date(project_start: NaiveDate, offset: f64) -> NaiveDate {
    let days = round_days(offset).max(0) as u64;
    project_start
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{schedule::compute_critical_path, task::Task};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_offsets_become_dates() {
        let tasks = vec![
            Task::new("design").with_estimate(2.0, 2.0, 2.0),
            Task::new("build")
                .with_estimate(3.0, 3.0, 3.0)
                .with_dependencies(&["design"]),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();
        let entries = schedule.calendar(date(2026, 1, 5));

        assert_eq!(entries[0].id, "design");
        assert_eq!(entries[0].start_date, date(2026, 1, 5));
        assert_eq!(entries[0].finish_date, date(2026, 1, 7));
        assert_eq!(entries[1].start_date, date(2026, 1, 7));
        assert_eq!(entries[1].finish_date, date(2026, 1, 10));
    }

    #[test]
    fn test_deadline_miss_is_flagged() {
        let mut late = Task::new("late").with_estimate(10.0, 10.0, 10.0);
        late.deadline = Some(date(2026, 3, 5));
        late.start_date = Some(date(2026, 3, 2));
        let mut on_time = Task::new("on_time").with_estimate(3.0, 3.0, 3.0);
        on_time.deadline = Some(date(2026, 3, 4));

        let schedule = compute_critical_path(&[late, on_time]).unwrap();
        let entries = schedule.calendar(date(2026, 3, 1));

        assert!(entries[0].overdue);
        assert_eq!(entries[0].planned_start, Some(date(2026, 3, 2)));
        assert!(!entries[1].overdue);
    }
}

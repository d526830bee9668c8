//! Critical-path scheduling over a task dependency graph.
//!
//! [`compute_critical_path`] runs a forward pass for earliest start and
//! finish offsets, a backward pass for latest start and finish, and traces
//! the longest chain of dependencies. All offsets are in days from the
//! project start.

pub mod calendar;

pub use calendar::CalendarEntry;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{InvalidEstimate, Result},
    task::{
        Priority, Status, Task,
        dependency::{check_references, dependency_indices, index_tasks, sort_topologically},
    },
};

/// Offsets closer than this are treated as equal.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub priority: Priority,
    pub dependencies: Vec<String>,
    /// `None` when the task has no usable estimate; it is scheduled as zero days.
    pub expected_duration: Option<f64>,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
    pub start: f64,
    pub finish: f64,
    pub latest_start: f64,
    pub latest_finish: f64,
    pub slack: f64,
    /// Longest number of dependency hops from a root task.
    pub level: usize,
    pub on_critical_path: bool,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub order: Vec<String>,
    pub critical_path: Vec<String>,
    pub total_duration: f64,
    /// Sum of the PERT variances along the critical path.
    pub critical_variance: f64,
    /// Scheduled tasks in topological order.
    pub tasks: Vec<ScheduledTask>,
    pub warnings: Vec<InvalidEstimate>,
}

impl Schedule {
    pub fn task(&self, id: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn critical_std_dev(&self) -> f64 {
        self.critical_variance.sqrt()
    }

    pub fn calendar(&self, project_start: NaiveDate) -> Vec<CalendarEntry> {
        calendar::project_dates(self, project_start)
    }
}

/// Resolves the dependency graph of `tasks` into a schedule and its critical
/// path.
///
/// Invalid estimates do not fail the computation: the task is scheduled with
/// zero duration and the problem is reported in [`Schedule::warnings`].
/// Unknown dependencies, duplicate ids and cycles are errors; cycles are
/// found by the topological sort.
pub fn compute_critical_path(tasks: &[Task]) -> Result<Schedule> {
    check_references(tasks)?;
    let order = sort_topologically(tasks)?;

    let index = index_tasks(tasks);
    let deps = dependency_indices(tasks, &index);
    let order_idx: Vec<usize> = order.iter().map(|id| index[id.as_str()]).collect();

    let mut warnings = Vec::new();
    let mut expected: Vec<Option<f64>> = Vec::with_capacity(tasks.len());
    let mut variance: Vec<Option<f64>> = Vec::with_capacity(tasks.len());
    let mut std_dev: Vec<Option<f64>> = Vec::with_capacity(tasks.len());

    for task in tasks {
        let points = match task.resolve_estimate() {
            Ok(points) => {
                if points.is_none() {
                    debug!(task = %task.id, "task not estimated, scheduling as zero days");
                }
                points
            }
            Err(invalid) => {
                warn!(task = %task.id, "{}", invalid);
                warnings.push(invalid);
                None
            }
        };
        expected.push(points.map(|p| p.expected()));
        variance.push(points.map(|p| p.variance()));
        std_dev.push(points.map(|p| p.std_dev()));
    }

    let duration = |idx: usize| expected[idx].unwrap_or(0.0);

    let n = tasks.len();
    let mut start = vec![0.0_f64; n];
    let mut finish = vec![0.0_f64; n];
    let mut level = vec![0_usize; n];
    let mut predecessor: Vec<Option<usize>> = vec![None; n];

    for &idx in &order_idx {
        let mut best: Option<usize> = None;
        for &dep in &deps[idx] {
            best = match best {
                Some(current) if !prefer(finish[dep], dep, finish[current], current) => {
                    Some(current)
                }
                _ => Some(dep),
            };
            level[idx] = level[idx].max(level[dep] + 1);
        }

        start[idx] = best.map(|dep| finish[dep]).unwrap_or(0.0);
        finish[idx] = start[idx] + duration(idx);
        predecessor[idx] = best;
    }

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (idx, task_deps) in deps.iter().enumerate() {
        for &dep in task_deps {
            dependents[dep].push(idx);
        }
    }

    // The chain ends at a task nothing depends on.
    let mut end: Option<usize> = None;
    for idx in (0..n).filter(|&idx| dependents[idx].is_empty()) {
        end = match end {
            Some(current) if !prefer(finish[idx], idx, finish[current], current) => {
                Some(current)
            }
            _ => Some(idx),
        };
    }

    let total_duration = end.map(|idx| finish[idx]).unwrap_or(0.0);

    let mut critical_idx = Vec::new();
    let mut cursor = end;
    while let Some(idx) = cursor {
        critical_idx.push(idx);
        cursor = predecessor[idx];
    }
    critical_idx.reverse();

    let mut on_critical_path = vec![false; n];
    for &idx in &critical_idx {
        on_critical_path[idx] = true;
    }

    let mut latest_start = vec![0.0_f64; n];
    let mut latest_finish = vec![0.0_f64; n];
    for &idx in order_idx.iter().rev() {
        latest_finish[idx] = dependents[idx]
            .iter()
            .map(|&d| latest_start[d])
            .fold(total_duration, f64::min);
        latest_start[idx] = latest_finish[idx] - duration(idx);
    }

    let critical_variance: f64 = critical_idx
        .iter()
        .filter_map(|&idx| variance[idx])
        .sum();

    let scheduled = order_idx
        .iter()
        .map(|&idx| {
            let task = &tasks[idx];
            let slack = latest_start[idx] - start[idx];
            ScheduledTask {
                id: task.id.clone(),
                title: task.title.clone(),
                status: task.status,
                priority: task.priority,
                dependencies: task.dependencies.clone(),
                expected_duration: expected[idx],
                variance: variance[idx],
                std_dev: std_dev[idx],
                start: start[idx],
                finish: finish[idx],
                latest_start: latest_start[idx],
                latest_finish: latest_finish[idx],
                slack: if slack < EPSILON { 0.0 } else { slack },
                level: level[idx],
                on_critical_path: on_critical_path[idx],
                start_date: task.start_date,
                deadline: task.deadline,
            }
        })
        .collect();

    let critical_path: Vec<String> = critical_idx
        .iter()
        .map(|&idx| tasks[idx].id.clone())
        .collect();

    debug!(
        tasks = n,
        total_duration,
        critical = %critical_path.join(" -> "),
        "computed critical path"
    );

    Ok(Schedule {
        order,
        critical_path,
        total_duration,
        critical_variance,
        tasks: scheduled,
        warnings,
    })
}

/// Whether `candidate` should replace `current` as the longest chain end.
/// Later finishes win; equal finishes go to the task listed first.
fn prefer(candidate_finish: f64, candidate: usize, current_finish: f64, current: usize) -> bool {
    if candidate_finish > current_finish + EPSILON {
        return true;
    }
    (candidate_finish - current_finish).abs() <= EPSILON && candidate < current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CritpathError, EstimateField};

    /// A task whose expected duration is exactly `days`.
    fn fixed(id: &str, days: f64, deps: &[&str]) -> Task {
        Task::new(id)
            .with_estimate(days, days, days)
            .with_dependencies(deps)
    }

    #[test]
    fn test_empty_task_list() {
        let schedule = compute_critical_path(&[]).unwrap();
        assert!(schedule.order.is_empty());
        assert!(schedule.critical_path.is_empty());
        assert_eq!(schedule.total_duration, 0.0);
    }

    #[test]
    fn test_roots_start_at_zero() {
        let tasks = vec![fixed("a", 3.0, &[]), fixed("b", 1.0, &[]), fixed("c", 2.0, &["a"])];
        let schedule = compute_critical_path(&tasks).unwrap();
        assert_eq!(schedule.task("a").unwrap().start, 0.0);
        assert_eq!(schedule.task("b").unwrap().start, 0.0);
        assert_eq!(schedule.task("c").unwrap().start, 3.0);
    }

    #[test]
    fn test_linear_chain() {
        let tasks = vec![
            fixed("A", 2.0, &[]),
            fixed("B", 3.0, &["A"]),
            fixed("C", 4.0, &["B"]),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();

        assert_eq!(schedule.task("A").unwrap().finish, 2.0);
        assert_eq!(schedule.task("B").unwrap().finish, 5.0);
        assert_eq!(schedule.task("C").unwrap().finish, 9.0);
        assert_eq!(schedule.critical_path, vec!["A", "B", "C"]);
        assert_eq!(schedule.total_duration, 9.0);
    }

    #[test]
    fn test_diamond_takes_longer_branch() {
        let tasks = vec![
            fixed("A", 1.0, &[]),
            fixed("C", 2.0, &["A"]),
            fixed("B", 5.0, &["A"]),
            fixed("D", 1.0, &["B", "C"]),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();

        assert_eq!(schedule.critical_path, vec!["A", "B", "D"]);
        assert_eq!(schedule.total_duration, 7.0);
        assert_eq!(schedule.task("D").unwrap().start, 6.0);

        let c = schedule.task("C").unwrap();
        assert!(!c.on_critical_path);
        assert_eq!(c.latest_start, 4.0);
        assert_eq!(c.slack, 3.0);
    }

    #[test]
    fn test_ties_prefer_input_order() {
        let tasks = vec![
            fixed("root", 1.0, &[]),
            fixed("left", 2.0, &["root"]),
            fixed("right", 2.0, &["root"]),
            fixed("join", 1.0, &["right", "left"]),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();
        assert_eq!(schedule.critical_path, vec!["root", "left", "join"]);

        let parallel = vec![fixed("x", 4.0, &[]), fixed("y", 4.0, &[])];
        let schedule = compute_critical_path(&parallel).unwrap();
        assert_eq!(schedule.critical_path, vec!["x"]);
    }

    #[test]
    fn test_critical_path_has_no_slack() {
        let tasks = vec![
            fixed("outline", 2.0, &[]),
            fixed("api", 4.0, &["outline"]),
            fixed("ui", 3.0, &["outline"]),
            fixed("docs", 1.0, &[]),
            fixed("launch", 1.0, &["api", "ui"]),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();

        for task in &schedule.tasks {
            if task.on_critical_path {
                assert_eq!(task.slack, 0.0, "task {}", task.id);
            }
        }
        assert_eq!(schedule.task("ui").unwrap().slack, 1.0);
        assert_eq!(schedule.task("docs").unwrap().slack, 6.0);
        assert_eq!(schedule.task("launch").unwrap().latest_finish, 7.0);
    }

    #[test]
    fn test_levels_count_longest_hop_chain() {
        let tasks = vec![
            fixed("a", 1.0, &[]),
            fixed("b", 1.0, &["a"]),
            fixed("c", 1.0, &["a", "b"]),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();
        let levels: Vec<usize> = schedule.tasks.iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![0, 1, 2]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let tasks = vec![fixed("A", 1.0, &["B"]), fixed("B", 1.0, &["A"])];
        match compute_critical_path(&tasks) {
            Err(CritpathError::CyclicDependency(cycle)) => {
                assert_eq!(cycle.len(), 2);
                assert!(cycle.contains(&"A".to_string()));
                assert!(cycle.contains(&"B".to_string()));
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_idempotent() {
        let tasks = vec![
            fixed("a", 1.5, &[]),
            Task::new("b").with_estimate(1.0, 2.0, 9.0).with_dependencies(&["a"]),
            Task::new("c").with_dependencies(&["a"]),
        ];
        let first = compute_critical_path(&tasks).unwrap();
        let second = compute_critical_path(&tasks).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unestimated_task_counts_as_zero() {
        let tasks = vec![
            fixed("a", 2.0, &[]),
            Task::new("review").with_dependencies(&["a"]),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();

        let review = schedule.task("review").unwrap();
        assert_eq!(review.expected_duration, None);
        assert_eq!(review.start, 2.0);
        assert_eq!(review.finish, 2.0);
        assert_eq!(schedule.critical_path, vec!["a", "review"]);
        assert!(schedule.warnings.is_empty());
    }

    #[test]
    fn test_invalid_estimate_is_a_warning() {
        let tasks = vec![
            fixed("a", 2.0, &[]),
            Task::new("b")
                .with_estimate(1.0, -3.0, 4.0)
                .with_dependencies(&["a"]),
            fixed("c", 1.0, &["b"]),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();

        assert_eq!(schedule.warnings.len(), 1);
        assert_eq!(schedule.warnings[0].task_id, "b");
        assert_eq!(schedule.warnings[0].field, EstimateField::MostLikely);
        assert_eq!(schedule.task("b").unwrap().expected_duration, None);
        assert_eq!(schedule.total_duration, 3.0);
    }

    #[test]
    fn test_critical_variance_sums_path() {
        let tasks = vec![
            Task::new("a").with_estimate(1.0, 2.0, 7.0),
            Task::new("b")
                .with_estimate(2.0, 3.0, 14.0)
                .with_dependencies(&["a"]),
            Task::new("side").with_estimate(0.0, 0.0, 6.0),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();
        assert_eq!(schedule.critical_path, vec!["a", "b"]);
        // (6/6)^2 + (12/6)^2
        assert_eq!(schedule.critical_variance, 5.0);
        assert_eq!(schedule.critical_std_dev(), 5.0_f64.sqrt());
    }

    #[test]
    fn test_std_dev_reported_per_task() {
        let tasks = vec![
            Task::new("a").with_estimate(1.0, 2.0, 7.0),
            Task::new("b")
                .with_estimate(2.0, 3.0, 14.0)
                .with_dependencies(&["a"]),
            Task::new("c").with_dependencies(&["b"]),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();

        assert_eq!(schedule.task("a").unwrap().std_dev, Some(1.0));
        let b = schedule.task("b").unwrap();
        assert_eq!(b.std_dev, Some(2.0));
        assert_eq!(b.variance, Some(4.0));
        assert_eq!(schedule.task("c").unwrap().std_dev, None);
    }

    #[test]
    fn test_huge_estimate_keeps_schedule_finite() {
        let tasks = vec![
            Task::new("a").with_estimate(1e308, 1e308, 1e308),
            fixed("b", 2.0, &["a"]),
        ];
        let schedule = compute_critical_path(&tasks).unwrap();

        assert_eq!(schedule.warnings.len(), 1);
        assert_eq!(schedule.warnings[0].task_id, "a");
        assert_eq!(schedule.warnings[0].field, EstimateField::Optimistic);

        let a = schedule.task("a").unwrap();
        assert_eq!(a.expected_duration, None);
        assert_eq!(a.std_dev, None);
        assert_eq!(schedule.total_duration, 2.0);
        assert!(schedule.tasks.iter().all(|t| t.slack.is_finite()));
        assert!(schedule.critical_variance.is_finite());

        let json = serde_json::to_string(&schedule).unwrap();
        let restored: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, schedule);
    }

    #[test]
    fn test_single_huge_estimate_has_zero_total() {
        let tasks = vec![Task::new("a").with_estimate(1e308, 1e308, 1e308)];
        let schedule = compute_critical_path(&tasks).unwrap();
        assert!(schedule.total_duration.is_finite());
        assert_eq!(schedule.total_duration, 0.0);
        assert_eq!(schedule.critical_path, vec!["a"]);
    }

    #[test]
    fn test_longer_cycle_found_without_prior_validation() {
        let tasks = vec![
            fixed("start", 1.0, &[]),
            fixed("x", 1.0, &["start", "z"]),
            fixed("y", 1.0, &["x"]),
            fixed("z", 1.0, &["y"]),
        ];
        match compute_critical_path(&tasks) {
            Err(CritpathError::CyclicDependency(cycle)) => {
                assert_eq!(cycle, vec!["x", "z", "y"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }
}

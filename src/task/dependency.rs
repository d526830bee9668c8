use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use tracing::debug;

use super::Task;
use crate::error::{CritpathError, Result};

/// Index of every task id in input order.
pub(crate) fn index_tasks(tasks: &[Task]) -> HashMap<&str, usize> {
    tasks
        .iter()
        .enumerate()
        .map(|(idx, t)| (t.id.as_str(), idx))
        .collect()
}

/// Dependency indices of every task, with repeated entries dropped.
///
/// Expects ids to have been checked by [`check_references`]; unknown ids are
/// skipped.
pub(crate) fn dependency_indices(tasks: &[Task], index: &HashMap<&str, usize>) -> Vec<Vec<usize>> {
    tasks
        .iter()
        .map(|task| {
            let mut seen = HashSet::new();
            task.dependencies
                .iter()
                .filter_map(|dep| index.get(dep.as_str()).copied())
                .filter(|idx| seen.insert(*idx))
                .collect()
        })
        .collect()
}

/// Orders tasks so every dependency precedes its dependents.
///
/// Among tasks that are ready at the same time the one listed first in
/// `tasks` goes first, so the result only depends on the input order.
pub fn sort_topologically(tasks: &[Task]) -> Result<Vec<String>> {
    let index = index_tasks(tasks);
    let deps = dependency_indices(tasks, &index);

    let mut in_degrees: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (idx, task_deps) in deps.iter().enumerate() {
        for &dep in task_deps {
            dependents[dep].push(idx);
        }
    }

    let mut ready: BTreeSet<usize> = in_degrees
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(idx, _)| idx)
        .collect();

    let mut sorted_tasks: Vec<String> = Vec::with_capacity(tasks.len());

    while let Some(idx) = ready.pop_first() {
        sorted_tasks.push(tasks[idx].id.clone());

        for &dependent in &dependents[idx] {
            in_degrees[dependent] -= 1;
            if in_degrees[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if sorted_tasks.len() < tasks.len() {
        let blocked: Vec<Task> = tasks
            .iter()
            .enumerate()
            .filter(|(idx, _)| in_degrees[*idx] > 0)
            .map(|(_, t)| t.clone())
            .collect();
        debug!(blocked = blocked.len(), "topological sort stalled");

        let cycle = find_cycle(&blocked)
            .unwrap_or_else(|| blocked.iter().map(|t| t.id.clone()).collect());
        return Err(CritpathError::CyclicDependency(cycle));
    }

    Ok(sorted_tasks)
}

/// Full check used when loading a project: ids, references and cycles.
pub fn validate_tasks(tasks: &[Task]) -> Result<()> {
    check_references(tasks)?;

    if let Some(cycle) = find_cycle(tasks) {
        return Err(CritpathError::CyclicDependency(cycle));
    }

    Ok(())
}

/// Rejects duplicate ids, self-dependencies and dependencies on unknown ids.
/// Longer cycles are left to [`sort_topologically`].
pub fn check_references(tasks: &[Task]) -> Result<()> {
    let mut task_ids: HashSet<&str> = HashSet::new();

    for task in tasks {
        if !task_ids.insert(task.id.as_str()) {
            return Err(CritpathError::DuplicateTask(task.id.clone()));
        }
    }

    for task in tasks {
        for dep_id in &task.dependencies {
            if dep_id == &task.id {
                return Err(CritpathError::CyclicDependency(vec![task.id.clone()]));
            }
            if !task_ids.contains(dep_id.as_str()) {
                return Err(CritpathError::UnknownDependency {
                    task: task.id.clone(),
                    dependency: dep_id.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Restricts `tasks` to `target_task_id` and everything it transitively
/// depends on, keeping input order.
pub fn required_tasks(tasks: &[Task], target_task_id: &str) -> Result<Vec<Task>> {
    let task_map: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();

    if !task_map.contains_key(target_task_id) {
        return Err(CritpathError::TaskNotFound(target_task_id.to_string()));
    }

    let mut needed_tasks = HashSet::new();
    let mut queue = VecDeque::new();

    queue.push_back(target_task_id);

    while let Some(current_task_id) = queue.pop_front() {
        if !needed_tasks.insert(current_task_id) {
            continue;
        }

        if let Some(task) = task_map.get(current_task_id) {
            for dep in &task.dependencies {
                if !needed_tasks.contains(dep.as_str()) {
                    queue.push_back(dep);
                }
            }
        }
    }

    Ok(tasks
        .iter()
        .filter(|task| needed_tasks.contains(task.id.as_str()))
        .cloned()
        .collect())
}

/// Returns the ids of one dependency cycle, each depending on the next and
/// the last depending on the first.
pub fn find_cycle(tasks: &[Task]) -> Option<Vec<String>> {
    let task_map: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut visited = HashSet::new();

    for task in tasks {
        let mut path = Vec::new();
        let mut on_path = HashMap::new();

        if let Some(start) =
            walk_for_cycle(&task.id, &task_map, &mut visited, &mut path, &mut on_path)
        {
            return Some(path[start..].iter().map(|id| id.to_string()).collect());
        }
    }

    None
}

/// Depth-first walk along dependencies. On a cycle, `path` holds the walk
/// and the returned index is where the cycle starts within it.
fn walk_for_cycle<'a>(
    task_id: &'a str,
    task_map: &HashMap<&'a str, &'a Task>,
    visited: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
    on_path: &mut HashMap<&'a str, usize>,
) -> Option<usize> {
    if let Some(&pos) = on_path.get(task_id) {
        return Some(pos);
    }

    if !visited.insert(task_id) {
        return None;
    }

    on_path.insert(task_id, path.len());
    path.push(task_id);

    if let Some(&task) = task_map.get(task_id) {
        for dep in &task.dependencies {
            if let Some(start) = walk_for_cycle(dep, task_map, visited, path, on_path) {
                return Some(start);
            }
        }
    }

    path.pop();
    on_path.remove(task_id);

    None
}

//! Pure task view helpers: the multi-criterion sort and the list filter.

use std::cmp::Ordering;
use std::collections::HashMap;

use itertools::Itertools;

use crate::domain::models::{Project, ProjectId, SortMode, Task, TaskFilter};

/// Sort a task collection without mutating it.
///
/// The underlying sort is stable, so tasks comparing equal keep their
/// relative order. Tasks without a deadline sort last in both deadline
/// directions; title and project comparisons are case-insensitive.
pub fn sort_tasks(tasks: &[Task], projects: &[Project], mode: SortMode) -> Vec<Task> {
    let project_names: HashMap<&ProjectId, &str> = projects
        .iter()
        .map(|project| (&project.id, project.name.as_str()))
        .collect();

    tasks
        .iter()
        .cloned()
        .sorted_by(|a, b| compare(a, b, mode, &project_names))
        .collect()
}

/// Borrowing filter over the task list.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

fn compare(a: &Task, b: &Task, mode: SortMode, names: &HashMap<&ProjectId, &str>) -> Ordering {
    match mode {
        SortMode::CreatedAsc => a.created_at.cmp(&b.created_at),
        SortMode::CreatedDesc => b.created_at.cmp(&a.created_at),
        SortMode::DeadlineAsc => by_deadline(a, b, false),
        SortMode::DeadlineDesc => by_deadline(a, b, true),
        SortMode::TitleAsc => collate(&a.title, &b.title),
        SortMode::TitleDesc => collate(&b.title, &a.title),
        SortMode::Status => a.status.sort_rank().cmp(&b.status.sort_rank()),
        SortMode::Project => collate(project_name(a, names), project_name(b, names)),
    }
}

// No deadline sorts last regardless of direction.
fn by_deadline(a: &Task, b: &Task, descending: bool) -> Ordering {
    match (a.deadline, b.deadline) {
        (Some(a), Some(b)) => {
            if descending {
                b.cmp(&a)
            } else {
                a.cmp(&b)
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn project_name<'a>(task: &Task, names: &HashMap<&ProjectId, &'a str>) -> &'a str {
    task.project_id
        .as_ref()
        .and_then(|id| names.get(id).copied())
        .unwrap_or("")
}

fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

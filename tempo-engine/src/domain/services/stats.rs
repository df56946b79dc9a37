//! Read-only aggregate metrics over the task collection.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::models::{Task, TaskStatus};

/// Derived statistics for a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Deadline strictly before today (UTC) and not completed. Deadlines
    /// are whole dates, so a task due today is not overdue until the next
    /// day starts.
    pub overdue: usize,
    /// Percent of tasks completed, rounded; 0 for an empty collection.
    pub completion_rate: u32,
    pub total_estimated_hours: f64,
    pub total_actual_hours: f64,
    /// Actual over estimated in percent, rounded; 0 when nothing estimated.
    pub efficiency: u32,
}

pub fn compute_stats(tasks: &[Task], now: OffsetDateTime) -> TaskStats {
    let today = now.date();
    let total = tasks.len();
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    let in_progress = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::InProgress)
        .count();
    let overdue = tasks
        .iter()
        .filter(|t| {
            t.status != TaskStatus::Completed && t.deadline.is_some_and(|deadline| deadline < today)
        })
        .count();

    let total_estimated_hours: f64 = tasks.iter().map(|t| t.estimated_hours).sum();
    let total_actual_hours: f64 = tasks.iter().map(|t| t.actual_hours).sum();

    TaskStats {
        total,
        completed,
        in_progress,
        overdue,
        completion_rate: percentage(completed as f64, total as f64),
        total_estimated_hours,
        total_actual_hours,
        efficiency: percentage(total_actual_hours, total_estimated_hours),
    }
}

fn percentage(part: f64, whole: f64) -> u32 {
    if whole > 0.0 {
        (part / whole * 100.0).round() as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TaskId;
    use time::macros::{date, datetime};

    fn task(status: TaskStatus, estimated: f64, actual: f64) -> Task {
        Task {
            id: TaskId::from("1"),
            title: "t".to_string(),
            description: String::new(),
            project_id: None,
            estimated_hours: estimated,
            actual_hours: actual,
            hourly_rate: None,
            deadline: None,
            status,
            created_at: datetime!(2025-06-01 12:00:00 UTC),
            updated_at: datetime!(2025-06-01 12:00:00 UTC),
        }
    }

    #[test]
    fn empty_collection_yields_zero_rates() {
        let stats = compute_stats(&[], datetime!(2025-06-01 12:00:00 UTC));

        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.efficiency, 0);
    }

    #[test]
    fn counts_statuses_and_rounds_rates() {
        let tasks = vec![
            task(TaskStatus::Completed, 2.0, 1.0),
            task(TaskStatus::InProgress, 1.0, 2.0),
            task(TaskStatus::NotStarted, 0.0, 0.0),
        ];

        let stats = compute_stats(&tasks, datetime!(2025-06-01 12:00:00 UTC));

        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 1);
        // 1/3 completed, rounded half away from zero.
        assert_eq!(stats.completion_rate, 33);
        assert_eq!(stats.total_estimated_hours, 3.0);
        assert_eq!(stats.total_actual_hours, 3.0);
        assert_eq!(stats.efficiency, 100);
    }

    #[test]
    fn overdue_needs_past_deadline_and_open_status() {
        let mut past_open = task(TaskStatus::InProgress, 0.0, 0.0);
        past_open.deadline = Some(date!(2025 - 05 - 31));
        let mut past_done = task(TaskStatus::Completed, 0.0, 0.0);
        past_done.deadline = Some(date!(2025 - 05 - 31));
        let mut due_today = task(TaskStatus::InProgress, 0.0, 0.0);
        due_today.deadline = Some(date!(2025 - 06 - 01));

        let stats = compute_stats(
            &[past_open, past_done, due_today],
            datetime!(2025-06-01 12:00:00 UTC),
        );

        assert_eq!(stats.overdue, 1);
    }
}

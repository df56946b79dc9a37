//! Backup parsing, merge reconciliation, and export.

use std::collections::HashMap;

use serde::Deserialize;
use time::OffsetDateTime;

use crate::domain::models::{
    BackupPayload, BackupProject, BackupTask, Project, ProjectId, Task, TaskId,
};
use crate::domain::TrackerError;

/// The incoming envelope. `meta` is informational and not validated, so
/// older exports and hand-edited files still import.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedBackup {
    #[serde(default)]
    #[allow(dead_code)]
    meta: Option<serde_json::Value>,
    #[serde(default)]
    projects: Option<Vec<BackupProject>>,
    #[serde(default)]
    tasks: Option<Vec<BackupTask>>,
}

/// Deserialize a backup payload.
///
/// Fails with `InvalidBackup` when the document is not parseable, a record
/// carries unknown fields, or neither a `projects` nor a `tasks` array is
/// present. Nothing is mutated on failure.
pub(crate) fn parse_backup(
    raw: &str,
) -> Result<(Vec<BackupProject>, Vec<BackupTask>), TrackerError> {
    let parsed: ParsedBackup =
        serde_json::from_str(raw).map_err(|err| TrackerError::invalid_backup(err.to_string()))?;
    if parsed.projects.is_none() && parsed.tasks.is_none() {
        return Err(TrackerError::invalid_backup(
            "payload carries neither projects nor tasks",
        ));
    }
    Ok((
        parsed.projects.unwrap_or_default(),
        parsed.tasks.unwrap_or_default(),
    ))
}

/// Last-writer-wins shallow merge of incoming tasks, keyed by id.
///
/// Existing records are overwritten field-by-field with whatever the
/// incoming record carries; unmatched ids are appended in incoming order;
/// id-less records are skipped. Existing order is preserved.
pub(crate) fn merge_tasks(current: &mut Vec<Task>, incoming: Vec<BackupTask>, now: OffsetDateTime) {
    let mut index: HashMap<TaskId, usize> = current
        .iter()
        .enumerate()
        .map(|(position, task)| (task.id.clone(), position))
        .collect();

    for record in incoming {
        let Some(id) = record.id.clone() else {
            tracing::warn!("skipping backup task without id");
            continue;
        };
        match index.get(&id) {
            Some(&position) => record.apply(&mut current[position]),
            None => {
                if let Some(task) = record.into_task(now) {
                    index.insert(id, current.len());
                    current.push(task);
                }
            }
        }
    }
}

/// Same reconciliation as [`merge_tasks`], for projects.
pub(crate) fn merge_projects(
    current: &mut Vec<Project>,
    incoming: Vec<BackupProject>,
    now: OffsetDateTime,
) {
    let mut index: HashMap<ProjectId, usize> = current
        .iter()
        .enumerate()
        .map(|(position, project)| (project.id.clone(), position))
        .collect();

    for record in incoming {
        let Some(id) = record.id.clone() else {
            tracing::warn!("skipping backup project without id");
            continue;
        };
        match index.get(&id) {
            Some(&position) => record.apply(&mut current[position]),
            None => {
                if let Some(project) = record.into_project(now) {
                    index.insert(id, current.len());
                    current.push(project);
                }
            }
        }
    }
}

/// Materialize incoming records as the full replacement collections.
pub(crate) fn replace_collections(
    incoming_projects: Vec<BackupProject>,
    incoming_tasks: Vec<BackupTask>,
    now: OffsetDateTime,
) -> (Vec<Project>, Vec<Task>) {
    let projects = incoming_projects
        .into_iter()
        .filter_map(|record| {
            let project = record.into_project(now);
            if project.is_none() {
                tracing::warn!("skipping backup project without id");
            }
            project
        })
        .collect();
    let tasks = incoming_tasks
        .into_iter()
        .filter_map(|record| {
            let task = record.into_task(now);
            if task.is_none() {
                tracing::warn!("skipping backup task without id");
            }
            task
        })
        .collect();
    (projects, tasks)
}

/// Build the export payload for the current collections.
pub(crate) fn export(projects: &[Project], tasks: &[Task], now: OffsetDateTime) -> BackupPayload {
    BackupPayload::new(projects.to_vec(), tasks.to_vec(), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TaskStatus;
    use time::macros::datetime;

    fn existing_task(id: &str, title: &str) -> Task {
        Task {
            id: TaskId::from(id),
            title: title.to_string(),
            description: "keep me".to_string(),
            project_id: None,
            estimated_hours: 4.0,
            actual_hours: 1.0,
            hourly_rate: Some(50.0),
            deadline: None,
            status: TaskStatus::InProgress,
            created_at: datetime!(2025-01-01 00:00:00 UTC),
            updated_at: datetime!(2025-01-01 00:00:00 UTC),
        }
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(parse_backup("not json at all").is_err());
        assert!(parse_backup(r#"{"meta": {"app": "tempo"}}"#).is_err());
        assert!(parse_backup(r#"[1, 2, 3]"#).is_err());
        // A record with unknown fields poisons the whole import.
        assert!(parse_backup(r#"{"tasks": [{"id": "1", "category": "x"}]}"#).is_err());
    }

    #[test]
    fn empty_arrays_are_a_valid_payload() {
        let (projects, tasks) = parse_backup(r#"{"projects": [], "tasks": []}"#).unwrap();
        assert!(projects.is_empty());
        assert!(tasks.is_empty());
    }

    #[test]
    fn merge_is_shallow_not_deep() {
        let mut current = vec![existing_task("1", "local title")];
        let (_, incoming) =
            parse_backup(r#"{"tasks": [{"id": "1", "title": "imported title"}]}"#).unwrap();

        merge_tasks(&mut current, incoming, datetime!(2025-06-01 00:00:00 UTC));

        assert_eq!(current.len(), 1);
        assert_eq!(current[0].title, "imported title");
        // Fields the incoming record omitted keep their local values.
        assert_eq!(current[0].description, "keep me");
        assert_eq!(current[0].actual_hours, 1.0);
        assert_eq!(current[0].status, TaskStatus::InProgress);
    }

    #[test]
    fn merge_incoming_null_clears_a_nullable_field() {
        let mut current = vec![existing_task("1", "local")];
        let (_, incoming) =
            parse_backup(r#"{"tasks": [{"id": "1", "hourlyRate": null}]}"#).unwrap();

        merge_tasks(&mut current, incoming, datetime!(2025-06-01 00:00:00 UTC));

        assert_eq!(current[0].hourly_rate, None);
    }

    #[test]
    fn merge_appends_new_ids_and_skips_idless_records() {
        let mut current = vec![existing_task("1", "first")];
        let (_, incoming) = parse_backup(
            r#"{"tasks": [{"title": "no id"}, {"id": "2", "title": "second"}]}"#,
        )
        .unwrap();

        merge_tasks(&mut current, incoming, datetime!(2025-06-01 00:00:00 UTC));

        assert_eq!(current.len(), 2);
        assert_eq!(current[0].id.as_str(), "1");
        assert_eq!(current[1].id.as_str(), "2");
        assert_eq!(current[1].title, "second");
    }

    #[test]
    fn export_carries_meta_and_file_name_stamp() {
        let payload = export(&[], &[], datetime!(2025-06-01 15:30:00 UTC));

        assert_eq!(payload.meta.app, "tempo");
        assert_eq!(payload.meta.version, 1);
        assert_eq!(payload.file_name(), "tempo-backup-20250601-153000.json");

        let json: serde_json::Value =
            serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(json["meta"]["exportedAt"], "2025-06-01T15:30:00Z");
    }
}

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::task::{nullable, nullable_date};
use super::{Project, ProjectId, Task, TaskId, TaskStatus};

/// `meta.app` value written into exported backups.
pub const BACKUP_APP: &str = "tempo";
/// Backup format version.
pub const BACKUP_VERSION: u32 = 1;

/// How an imported backup is reconciled with local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Discard local projects and tasks, substitute the incoming sequences.
    Replace,
    /// Last-writer-wins shallow merge keyed by id; the import wins per field.
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    pub app: String,
    pub version: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub exported_at: OffsetDateTime,
}

/// The exported backup document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupPayload {
    pub meta: BackupMeta,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

impl BackupPayload {
    pub fn new(projects: Vec<Project>, tasks: Vec<Task>, exported_at: OffsetDateTime) -> Self {
        Self {
            meta: BackupMeta {
                app: BACKUP_APP.to_string(),
                version: BACKUP_VERSION,
                exported_at,
            },
            projects,
            tasks,
        }
    }

    /// Timestamp-suffixed suggested export file name.
    pub fn file_name(&self) -> String {
        let stamp = self
            .meta
            .exported_at
            .format(&time::macros::format_description!(
                "[year][month][day]-[hour][minute][second]"
            ))
            .unwrap_or_default();
        format!("{BACKUP_APP}-backup-{stamp}.json")
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Incoming task record: every field optional so a partial shape merges
/// shallowly, unknown fields rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BackupTask {
    #[serde(default)]
    pub id: Option<TaskId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub project_id: Option<Option<ProjectId>>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub actual_hours: Option<f64>,
    #[serde(default, deserialize_with = "nullable")]
    pub hourly_rate: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable_date")]
    pub deadline: Option<Option<Date>>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "time::serde::rfc3339::option::deserialize")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "time::serde::rfc3339::option::deserialize")]
    pub updated_at: Option<OffsetDateTime>,
}

impl BackupTask {
    /// Overwrite `task` with every field this record carries.
    pub(crate) fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(project_id) = &self.project_id {
            task.project_id = project_id.clone();
        }
        if let Some(estimated_hours) = self.estimated_hours {
            task.estimated_hours = estimated_hours;
        }
        if let Some(actual_hours) = self.actual_hours {
            task.actual_hours = actual_hours;
        }
        if let Some(hourly_rate) = self.hourly_rate {
            task.hourly_rate = hourly_rate;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(created_at) = self.created_at {
            task.created_at = created_at;
        }
        if let Some(updated_at) = self.updated_at {
            task.updated_at = updated_at;
        }
    }

    /// Materialize as a full task, defaulting whatever the record omits.
    /// `None` if the record has no id.
    pub(crate) fn into_task(self, now: OffsetDateTime) -> Option<Task> {
        let id = self.id?;
        Some(Task {
            id,
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            project_id: self.project_id.flatten(),
            estimated_hours: self.estimated_hours.unwrap_or(0.0),
            actual_hours: self.actual_hours.unwrap_or(0.0),
            hourly_rate: self.hourly_rate.flatten(),
            deadline: self.deadline.flatten(),
            status: self.status.unwrap_or_default(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        })
    }
}

/// Incoming project record, same conventions as [`BackupTask`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BackupProject {
    #[serde(default)]
    pub id: Option<ProjectId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "time::serde::rfc3339::option::deserialize")]
    pub created_at: Option<OffsetDateTime>,
}

impl BackupProject {
    pub(crate) fn apply(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(created_at) = self.created_at {
            project.created_at = created_at;
        }
    }

    pub(crate) fn into_project(self, now: OffsetDateTime) -> Option<Project> {
        let id = self.id?;
        Some(Project {
            id,
            name: self.name.unwrap_or_default(),
            created_at: self.created_at.unwrap_or(now),
        })
    }
}

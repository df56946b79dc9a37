use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{ProjectId, Task, TaskStatus};

/// Sort order for task views. Closed set; the persisted form is the
/// snake_case name (`"created_desc"` and friends).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortMode {
    CreatedAsc,
    #[default]
    CreatedDesc,
    DeadlineAsc,
    DeadlineDesc,
    TitleAsc,
    TitleDesc,
    Status,
    Project,
}

/// Last-used task list filter, persisted as a preference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}

impl TaskFilter {
    pub fn by_status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn by_project(id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.project_id.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(project_id) = &self.project_id {
            if task.project_id.as_ref() != Some(project_id) {
                return false;
            }
        }
        true
    }
}

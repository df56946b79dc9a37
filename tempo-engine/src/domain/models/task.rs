use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use time::{Date, OffsetDateTime};

use super::{ProjectId, TaskId};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Parse a deadline in the persisted `YYYY-MM-DD` form.
pub(crate) fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, &time::macros::format_description!("[year]-[month]-[day]"))
}

/// Lifecycle status of a task. Closed set; display text is part of the type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Not Started")]
    #[strum(serialize = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    #[strum(serialize = "On Hold")]
    OnHold,
    Completed,
}

impl TaskStatus {
    /// Fixed ordering used by status sorts: the natural workflow order.
    pub(crate) fn sort_rank(self) -> u8 {
        match self {
            TaskStatus::NotStarted => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::OnHold => 2,
            TaskStatus::Completed => 3,
        }
    }
}

/// A unit of trackable work.
///
/// `actual_hours` is authoritative only while no timer runs for this task;
/// a running timer's live elapsed value supersedes it until the timer stops
/// and writes the accumulated total back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub actual_hours: f64,
    #[serde(default)]
    pub hourly_rate: Option<f64>,
    #[serde(default, with = "iso_date::option")]
    pub deadline: Option<Date>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Task {
    /// Field-by-field overwrite with the fields present in `patch`.
    pub(crate) fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(project_id) = &patch.project_id {
            self.project_id = project_id.clone();
        }
        if let Some(estimated_hours) = patch.estimated_hours {
            self.estimated_hours = estimated_hours;
        }
        if let Some(actual_hours) = patch.actual_hours {
            self.actual_hours = actual_hours;
        }
        if let Some(hourly_rate) = patch.hourly_rate {
            self.hourly_rate = hourly_rate;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Data for creating a task. Missing numerics default to zero, status to
/// [`TaskStatus::NotStarted`].
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub project_id: Option<ProjectId>,
    pub estimated_hours: f64,
    pub hourly_rate: Option<f64>,
    pub deadline: Option<Date>,
    pub status: TaskStatus,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_project(mut self, id: impl Into<ProjectId>) -> Self {
        self.project_id = Some(id.into());
        self
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    pub fn with_hourly_rate(mut self, rate: f64) -> Self {
        self.hourly_rate = Some(rate);
        self
    }

    pub fn with_deadline(mut self, deadline: Date) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

/// Explicit partial update for a task: every field optional, unknown fields
/// rejected at deserialization.
///
/// For nullable fields the outer `Option` is "was the field present", the
/// inner one the value itself, so a JSON `null` clears the field while an
/// absent field leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskPatch {
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
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_project(mut self, id: impl Into<ProjectId>) -> Self {
        self.project_id = Some(Some(id.into()));
        self
    }

    pub fn clear_project(mut self) -> Self {
        self.project_id = Some(None);
        self
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    pub fn with_actual_hours(mut self, hours: f64) -> Self {
        self.actual_hours = Some(hours);
        self
    }

    pub fn with_hourly_rate(mut self, rate: f64) -> Self {
        self.hourly_rate = Some(Some(rate));
        self
    }

    pub fn with_deadline(mut self, deadline: Date) -> Self {
        self.deadline = Some(Some(deadline));
        self
    }

    pub fn clear_deadline(mut self) -> Self {
        self.deadline = Some(None);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Present-but-maybe-null deserializer for double-`Option` fields.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Like [`nullable`], for deadlines in the `YYYY-MM-DD` form.
pub(crate) fn nullable_date<'de, D>(deserializer: D) -> Result<Option<Option<Date>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Some(None)),
        Some(raw) => parse_date(&raw)
            .map(|date| Some(Some(date)))
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let patch: TaskPatch = serde_json::from_str(r#"{"deadline": null}"#).unwrap();
        assert_eq!(patch.deadline, Some(None));
        assert!(patch.title.is_none());

        let patch: TaskPatch = serde_json::from_str(r#"{"deadline": "2025-01-01"}"#).unwrap();
        assert_eq!(
            patch.deadline,
            Some(Some(time::macros::date!(2025 - 01 - 01)))
        );
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let result = serde_json::from_str::<TaskPatch>(r#"{"favoriteColor": "teal"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn status_round_trips_display_text() {
        assert_eq!(TaskStatus::InProgress.to_string(), "In Progress");
        assert_eq!(
            "On Hold".parse::<TaskStatus>().unwrap(),
            TaskStatus::OnHold
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::NotStarted).unwrap(),
            r#""Not Started""#
        );
    }
}

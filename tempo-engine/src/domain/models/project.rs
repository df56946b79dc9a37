use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::ProjectId;

/// A named grouping of tasks.
///
/// Tasks point at projects via `Task::project_id`; the engine refuses to
/// delete a project while any task still references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

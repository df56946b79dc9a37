//! Typed persistence façade over the raw key-value store.
//!
//! Knows the recognized keys and their schemas; everything above it works
//! with domain types only. Corrupt stored values degrade to defaults with a
//! warning so one bad key cannot brick the whole dataset; an I/O failure is
//! a real `Storage` error.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tempo_store::KeyValueStore;

use crate::domain::models::{Project, SortMode, Task, TaskFilter, TaskId, TimerSnapshot};
use crate::domain::TrackerError;

pub(crate) mod keys {
    pub const TASKS: &str = "tasks";
    pub const PROJECTS: &str = "projects";
    pub const RUNNING_TIMERS: &str = "runningTimers";
    pub const SORT_MODE: &str = "sortMode";
    pub const FILTERS: &str = "filters";
}

#[derive(Debug, Default)]
pub(crate) struct PersistedState {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub running_timers: HashMap<TaskId, TimerSnapshot>,
    pub sort_mode: SortMode,
    pub filter: TaskFilter,
}

pub(crate) struct StoreFacade<S> {
    store: S,
}

impl<S: KeyValueStore> StoreFacade<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn load_state(&self) -> Result<PersistedState, TrackerError> {
        let mut values = self
            .store
            .load(&[
                keys::TASKS,
                keys::PROJECTS,
                keys::RUNNING_TIMERS,
                keys::SORT_MODE,
                keys::FILTERS,
            ])
            .await?;

        Ok(PersistedState {
            tasks: decode_or_default(values.remove(keys::TASKS), keys::TASKS),
            projects: decode_or_default(values.remove(keys::PROJECTS), keys::PROJECTS),
            running_timers: decode_or_default(
                values.remove(keys::RUNNING_TIMERS),
                keys::RUNNING_TIMERS,
            ),
            sort_mode: decode_or_default(values.remove(keys::SORT_MODE), keys::SORT_MODE),
            filter: decode_or_default(values.remove(keys::FILTERS), keys::FILTERS),
        })
    }

    pub async fn save_tasks(&self, tasks: &[Task]) -> Result<(), TrackerError> {
        self.save(vec![(keys::TASKS, encode(&tasks)?)]).await
    }

    pub async fn save_projects(&self, projects: &[Project]) -> Result<(), TrackerError> {
        self.save(vec![(keys::PROJECTS, encode(&projects)?)]).await
    }

    pub async fn save_timers(
        &self,
        timers: &HashMap<TaskId, TimerSnapshot>,
    ) -> Result<(), TrackerError> {
        self.save(vec![(keys::RUNNING_TIMERS, encode(timers)?)]).await
    }

    /// Stop/delete paths touch both the task list and the snapshot; one
    /// batched save keeps them from diverging on a mid-write crash.
    pub async fn save_tasks_and_timers(
        &self,
        tasks: &[Task],
        timers: &HashMap<TaskId, TimerSnapshot>,
    ) -> Result<(), TrackerError> {
        self.save(vec![
            (keys::TASKS, encode(&tasks)?),
            (keys::RUNNING_TIMERS, encode(timers)?),
        ])
        .await
    }

    pub async fn save_collections(
        &self,
        tasks: &[Task],
        projects: &[Project],
        timers: &HashMap<TaskId, TimerSnapshot>,
    ) -> Result<(), TrackerError> {
        self.save(vec![
            (keys::TASKS, encode(&tasks)?),
            (keys::PROJECTS, encode(&projects)?),
            (keys::RUNNING_TIMERS, encode(timers)?),
        ])
        .await
    }

    pub async fn save_sort_mode(&self, mode: SortMode) -> Result<(), TrackerError> {
        self.save(vec![(keys::SORT_MODE, encode(&mode)?)]).await
    }

    pub async fn save_filter(&self, filter: &TaskFilter) -> Result<(), TrackerError> {
        self.save(vec![(keys::FILTERS, encode(filter)?)]).await
    }

    async fn save(&self, entries: Vec<(&str, Value)>) -> Result<(), TrackerError> {
        let entries: HashMap<String, Value> = entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        if let Err(err) = self.store.save(entries).await {
            tracing::error!(%err, "save failed; in-memory state retained, caller may retry");
            return Err(err.into());
        }
        Ok(())
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, TrackerError> {
    serde_json::to_value(value).map_err(|err| TrackerError::Storage(err.into()))
}

fn decode_or_default<T: DeserializeOwned + Default>(value: Option<Value>, key: &str) -> T {
    match value {
        None => T::default(),
        Some(value) => match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::warn!(key, %err, "corrupt stored value replaced with default");
                T::default()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempo_store::MemoryStore;

    #[tokio::test]
    async fn missing_keys_load_as_defaults() {
        let facade = StoreFacade::new(MemoryStore::new());

        let state = facade.load_state().await.unwrap();

        assert!(state.tasks.is_empty());
        assert!(state.projects.is_empty());
        assert!(state.running_timers.is_empty());
        assert_eq!(state.sort_mode, SortMode::CreatedDesc);
        assert!(state.filter.is_empty());
    }

    #[tokio::test]
    async fn corrupt_values_degrade_to_defaults() {
        let store = MemoryStore::new()
            .with_entry(keys::TASKS, json!("definitely not a task list"))
            .with_entry(keys::SORT_MODE, json!("by_vibes"));
        let facade = StoreFacade::new(store);

        let state = facade.load_state().await.unwrap();

        assert!(state.tasks.is_empty());
        assert_eq!(state.sort_mode, SortMode::CreatedDesc);
    }

    #[tokio::test]
    async fn sort_mode_round_trips_as_plain_string() {
        let store = MemoryStore::new();
        let facade = StoreFacade::new(store.clone());

        facade.save_sort_mode(SortMode::TitleAsc).await.unwrap();

        assert_eq!(store.get(keys::SORT_MODE), Some(json!("title_asc")));
        let state = facade.load_state().await.unwrap();
        assert_eq!(state.sort_mode, SortMode::TitleAsc);
    }
}

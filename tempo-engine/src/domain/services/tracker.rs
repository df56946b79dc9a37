//! The state-owning tracker service.
//!
//! One instance per process owns the task/project/timer collections and is
//! the only writer to the underlying store. Mutations update memory first
//! and then persist; a failed save is logged and returned as
//! `TrackerError::Storage` without rolling the in-memory change back, so
//! callers can retry persistence or surface the error.

use std::collections::HashMap;

use time::OffsetDateTime;

use crate::domain::duration::parse_duration;
use crate::domain::models::{
    BackupPayload, ImportMode, NewTask, Project, ProjectId, RunningTimer, SortMode, Task,
    TaskFilter, TaskId, TaskPatch, TimerSnapshot,
};
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::services::persistence::StoreFacade;
use crate::domain::services::{backup, sort, stats};
use crate::domain::TrackerError;
use tempo_store::KeyValueStore;

pub struct TrackerService<S: KeyValueStore, C: Clock = SystemClock> {
    facade: StoreFacade<S>,
    clock: C,
    tasks: Vec<Task>,
    projects: Vec<Project>,
    timers: HashMap<TaskId, RunningTimer>,
    sort_mode: SortMode,
    filter: TaskFilter,
}

impl<S: KeyValueStore> TrackerService<S, SystemClock> {
    /// Load persisted state from `store` using the system clock.
    pub async fn load(store: S) -> Result<Self, TrackerError> {
        Self::load_with_clock(store, SystemClock).await
    }
}

impl<S: KeyValueStore, C: Clock> TrackerService<S, C> {
    /// Load persisted state and restore running timers.
    ///
    /// Snapshot entries whose task no longer exists are dropped: the task
    /// was deleted while its timer ran, possibly by another process
    /// instance. Surviving entries keep their absolute start instant, so
    /// elapsed time accrued across the restart is preserved.
    pub async fn load_with_clock(store: S, clock: C) -> Result<Self, TrackerError> {
        let facade = StoreFacade::new(store);
        let state = facade.load_state().await?;

        let mut timers = HashMap::new();
        for (task_id, snapshot) in state.running_timers {
            if !state.tasks.iter().any(|task| task.id == task_id) {
                tracing::warn!(%task_id, "dropping running timer for missing task");
                continue;
            }
            match snapshot.into_running() {
                Some(timer) => {
                    timers.insert(task_id, timer);
                }
                None => tracing::warn!(%task_id, "dropping stopped entry from timer snapshot"),
            }
        }

        tracing::debug!(
            tasks = state.tasks.len(),
            projects = state.projects.len(),
            running_timers = timers.len(),
            "tracker state loaded"
        );

        Ok(Self {
            facade,
            clock,
            tasks: state.tasks,
            projects: state.projects,
            timers,
            sort_mode: state.sort_mode,
            filter: state.filter,
        })
    }

    // ---- task CRUD ----

    pub async fn create_task(&mut self, new_task: NewTask) -> Result<Task, TrackerError> {
        let title = new_task.title.trim();
        if title.is_empty() {
            return Err(TrackerError::validation("task title must not be empty"));
        }
        ensure_non_negative(new_task.estimated_hours, "estimated hours")?;
        if let Some(rate) = new_task.hourly_rate {
            ensure_non_negative(rate, "hourly rate")?;
        }
        if let Some(project_id) = &new_task.project_id {
            self.require_project(project_id)?;
        }

        let now = self.clock.now();
        let task = Task {
            id: self.fresh_task_id(now),
            title: title.to_string(),
            description: new_task.description,
            project_id: new_task.project_id,
            estimated_hours: new_task.estimated_hours,
            actual_hours: 0.0,
            hourly_rate: new_task.hourly_rate,
            deadline: new_task.deadline,
            status: new_task.status,
            created_at: now,
            updated_at: now,
        };
        self.tasks.push(task.clone());
        self.facade.save_tasks(&self.tasks).await?;
        Ok(task)
    }

    /// Apply a partial update. Unknown ids are ignored, not an error,
    /// whatever the patch contains; validation runs only for tasks that
    /// exist.
    pub async fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> Result<(), TrackerError> {
        let Some(position) = self.tasks.iter().position(|task| &task.id == id) else {
            tracing::debug!(%id, "update for unknown task ignored");
            return Ok(());
        };

        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(TrackerError::validation("task title must not be empty"));
            }
        }
        if let Some(hours) = patch.estimated_hours {
            ensure_non_negative(hours, "estimated hours")?;
        }
        if let Some(hours) = patch.actual_hours {
            ensure_non_negative(hours, "actual hours")?;
        }
        if let Some(Some(rate)) = patch.hourly_rate {
            ensure_non_negative(rate, "hourly rate")?;
        }
        if let Some(Some(project_id)) = &patch.project_id {
            self.require_project(project_id)?;
        }

        let now = self.clock.now();
        let task = &mut self.tasks[position];
        task.apply(&patch);
        task.updated_at = now;
        self.facade.save_tasks(&self.tasks).await
    }

    /// Remove a task and, as a cascade, any timer entry it had.
    pub async fn delete_task(&mut self, id: &TaskId) -> Result<(), TrackerError> {
        let had_task = self.tasks.iter().any(|task| &task.id == id);
        if !had_task {
            return Ok(());
        }
        self.tasks.retain(|task| &task.id != id);
        self.timers.remove(id);
        self.facade
            .save_tasks_and_timers(&self.tasks, &self.snapshot())
            .await
    }

    // ---- projects ----

    pub async fn create_project(&mut self, name: &str) -> Result<Project, TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::validation("project name must not be empty"));
        }
        let now = self.clock.now();
        let project = Project {
            id: self.fresh_project_id(now),
            name: name.to_string(),
            created_at: now,
        };
        self.projects.push(project.clone());
        self.facade.save_projects(&self.projects).await?;
        Ok(project)
    }

    pub async fn rename_project(&mut self, id: &ProjectId, name: &str) -> Result<(), TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::validation("project name must not be empty"));
        }
        let Some(project) = self.projects.iter_mut().find(|project| &project.id == id) else {
            tracing::debug!(%id, "rename for unknown project ignored");
            return Ok(());
        };
        project.name = name.to_string();
        self.facade.save_projects(&self.projects).await
    }

    /// Delete a project; fails while any task still references it.
    pub async fn delete_project(&mut self, id: &ProjectId) -> Result<(), TrackerError> {
        if self
            .tasks
            .iter()
            .any(|task| task.project_id.as_ref() == Some(id))
        {
            return Err(TrackerError::ReferentialIntegrity(id.clone()));
        }
        self.projects.retain(|project| &project.id != id);
        self.facade.save_projects(&self.projects).await
    }

    // ---- timers ----

    /// Start the task's timer if stopped, stop it if running.
    ///
    /// Starting persists the running-timers snapshot so a later cold start
    /// can recover this clock; stopping folds the elapsed whole seconds into
    /// `actual_hours` and persists both the task list and the now-smaller
    /// snapshot. Unknown ids are ignored.
    pub async fn toggle_timer(&mut self, id: &TaskId) -> Result<(), TrackerError> {
        let now = self.clock.now();
        let Some(position) = self.tasks.iter().position(|task| &task.id == id) else {
            tracing::debug!(%id, "timer toggle for unknown task ignored");
            return Ok(());
        };

        if let Some(timer) = self.timers.remove(id) {
            let elapsed = timer.elapsed_seconds(now);
            let task = &mut self.tasks[position];
            task.actual_hours = elapsed as f64 / 3600.0;
            task.updated_at = now;
            self.facade
                .save_tasks_and_timers(&self.tasks, &self.snapshot())
                .await
        } else {
            let task = &self.tasks[position];
            let baseline_seconds = (task.actual_hours * 3600.0).round() as u64;
            self.timers.insert(
                id.clone(),
                RunningTimer {
                    started_at: now,
                    baseline_seconds,
                },
            );
            self.facade.save_timers(&self.snapshot()).await
        }
    }

    /// Discard the task's timer entirely and zero its accumulated hours.
    pub async fn reset_timer(&mut self, id: &TaskId) -> Result<(), TrackerError> {
        let Some(task) = self.tasks.iter_mut().find(|task| &task.id == id) else {
            return Ok(());
        };
        self.timers.remove(id);
        task.actual_hours = 0.0;
        task.updated_at = self.clock.now();
        self.facade
            .save_tasks_and_timers(&self.tasks, &self.snapshot())
            .await
    }

    /// Set the task's accumulated time from a textual duration
    /// (`HH:MM:SS`, `HH:MM`, or decimal hours).
    ///
    /// If the timer is running the new value becomes the baseline and the
    /// current run restarts at `now`; parsing failures mutate nothing.
    pub async fn edit_timer(&mut self, id: &TaskId, input: &str) -> Result<(), TrackerError> {
        let seconds = parse_duration(input)?;
        let now = self.clock.now();
        let Some(task) = self.tasks.iter_mut().find(|task| &task.id == id) else {
            tracing::debug!(%id, "timer edit for unknown task ignored");
            return Ok(());
        };
        task.actual_hours = seconds as f64 / 3600.0;
        task.updated_at = now;

        if let Some(timer) = self.timers.get_mut(id) {
            timer.started_at = now;
            timer.baseline_seconds = seconds;
            self.facade
                .save_tasks_and_timers(&self.tasks, &self.snapshot())
                .await
        } else {
            self.facade.save_tasks(&self.tasks).await
        }
    }

    /// Live elapsed seconds for a task; `None` for unknown ids.
    pub fn elapsed_seconds(&self, id: &TaskId) -> Option<u64> {
        let task = self.tasks.iter().find(|task| &task.id == id)?;
        Some(match self.timers.get(id) {
            Some(timer) => timer.elapsed_seconds(self.clock.now()),
            None => (task.actual_hours * 3600.0).round() as u64,
        })
    }

    pub fn is_timer_running(&self, id: &TaskId) -> bool {
        self.timers.contains_key(id)
    }

    /// Accrued cost at the task's hourly rate; `None` without a positive rate.
    pub fn cost(&self, id: &TaskId) -> Option<f64> {
        let task = self.tasks.iter().find(|task| &task.id == id)?;
        let rate = task.hourly_rate.filter(|rate| *rate > 0.0)?;
        let hours = self.elapsed_seconds(id)? as f64 / 3600.0;
        Some(hours * rate)
    }

    // ---- views ----

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn sorted_tasks(&self) -> Vec<Task> {
        sort::sort_tasks(&self.tasks, &self.projects, self.sort_mode)
    }

    pub fn sorted_tasks_by(&self, mode: SortMode) -> Vec<Task> {
        sort::sort_tasks(&self.tasks, &self.projects, mode)
    }

    pub fn filtered_tasks(&self) -> Vec<&Task> {
        sort::filter_tasks(&self.tasks, &self.filter)
    }

    pub fn stats(&self) -> stats::TaskStats {
        stats::compute_stats(&self.tasks, self.clock.now())
    }

    // ---- preferences ----

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub async fn set_sort_mode(&mut self, mode: SortMode) -> Result<(), TrackerError> {
        self.sort_mode = mode;
        self.facade.save_sort_mode(mode).await
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub async fn set_filter(&mut self, filter: TaskFilter) -> Result<(), TrackerError> {
        self.filter = filter;
        self.facade.save_filter(&self.filter).await
    }

    // ---- backup ----

    /// Import a backup document. Malformed payloads fail without touching
    /// current state; on success both collections are persisted in one save.
    pub async fn import_backup(
        &mut self,
        raw: &str,
        mode: ImportMode,
    ) -> Result<(), TrackerError> {
        let (incoming_projects, incoming_tasks) = backup::parse_backup(raw)?;
        let now = self.clock.now();

        match mode {
            ImportMode::Replace => {
                let (projects, tasks) =
                    backup::replace_collections(incoming_projects, incoming_tasks, now);
                self.projects = projects;
                self.tasks = tasks;
            }
            ImportMode::Merge => {
                backup::merge_projects(&mut self.projects, incoming_projects, now);
                backup::merge_tasks(&mut self.tasks, incoming_tasks, now);
            }
        }

        // Same cascade as task deletion: a timer may not outlive its task.
        let tasks = &self.tasks;
        self.timers
            .retain(|id, _| tasks.iter().any(|task| &task.id == id));

        self.facade
            .save_collections(&self.tasks, &self.projects, &self.snapshot())
            .await
    }

    pub fn export_backup(&self) -> BackupPayload {
        backup::export(&self.projects, &self.tasks, self.clock.now())
    }

    // ---- internals ----

    fn snapshot(&self) -> HashMap<TaskId, TimerSnapshot> {
        self.timers
            .iter()
            .map(|(id, timer)| (id.clone(), TimerSnapshot::from(*timer)))
            .collect()
    }

    fn require_project(&self, id: &ProjectId) -> Result<(), TrackerError> {
        if self.projects.iter().any(|project| &project.id == id) {
            Ok(())
        } else {
            Err(TrackerError::validation(format!("unknown project: {id}")))
        }
    }

    fn fresh_task_id(&self, now: OffsetDateTime) -> TaskId {
        let mut millis = now.unix_timestamp_nanos() / 1_000_000;
        loop {
            let candidate = TaskId::from_millis(millis);
            if !self.tasks.iter().any(|task| task.id == candidate) {
                return candidate;
            }
            millis += 1;
        }
    }

    fn fresh_project_id(&self, now: OffsetDateTime) -> ProjectId {
        let mut millis = now.unix_timestamp_nanos() / 1_000_000;
        loop {
            let candidate = ProjectId::from_millis(millis);
            if !self.projects.iter().any(|project| project.id == candidate) {
                return candidate;
            }
            millis += 1;
        }
    }
}

fn ensure_non_negative(value: f64, field: &str) -> Result<(), TrackerError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TrackerError::validation(format!(
            "{field} must be a non-negative number"
        )))
    }
}

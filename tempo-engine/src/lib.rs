//! Task and timer tracking engine.
//!
//! One [`TrackerService`] per process owns the task, project, and timer
//! collections, persists them through a [`tempo_store::KeyValueStore`], and
//! survives process restarts without losing or double-counting elapsed time:
//! only *running* timers are durably stored, as absolute start instants plus
//! accumulated seconds, so recovery is a pure function of the snapshot and
//! the wall clock.

pub mod domain;

pub use domain::duration::{format_hms, parse_duration};
pub use domain::models::{
    BackupMeta, BackupPayload, ImportMode, NewTask, Project, ProjectId, SortMode, Task,
    TaskFilter, TaskId, TaskPatch, TaskStatus,
};
pub use domain::ports::{Clock, ManualClock, SystemClock};
pub use domain::services::{compute_stats, filter_tasks, sort_tasks, TaskStats, TrackerService};
pub use domain::TrackerError;

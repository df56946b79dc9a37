pub mod backup;
pub mod persistence;
pub mod sort;
pub mod stats;
pub mod tracker;

pub use sort::{filter_tasks, sort_tasks};
pub use stats::{compute_stats, TaskStats};
pub use tracker::TrackerService;

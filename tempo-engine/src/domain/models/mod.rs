mod backup;
mod ids;
mod preferences;
mod project;
mod task;
mod timer;

pub use backup::*;
pub use ids::*;
pub use preferences::*;
pub use project::*;
pub use task::*;
pub use timer::*;

mod error;

pub mod duration;
pub mod models;
pub mod ports;
pub mod services;

pub use error::TrackerError;

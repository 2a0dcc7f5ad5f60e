//! Pocket Pilot core - notification and reminder feed.
//!
//! Merges backend reminders with locally generated notifications,
//! reconciles read/deleted flags between the device and the backend, and
//! exposes filtered views of the result to the presentation layer.

pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

pub use error::AppError;
pub use state::{AppState, Collaborators};

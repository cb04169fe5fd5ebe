//! sparta - Sparta Fitness student and trainer companion
//!
//! The core is the workout progress tracker: which exercise is active,
//! what is done, how long the session has been running.

pub mod context;
pub mod db;
pub mod diet;
pub mod history;
pub mod reviews;
pub mod roster;
pub mod tracker;
pub mod tui;
pub mod workout;

pub use db::Database;
pub use tracker::WorkoutProgressTracker;

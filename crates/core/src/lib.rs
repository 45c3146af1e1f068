//! Moodwell domain logic.
//!
//! Pure types and rules shared by the database layer, the progress
//! synchronizer and the HTTP API. Nothing in this crate performs I/O.

pub mod error;
pub mod progress;
pub mod roles;
pub mod signals;
pub mod team_signals;
pub mod types;

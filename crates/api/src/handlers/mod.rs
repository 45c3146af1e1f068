//! Request handlers.
//!
//! Handlers delegate to the repositories in `moodwell_db` and the pure
//! domain logic in `moodwell_core`, mapping errors via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod progress;
pub mod signals;
pub mod team_aggregate;

//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod badge_award_repo;
pub mod mood_entry_repo;
pub mod module_progress_repo;
pub mod module_session_repo;
pub mod team_aggregate_repo;
pub mod team_repo;

pub use badge_award_repo::BadgeAwardRepo;
pub use mood_entry_repo::MoodEntryRepo;
pub use module_progress_repo::ModuleProgressRepo;
pub use module_session_repo::ModuleSessionRepo;
pub use team_aggregate_repo::TeamAggregateRepo;
pub use team_repo::TeamRepo;

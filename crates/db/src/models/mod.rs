//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts

pub mod badge;
pub mod mood_entry;
pub mod module_session;
pub mod progress;
pub mod team;

//! Debounced, optimistic progress synchronization.
//!
//! - [`ProgressSync`] -- local mirror of one module's progress with coalesced
//!   background saves and a flush on teardown.
//! - [`ProgressStore`] -- the remote record store seam, implemented for
//!   Postgres ([`PgProgressStore`]), the HTTP API ([`HttpProgressStore`]) and
//!   memory ([`MemoryProgressStore`]).

pub mod config;
pub mod error;
pub mod http;
pub mod store;
pub mod synchronizer;

pub use config::SyncConfig;
pub use error::SyncError;
pub use http::HttpProgressStore;
pub use store::{MemoryProgressStore, PgProgressStore, ProgressStore};
pub use synchronizer::{ProgressSync, SyncEvent};

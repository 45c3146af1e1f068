use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A half-open reporting window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Period {
    /// Build a period, rejecting empty or inverted windows.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::Validation(format!(
                "period_start ({start}) must be before period_end ({end})"
            )));
        }
        Ok(Self { start, end })
    }
}

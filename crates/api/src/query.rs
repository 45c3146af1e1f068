//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default number of rows returned by list endpoints.
pub const DEFAULT_LIMIT: i64 = 50;
/// Maximum number of rows a caller may request.
pub const MAX_LIMIT: i64 = 200;

/// `?limit=` for list endpoints.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

impl LimitParams {
    /// Requested limit clamped to `1..=MAX_LIMIT`.
    pub fn clamped(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(LimitParams { limit: None }.clamped(), DEFAULT_LIMIT);
        assert_eq!(LimitParams { limit: Some(0) }.clamped(), 1);
        assert_eq!(LimitParams { limit: Some(5000) }.clamped(), MAX_LIMIT);
        assert_eq!(LimitParams { limit: Some(10) }.clamped(), 10);
    }
}

//! Repository for the `badge_awards` table.

use sqlx::PgPool;

use crate::models::badge::{BadgeAward, CreateBadgeAward};

/// Column list for `badge_awards` queries.
const COLUMNS: &str = "id, user_id, badge_code, awarded_at";

pub struct BadgeAwardRepo;

impl BadgeAwardRepo {
    /// Award a badge. The same badge may be awarded more than once.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBadgeAward,
    ) -> Result<BadgeAward, sqlx::Error> {
        let query = format!(
            "INSERT INTO badge_awards (user_id, badge_code, awarded_at) \
             VALUES ($1, $2, COALESCE($3, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BadgeAward>(&query)
            .bind(input.user_id)
            .bind(&input.badge_code)
            .bind(input.awarded_at)
            .fetch_one(pool)
            .await
    }
}

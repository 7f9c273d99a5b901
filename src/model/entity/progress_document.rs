use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::model::{ModelManager, ResourceTyped, error::DatabaseResult};
use crate::progress::{CourseCatalog, ProgressDocumentStore, Rank, UserProgress};

/// `user_progress` table: one progress snapshot per user, stored as jsonb.
pub struct ProgressDocument;

impl ResourceTyped for ProgressDocument {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::UserProgress
    }
}

#[async_trait]
impl ProgressDocumentStore for ModelManager {
    async fn load(&self, user_id: Uuid) -> DatabaseResult<Option<UserProgress>> {
        let document: Option<Json<UserProgress>> =
            sqlx::query_scalar("SELECT document FROM user_progress WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.executor())
                .await?;

        Ok(document.map(|Json(progress)| progress))
    }

    async fn save(&self, user_id: Uuid, progress: &UserProgress) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_progress (user_id, document, total_points, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id) DO UPDATE
            SET document = EXCLUDED.document,
                total_points = EXCLUDED.total_points,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(Json(progress))
        .bind(i64::from(progress.total_points))
        .execute(self.executor())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CourseCatalog for ModelManager {
    async fn course_size(&self, course_id: Uuid) -> DatabaseResult<Option<u32>> {
        let size: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM lessons l WHERE l.course_id = c.id)
              + (SELECT COUNT(*) FROM quizzes q WHERE q.course_id = c.id)
            FROM courses c
            WHERE c.id = $1
            "#,
        )
        .bind(course_id)
        .fetch_optional(self.executor())
        .await?;

        Ok(size.map(|s| u32::try_from(s).unwrap_or(u32::MAX)))
    }
}

// Utils

#[derive(Debug, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub user_id: Uuid,
    pub username: String,
    pub total_points: i64,
}

impl ResourceTyped for LeaderboardRow {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Leaderboard
    }
}

impl LeaderboardRow {
    /// Users with stored progress, best first.
    pub async fn top(mm: &ModelManager, limit: i64) -> DatabaseResult<Vec<Self>> {
        let rows = sqlx::query_as(
            r#"
            SELECT u.id AS user_id, u.username, up.total_points
            FROM user_progress up
            JOIN users u ON u.id = up.user_id
            ORDER BY up.total_points DESC, u.username ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(mm.executor())
        .await?;

        Ok(rows)
    }

    pub fn points(&self) -> u32 {
        u32::try_from(self.total_points.max(0)).unwrap_or(u32::MAX)
    }

    pub fn rank(&self) -> Rank {
        Rank::from_points(self.points())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn row(username: &str, total_points: i64) -> LeaderboardRow {
        LeaderboardRow {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            total_points,
        }
    }

    #[test]
    fn leaderboard_row_rank() {
        assert_eq!(row("ferris", 5200).rank(), Rank::Expert);
        assert_eq!(row("crab", 1500).rank(), Rank::Intermediate);
    }

    #[test]
    fn leaderboard_clamps_negative_points() {
        assert_eq!(row("broken", -10).points(), 0);
    }
}

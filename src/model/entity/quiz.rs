use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quiz {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    max_score: i32,
    order_index: i32,
}

impl ResourceTyped for Quiz {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Quiz
    }
}

impl Quiz {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn course_id(&self) -> Uuid {
        self.course_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn max_score(&self) -> i32 {
        self.max_score
    }

    pub fn order_index(&self) -> i32 {
        self.order_index
    }

    /// Whether `score` is a result this quiz can produce.
    pub fn accepts_score(&self, score: i64) -> bool {
        (0..=i64::from(self.max_score)).contains(&score)
    }
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct QuizCreate {
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub max_score: i32,
    pub order_index: Option<i32>,
}

#[async_trait]
impl CrudRepository<Quiz, QuizCreate, uuid::Uuid> for Quiz {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let quiz = sqlx::query_as(
            r#"
            INSERT INTO quizzes (id, course_id, title, description, max_score, order_index)
            VALUES ($1,$2,$3,$4,$5,$6)
            RETURNING id, course_id, title, description, max_score, order_index
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.max_score)
        .bind(data.order_index.unwrap_or(0))
        .fetch_one(mm.executor())
        .await?;

        Ok(quiz)
    }

    async fn update(
        mut self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: QuizCreate,
    ) -> DatabaseResult<Self> {
        let order_index = data.order_index.unwrap_or(self.order_index);
        sqlx::query(
            r#"
            UPDATE quizzes
            SET course_id = $1, title = $2, description = $3, max_score = $4, order_index = $5
            WHERE id = $6
            "#,
        )
        .bind(data.course_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.max_score)
        .bind(order_index)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.course_id = data.course_id;
        self.title = data.title;
        self.description = data.description;
        self.max_score = data.max_score;
        self.order_index = order_index;
        Ok(self)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: uuid::Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM quizzes WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;

        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM quizzes LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn quiz(max_score: i32) -> Quiz {
        Quiz {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            title: String::from("borrowing"),
            description: String::new(),
            max_score,
            order_index: 0,
        }
    }

    #[test]
    fn quiz_score_bounds() {
        let q = quiz(100);
        assert!(q.accepts_score(0));
        assert!(q.accepts_score(100));
        assert!(!q.accepts_score(101));
        assert!(!q.accepts_score(-1));
    }
}

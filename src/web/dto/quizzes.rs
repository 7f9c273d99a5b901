use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::Quiz;
use crate::progress::UserProgress;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizResponse {
    id: Uuid,
    course_id: Uuid,
    title: String,
    description: String,
    max_score: i32,
    order_index: i32,
    completed: bool,
    best_score: Option<u32>,
}

impl QuizResponse {
    pub fn new(quiz: Quiz, progress: &UserProgress) -> Self {
        let state = progress.quiz(quiz.course_id(), quiz.id());
        Self {
            id: quiz.id(),
            course_id: quiz.course_id(),
            title: quiz.title().to_string(),
            description: quiz.description().to_string(),
            max_score: quiz.max_score(),
            order_index: quiz.order_index(),
            completed: state.is_some_and(|q| q.completed),
            best_score: state.map(|q| q.score),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizSubmitRequest {
    /// Must be within `0..=max_score` of the quiz.
    pub score: i64,
}

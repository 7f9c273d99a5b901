use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::{DatabaseResult, entity::CourseWithContentRow},
    progress::UserProgress,
};

// shapes produced by json_build_object in `CourseWithContentRow`
#[derive(Deserialize)]
struct LessonRow {
    id: Uuid,
    title: String,
    order_index: i32,
}

#[derive(Deserialize)]
struct QuizRow {
    id: Uuid,
    title: String,
    max_score: i32,
    order_index: i32,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonShort {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizShort {
    pub id: Uuid,
    pub title: String,
    pub max_score: i32,
    pub order_index: i32,
    pub completed: bool,
    pub best_score: Option<u32>,
}

/// Catalog entry of a course with the caller's progress laid over it.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseOverview {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    pub lessons: Vec<LessonShort>,
    pub quizzes: Vec<QuizShort>,
    pub total_points: u32,
    pub completion_percentage: f64,
}

impl CourseOverview {
    pub fn from_row(row: CourseWithContentRow, progress: &UserProgress) -> DatabaseResult<Self> {
        let lessons: Vec<LessonRow> = serde_json::from_value(row.lessons)?;
        let quizzes: Vec<QuizRow> = serde_json::from_value(row.quizzes)?;
        // the stored percentage predates lessons or quizzes added since
        let size = u32::try_from(lessons.len() + quizzes.len()).unwrap_or(u32::MAX);
        let course = progress.course(row.id).cloned().map(|mut course| {
            course.recalculate_completion(size);
            course
        });

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            order_index: row.order_index,
            lessons: lessons
                .into_iter()
                .map(|l| LessonShort {
                    completed: progress.is_lesson_completed(row.id, l.id),
                    id: l.id,
                    title: l.title,
                    order_index: l.order_index,
                })
                .collect(),
            quizzes: quizzes
                .into_iter()
                .map(|q| {
                    let state = progress.quiz(row.id, q.id);
                    QuizShort {
                        id: q.id,
                        title: q.title,
                        max_score: q.max_score,
                        order_index: q.order_index,
                        completed: state.is_some_and(|s| s.completed),
                        best_score: state.map(|s| s.score),
                    }
                })
                .collect(),
            total_points: course.as_ref().map_or(0, |c| c.total_points),
            completion_percentage: course.as_ref().map_or(0.0, |c| c.completion_percentage),
        })
    }

    pub fn from_rows(
        rows: Vec<CourseWithContentRow>,
        progress: &UserProgress,
    ) -> DatabaseResult<Vec<Self>> {
        rows.into_iter()
            .map(|row| Self::from_row(row, progress))
            .collect()
    }
}

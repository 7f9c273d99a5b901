//! Progress document kept per user. The whole document is read and written
//! as one snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::progress::Rank;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProgress {
    pub courses: BTreeMap<Uuid, CourseProgress>,
    pub total_points: u32,
    pub rank: Rank,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseProgress {
    pub lessons: BTreeMap<Uuid, LessonProgress>,
    pub quizzes: BTreeMap<Uuid, QuizProgress>,
    pub total_points: u32,
    pub completion_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgress {
    pub completed: bool,
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl UserProgress {
    pub fn course(&self, course_id: Uuid) -> Option<&CourseProgress> {
        self.courses.get(&course_id)
    }

    pub fn is_lesson_completed(&self, course_id: Uuid, lesson_id: Uuid) -> bool {
        self.course(course_id)
            .and_then(|c| c.lessons.get(&lesson_id))
            .is_some_and(|l| l.completed)
    }

    pub fn quiz(&self, course_id: Uuid, quiz_id: Uuid) -> Option<&QuizProgress> {
        self.course(course_id).and_then(|c| c.quizzes.get(&quiz_id))
    }

    pub fn completed_lessons(&self) -> usize {
        self.courses.values().map(CourseProgress::completed_lessons).sum()
    }

    pub fn completed_quizzes(&self) -> usize {
        self.courses.values().map(CourseProgress::completed_quizzes).sum()
    }

    /// Re-derives the user total from the course totals and the rank from
    /// the user total.
    pub fn recalculate_totals(&mut self) {
        self.total_points = self
            .courses
            .values()
            .fold(0u32, |acc, c| acc.saturating_add(c.total_points));
        self.rank = Rank::from_points(self.total_points);
    }
}

impl CourseProgress {
    pub fn completed_lessons(&self) -> usize {
        self.lessons.values().filter(|l| l.completed).count()
    }

    pub fn completed_quizzes(&self) -> usize {
        self.quizzes.values().filter(|q| q.completed).count()
    }

    /// `size` is the number of lessons plus quizzes in the course.
    pub fn recalculate_completion(&mut self, size: u32) {
        if size == 0 {
            return;
        }

        let done = (self.completed_lessons() + self.completed_quizzes()) as f64;
        self.completion_percentage = (done * 100.0 / f64::from(size)).clamp(0.0, 100.0);
    }
}

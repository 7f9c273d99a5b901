use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::Lesson;
use crate::progress::UserProgress;
use crate::web::dto::progress::ProgressChangeResponse;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonResponse {
    id: Uuid,
    course_id: Uuid,
    title: String,
    content: String,
    order_index: i32,
    completed: bool,
}

impl LessonResponse {
    pub fn new(lesson: Lesson, progress: &UserProgress) -> Self {
        Self {
            completed: progress.is_lesson_completed(lesson.course_id(), lesson.id()),
            id: lesson.id(),
            course_id: lesson.course_id(),
            order_index: lesson.order_index(),
            title: lesson.title().to_string(),
            content: lesson.content().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LessonCompleteResponse {
    #[serde(flatten)]
    pub change: ProgressChangeResponse,
    /// First lesson after this one that is not completed yet.
    pub next_lesson_id: Option<Uuid>,
}

/// Picks the first uncompleted lesson that comes after `current` in
/// `lessons`, which must be in reading order.
pub fn next_uncompleted_lesson(
    lessons: &[Lesson],
    current: Uuid,
    progress: &UserProgress,
) -> Option<Uuid> {
    lessons
        .iter()
        .skip_while(|l| l.id() != current)
        .skip(1)
        .find(|l| !progress.is_lesson_completed(l.course_id(), l.id()))
        .map(Lesson::id)
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::progress::PointsPolicy;

    fn lesson(course_id: Uuid, order_index: i32) -> Lesson {
        serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "course_id": course_id,
            "title": format!("lesson {order_index}"),
            "content": "",
            "order_index": order_index,
        }))
        .unwrap()
    }

    #[test]
    fn next_lesson_skips_completed() {
        let course = Uuid::new_v4();
        let lessons: Vec<Lesson> = (0..4).map(|i| lesson(course, i)).collect();
        let mut progress = UserProgress::default();
        let policy = PointsPolicy::default();

        progress.mark_lesson_complete(&policy, course, lessons[0].id(), Utc::now());
        progress.mark_lesson_complete(&policy, course, lessons[1].id(), Utc::now());

        assert_eq!(
            next_uncompleted_lesson(&lessons, lessons[0].id(), &progress),
            Some(lessons[2].id())
        );
        assert_eq!(next_uncompleted_lesson(&lessons, lessons[3].id(), &progress), None);
    }

    #[test]
    fn lesson_response_reports_completion() {
        let course = Uuid::new_v4();
        let l = lesson(course, 0);
        let mut progress = UserProgress::default();
        progress.mark_lesson_complete(&PointsPolicy::default(), course, l.id(), Utc::now());

        let response = LessonResponse::new(l, &progress);
        assert!(response.completed);
    }
}

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::progress::{LessonProgress, UserProgress};

pub const DEFAULT_LESSON_POINTS: u32 = 50;
pub const DEFAULT_QUIZ_POINTS_PER_SCORE: u32 = 2;

/// How many points each kind of completion is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PointsPolicy {
    lesson_points: u32,
    quiz_points_per_score: u32,
}

impl Default for PointsPolicy {
    fn default() -> Self {
        Self {
            lesson_points: DEFAULT_LESSON_POINTS,
            quiz_points_per_score: DEFAULT_QUIZ_POINTS_PER_SCORE,
        }
    }
}

impl PointsPolicy {
    pub fn new(lesson_points: u32, quiz_points_per_score: u32) -> Self {
        Self {
            lesson_points,
            quiz_points_per_score,
        }
    }

    #[inline]
    pub fn lesson_points(&self) -> u32 {
        self.lesson_points
    }

    #[inline]
    pub fn quiz_points_per_score(&self) -> u32 {
        self.quiz_points_per_score
    }
}

// State transitions. Each returns the points it changed and leaves the
// user total and rank consistent with the courses.
impl UserProgress {
    /// Awards `lesson_points` the first time a lesson is completed, nothing
    /// afterwards.
    pub fn mark_lesson_complete(
        &mut self,
        policy: &PointsPolicy,
        course_id: Uuid,
        lesson_id: Uuid,
        now: DateTime<Utc>,
    ) -> u32 {
        let course = self.courses.entry(course_id).or_default();
        let lesson = course.lessons.entry(lesson_id).or_default();

        if lesson.completed {
            return 0;
        }

        *lesson = LessonProgress {
            completed: true,
            completed_at: Some(now),
        };

        let awarded = policy.lesson_points;
        course.total_points = course.total_points.saturating_add(awarded);
        self.recalculate_totals();
        awarded
    }

    /// Awards points for the improvement over the best previous score only.
    /// The stored score never goes down.
    pub fn mark_quiz_complete(
        &mut self,
        policy: &PointsPolicy,
        course_id: Uuid,
        quiz_id: Uuid,
        score: u32,
        now: DateTime<Utc>,
    ) -> u32 {
        let course = self.courses.entry(course_id).or_default();
        let quiz = course.quizzes.entry(quiz_id).or_default();

        let improvement = score.saturating_sub(quiz.score);
        let awarded = improvement.saturating_mul(policy.quiz_points_per_score);

        quiz.score = quiz.score.max(score);
        if !quiz.completed {
            quiz.completed = true;
            quiz.completed_at = Some(now);
        }

        course.total_points = course.total_points.saturating_add(awarded);
        self.recalculate_totals();
        awarded
    }

    /// Zeroes a course and returns the points removed from the user total.
    pub fn reset_course(&mut self, course_id: Uuid) -> u32 {
        let Some(course) = self.courses.get_mut(&course_id) else {
            return 0;
        };

        let removed = course.total_points;
        *course = Default::default();
        self.recalculate_totals();
        removed
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::progress::Rank;

    fn ids() -> (Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn lesson_completion_is_idempotent() {
        let policy = PointsPolicy::default();
        let mut progress = UserProgress::default();
        let (course, lesson) = ids();

        let first = progress.mark_lesson_complete(&policy, course, lesson, Utc::now());
        let completed_at = progress.courses[&course].lessons[&lesson].completed_at;
        let second = progress.mark_lesson_complete(&policy, course, lesson, Utc::now());

        assert_eq!(first, DEFAULT_LESSON_POINTS);
        assert_eq!(second, 0);
        assert_eq!(progress.total_points, DEFAULT_LESSON_POINTS);
        assert_eq!(
            progress.courses[&course].lessons[&lesson].completed_at,
            completed_at
        );
        assert!(progress.is_lesson_completed(course, lesson));
    }

    #[test]
    fn quiz_awards_only_improvement() {
        let policy = PointsPolicy::new(50, 2);
        let mut progress = UserProgress::default();
        let (course, quiz) = ids();

        assert_eq!(progress.mark_quiz_complete(&policy, course, quiz, 60, Utc::now()), 120);
        assert_eq!(progress.mark_quiz_complete(&policy, course, quiz, 80, Utc::now()), 40);
        assert_eq!(progress.total_points, 160);
        assert_eq!(progress.quiz(course, quiz).unwrap().score, 80);
    }

    #[test]
    fn quiz_lower_retake_awards_nothing() {
        let policy = PointsPolicy::default();
        let mut progress = UserProgress::default();
        let (course, quiz) = ids();

        progress.mark_quiz_complete(&policy, course, quiz, 90, Utc::now());
        let before = progress.total_points;

        assert_eq!(progress.mark_quiz_complete(&policy, course, quiz, 40, Utc::now()), 0);
        assert_eq!(progress.total_points, before);
        assert_eq!(progress.quiz(course, quiz).unwrap().score, 90);

        // retaking with the old best is not an improvement either
        assert_eq!(progress.mark_quiz_complete(&policy, course, quiz, 90, Utc::now()), 0);
    }

    #[test]
    fn quiz_zero_score_still_completes() {
        let policy = PointsPolicy::default();
        let mut progress = UserProgress::default();
        let (course, quiz) = ids();

        assert_eq!(progress.mark_quiz_complete(&policy, course, quiz, 0, Utc::now()), 0);
        let state = progress.quiz(course, quiz).unwrap();
        assert!(state.completed);
        assert!(state.completed_at.is_some());
    }

    #[test]
    fn reset_removes_exactly_course_points() {
        let policy = PointsPolicy::default();
        let mut progress = UserProgress::default();
        let (first, second) = ids();

        progress.mark_lesson_complete(&policy, first, Uuid::new_v4(), Utc::now());
        progress.mark_quiz_complete(&policy, first, Uuid::new_v4(), 70, Utc::now());
        progress.mark_lesson_complete(&policy, second, Uuid::new_v4(), Utc::now());

        let before = progress.total_points;
        let course_points = progress.courses[&first].total_points;
        let removed = progress.reset_course(first);

        assert_eq!(removed, course_points);
        assert_eq!(progress.total_points, before - course_points);
        let course = &progress.courses[&first];
        assert!(course.lessons.is_empty());
        assert!(course.quizzes.is_empty());
        assert_eq!(course.total_points, 0);
        assert_eq!(course.completion_percentage, 0.0);
    }

    #[test]
    fn reset_unknown_course_is_noop() {
        let mut progress = UserProgress::default();
        assert_eq!(progress.reset_course(Uuid::new_v4()), 0);
        assert!(progress.courses.is_empty());
    }

    #[test]
    fn lesson_can_be_completed_again_after_reset() {
        let policy = PointsPolicy::default();
        let mut progress = UserProgress::default();
        let (course, lesson) = ids();

        progress.mark_lesson_complete(&policy, course, lesson, Utc::now());
        progress.reset_course(course);
        assert_eq!(
            progress.mark_lesson_complete(&policy, course, lesson, Utc::now()),
            DEFAULT_LESSON_POINTS
        );
    }

    #[test]
    fn rank_follows_points() {
        let policy = PointsPolicy::new(500, 1);
        let mut progress = UserProgress::default();
        let course = Uuid::new_v4();

        for _ in 0..3 {
            progress.mark_lesson_complete(&policy, course, Uuid::new_v4(), Utc::now());
        }
        assert_eq!(progress.total_points, 1500);
        assert_eq!(progress.rank, Rank::Intermediate);

        progress.reset_course(course);
        assert_eq!(progress.rank, Rank::Novice);
    }

    #[test]
    fn policy_defaults_when_missing() {
        let policy: PointsPolicy = toml::from_str("lesson_points = 10").unwrap();
        assert_eq!(policy.lesson_points(), 10);
        assert_eq!(policy.quiz_points_per_score(), DEFAULT_QUIZ_POINTS_PER_SCORE);
    }
}

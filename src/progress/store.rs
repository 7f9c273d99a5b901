use chrono::Utc;
use uuid::Uuid;

use crate::error::log_error;
use crate::model::DatabaseResult;
use crate::progress::{PointsPolicy, Rank, UserProgress};

/// Whole-document storage for [`UserProgress`] snapshots.
#[async_trait::async_trait]
pub trait ProgressDocumentStore: Send + Sync {
    async fn load(&self, user_id: Uuid) -> DatabaseResult<Option<UserProgress>>;
    async fn save(&self, user_id: Uuid, progress: &UserProgress) -> DatabaseResult<()>;
}

/// Lookup of how many lessons and quizzes a course has. `None` if the course
/// is unknown.
#[async_trait::async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn course_size(&self, course_id: Uuid) -> DatabaseResult<Option<u32>>;
}

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    awarded: u32,
    removed: u32,
    progress: UserProgress,
    persisted: bool,
}

impl ProgressUpdate {
    pub fn awarded(&self) -> u32 {
        self.awarded
    }

    pub fn removed(&self) -> u32 {
        self.removed
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    /// `false` when the snapshot could not be written back. The failure has
    /// already been logged.
    pub fn persisted(&self) -> bool {
        self.persisted
    }
}

/// Read-modify-write of a user's progress document. Last write wins.
pub struct ProgressService<'a, S> {
    store: &'a S,
    policy: PointsPolicy,
}

impl<'a, S> ProgressService<'a, S>
where
    S: ProgressDocumentStore + CourseCatalog,
{
    pub fn new(store: &'a S, policy: PointsPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &PointsPolicy {
        &self.policy
    }

    /// Current document of the user, empty if nothing was stored yet.
    pub async fn snapshot(&self, user_id: Uuid) -> DatabaseResult<UserProgress> {
        let mut progress = self.store.load(user_id).await?.unwrap_or_default();
        progress.recalculate_totals();
        Ok(progress)
    }

    #[tracing::instrument(skip(self))]
    pub async fn mark_lesson_complete(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> DatabaseResult<ProgressUpdate> {
        let mut progress = self.snapshot(user_id).await?;
        let before = progress.rank;

        let awarded =
            progress.mark_lesson_complete(&self.policy, course_id, lesson_id, Utc::now());
        self.refresh_completion(&mut progress, course_id).await;

        tracing::debug!(awarded, total = progress.total_points, "lesson completed");
        log_rank_change(before, progress.rank);

        Ok(self.persist(user_id, progress, awarded, 0).await)
    }

    #[tracing::instrument(skip(self))]
    pub async fn mark_quiz_complete(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        quiz_id: Uuid,
        score: u32,
    ) -> DatabaseResult<ProgressUpdate> {
        let mut progress = self.snapshot(user_id).await?;
        let before = progress.rank;

        let awarded =
            progress.mark_quiz_complete(&self.policy, course_id, quiz_id, score, Utc::now());
        self.refresh_completion(&mut progress, course_id).await;

        tracing::debug!(awarded, total = progress.total_points, "quiz completed");
        log_rank_change(before, progress.rank);

        Ok(self.persist(user_id, progress, awarded, 0).await)
    }

    #[tracing::instrument(skip(self))]
    pub async fn reset_course_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> DatabaseResult<ProgressUpdate> {
        let mut progress = self.snapshot(user_id).await?;
        let before = progress.rank;

        let removed = progress.reset_course(course_id);

        tracing::debug!(removed, total = progress.total_points, "course progress reset");
        log_rank_change(before, progress.rank);

        Ok(self.persist(user_id, progress, 0, removed).await)
    }

    async fn refresh_completion(&self, progress: &mut UserProgress, course_id: Uuid) {
        let size = match self.store.course_size(course_id).await {
            Ok(Some(size)) => size,
            Ok(None) => {
                tracing::warn!(%course_id, "course size unknown, completion left as is");
                return;
            }
            Err(e) => {
                log_error(&e);
                return;
            }
        };

        if let Some(course) = progress.courses.get_mut(&course_id) {
            course.recalculate_completion(size);
        }
    }

    async fn persist(
        &self,
        user_id: Uuid,
        progress: UserProgress,
        awarded: u32,
        removed: u32,
    ) -> ProgressUpdate {
        let persisted = match self.store.save(user_id, &progress).await {
            Ok(()) => true,
            Err(e) => {
                log_error(&e);
                false
            }
        };

        ProgressUpdate {
            awarded,
            removed,
            progress,
            persisted,
        }
    }
}

fn log_rank_change(before: Rank, after: Rank) {
    if before != after {
        tracing::info!(%before, %after, "rank changed");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::DatabaseError;
    use crate::progress::MemoryProgressStore;
    use crate::progress::tracker::DEFAULT_LESSON_POINTS;

    #[tokio::test]
    async fn lesson_twice_awards_once() {
        let store = MemoryProgressStore::new();
        let course = Uuid::new_v4();
        store.set_course_size(course, 4);
        let service = ProgressService::new(&store, PointsPolicy::default());
        let user = Uuid::new_v4();
        let lesson = Uuid::new_v4();

        let first = service.mark_lesson_complete(user, course, lesson).await.unwrap();
        let second = service.mark_lesson_complete(user, course, lesson).await.unwrap();

        assert_eq!(first.awarded(), DEFAULT_LESSON_POINTS);
        assert_eq!(second.awarded(), 0);
        assert!(second.persisted());

        let stored = store.document(user).unwrap();
        assert_eq!(stored.total_points, DEFAULT_LESSON_POINTS);
        assert_eq!(stored.courses[&course].completion_percentage, 25.0);
    }

    #[tokio::test]
    async fn quiz_retake_lower_awards_zero() {
        let store = MemoryProgressStore::new();
        let service = ProgressService::new(&store, PointsPolicy::new(50, 1));
        let (user, course, quiz) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        let first = service.mark_quiz_complete(user, course, quiz, 75).await.unwrap();
        let retake = service.mark_quiz_complete(user, course, quiz, 30).await.unwrap();

        assert_eq!(first.awarded(), 75);
        assert_eq!(retake.awarded(), 0);
        assert_eq!(retake.progress().total_points, 75);
        assert_eq!(store.document(user).unwrap().quiz(course, quiz).unwrap().score, 75);
    }

    #[tokio::test]
    async fn reset_subtracts_course_points() {
        let store = MemoryProgressStore::new();
        let service = ProgressService::new(&store, PointsPolicy::new(100, 1));
        let (user, kept, reset) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        service.mark_lesson_complete(user, kept, Uuid::new_v4()).await.unwrap();
        service.mark_lesson_complete(user, reset, Uuid::new_v4()).await.unwrap();
        service.mark_quiz_complete(user, reset, Uuid::new_v4(), 40).await.unwrap();

        let before = service.snapshot(user).await.unwrap();
        let update = service.reset_course_progress(user, reset).await.unwrap();

        assert_eq!(update.removed(), 140);
        assert_eq!(update.progress().total_points, before.total_points - 140);
        assert_eq!(store.document(user).unwrap().total_points, 100);
    }

    #[tokio::test]
    async fn persist_failure_is_not_an_error() {
        let store = MemoryProgressStore::new();
        store.fail_writes(true);
        let service = ProgressService::new(&store, PointsPolicy::default());
        let user = Uuid::new_v4();

        let update = service
            .mark_lesson_complete(user, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();

        assert!(!update.persisted());
        assert_eq!(update.awarded(), DEFAULT_LESSON_POINTS);
        assert!(store.document(user).is_none());
    }

    #[tokio::test]
    async fn load_failure_aborts_without_writing() {
        let store = MemoryProgressStore::new();
        let service = ProgressService::new(&store, PointsPolicy::default());
        let (user, course) = (Uuid::new_v4(), Uuid::new_v4());

        service.mark_lesson_complete(user, course, Uuid::new_v4()).await.unwrap();
        store.fail_reads(true);

        let result = service.mark_lesson_complete(user, course, Uuid::new_v4()).await;
        assert!(matches!(result, Err(DatabaseError::Unavailable(_))));
        assert!(service.reset_course_progress(user, course).await.is_err());

        store.fail_reads(false);
        assert_eq!(store.document(user).unwrap().total_points, DEFAULT_LESSON_POINTS);
    }

    #[tokio::test]
    async fn catalog_failure_keeps_completion() {
        let store = MemoryProgressStore::new();
        let service = ProgressService::new(&store, PointsPolicy::default());
        let (user, course) = (Uuid::new_v4(), Uuid::new_v4());
        store.set_course_size(course, 2);

        let first = service.mark_lesson_complete(user, course, Uuid::new_v4()).await.unwrap();
        assert_eq!(first.progress().courses[&course].completion_percentage, 50.0);

        store.fail_catalog(true);
        let second = service.mark_lesson_complete(user, course, Uuid::new_v4()).await.unwrap();

        assert_eq!(second.awarded(), DEFAULT_LESSON_POINTS);
        assert!(second.persisted());
        assert_eq!(second.progress().courses[&course].completion_percentage, 50.0);
    }

    #[tokio::test]
    async fn unknown_course_size_keeps_completion() {
        let store = MemoryProgressStore::new();
        let service = ProgressService::new(&store, PointsPolicy::default());
        let (user, course) = (Uuid::new_v4(), Uuid::new_v4());

        let update = service
            .mark_quiz_complete(user, course, Uuid::new_v4(), 10)
            .await
            .unwrap();

        assert_eq!(update.progress().courses[&course].completion_percentage, 0.0);
        assert_eq!(update.awarded(), 20);
    }

    #[tokio::test]
    async fn snapshot_of_unknown_user_is_empty() {
        let store = MemoryProgressStore::new();
        let service = ProgressService::new(&store, PointsPolicy::default());

        let progress = service.snapshot(Uuid::new_v4()).await.unwrap();
        assert_eq!(progress, UserProgress::default());
    }

    #[tokio::test]
    async fn snapshot_repairs_stale_totals() {
        let store = MemoryProgressStore::new();
        let user = Uuid::new_v4();
        let mut stale = UserProgress::default();
        stale.courses.insert(
            Uuid::new_v4(),
            crate::progress::CourseProgress {
                total_points: 600,
                ..Default::default()
            },
        );
        store.save(user, &stale).await.unwrap();

        let service = ProgressService::new(&store, PointsPolicy::default());
        let progress = service.snapshot(user).await.unwrap();
        assert_eq!(progress.total_points, 600);
        assert_eq!(progress.rank, Rank::Beginner);
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::LeaderboardRow;
use crate::progress::{CourseProgress, ProgressUpdate, Rank, UserProgress};

/// Dashboard view of the current user's progress.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub username: String,
    pub total_points: u32,
    pub rank: Rank,
    pub next_rank: Option<Rank>,
    pub points_to_next_rank: Option<u32>,
    pub completed_lessons: usize,
    pub completed_quizzes: usize,
    pub courses: BTreeMap<Uuid, CourseProgress>,
}

impl DashboardResponse {
    pub fn new(username: String, progress: UserProgress) -> Self {
        Self {
            username,
            total_points: progress.total_points,
            rank: progress.rank,
            next_rank: progress.rank.next(),
            points_to_next_rank: Rank::points_to_next_rank(progress.total_points),
            completed_lessons: progress.completed_lessons(),
            completed_quizzes: progress.completed_quizzes(),
            courses: progress.courses,
        }
    }
}

/// Result of a progress mutation.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProgressChangeResponse {
    pub awarded: u32,
    pub removed: u32,
    pub total_points: u32,
    pub rank: Rank,
    pub course: CourseProgress,
    /// `false` if the snapshot could not be saved, the change is then lost
    /// on the next read.
    pub persisted: bool,
}

impl ProgressChangeResponse {
    pub fn new(update: &ProgressUpdate, course_id: Uuid) -> Self {
        let progress = update.progress();
        Self {
            awarded: update.awarded(),
            removed: update.removed(),
            total_points: progress.total_points,
            rank: progress.rank,
            course: progress.course(course_id).cloned().unwrap_or_default(),
            persisted: update.persisted(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

impl LeaderboardQuery {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LeaderboardEntry {
    pub position: usize,
    pub user_id: Uuid,
    pub username: String,
    pub total_points: u32,
    pub rank: Rank,
}

impl LeaderboardEntry {
    pub fn from_rows(rows: Vec<LeaderboardRow>) -> Vec<Self> {
        rows.into_iter()
            .enumerate()
            .map(|(i, row)| Self {
                position: i + 1,
                user_id: row.user_id,
                total_points: row.points(),
                rank: row.rank(),
                username: row.username,
            })
            .collect()
    }
}

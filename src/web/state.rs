use crate::model::ModelManager;
use crate::progress::{PointsPolicy, ProgressService};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    policy: PointsPolicy,
}

impl AppState {
    pub fn new(mm: ModelManager, policy: PointsPolicy) -> Self {
        Self { mm, policy }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    /// Progress operations backed by the `user_progress` documents.
    pub fn progress(&self) -> ProgressService<'_, ModelManager> {
        ProgressService::new(&self.mm, self.policy)
    }
}

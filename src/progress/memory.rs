use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::model::{DatabaseError, DatabaseResult};
use crate::progress::{CourseCatalog, ProgressDocumentStore, UserProgress};

/// In-process document store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    documents: Mutex<HashMap<Uuid, UserProgress>>,
    course_sizes: Mutex<HashMap<Uuid, u32>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_catalog: AtomicBool,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_course_size(&self, course_id: Uuid, size: u32) {
        self.course_sizes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(course_id, size);
    }

    /// Makes every following `load` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every following `course_size` lookup fail.
    pub fn fail_catalog(&self, fail: bool) {
        self.fail_catalog.store(fail, Ordering::SeqCst);
    }

    /// Makes every following `save` fail, to simulate an unreachable store.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn document(&self, user_id: Uuid) -> Option<UserProgress> {
        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .cloned()
    }
}

#[async_trait::async_trait]
impl ProgressDocumentStore for MemoryProgressStore {
    async fn load(&self, user_id: Uuid) -> DatabaseResult<Option<UserProgress>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable(String::from(
                "memory store rejects reads",
            )));
        }

        Ok(self.document(user_id))
    }

    async fn save(&self, user_id: Uuid, progress: &UserProgress) -> DatabaseResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable(String::from(
                "memory store rejects writes",
            )));
        }

        self.documents
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user_id, progress.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl CourseCatalog for MemoryProgressStore {
    async fn course_size(&self, course_id: Uuid) -> DatabaseResult<Option<u32>> {
        if self.fail_catalog.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable(String::from(
                "memory catalog is unreachable",
            )));
        }

        Ok(self
            .course_sizes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&course_id)
            .copied())
    }
}

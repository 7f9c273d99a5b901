//! Learner progress: completion state, points and rank.

mod rank;
pub use rank::{Rank, UnknownRank};

mod document;
pub use document::{CourseProgress, LessonProgress, QuizProgress, UserProgress};

mod tracker;
pub use tracker::{DEFAULT_LESSON_POINTS, DEFAULT_QUIZ_POINTS_PER_SCORE, PointsPolicy};

mod store;
pub use store::{CourseCatalog, ProgressDocumentStore, ProgressService, ProgressUpdate};

mod memory;
pub use memory::MemoryProgressStore;

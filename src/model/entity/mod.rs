mod user;
pub use user::{UserEntity, UserEntityCreateUpdate};

mod course;
pub use course::{Course, CourseCreate, CourseWithContentRow};

mod lesson;
pub use lesson::{Lesson, LessonCreate};

mod quiz;
pub use quiz::{Quiz, QuizCreate};

mod progress_document;
pub use progress_document::{LeaderboardRow, ProgressDocument};

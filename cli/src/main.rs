use clap::{Parser, Subcommand};
use skillpath::Config;
use skillpath::error::{AppError, AppResult};
use skillpath::model::entity::{
    Course, CourseCreate, Lesson, LessonCreate, Quiz, QuizCreate, UserEntity,
    UserEntityCreateUpdate,
};
use skillpath::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use skillpath::progress::{ProgressService, ProgressUpdate};
use skillpath::web::{AuthenticatedUser, UserRole};

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the course DB and inspecting progress", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Manage quizzes
    Quiz {
        #[command(subcommand)]
        action: QuizCommands,
    },

    /// Inspect or reset learner progress
    Progress {
        #[command(subcommand)]
        action: ProgressCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// "admin" or "user"
        #[arg(long, default_value = "user")]
        role: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        /// Course title to attach the lesson to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with lesson content
        #[arg(long)]
        file: String,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuizCommands {
    Add {
        /// Course title to attach the quiz to
        #[arg(long)]
        course_title: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = 100)]
        max_score: i32,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProgressCommands {
    Show {
        #[arg(long)]
        username: String,
    },
    Reset {
        #[arg(long)]
        username: String,
        #[arg(long)]
        course_title: String,
    },
}

async fn course_by_title(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    title: &str,
) -> AppResult<Course> {
    Course::find_by_title(mm, actor, title)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("course '{title}'")))
}

async fn user_by_name(
    mm: &ModelManager,
    actor: &AuthenticatedUser,
    username: &str,
) -> AppResult<UserEntity> {
    UserEntity::find_by_username(mm, actor, username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{username}'")))
}

/// Report line for `progress reset`. A reset that was not written back is an
/// error, the stored document still holds the old points.
fn reset_summary(update: &ProgressUpdate) -> AppResult<String> {
    if !update.persisted() {
        return Err(AppError::DatabaseError(DatabaseError::Unavailable(
            String::from("course reset was not saved, progress is unchanged"),
        )));
    }

    Ok(format!(
        "Removed {} points, {} left (rank {})",
        update.removed(),
        update.progress().total_points,
        update.progress().rank
    ))
}

#[tokio::main]
async fn main() -> AppResult<()> {
    skillpath::setup_trace();
    let args = Cli::parse();

    let config = Config::parse(&skillpath::config::read_config(true)?)?;
    let database_uri = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| config.app().database_uri().to_owned());

    let db_con = DbConnection::connect(&database_uri)?;
    db_con.migrate().await?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { username, password, role } => {
                let mut user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        username,
                        password_hash: skillpath::auth::hash_password(&password)?,
                    },
                )
                .await?;

                let role = UserRole::from(role.as_str());
                if role != UserRole::User {
                    user = user.set_role(&mm, &actor, role).await?;
                }
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add { title, description, order_index } => {
                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        title,
                        description,
                        order_index: Some(order_index),
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add { course_title, title, file, order_index } => {
                let course = course_by_title(&mm, &actor, &course_title).await?;

                let content = std::fs::read_to_string(file)?;
                let lesson = Lesson::create(
                    &mm,
                    &actor,
                    LessonCreate {
                        course_id: course.id(),
                        title,
                        content,
                        order_index: Some(order_index),
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },

        Commands::Quiz { action } => match action {
            QuizCommands::Add { course_title, title, description, max_score, order_index } => {
                let course = course_by_title(&mm, &actor, &course_title).await?;

                let quiz = Quiz::create(
                    &mm,
                    &actor,
                    QuizCreate {
                        course_id: course.id(),
                        title,
                        description,
                        max_score,
                        order_index: Some(order_index),
                    },
                )
                .await?;
                println!("Quiz created: {:?}", quiz);
            }
        },

        Commands::Progress { action } => {
            let service = ProgressService::new(&mm, *config.progress());

            match action {
                ProgressCommands::Show { username } => {
                    let user = user_by_name(&mm, &actor, &username).await?;
                    let progress = service.snapshot(user.id()).await?;

                    println!(
                        "{}: {} points, rank {}",
                        user.username(),
                        progress.total_points,
                        progress.rank
                    );
                    for (course_id, course) in &progress.courses {
                        println!(
                            "  {course_id}: {} points, {:.1}% complete",
                            course.total_points, course.completion_percentage
                        );
                    }
                }

                ProgressCommands::Reset { username, course_title } => {
                    let user = user_by_name(&mm, &actor, &username).await?;
                    let course = course_by_title(&mm, &actor, &course_title).await?;

                    let update = service.reset_course_progress(user.id(), course.id()).await?;
                    println!("{}", reset_summary(&update)?);
                }
            }
        }
    }

    Ok(())
}

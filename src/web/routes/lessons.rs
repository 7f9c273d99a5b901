use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, DatabaseResult, ResourceTyped,
        entity::{Lesson, ProgressDocument},
    },
    progress::{CourseCatalog, ProgressDocumentStore, ProgressService},
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            lessons::{LessonCompleteResponse, LessonResponse, next_uncompleted_lesson},
            progress::ProgressChangeResponse,
        },
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}", get(lessons_get_handler))
        .route("/{id}/complete", post(lessons_complete_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{lesson_id}",
    description = "Fetch comprehensive info about lesson including its content",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to get")
    ),
    responses(
        (status = 200, description = "Lesson found", body = LessonResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lesson = Lesson::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let progress = state
        .progress()
        .snapshot(user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(ProgressDocument::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(LessonResponse::new(lesson, &progress))))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{lesson_id}/complete",
    description = "Mark lesson as completed. Points are awarded on the first completion only",
    params(
        ("lesson_id" = Uuid, Path, description = "ID of the lesson to mark")
    ),
    responses(
        (status = 200, description = "Lesson marked", body = LessonCompleteResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 401, description = "You're not allowed to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "lessons"
)]
async fn lessons_complete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lesson = Lesson::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Lesson::get_resource_type()))?;

    let siblings = Lesson::all_by_course(state.pool(), user, lesson.course_id());
    let response = complete_lesson(&state.progress(), user.user_id(), &lesson, siblings).await?;

    Ok((StatusCode::OK, Json(response)))
}

/// Marks `lesson` complete once the lessons of its course are known, so a
/// failed lookup leaves the stored progress untouched.
async fn complete_lesson<S, F>(
    service: &ProgressService<'_, S>,
    user_id: Uuid,
    lesson: &Lesson,
    siblings: F,
) -> WebResult<LessonCompleteResponse>
where
    S: ProgressDocumentStore + CourseCatalog,
    F: Future<Output = DatabaseResult<Vec<Lesson>>>,
{
    let course_id = lesson.course_id();
    let siblings = siblings
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    let update = service
        .mark_lesson_complete(user_id, course_id, lesson.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(ProgressDocument::get_resource_type(), e))?;

    Ok(LessonCompleteResponse {
        change: ProgressChangeResponse::new(&update, course_id),
        next_lesson_id: next_uncompleted_lesson(&siblings, lesson.id(), update.progress()),
    })
}

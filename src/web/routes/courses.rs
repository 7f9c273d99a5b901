use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::{
    model::{
        ResourceTyped,
        entity::{Course, CourseWithContentRow, ProgressDocument},
    },
    web::{
        AppState, RequestContext, WebError, WebResult, dto::courses::CourseOverview,
        error::ErrorResponse, middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(courses_list_handler))
        .route("/{id}", get(courses_get_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    description = "List ALL courses with their lessons, quizzes and the caller's progress in them",
    responses(
        (status = 200, description = "Successfully collected courses", body = Vec<CourseOverview>),
        (status = 401, description = "You had to be authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn courses_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let service = state.progress();

    let (rows, progress) = tokio::try_join!(
        CourseWithContentRow::fetch_all(state.pool(), user),
        service.snapshot(user.user_id()),
    )
    .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let courses = CourseOverview::from_rows(rows, &progress)
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(courses)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}",
    description = "Fetch a single course with its lessons, quizzes and the caller's progress",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course to get")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseOverview),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("cookie" = [])
    )
)]
async fn courses_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let row = CourseWithContentRow::fetch_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    let progress = state
        .progress()
        .snapshot(user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(ProgressDocument::get_resource_type(), e))?;

    let course = CourseOverview::from_row(row, &progress)
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(course)))
}

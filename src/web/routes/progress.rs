use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Course, LeaderboardRow, ProgressDocument, UserEntity},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::progress::{
            DashboardResponse, LeaderboardEntry, LeaderboardQuery, ProgressChangeResponse,
        },
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(progress_get_handler))
        .route("/courses/{id}", delete(progress_reset_handler))
        .route("/leaderboard", get(progress_leaderboard_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/progress",
    description = "Get current user's dashboard: points, rank and per-course progress",
    responses(
        (status = 200, description = "Progress found", body = DashboardResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(
        ("cookie" = [])
    )
)]
async fn progress_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let progress = state
        .progress()
        .snapshot(user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(ProgressDocument::get_resource_type(), e))?;

    let res = DashboardResponse::new(found.username().to_owned(), progress);

    Ok((StatusCode::OK, Json(res)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/progress/courses/{course_id}",
    description = "Forget everything done in a course and take back the points it gave",
    params(
        ("course_id" = Uuid, Path, description = "ID of the course to reset")
    ),
    responses(
        (status = 200, description = "Course progress reset", body = ProgressChangeResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(
        ("cookie" = [])
    )
)]
async fn progress_reset_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let course = Course::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Course::get_resource_type()))?;

    let update = state
        .progress()
        .reset_course_progress(user.user_id(), course.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(ProgressDocument::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ProgressChangeResponse::new(&update, course.id())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/progress/leaderboard",
    description = "Users ordered by total points",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard collected", body = Vec<LeaderboardEntry>),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "progress",
    security(
        ("cookie" = [])
    )
)]
async fn progress_leaderboard_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> WebResult<impl IntoResponse> {
    // any signed-in user may see the board
    ctx.user()?;

    let rows = LeaderboardRow::top(state.pool(), query.limit())
        .await
        .map_err(|e| WebError::resource_fetch_error(LeaderboardRow::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(LeaderboardEntry::from_rows(rows))))
}

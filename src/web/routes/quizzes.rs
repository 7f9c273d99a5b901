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
        CrudRepository, ResourceTyped,
        entity::{ProgressDocument, Quiz},
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            progress::ProgressChangeResponse,
            quizzes::{QuizResponse, QuizSubmitRequest},
        },
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/{id}", get(quizzes_get_handler))
        .route("/{id}/submit", post(quizzes_submit_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/quizzes/{quiz_id}",
    description = "Fetch a quiz together with the caller's best score",
    params(
        ("quiz_id" = Uuid, Path, description = "ID of the quiz to get")
    ),
    responses(
        (status = 200, description = "Quiz found", body = QuizResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quizzes_get_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let quiz = Quiz::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))?;

    let progress = state
        .progress()
        .snapshot(user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(ProgressDocument::get_resource_type(), e))?;

    Ok((StatusCode::OK, Json(QuizResponse::new(quiz, &progress))))
}

#[utoipa::path(
    post,
    path = "/api/v1/quizzes/{quiz_id}/submit",
    description = "Record a quiz result. Only an improvement over the best previous score earns points",
    request_body = QuizSubmitRequest,
    params(
        ("quiz_id" = Uuid, Path, description = "ID of the quiz taken")
    ),
    responses(
        (status = 200, description = "Result recorded", body = ProgressChangeResponse),
        (status = 400, description = "Score out of range", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
        (status = 401, description = "You're not authorized to do this", body = ErrorResponse),
        (status = 500, description = "Internal Server Error", body = ErrorResponse),
    ),
    security(
        ("cookie" = [])
    ),
    tag = "quizzes"
)]
async fn quizzes_submit_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ctx: RequestContext,
    Json(req): Json<QuizSubmitRequest>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let quiz = Quiz::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Quiz::get_resource_type(), e))?
        .ok_or_else(|| WebError::resource_not_found(Quiz::get_resource_type()))?;

    if !quiz.accepts_score(req.score) {
        return Err(WebError::resource_bad_request(
            Quiz::get_resource_type(),
            format!("score must be between 0 and {}", quiz.max_score()),
        ));
    }
    // accepts_score guarantees 0..=i32::MAX
    let score = u32::try_from(req.score).unwrap_or_default();

    let update = state
        .progress()
        .mark_quiz_complete(user.user_id(), quiz.course_id(), quiz.id(), score)
        .await
        .map_err(|e| WebError::resource_fetch_error(ProgressDocument::get_resource_type(), e))?;

    Ok((
        StatusCode::OK,
        Json(ProgressChangeResponse::new(&update, quiz.course_id())),
    ))
}

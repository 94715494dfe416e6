use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::tutor::{OpenSessionRequest, SendMessageRequest, TutorSessionResponse},
    error::AppError,
    services::tutor_service,
    state::SharedState,
};

/// Server-hosted tutor session routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/tutor/sessions", post(open_session))
        .route(
            "/tutor/sessions/{id}",
            get(get_session).delete(close_session),
        )
        .route("/tutor/sessions/{id}/messages", post(send_message))
        .route("/tutor/sessions/{id}/reset", post(reset_session))
}

/// Open a tutor session for a game and wait for the welcome turn.
#[utoipa::path(
    post,
    path = "/tutor/sessions",
    tag = "tutor",
    request_body = OpenSessionRequest,
    responses(
        (status = 201, description = "Session opened", body = TutorSessionResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn open_session(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<OpenSessionRequest>>,
) -> Result<(StatusCode, Json<TutorSessionResponse>), AppError> {
    let (id, snapshot) = tutor_service::open_session(&state, &payload.game).await?;
    Ok((
        StatusCode::CREATED,
        Json(TutorSessionResponse::new(id, snapshot)),
    ))
}

/// Current state of a tutor session.
#[utoipa::path(
    get,
    path = "/tutor/sessions/{id}",
    tag = "tutor",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session state", body = TutorSessionResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TutorSessionResponse>, AppError> {
    let snapshot = tutor_service::get_session(&state, id).await?;
    Ok(Json(TutorSessionResponse::new(id, snapshot)))
}

/// Send a user turn and wait for the reply (or the apology turn).
#[utoipa::path(
    post,
    path = "/tutor/sessions/{id}/messages",
    tag = "tutor",
    params(("id" = Uuid, Path, description = "Session identifier")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Updated session", body = TutorSessionResponse),
        (status = 400, description = "Empty message"),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "A response is still pending")
    )
)]
pub async fn send_message(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SendMessageRequest>>,
) -> Result<Json<TutorSessionResponse>, AppError> {
    let snapshot = tutor_service::send_message(&state, id, &payload.content).await?;
    Ok(Json(TutorSessionResponse::new(id, snapshot)))
}

/// Clear the conversation and request a new welcome.
#[utoipa::path(
    post,
    path = "/tutor/sessions/{id}/reset",
    tag = "tutor",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session restarted", body = TutorSessionResponse),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Session not active or busy")
    )
)]
pub async fn reset_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TutorSessionResponse>, AppError> {
    let snapshot = tutor_service::reset_session(&state, id).await?;
    Ok(Json(TutorSessionResponse::new(id, snapshot)))
}

/// Close a session and drop its transcript.
#[utoipa::path(
    delete,
    path = "/tutor/sessions/{id}",
    tag = "tutor",
    params(("id" = Uuid, Path, description = "Session identifier")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn close_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    tutor_service::close_session(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! REST API routes for the reviewer assignment service.
//!
//! Handlers parse the request, call into [`ReviewService`] and wrap the
//! result in the JSON envelope clients expect.

use crate::error::{AppError, Conflict};
use crate::models::{NewPullRequest, NewTeam, PullRequest, Team, User};
use crate::review::{Reassignment, UserReviews};
use crate::services::review_service::ReviewService;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

/// Shared state for the axum routes.
#[derive(Clone)]
pub struct ApiState {
    pub service: ReviewService,
}

// ── Error handling ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ApiError {
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ApiError,
}

/// Wrapper to make AppError usable as an axum error response.
pub struct ApiErr(pub AppError);

/// HTTP status for each error kind.
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        AppError::AlreadyExists {
            kind: Conflict::Team,
            ..
        } => StatusCode::BAD_REQUEST,
        AppError::AlreadyExists {
            kind: Conflict::PullRequest,
            ..
        }
        | AppError::PrMerged { .. }
        | AppError::NotAssigned { .. }
        | AppError::NoCandidate { .. } => StatusCode::CONFLICT,
        AppError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if self.0.is_internal() {
            log::error!("[api] {}", self.0);
        } else {
            log::debug!("[api] {} {:?}", self.0.code(), self.0);
        }
        (
            status,
            Json(ErrorBody {
                error: ApiError {
                    code: self.0.code(),
                    message: self.0.to_string(),
                },
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_input(format!(
            "invalid json: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        Self(AppError::invalid_input(rejection.body_text()))
    }
}

// ── Request and response types ───────────────────────────────────────────────

#[derive(Deserialize)]
struct TeamQuery {
    team_name: String,
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: String,
}

#[derive(Deserialize)]
struct SetActiveRequest {
    user_id: String,
    is_active: bool,
}

#[derive(Deserialize)]
struct MergeRequest {
    pull_request_id: String,
}

#[derive(Deserialize)]
struct ReassignRequest {
    pull_request_id: String,
    old_user_id: String,
}

#[derive(Serialize)]
struct TeamResponse {
    team: Team,
}

#[derive(Serialize)]
struct UserResponse {
    user: User,
}

#[derive(Serialize)]
struct PullRequestResponse {
    pr: PullRequest,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

// ── Route builder ────────────────────────────────────────────────────────────

/// Build the API routes.
pub fn api_routes() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .route("/team/add", post(add_team))
        .route("/team/get", get(get_team))
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_review))
        .route("/pullRequest/create", post(create_pull_request))
        .route("/pullRequest/merge", post(merge_pull_request))
        .route("/pullRequest/reassign", post(reassign_reviewer))
}

/// Routes with state applied, ready to serve or to drive from tests.
pub fn router(service: ReviewService) -> Router {
    api_routes().with_state(ApiState { service })
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn add_team(
    State(state): State<ApiState>,
    body: Result<Json<NewTeam>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiErr> {
    let Json(input) = body?;
    let team = state.service.add_team(input).await?;
    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

async fn get_team(
    State(state): State<ApiState>,
    query: Result<Query<TeamQuery>, QueryRejection>,
) -> Result<Json<Team>, ApiErr> {
    let Query(query) = query?;
    let team = state.service.get_team(&query.team_name).await?;
    Ok(Json(team))
}

async fn set_is_active(
    State(state): State<ApiState>,
    body: Result<Json<SetActiveRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiErr> {
    let Json(req) = body?;
    let user = state
        .service
        .set_user_active(&req.user_id, req.is_active)
        .await?;
    Ok(Json(UserResponse { user }))
}

async fn get_review(
    State(state): State<ApiState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> Result<Json<UserReviews>, ApiErr> {
    let Query(query) = query?;
    let reviews = state.service.reviews_for_user(&query.user_id).await?;
    Ok(Json(reviews))
}

async fn create_pull_request(
    State(state): State<ApiState>,
    body: Result<Json<NewPullRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestResponse>), ApiErr> {
    let Json(input) = body?;
    let pr = state.service.create_pull_request(input).await?;
    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

async fn merge_pull_request(
    State(state): State<ApiState>,
    body: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<PullRequestResponse>, ApiErr> {
    let Json(req) = body?;
    let pr = state.service.merge_pull_request(&req.pull_request_id).await?;
    Ok(Json(PullRequestResponse { pr }))
}

async fn reassign_reviewer(
    State(state): State<ApiState>,
    body: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<Reassignment>, ApiErr> {
    let Json(req) = body?;
    let result = state
        .service
        .reassign_reviewer(&req.pull_request_id, &req.old_user_id)
        .await?;
    Ok(Json(result))
}

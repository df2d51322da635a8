//! HTTP route handlers for the copilot API.

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use copilot::core::payload::{
    ChatRequest, ChatResponse, CreatePrRequest, CreatePrResponse, DocsRequest, DocsResponse,
    PrReviewRequest, ReviewResponse, TemplateRequest, TemplateResponse,
};
use copilot::service::ServiceError;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/generate/template", post(generate_template))
        .route("/review/pr", post(review_pr))
        .route("/generate/docs", post(generate_docs))
        .route("/chat", post(chat))
        .route("/github/create_pr", post(create_pr))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Handler error rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            warn!(error = %err, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

/// POST /api/generate/template - generate and validate a DevOps artifact.
async fn generate_template(
    State(state): State<AppState>,
    payload: Result<Json<TemplateRequest>, JsonRejection>,
) -> Result<Json<TemplateResponse>, ApiError> {
    let Json(payload) = payload?;
    Ok(Json(state.copilot.generate_template(payload).await?))
}

/// POST /api/review/pr - review a diff.
async fn review_pr(
    State(state): State<AppState>,
    payload: Result<Json<PrReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let Json(payload) = payload?;
    Ok(Json(state.copilot.review_pr(payload).await?))
}

/// POST /api/generate/docs - generate a README.
async fn generate_docs(
    State(state): State<AppState>,
    payload: Result<Json<DocsRequest>, JsonRejection>,
) -> Result<Json<DocsResponse>, ApiError> {
    let Json(payload) = payload?;
    Ok(Json(state.copilot.generate_docs(payload).await?))
}

/// POST /api/chat - free-form question; empty message is a 400.
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload?;
    Ok(Json(state.copilot.chat(payload).await?))
}

/// POST /api/github/create_pr - commit files and open a pull request.
async fn create_pr(
    State(state): State<AppState>,
    payload: Result<Json<CreatePrRequest>, JsonRejection>,
) -> Result<Json<CreatePrResponse>, ApiError> {
    let Json(payload) = payload?;
    Ok(Json(state.copilot.create_pr_on_github(payload).await?))
}

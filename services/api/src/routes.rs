use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use leadgate::chat::ChatMessage;
use leadgate::leads::{
    contact_router, CaptchaVerifier, ContactService, Mailer, SubmissionId, SubmissionPatch,
    SubmissionStatus, SubmissionStore,
};

use crate::infra::{session_token, AppState, SESSION_COOKIE, SESSION_TTL_HOURS};

/// Full site router: the public contact endpoint, the admin surface, the
/// chat endpoint, and the operational endpoints.
pub(crate) fn site_router<S, M, C>(service: Arc<ContactService<S, M, C>>) -> Router
where
    S: SubmissionStore + 'static,
    M: Mailer + 'static,
    C: CaptchaVerifier + 'static,
{
    let admin = Router::new()
        .route("/admin/login", post(login_endpoint))
        .route(
            "/admin/submissions",
            get(admin_list_endpoint::<S, M, C>)
                .put(admin_update_endpoint::<S, M, C>)
                .delete(admin_delete_endpoint::<S, M, C>),
        )
        .with_state(service.clone());

    contact_router(service)
        .merge(admin)
        .route("/chat", post(chat_endpoint))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) password: String,
}

pub(crate) async fn login_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<LoginRequest>,
) -> Response {
    let rejected = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        )
            .into_response()
    };

    let Some(credentials) = state.admin.as_ref() else {
        return rejected();
    };
    if credentials.username != request.username || credentials.password != request.password {
        return rejected();
    }

    let token = state.sessions.issue(Utc::now());
    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict{}",
        SESSION_TTL_HOURS * 60 * 60,
        if state.secure_cookies { "; Secure" } else { "" }
    );

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true })),
    )
        .into_response()
}

pub(crate) async fn admin_list_endpoint<S, M, C>(
    State(service): State<Arc<ContactService<S, M, C>>>,
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Response
where
    S: SubmissionStore + 'static,
    M: Mailer + 'static,
    C: CaptchaVerifier + 'static,
{
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    match service.list(Utc::now()) {
        Ok(submissions) => (StatusCode::OK, Json(submissions)).into_response(),
        Err(err) => {
            error!(%err, "failed to list submissions");
            internal_error()
        }
    }
}

/// Admin edit payload. Mutable fields only; anything else (identifier
/// changes, creation timestamps, typos) fails deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct UpdateSubmissionRequest {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    pub(crate) company: Option<String>,
    #[serde(default)]
    pub(crate) subject: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<SubmissionStatus>,
}

impl UpdateSubmissionRequest {
    fn into_parts(self) -> (SubmissionId, SubmissionPatch) {
        (
            SubmissionId(self.id),
            SubmissionPatch {
                name: self.name,
                email: self.email,
                phone: self.phone,
                company: self.company,
                subject: self.subject,
                message: self.message,
                status: self.status,
            },
        )
    }
}

pub(crate) async fn admin_update_endpoint<S, M, C>(
    State(service): State<Arc<ContactService<S, M, C>>>,
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpdateSubmissionRequest>, JsonRejection>,
) -> Response
where
    S: SubmissionStore + 'static,
    M: Mailer + 'static,
    C: CaptchaVerifier + 'static,
{
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.body_text() })),
            )
                .into_response();
        }
    };

    let (id, patch) = request.into_parts();
    match service.update(&id, patch) {
        Ok(Some(submission)) => (
            StatusCode::OK,
            Json(json!({ "success": true, "submission": submission })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Submission not found" })),
        )
            .into_response(),
        Err(err) => {
            error!(%err, "failed to update submission");
            internal_error()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteParams {
    pub(crate) id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteBody {
    pub(crate) ids: Vec<String>,
}

pub(crate) async fn admin_delete_endpoint<S, M, C>(
    State(service): State<Arc<ContactService<S, M, C>>>,
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(params): Query<DeleteParams>,
    body: Option<Json<DeleteBody>>,
) -> Response
where
    S: SubmissionStore + 'static,
    M: Mailer + 'static,
    C: CaptchaVerifier + 'static,
{
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let outcome = if let Some(id) = params.id {
        service.delete(&SubmissionId(id))
    } else if let Some(Json(body)) = body {
        let ids: Vec<SubmissionId> = body.ids.into_iter().map(SubmissionId).collect();
        service.delete_many(&ids)
    } else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing ID or IDs" })),
        )
            .into_response();
    };

    match outcome {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(err) => {
            error!(%err, "failed to delete submissions");
            internal_error()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChatRequest {
    #[serde(default)]
    pub(crate) messages: Vec<ChatMessage>,
    pub(crate) user_message: ChatMessage,
}

pub(crate) async fn chat_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let Some(client) = state.chat.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Chat is not configured" })),
        )
            .into_response();
    };

    match client
        .answer(&request.messages, &request.user_message.text)
        .await
    {
        Ok(text) => (StatusCode::OK, Json(json!({ "text": text }))).into_response(),
        Err(err) => {
            error!(%err, "chat model call failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    session_token(headers)
        .map(|token| state.sessions.is_valid(token, Utc::now()))
        .unwrap_or(false)
}

/// Deliberately uniform: the body never says whether the cookie was
/// missing, unknown, or expired.
fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;
use tracing::error;

use super::captcha::CaptchaVerifier;
use super::domain::ContactRequest;
use super::notify::Mailer;
use super::service::{ContactService, SubmitError};
use super::store::SubmissionStore;

/// Router builder exposing the public contact-form endpoint.
pub fn contact_router<S, M, C>(service: Arc<ContactService<S, M, C>>) -> Router
where
    S: SubmissionStore + 'static,
    M: Mailer + 'static,
    C: CaptchaVerifier + 'static,
{
    Router::new()
        .route("/contact", post(contact_handler::<S, M, C>))
        .with_state(service)
}

pub(crate) async fn contact_handler<S, M, C>(
    State(service): State<Arc<ContactService<S, M, C>>>,
    axum::Json(request): axum::Json<ContactRequest>,
) -> Response
where
    S: SubmissionStore + 'static,
    M: Mailer + 'static,
    C: CaptchaVerifier + 'static,
{
    match service.submit(request).await {
        Ok(submission) => (
            StatusCode::OK,
            axum::Json(json!({ "success": true, "submission": submission })),
        )
            .into_response(),
        Err(err @ (SubmitError::Rejected(_) | SubmitError::BotSuspected)) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        Err(err @ SubmitError::VerificationUnavailable(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
        Err(SubmitError::Store(err)) => {
            error!(%err, "submission store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

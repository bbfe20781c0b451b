//! Bot-verification verdicts from the external reCAPTCHA service.
//!
//! The contact service fails closed: a transport or decoding error is a
//! server error, never an admitted submission.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Verdict returned by the verification service.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CaptchaVerdict {
    pub success: bool,
    #[serde(default)]
    pub score: Option<f32>,
}

impl CaptchaVerdict {
    /// v2-style verdicts carry no score and pass on `success` alone.
    pub fn passes(&self, threshold: f32) -> bool {
        self.success && self.score.map_or(true, |score| score >= threshold)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VerdictError {
    #[error("verification service unreachable: {0}")]
    Transport(String),
    #[error("verification service returned an unreadable verdict: {0}")]
    Malformed(String),
}

/// Seam for the external verdict call.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CaptchaVerdict, VerdictError>;
}

const SITEVERIFY_ENDPOINT: &str = "https://www.google.com/recaptcha/api/siteverify";
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Google siteverify client.
pub struct RecaptchaClient {
    http: reqwest::Client,
    secret: String,
}

impl RecaptchaClient {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(VERIFY_TIMEOUT)
                .build()
                .expect("http client builds"),
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaClient {
    async fn verify(&self, token: &str) -> Result<CaptchaVerdict, VerdictError> {
        let response = self
            .http
            .post(SITEVERIFY_ENDPOINT)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .map_err(|err| VerdictError::Transport(err.to_string()))?;

        response
            .json::<CaptchaVerdict>()
            .await
            .map_err(|err| VerdictError::Malformed(err.to_string()))
    }
}

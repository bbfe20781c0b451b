//! Best-effort lead notifications: a confirmation to the submitter and an
//! alert to the configured operator address.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::catalog;

use super::domain::Submission;
use super::templates;

/// Outbound message handed to the mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport failure: {0}")]
    Transport(String),
    #[error("mail provider rejected the message: {0}")]
    Rejected(String),
}

/// Transport seam so tests can observe sends without a network.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Individual outcome of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Skipped,
    Failed(String),
}

/// Outcome pair reported after a create. The caller's success does not
/// depend on either branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub acknowledgment: DispatchOutcome,
    pub operator_alert: DispatchOutcome,
}

impl DispatchReport {
    fn skipped() -> Self {
        Self {
            acknowledgment: DispatchOutcome::Skipped,
            operator_alert: DispatchOutcome::Skipped,
        }
    }
}

/// Fires both notifications after a successful create. Invoked only once
/// the record is durably stored; a failed send never rolls the create back.
pub struct NotificationDispatcher<M> {
    mailer: Option<Arc<M>>,
    operator_address: Option<String>,
}

impl<M> NotificationDispatcher<M>
where
    M: Mailer,
{
    pub fn new(mailer: Option<Arc<M>>, operator_address: Option<String>) -> Self {
        Self {
            mailer,
            operator_address,
        }
    }

    /// Dispatcher with no transport; every dispatch reports both branches
    /// skipped.
    pub fn disabled() -> Self {
        Self {
            mailer: None,
            operator_address: None,
        }
    }

    /// Send the acknowledgment and operator alert concurrently and wait for
    /// both individual outcomes. Failures are logged, not propagated.
    pub async fn dispatch(&self, submission: &Submission) -> DispatchReport {
        let Some(mailer) = self.mailer.as_ref() else {
            return DispatchReport::skipped();
        };

        let acknowledgment = async {
            let reference = templates::reference_id();
            let message = EmailMessage {
                to: submission.email.clone(),
                subject: templates::acknowledgment_subject(),
                html: templates::acknowledgment_body(submission, &reference),
                reply_to: None,
            };
            outcome_of(mailer.send(&message).await)
        };

        let operator_alert = async {
            match self.operator_address.as_deref() {
                None => DispatchOutcome::Skipped,
                Some(address) => {
                    let message = EmailMessage {
                        to: address.to_string(),
                        subject: templates::operator_alert_subject(submission),
                        html: templates::operator_alert_body(submission),
                        reply_to: Some(submission.email.clone()),
                    };
                    outcome_of(mailer.send(&message).await)
                }
            }
        };

        let (acknowledgment, operator_alert) = tokio::join!(acknowledgment, operator_alert);

        if let DispatchOutcome::Failed(reason) = &acknowledgment {
            warn!(submission = %submission.id, %reason, "acknowledgment email failed");
        }
        if let DispatchOutcome::Failed(reason) = &operator_alert {
            warn!(submission = %submission.id, %reason, "operator alert email failed");
        }

        DispatchReport {
            acknowledgment,
            operator_alert,
        }
    }
}

fn outcome_of(result: Result<(), MailError>) -> DispatchOutcome {
    match result {
        Ok(()) => DispatchOutcome::Sent,
        Err(err) => DispatchOutcome::Failed(err.to_string()),
    }
}

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Resend-backed transport used in production. Each send is bounded by the
/// client's request timeout.
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: String,
    from_address: String,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>, from_address: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(SEND_TIMEOUT)
                .build()
                .expect("http client builds"),
            api_key: api_key.into(),
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let mut payload = serde_json::json!({
            "from": format!("{} <{}>", catalog::COMPANY_NAME, self.from_address),
            "to": [message.to.as_str()],
            "subject": message.subject.as_str(),
            "html": message.html.as_str(),
        });
        if let Some(reply_to) = &message.reply_to {
            payload["reply_to"] = serde_json::Value::String(reply_to.clone());
        }

        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| MailError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(MailError::Rejected(format!("{status}: {detail}")))
        }
    }
}

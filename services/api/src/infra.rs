use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use rand::distributions::Alphanumeric;
use rand::Rng;

use leadgate::chat::ChatClient;
use leadgate::config::AdminCredentials;
use leadgate::leads::{
    EmailMessage, LeadFields, MailError, Mailer, StoreError, Submission, SubmissionId,
    SubmissionPatch, SubmissionStatus, SubmissionStore,
};

/// Session lifetime, matching the login cookie's Max-Age.
pub(crate) const SESSION_TTL_HOURS: i64 = 24;

pub(crate) const SESSION_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) sessions: Arc<AdminSessions>,
    pub(crate) admin: Option<AdminCredentials>,
    pub(crate) chat: Option<Arc<ChatClient>>,
    pub(crate) secure_cookies: bool,
}

/// Opaque dashboard session tokens, kept in process memory. Tokens expire
/// after [`SESSION_TTL_HOURS`] and are purged lazily on their next check.
#[derive(Default)]
pub(crate) struct AdminSessions {
    tokens: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl AdminSessions {
    pub(crate) fn issue(&self, now: DateTime<Utc>) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        self.tokens
            .lock()
            .expect("session mutex poisoned")
            .insert(token.clone(), now + Duration::hours(SESSION_TTL_HOURS));
        token
    }

    pub(crate) fn is_valid(&self, token: &str, now: DateTime<Utc>) -> bool {
        let mut guard = self.tokens.lock().expect("session mutex poisoned");
        match guard.get(token) {
            Some(expiry) if *expiry > now => true,
            Some(_) => {
                guard.remove(token);
                false
            }
            None => false,
        }
    }
}

/// Extract the dashboard session token from a request's cookies.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<&str> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
}

/// In-memory store used by the CLI demo and route tests.
#[derive(Default)]
pub(crate) struct InMemorySubmissionStore {
    records: Mutex<Vec<Submission>>,
}

impl InMemorySubmissionStore {
    pub(crate) fn with_records(records: Vec<Submission>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Submission> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn list(&self) -> Result<Vec<Submission>, StoreError> {
        let mut records = self.snapshot();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn create(&self, fields: LeadFields) -> Result<Submission, StoreError> {
        let submission = Submission {
            id: SubmissionId::random(),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            company: fields.company,
            subject: fields.subject,
            message: fields.message,
            created_at: Utc::now(),
            status: SubmissionStatus::New,
        };
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(submission.clone());
        Ok(submission)
    }

    fn update(
        &self,
        id: &SubmissionId,
        patch: SubmissionPatch,
    ) -> Result<Option<Submission>, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let Some(record) = guard.iter_mut().find(|record| record.id == *id) else {
            return Ok(None);
        };
        patch.apply(record);
        Ok(Some(record.clone()))
    }

    fn delete(&self, id: &SubmissionId) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .retain(|record| record.id != *id);
        Ok(())
    }

    fn delete_many(&self, ids: &[SubmissionId]) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .retain(|record| !ids.contains(&record.id));
        Ok(())
    }
}

/// Mailer double recording messages instead of sending them.
#[derive(Default)]
pub(crate) struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub(crate) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tokens_expire_after_the_ttl() {
        let sessions = AdminSessions::default();
        let issued_at = Utc::now();
        let token = sessions.issue(issued_at);

        assert!(sessions.is_valid(&token, issued_at + Duration::hours(1)));
        assert!(!sessions.is_valid(
            &token,
            issued_at + Duration::hours(SESSION_TTL_HOURS) + Duration::minutes(1)
        ));
        // Expired tokens are purged, not resurrected.
        assert!(!sessions.is_valid(&token, issued_at));
    }

    #[test]
    fn session_token_parses_out_of_a_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            "theme=dark; auth_token=abc123; lang=en"
                .parse()
                .expect("header value"),
        );
        assert_eq!(session_token(&headers), Some("abc123"));

        let mut missing = HeaderMap::new();
        missing.insert(
            axum::http::header::COOKIE,
            "theme=dark".parse().expect("header value"),
        );
        assert_eq!(session_token(&missing), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }
}

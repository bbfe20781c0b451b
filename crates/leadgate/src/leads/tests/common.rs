use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::leads::captcha::{CaptchaVerdict, CaptchaVerifier, VerdictError};
use crate::leads::domain::{
    ContactRequest, LeadFields, Submission, SubmissionId, SubmissionPatch, SubmissionStatus,
};
use crate::leads::intake::ContactPolicy;
use crate::leads::notify::{EmailMessage, MailError, Mailer, NotificationDispatcher};
use crate::leads::router::contact_router;
use crate::leads::service::ContactService;
use crate::leads::store::{StoreError, SubmissionStore};

pub(super) const OPERATOR_ADDRESS: &str = "leads@technomech.example";

pub(super) fn policy() -> ContactPolicy {
    ContactPolicy {
        country_prefix: "+91".to_string(),
        email_domain: "@gmail.com".to_string(),
    }
}

pub(super) fn request() -> ContactRequest {
    ContactRequest {
        name: "Asha Rao".to_string(),
        email: "asha.rao@gmail.com".to_string(),
        phone: "98765 43210".to_string(),
        company: None,
        subject: "Quote".to_string(),
        message: "Need 500 units".to_string(),
        captcha_value: None,
    }
}

pub(super) fn lead_fields() -> LeadFields {
    LeadFields {
        name: "Asha Rao".to_string(),
        email: "asha.rao@gmail.com".to_string(),
        phone: "+91 9876543210".to_string(),
        company: None,
        subject: "Quote".to_string(),
        message: "Need 500 units".to_string(),
    }
}

/// A stored record whose creation timestamp lies `age_hours` in the past.
pub(super) fn stored(age_hours: i64) -> Submission {
    Submission {
        id: SubmissionId::random(),
        name: "Asha Rao".to_string(),
        email: "asha.rao@gmail.com".to_string(),
        phone: "+91 9876543210".to_string(),
        company: None,
        subject: "Quote".to_string(),
        message: "Need 500 units".to_string(),
        created_at: Utc::now() - Duration::hours(age_hours),
        status: SubmissionStatus::New,
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) records: Mutex<Vec<Submission>>,
}

impl MemoryStore {
    pub(super) fn with_records(records: Vec<Submission>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }

    pub(super) fn snapshot(&self) -> Vec<Submission> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl SubmissionStore for MemoryStore {
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

/// Store double that refuses every operation.
pub(super) struct UnavailableStore;

impl SubmissionStore for UnavailableStore {
    fn list(&self) -> Result<Vec<Submission>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn create(&self, _fields: LeadFields) -> Result<Submission, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _id: &SubmissionId,
        _patch: SubmissionPatch,
    ) -> Result<Option<Submission>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &SubmissionId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn delete_many(&self, _ids: &[SubmissionId]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Mailer double recording every message instead of sending it.
#[derive(Default)]
pub(super) struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub(super) fn sent(&self) -> Vec<EmailMessage> {
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

/// Mailer double failing for one recipient and recording the rest.
pub(super) struct RejectingMailer {
    pub(super) reject_to: String,
    pub(super) sent: Mutex<Vec<EmailMessage>>,
}

impl RejectingMailer {
    pub(super) fn new(reject_to: &str) -> Self {
        Self {
            reject_to: reject_to.to_string(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl Mailer for RejectingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if message.to == self.reject_to {
            return Err(MailError::Transport("smtp down".to_string()));
        }
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

/// Verifier double returning a canned verdict or transport failure.
pub(super) struct StaticVerifier {
    pub(super) outcome: Result<CaptchaVerdict, String>,
}

impl StaticVerifier {
    pub(super) fn passing() -> Self {
        Self {
            outcome: Ok(CaptchaVerdict {
                success: true,
                score: Some(0.9),
            }),
        }
    }

    pub(super) fn scoring(score: f32) -> Self {
        Self {
            outcome: Ok(CaptchaVerdict {
                success: true,
                score: Some(score),
            }),
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            outcome: Ok(CaptchaVerdict {
                success: false,
                score: None,
            }),
        }
    }

    pub(super) fn unreachable() -> Self {
        Self {
            outcome: Err("connection refused".to_string()),
        }
    }
}

#[async_trait]
impl CaptchaVerifier for StaticVerifier {
    async fn verify(&self, _token: &str) -> Result<CaptchaVerdict, VerdictError> {
        self.outcome
            .clone()
            .map_err(VerdictError::Transport)
    }
}

pub(super) type TestService = ContactService<MemoryStore, RecordingMailer, StaticVerifier>;

/// Service wired with memory doubles, a recording mailer, an operator
/// address, and no verifier.
pub(super) fn build_service() -> (Arc<TestService>, Arc<MemoryStore>, Arc<RecordingMailer>) {
    build_service_with_store(MemoryStore::default())
}

pub(super) fn build_service_with_store(
    store: MemoryStore,
) -> (Arc<TestService>, Arc<MemoryStore>, Arc<RecordingMailer>) {
    let store = Arc::new(store);
    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher =
        NotificationDispatcher::new(Some(mailer.clone()), Some(OPERATOR_ADDRESS.to_string()));
    let service = Arc::new(ContactService::new(
        policy(),
        store.clone(),
        dispatcher,
        None,
        0.5,
    ));
    (service, store, mailer)
}

pub(super) fn build_service_with_verifier(
    verifier: StaticVerifier,
) -> (Arc<TestService>, Arc<MemoryStore>, Arc<RecordingMailer>) {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher =
        NotificationDispatcher::new(Some(mailer.clone()), Some(OPERATOR_ADDRESS.to_string()));
    let service = Arc::new(ContactService::new(
        policy(),
        store.clone(),
        dispatcher,
        Some(Arc::new(verifier)),
        0.5,
    ));
    (service, store, mailer)
}

pub(super) fn contact_router_with_service(service: Arc<TestService>) -> axum::Router {
    contact_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::captcha::{CaptchaVerifier, VerdictError};
use super::domain::{ContactRequest, Submission, SubmissionId, SubmissionPatch, SubmissionStatus};
use super::intake::{ContactPolicy, IntakeError};
use super::notify::{Mailer, NotificationDispatcher};
use super::store::{StoreError, SubmissionStore};

/// Service composing the intake gate, submission store, and notification
/// dispatcher. Admin operations talk to the store directly and bypass both
/// the gate and the dispatcher.
pub struct ContactService<S, M, C> {
    policy: ContactPolicy,
    store: Arc<S>,
    dispatcher: NotificationDispatcher<M>,
    verifier: Option<Arc<C>>,
    score_threshold: f32,
}

/// Error raised by the public submit flow.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Rejected(#[from] IntakeError),
    #[error("Verification failed. We suspect you might be a bot. Please try again or contact us directly.")]
    BotSuspected,
    #[error("Security check failed. Please try again.")]
    VerificationUnavailable(#[source] VerdictError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl<S, M, C> ContactService<S, M, C>
where
    S: SubmissionStore,
    M: Mailer,
    C: CaptchaVerifier,
{
    pub fn new(
        policy: ContactPolicy,
        store: Arc<S>,
        dispatcher: NotificationDispatcher<M>,
        verifier: Option<Arc<C>>,
        score_threshold: f32,
    ) -> Self {
        Self {
            policy,
            store,
            dispatcher,
            verifier,
            score_threshold,
        }
    }

    /// Full create flow: validate, verify, persist, notify. Notification
    /// outcomes are logged but never affect the returned result.
    pub async fn submit(&self, request: ContactRequest) -> Result<Submission, SubmitError> {
        let token = request.captcha_value.clone();
        let fields = self.policy.validate(request)?;

        // Verification runs only when a verifier is configured and the
        // request carries a token; a verdict-service error fails closed.
        if let (Some(verifier), Some(token)) = (self.verifier.as_ref(), token.as_deref()) {
            let verdict = verifier
                .verify(token)
                .await
                .map_err(SubmitError::VerificationUnavailable)?;
            if !verdict.passes(self.score_threshold) {
                return Err(SubmitError::BotSuspected);
            }
        }

        let submission = self.store.create(fields)?;
        let report = self.dispatcher.dispatch(&submission).await;
        info!(
            submission = %submission.id,
            acknowledgment = ?report.acknowledgment,
            operator_alert = ?report.operator_alert,
            "lead captured"
        );
        Ok(submission)
    }

    /// All records, newest first, with the read-triggered aging rule
    /// applied: `new` records past the follow-up window move to `pending`
    /// and the transition is persisted before the listing is returned.
    pub fn list(&self, now: DateTime<Utc>) -> Result<Vec<Submission>, StoreError> {
        let mut records = self.store.list()?;
        for record in &mut records {
            if record.needs_follow_up(now) {
                self.store
                    .update(&record.id, SubmissionPatch::status(SubmissionStatus::Pending))?;
                record.status = SubmissionStatus::Pending;
            }
        }
        Ok(records)
    }

    pub fn update(
        &self,
        id: &SubmissionId,
        patch: SubmissionPatch,
    ) -> Result<Option<Submission>, StoreError> {
        self.store.update(id, patch)
    }

    pub fn delete(&self, id: &SubmissionId) -> Result<(), StoreError> {
        self.store.delete(id)
    }

    pub fn delete_many(&self, ids: &[SubmissionId]) -> Result<(), StoreError> {
        self.store.delete_many(ids)
    }
}

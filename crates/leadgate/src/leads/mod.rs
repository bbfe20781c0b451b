//! Contact-lead capture, storage, and notification pipeline.
//!
//! The flow for a public submission is intake validation, optional bot
//! verification, a durable store write, then best-effort notifications.
//! Admin reads and edits go straight to the store.

pub mod captcha;
pub mod domain;
pub mod intake;
pub mod notify;
pub mod router;
pub mod service;
pub mod store;
pub(crate) mod templates;

#[cfg(test)]
mod tests;

pub use captcha::{CaptchaVerdict, CaptchaVerifier, RecaptchaClient, VerdictError};
pub use domain::{
    ContactRequest, LeadFields, Submission, SubmissionId, SubmissionPatch, SubmissionStatus,
    FOLLOW_UP_WINDOW_HOURS,
};
pub use intake::{ContactPolicy, IntakeError, PHONE_DIGITS};
pub use notify::{
    DispatchOutcome, DispatchReport, EmailMessage, MailError, Mailer, NotificationDispatcher,
    ResendMailer,
};
pub use router::contact_router;
pub use service::{ContactService, SubmitError};
pub use store::{JsonFileStore, StoreError, SubmissionStore};

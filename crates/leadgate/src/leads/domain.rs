use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for stored submissions. Assigned once at creation and
/// never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Workflow states a captured lead moves through. The lifecycle is soft:
/// an admin edit may set any state, including moving backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    New,
    Pending,
    Contacted,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::New => "new",
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Contacted => "contacted",
        }
    }
}

/// How long a lead may sit in `new` before a full-list read moves it to
/// `pending`.
pub const FOLLOW_UP_WINDOW_HOURS: i64 = 24;

/// A lead captured from the contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub status: SubmissionStatus,
}

impl Submission {
    /// True when the read-triggered aging rule should move this lead from
    /// `new` to `pending`.
    pub fn needs_follow_up(&self, now: DateTime<Utc>) -> bool {
        self.status == SubmissionStatus::New
            && now.signed_duration_since(self.created_at)
                > Duration::hours(FOLLOW_UP_WINDOW_HOURS)
    }
}

/// Raw, untrusted contact-form payload as posted by the site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub captcha_value: Option<String>,
}

/// Validated field set the intake gate hands to the store. The phone number
/// is already in normalized form here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
}

/// Partial admin edit naming exactly the mutable fields. Identifier and
/// creation timestamp are not editable; unknown keys fail deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmissionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SubmissionStatus>,
}

impl SubmissionPatch {
    pub fn status(status: SubmissionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Apply the edit in place, leaving `id` and `created_at` untouched.
    pub fn apply(&self, submission: &mut Submission) {
        if let Some(name) = &self.name {
            submission.name = name.clone();
        }
        if let Some(email) = &self.email {
            submission.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            submission.phone = phone.clone();
        }
        if let Some(company) = &self.company {
            submission.company = Some(company.clone());
        }
        if let Some(subject) = &self.subject {
            submission.subject = subject.clone();
        }
        if let Some(message) = &self.message {
            submission.message = message.clone();
        }
        if let Some(status) = self.status {
            submission.status = status;
        }
    }
}

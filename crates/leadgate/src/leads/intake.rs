//! Inbound contact-form validation. Rejections carry the reason string the
//! site shows to the visitor.

use super::domain::{ContactRequest, LeadFields};

/// Digits a phone number must strip down to.
pub const PHONE_DIGITS: usize = 10;

/// Deployment-tunable validation rules for the public contact form.
#[derive(Debug, Clone)]
pub struct ContactPolicy {
    pub country_prefix: String,
    pub email_domain: String,
}

impl Default for ContactPolicy {
    fn default() -> Self {
        Self {
            country_prefix: "+91".to_string(),
            email_domain: "@gmail.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("Missing required fields")]
    MissingRequired,
    #[error("Invalid phone number. Must be exactly 10 digits.")]
    InvalidPhone,
    #[error("Invalid email. Only {domain} addresses are supported.")]
    InvalidEmail { domain: String },
}

impl ContactPolicy {
    /// Validate a raw request and produce the field set handed to the store.
    pub fn validate(&self, request: ContactRequest) -> Result<LeadFields, IntakeError> {
        let ContactRequest {
            name,
            email,
            phone,
            company,
            subject,
            message,
            ..
        } = request;

        if name.trim().is_empty()
            || email.trim().is_empty()
            || subject.trim().is_empty()
            || message.trim().is_empty()
        {
            return Err(IntakeError::MissingRequired);
        }

        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != PHONE_DIGITS {
            return Err(IntakeError::InvalidPhone);
        }

        if !email
            .to_lowercase()
            .ends_with(&self.email_domain.to_lowercase())
        {
            return Err(IntakeError::InvalidEmail {
                domain: self.email_domain.clone(),
            });
        }

        Ok(LeadFields {
            name,
            email,
            phone: format!("{} {digits}", self.country_prefix),
            company: company.filter(|value| !value.trim().is_empty()),
            subject,
            message,
        })
    }
}

//! Message bodies for the notification dispatcher.

use std::fmt::Write as _;

use rand::Rng;

use crate::catalog;

use super::domain::Submission;

/// Cosmetic acknowledgment reference shown to the submitter. Not the stored
/// identifier and never used for lookup.
pub(crate) fn reference_id() -> String {
    format!("REQ-{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

pub(crate) fn acknowledgment_subject() -> String {
    format!("Thank you for contacting {}", catalog::COMPANY_NAME)
}

pub(crate) fn operator_alert_subject(submission: &Submission) -> String {
    format!("New Lead: {}", submission.subject)
}

pub(crate) fn acknowledgment_body(submission: &Submission, reference: &str) -> String {
    let mut html = String::new();
    writeln!(
        html,
        "<h1>{}, thank you for contacting us.</h1>",
        escape_html(&submission.name)
    )
    .expect("write greeting");
    writeln!(
        html,
        "<p>We have received your message and our team is currently reviewing your inquiry. \
         You will receive an update from us shortly regarding your request.</p>"
    )
    .expect("write body");
    writeln!(
        html,
        "<p>Inquiry ID: <strong>{}</strong><br>Status: Received</p>",
        escape_html(reference)
    )
    .expect("write reference");
    writeln!(
        html,
        "<p><a href=\"{}\">Visit our website</a></p>",
        catalog::COMPANY_WEBSITE
    )
    .expect("write link");
    writeln!(
        html,
        "<p>{}<br>{}</p>",
        catalog::COMPANY_NAME,
        escape_html(catalog::COMPANY_ADDRESS)
    )
    .expect("write footer");
    html
}

pub(crate) fn operator_alert_body(submission: &Submission) -> String {
    let mut html = String::new();
    writeln!(html, "<h1>New Lead Notification</h1>").expect("write heading");
    writeln!(
        html,
        "<p>Name: {}<br>Subject: {}</p>",
        escape_html(&submission.name),
        escape_html(&submission.subject)
    )
    .expect("write summary");
    writeln!(
        html,
        "<p>Email: <a href=\"mailto:{0}\">{0}</a><br>Phone: {1}</p>",
        escape_html(&submission.email),
        escape_html(&submission.phone)
    )
    .expect("write contact info");
    if let Some(company) = &submission.company {
        writeln!(html, "<p>Company: {}</p>", escape_html(company)).expect("write company");
    }
    writeln!(
        html,
        "<p style=\"white-space: pre-wrap;\">{}</p>",
        escape_html(&submission.message)
    )
    .expect("write message");
    writeln!(
        html,
        "<p><em>Received via the {} contact form at {}.</em></p>",
        catalog::COMPANY_NAME,
        submission.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
    .expect("write footer");
    html
}

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

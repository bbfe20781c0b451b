use std::sync::Arc;

use chrono::Utc;
use clap::Args;

use leadgate::error::AppError;
use leadgate::leads::{
    ContactPolicy, ContactRequest, ContactService, NotificationDispatcher, RecaptchaClient,
};

use crate::infra::{InMemorySubmissionStore, RecordingMailer};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Operator address receiving the demo alert notification
    #[arg(long, default_value = "leads@technomech.example")]
    pub(crate) operator: String,
    /// Phone number for the sample inquiry, as a visitor would type it
    #[arg(long, default_value = "98765 43210")]
    pub(crate) phone: String,
}

/// End-to-end walkthrough of the submit flow against in-memory infra:
/// intake, store write, both notifications, then a listing.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemorySubmissionStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = NotificationDispatcher::new(Some(mailer.clone()), Some(args.operator));
    let service: ContactService<InMemorySubmissionStore, RecordingMailer, RecaptchaClient> =
        ContactService::new(ContactPolicy::default(), store, dispatcher, None, 0.5);

    let request = ContactRequest {
        name: "Asha Rao".to_string(),
        email: "asha.rao@gmail.com".to_string(),
        phone: args.phone,
        company: Some("Rao Industries".to_string()),
        subject: "Quote".to_string(),
        message: "Need 500 units of precision washers".to_string(),
        captcha_value: None,
    };

    match service.submit(request).await {
        Ok(submission) => {
            println!(
                "Captured lead {} from {} ({})",
                submission.id,
                submission.name,
                submission.status.label()
            );
            println!("Normalized phone: {}", submission.phone);
        }
        Err(err) => {
            println!("Submission rejected: {err}");
            return Ok(());
        }
    }

    for message in mailer.sent() {
        println!("Notification to {}: {}", message.to, message.subject);
    }

    let listed = service.list(Utc::now()).map_err(AppError::Store)?;
    println!("{} lead(s) on file", listed.len());

    Ok(())
}

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;

/// Send a plain-text notification for a new job application, off the request
/// path. Disabled (and silently skipped) unless SMTP is fully configured; a
/// send failure is logged and never surfaces to the applicant.
pub fn notify_application(smtp: &SmtpConfig, job_title: &str, applicant: &str, email: &str) {
    if !smtp.enabled() {
        return;
    }

    let smtp = smtp.clone();
    let subject = format!("New application: {}", job_title);
    let body = format!(
        "{} <{}> applied for \"{}\".\n\nReview it in the admin dashboard.",
        applicant, email, job_title
    );

    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || send(&smtp, &subject, &body)).await;
        match result {
            Ok(Ok(())) => tracing::info!("application notification sent"),
            Ok(Err(e)) => tracing::warn!("could not send application notification: {}", e),
            Err(e) => tracing::warn!("notification task failed: {}", e),
        }
    });
}

fn send(smtp: &SmtpConfig, subject: &str, body: &str) -> anyhow::Result<()> {
    let server = smtp
        .server
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("smtp server not configured"))?;
    let to = smtp
        .notify_to
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("smtp recipient not configured"))?;

    let message = Message::builder()
        .from(smtp.from_address.parse()?)
        .to(to.parse()?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?;

    let mailer = SmtpTransport::relay(server)?
        .port(smtp.port)
        .credentials(Credentials::new(smtp.user.clone(), smtp.password.clone()))
        .build();

    mailer.send(&message)?;
    Ok(())
}

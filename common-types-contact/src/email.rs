use ::std::future::Future;
use thiserror::Error;

use crate::{
    Config::{Locale, SmtpSettings},
    Constants,
    Routes::contact::ContactSubmission,
};

mod smtp;
pub use smtp::{SmtpTransport, Submission};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEmail {
    pub recipient: String,
    pub reply_to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid address '{address}', {reason}")]
    Address {
        address: String,
        reason: String,
    },
    #[error("failed to build message, {0}")]
    Message(String),
    #[error("timed out, {0}")]
    Timeout(String),
    #[error("rejected by server, {0}")]
    Rejected(String),
    #[error("connection failed, {0}")]
    Connection(String),
}

impl TransportError {
    pub fn category(&self) -> &'static str {
        match self {
            TransportError::Address { .. } => "address",
            TransportError::Message(_) => "message",
            TransportError::Timeout(_) => "timeout",
            TransportError::Rejected(_) => "rejected",
            TransportError::Connection(_) => "connection",
        }
    }
}

impl From<lettre::transport::smtp::Error> for TransportError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_permanent() || err.is_transient() {
            // Negative SMTP replies, e.g. 535 on a bad login
            TransportError::Rejected(err.to_string())
        } else {
            TransportError::Connection(err.to_string())
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait EmailTransport: Send + Sync + 'static {
    fn send(&self, settings: SmtpSettings, email: ContactEmail) -> impl Future<Output = Result<(), TransportError>> + Send;
}

impl Locale {
    fn subject(&self, name: &str) -> String {
        match self {
            Locale::Russian => format!("Новое сообщение от {name}"),
            Locale::English => format!("New message from {name}"),
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            Locale::Russian => "Новое сообщение с сайта-резюме",
            Locale::English => "New message from the resume website",
        }
    }

    fn name_label(&self) -> &'static str {
        match self {
            Locale::Russian => "Имя",
            Locale::English => "Name",
        }
    }

    fn message_label(&self) -> &'static str {
        match self {
            Locale::Russian => "Сообщение",
            Locale::English => "Message",
        }
    }
}

pub fn compose(submission: &ContactSubmission, locale: Locale) -> ContactEmail {
    ContactEmail {
        recipient: Constants::CONTACT_RECIPIENT.to_string(),
        reply_to: submission.email.clone(),
        subject: locale.subject(&submission.name),
        text_body: render_text(submission, locale),
        html_body: render_html(submission, locale),
    }
}

fn render_text(submission: &ContactSubmission, locale: Locale) -> String {
    format!(
        "{heading}:\n\n{name_label}: {name}\nEmail: {email}\n\n{message_label}:\n{message}\n",
        heading = locale.heading(),
        name_label = locale.name_label(),
        name = submission.name,
        email = submission.email,
        message_label = locale.message_label(),
        message = submission.message,
    )
}

fn render_html(submission: &ContactSubmission, locale: Locale) -> String {
    let name = ammonia::clean_text(&submission.name);
    let email = ammonia::clean_text(&submission.email);
    // clean_text escapes newlines too, so split first. A trailing
    // newline still becomes a trailing <br>.
    let message = submission.message
        .split('\n')
        .map(|line| ammonia::clean_text(line.strip_suffix('\r').unwrap_or(line)))
        .collect::<Vec<String>>()
        .join("<br>");
    format!(
        r#"<html>
<head></head>
<body>
    <h2>{heading}</h2>
    <p><strong>{name_label}:</strong> {name}</p>
    <p><strong>Email:</strong> <a href="mailto:{email}">{email}</a></p>
    <h3>{message_label}:</h3>
    <p>{message}</p>
</body>
</html>
"#,
        heading = locale.heading(),
        name_label = locale.name_label(),
        message_label = locale.message_label(),
    )
}

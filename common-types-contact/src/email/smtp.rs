use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{ContactEmail, EmailTransport, TransportError};
use crate::{Config::SmtpSettings, Constants};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    ImplicitTls,
    StartTls,
}

impl Submission {
    pub fn for_port(port: u16) -> Self {
        match port {
            Constants::IMPLICIT_TLS_PORT => Submission::ImplicitTls,
            _ => Submission::StartTls,
        }
    }
}

/// Opens one authenticated SMTP session per message. Settings arrive with
/// every call so nothing is cached between invocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpTransport;

impl EmailTransport for SmtpTransport {
    async fn send(&self, settings: SmtpSettings, email: ContactEmail) -> Result<(), TransportError> {
        let message = build_message(&settings, email)?;
        let mailer = build_mailer(&settings)?;

        tracing::info!("Submitting contact email through {}:{} ({:?})", settings.host, settings.port, Submission::for_port(settings.port));
        match tokio::time::timeout(settings.timeout, mailer.send(message)).await {
            Ok(Ok(_)) => {
                tracing::info!("SMTP server accepted contact email");
                Ok(())
            },
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(TransportError::Timeout(format!("no reply from {} within {}s", settings.host, settings.timeout.as_secs()))),
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address.parse::<Mailbox>().map_err(|err| TransportError::Address {
        address: address.to_string(),
        reason: err.to_string(),
    })
}

pub(crate) fn build_message(settings: &SmtpSettings, email: ContactEmail) -> Result<Message, TransportError> {
    Message::builder()
        .from(parse_mailbox(&settings.from)?)
        .to(parse_mailbox(&email.recipient)?)
        .reply_to(parse_mailbox(&email.reply_to)?)
        .subject(email.subject)
        .multipart(MultiPart::alternative_plain_html(email.text_body, email.html_body))
        .map_err(|err| TransportError::Message(err.to_string()))
}

pub(crate) fn build_mailer(settings: &SmtpSettings) -> Result<AsyncSmtpTransport<Tokio1Executor>, TransportError> {
    let builder = match Submission::for_port(settings.port) {
        Submission::ImplicitTls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?,
        Submission::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?,
    };
    Ok(builder
        .port(settings.port)
        .credentials(Credentials::new(settings.user.clone(), settings.password.clone()))
        .timeout(Some(settings.timeout))
        .build())
}

#[cfg(test)]
mod tests {
    use ::std::time::Duration;
    use super::*;

    fn settings(port: u16) -> SmtpSettings {
        SmtpSettings {
            host: "127.0.0.1".to_string(),
            port,
            user: "relay@example.com".to_string(),
            password: "secret".to_string(),
            from: "relay@example.com".to_string(),
            timeout: Duration::from_secs(2),
        }
    }

    fn email() -> ContactEmail {
        ContactEmail {
            recipient: Constants::CONTACT_RECIPIENT.to_string(),
            reply_to: "jo@example.com".to_string(),
            subject: "New message from Jo".to_string(),
            text_body: "Hello there!".to_string(),
            html_body: "<p>Hello there!</p>".to_string(),
        }
    }

    #[test]
    fn port_465_uses_implicit_tls() {
        assert_eq!(Submission::for_port(465), Submission::ImplicitTls);
        assert_eq!(Submission::for_port(587), Submission::StartTls);
        assert_eq!(Submission::for_port(25), Submission::StartTls);
    }

    #[test]
    fn message_carries_reply_to_and_both_renderings() {
        let message = build_message(&settings(587), email()).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("From: relay@example.com"));
        assert!(formatted.contains("To: ivan@elkin.pro"));
        assert!(formatted.contains("Reply-To: jo@example.com"));
        assert!(formatted.contains("Subject: New message from Jo"));
        assert!(formatted.contains("multipart/alternative"));
        assert!(formatted.contains("text/plain"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn sender_must_be_an_address() {
        let mut settings = settings(587);
        settings.from = "relay-user".to_string();
        let err = build_message(&settings, email()).unwrap_err();
        assert_eq!(err.category(), "address");
    }

    #[test]
    fn login_need_not_be_an_address() {
        let mut settings = settings(587);
        settings.user = "apikey".to_string();
        settings.from = "site@example.com".to_string();
        let message = build_message(&settings, email()).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("From: site@example.com"));
    }

    #[test]
    fn mailer_builds_for_both_submission_modes() {
        assert!(build_mailer(&settings(465)).is_ok());
        assert!(build_mailer(&settings(587)).is_ok());
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_failure() {
        // Nothing listens on port 1
        let err = SmtpTransport.send(settings(1), email()).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_) | TransportError::Timeout(_)), "unexpected {err:?}");
    }
}

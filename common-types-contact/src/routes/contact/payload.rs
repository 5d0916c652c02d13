use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    Constants::{MESSAGE_MIN_LENGTH, NAME_MAX_LENGTH, NAME_MIN_LENGTH},
    Errors::ContactError,
};

const FIELDS: [&str; 3] = ["name", "email", "message"];

#[derive(Deserialize, Debug, Default)]
pub struct RequestPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub struct SubmissionLimits {
    pub message_max_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
#[garde(context(SubmissionLimits))]
pub struct ContactSubmission {
    #[garde(custom(name_length))]
    pub name: String,
    #[garde(email, custom(reply_address))]
    pub email: String,
    #[garde(custom(message_length))]
    pub message: String,
}

// Lengths count characters, a Cyrillic name is two bytes per letter
fn char_length(value: &str, min: usize, max: usize) -> garde::Result {
    let length = value.chars().count();
    if length < min {
        return Err(garde::Error::new(format!("length is lower than {min}")));
    }
    if length > max {
        return Err(garde::Error::new(format!("length is greater than {max}")));
    }
    Ok(())
}

fn name_length(value: &String, _: &SubmissionLimits) -> garde::Result {
    char_length(value, NAME_MIN_LENGTH, NAME_MAX_LENGTH)
}

fn message_length(value: &String, limits: &SubmissionLimits) -> garde::Result {
    char_length(value, MESSAGE_MIN_LENGTH, limits.message_max_length)
}

// The address becomes Reply-To, so it needs a public dotted domain.
// A missing '@' is left to the email rule.
fn reply_address(value: &String, _: &SubmissionLimits) -> garde::Result {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return Ok(());
    };
    if local.is_empty() {
        return Err(garde::Error::new("local part is empty"));
    }
    if domain.starts_with('[') {
        return Err(garde::Error::new("domain literals are not accepted"));
    }
    if domain.split('.').count() < 2 || domain.split('.').any(str::is_empty) {
        return Err(garde::Error::new("domain must be a dotted host name"));
    }
    Ok(())
}

impl RequestPayload {
    pub fn parse(body: &str) -> Result<Self, ContactError> {
        let value: Value = serde_json::from_str(body).map_err(|err| ContactError::MalformedInput(err.to_string()))?;
        if !value.is_object() {
            return Err(ContactError::MalformedInput("expected a JSON object".to_string()));
        }
        serde_json::from_value(value).map_err(|err| ContactError::MalformedInput(err.to_string()))
    }

    pub fn into_submission(self, limits: &SubmissionLimits) -> Result<ContactSubmission, ContactError> {
        let missing: Vec<&'static str> = FIELDS.into_iter()
            .zip([self.name.is_none(), self.email.is_none(), self.message.is_none()])
            .filter(|(_, absent)| *absent)
            .map(|(field, _)| field)
            .collect();
        let submission = ContactSubmission {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
        };

        let mut details: Vec<FieldError> = missing.iter()
            .map(|field| FieldError::new(*field, "field required"))
            .collect();
        if let Err(report) = submission.validate(limits) {
            details.extend(report.iter()
                .map(|(path, error)| FieldError::new(path.to_string(), error.to_string()))
                .filter(|detail| !missing.iter().any(|field| *field == detail.field)));
        }
        if details.is_empty() {
            return Ok(submission);
        }
        // One entry per field, the first rule that failed wins
        details.sort_by_key(|detail| FIELDS.iter().position(|field| *field == detail.field));
        details.dedup_by(|later, earlier| later.field == earlier.field);
        Err(ContactError::Validation(details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: SubmissionLimits = SubmissionLimits { message_max_length: 2000 };

    fn payload(name: &str, email: &str, message: &str) -> RequestPayload {
        RequestPayload {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
        }
    }

    fn failing_fields(result: Result<ContactSubmission, ContactError>) -> Vec<String> {
        match result {
            Err(ContactError::Validation(details)) => details.into_iter().map(|detail| detail.field).collect(),
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn accepts_bounds_inclusive() {
        let name = "x".repeat(100);
        let message = "m".repeat(2000);
        let submission = payload(&name, "a@b.com", &message).into_submission(&LIMITS).unwrap();
        assert_eq!(submission.name.len(), 100);
        assert!(payload("Jo", "a@b.com", "0123456789").into_submission(&LIMITS).is_ok());
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert!(payload("Ян", "ian@example.ru", "Привет, как дела?").into_submission(&LIMITS).is_ok());
        let long_name = "я".repeat(101);
        assert_eq!(failing_fields(payload(&long_name, "a@b.com", "Hello there!").into_submission(&LIMITS)), vec!["name"]);
    }

    #[test]
    fn reports_every_failing_field_in_order() {
        let result = payload("J", "not-an-email", "short").into_submission(&LIMITS);
        assert_eq!(failing_fields(result), vec!["name", "email", "message"]);
    }

    #[test]
    fn message_limit_comes_from_context() {
        let limits = SubmissionLimits { message_max_length: 1000 };
        let message = "m".repeat(1001);
        assert_eq!(failing_fields(payload("Jo", "a@b.com", &message).into_submission(&limits)), vec!["message"]);
    }

    #[test]
    fn missing_fields_are_required_not_too_short() {
        let payload = RequestPayload {
            name: None,
            email: Some("not-an-email".to_string()),
            message: None,
        };
        match payload.into_submission(&LIMITS) {
            Err(ContactError::Validation(details)) => {
                assert_eq!(details.len(), 3);
                assert_eq!(details[0], FieldError::new("name", "field required"));
                assert_eq!(details[1].field, "email");
                assert_ne!(details[1].message, "field required");
                assert_eq!(details[2], FieldError::new("message", "field required"));
            },
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn reply_address_needs_a_dotted_domain() {
        for email in ["jo@localhost", "jo@b", "jo@[127.0.0.1]", "jo@example.", "@example.com"] {
            let result = payload("Jo", email, "Hello there!").into_submission(&LIMITS);
            assert_eq!(failing_fields(result), vec!["email"], "{email}");
        }
        assert!(payload("Jo", "jo@mail.example.co.uk", "Hello there!").into_submission(&LIMITS).is_ok());
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(matches!(RequestPayload::parse("[1, 2, 3]"), Err(ContactError::MalformedInput(_))));
        assert!(matches!(RequestPayload::parse("{\"name\": "), Err(ContactError::MalformedInput(_))));
        assert!(matches!(RequestPayload::parse("{\"name\": 5}"), Err(ContactError::MalformedInput(_))));
    }

    #[test]
    fn parse_ignores_unknown_fields_and_nulls() {
        let payload = RequestPayload::parse(r#"{"name": "Jo", "email": null, "company": "Acme"}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("Jo"));
        assert!(payload.email.is_none());
        assert!(payload.message.is_none());
    }
}

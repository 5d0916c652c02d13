use http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::{
    Email::TransportError,
    Response::{ServerResponse, detailed_response, json_response, status_response},
    Routes::contact::FieldError,
};

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("method {0} is not allowed")]
    UnsupportedMethod(String),
    #[error("malformed request body, {0}")]
    MalformedInput(String),
    #[error("submission failed validation on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("SMTP configuration incomplete, missing {}", .0.join(", "))]
    ConfigurationIncomplete(Vec<&'static str>),
    #[error("failed to send email, {0}")]
    Transport(#[from] TransportError),
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            ContactError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            ContactError::MalformedInput(_) | ContactError::Validation(_) => StatusCode::BAD_REQUEST,
            ContactError::ConfigurationIncomplete(_) | ContactError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn log(&self) {
        match self {
            ContactError::Validation(details) => {
                tracing::info!("Validation failed with reason: {:?}", details);
            },
            ContactError::ConfigurationIncomplete(_) => {
                tracing::error!("{self}");
            },
            ContactError::Transport(err) => {
                tracing::error!(category = err.category(), "{self}");
            },
            _ => {
                tracing::info!("Rejected request, {self}");
            },
        }
    }

    // Operator detail stays in the log; clients get a short category and message
    pub fn into_response(self) -> ServerResponse {
        let status = self.status();
        match self {
            ContactError::UnsupportedMethod(_) => status_response(status, "Method not allowed"),
            ContactError::MalformedInput(reason) => detailed_response(status, "Invalid request body", json!(reason)),
            ContactError::Validation(details) => detailed_response(status, "Validation error", json!(details)),
            ContactError::ConfigurationIncomplete(missing) => detailed_response(status, "SMTP configuration incomplete", json!(missing)),
            ContactError::Transport(err) => json_response(status, json!({
                "error": "Failed to send email",
                "details": err.to_string(),
                "category": err.category(),
            })),
        }
    }
}

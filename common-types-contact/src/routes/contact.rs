use base64::prelude::*;
use http::Method;
use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    common_types::ApiGateway::ApiGatewayProxyRequest,
    Config::DispatchMode,
    Constants,
    Email::{self, EmailTransport},
    Errors::ContactError,
    Middleware::set_cors_headers,
    Response::{ServerResponse, success_response},
    State::InternalAppState,
};

mod payload;
pub use payload::{ContactSubmission, FieldError, RequestPayload, SubmissionLimits};


const HTTP_METHOD_KEY: &str = "httpMethod";

/// Proxy event for the contact route. A bare invocation without
/// `httpMethod` is a form submission and reads as POST.
#[derive(Debug, Clone)]
pub struct ContactEvent(pub ApiGatewayProxyRequest);

impl<'de> Deserialize<'de> for ContactEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = Value::deserialize(deserializer)?;
        if let Value::Object(fields) = &mut raw {
            if fields.get(HTTP_METHOD_KEY).map_or(true, Value::is_null) {
                fields.insert(HTTP_METHOD_KEY.to_string(), Value::from(Method::POST.as_str()));
            }
        }
        serde_json::from_value(raw).map(ContactEvent).map_err(D::Error::custom)
    }
}

// Contact form endpoint, POST and OPTIONS
#[tracing::instrument(skip(appstate, event), fields(request="/contact"))]
pub async fn request<T: EmailTransport>(appstate: &InternalAppState<T>, event: ApiGatewayProxyRequest, request_id: &str) -> ServerResponse {
    // Methods are case-sensitive, "post" is not POST
    if event.http_method == Method::OPTIONS {
        return set_cors_headers::preflight();
    }
    let outcome = if event.http_method == Method::POST {
        submit(appstate, &event, request_id).await
    } else {
        Err(ContactError::UnsupportedMethod(event.http_method.to_string()))
    };
    let response = match outcome {
        Ok(response) => response,
        Err(err) => {
            err.log();
            err.into_response()
        },
    };
    set_cors_headers::middleware(response)
}

async fn submit<T: EmailTransport>(appstate: &InternalAppState<T>, event: &ApiGatewayProxyRequest, request_id: &str) -> Result<ServerResponse, ContactError> {
    let body = decode_body(event)?;
    let limits = SubmissionLimits {
        message_max_length: appstate.config.message_max_length,
    };
    let submission = RequestPayload::parse(&body)?.into_submission(&limits)?;

    match appstate.config.dispatch {
        DispatchMode::AuditLog => {
            record_submission(request_id, &submission);
            Ok(success_response("Message received successfully", request_id))
        },
        DispatchMode::Email => {
            // Checked before any connection is attempted
            let settings = appstate.config.smtp.settings().map_err(ContactError::ConfigurationIncomplete)?;
            let email = Email::compose(&submission, appstate.config.locale);
            appstate.transport.send(settings, email).await?;
            tracing::info!("Relayed contact message to {}", Constants::CONTACT_RECIPIENT);
            Ok(success_response("Email sent successfully", request_id))
        },
    }
}

fn decode_body(event: &ApiGatewayProxyRequest) -> Result<String, ContactError> {
    // No body reads as an empty object so every field is reported missing
    let Some(body) = event.body.as_deref().filter(|body| !body.trim().is_empty()) else {
        return Ok("{}".to_string());
    };
    if !event.is_base64_encoded {
        return Ok(body.to_string());
    }
    let bytes = BASE64_STANDARD.decode(body.trim()).map_err(|err| {
        ContactError::MalformedInput(format!("body is not valid base64, {err}"))
    })?;
    String::from_utf8(bytes).map_err(|_| ContactError::MalformedInput("body is not valid UTF-8".to_string()))
}

fn record_submission(request_id: &str, submission: &ContactSubmission) {
    tracing::info!(
        request_id,
        contact.name = %submission.name,
        contact.email = %submission.email,
        contact.message = %submission.message,
        "[CONTACT FORM] submission received"
    );
}

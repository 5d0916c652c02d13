use common_types;

pub type E = Box<dyn ::std::error::Error + Send + Sync + 'static>;

mod config;
mod email;
mod error;
mod routes;
mod middleware;

#[allow(non_snake_case)]
pub mod Routes {
    pub use crate::routes::*;
}

#[allow(non_snake_case)]
pub mod Middleware {
    pub use crate::middleware::*;
}

#[allow(non_snake_case)]
pub mod Email {
    pub use crate::email::*;
}

#[allow(non_snake_case)]
pub mod Config {
    pub use crate::config::*;
}

#[allow(non_snake_case)]
pub mod Errors {
    pub use crate::error::*;
}

#[allow(non_snake_case)]
pub mod Response {
    use http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, StatusCode};
    use serde_json::{json, Value};
    use crate::common_types::ApiGateway::{ApiGatewayProxyResponse, Body};

    pub type ServerResponse = ApiGatewayProxyResponse;

    pub fn empty_response(status: StatusCode) -> ServerResponse {
        ApiGatewayProxyResponse {
            status_code: i64::from(status.as_u16()),
            headers: HeaderMap::new(),
            multi_value_headers: HeaderMap::new(),
            body: None,
            is_base64_encoded: false,
        }
    }

    pub fn json_response(status: StatusCode, body: Value) -> ServerResponse {
        let mut response = empty_response(status);
        response.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response.body = Some(Body::Text(body.to_string()));
        response
    }

    pub fn status_response<E: ToString>(status: StatusCode, error: E) -> ServerResponse {
        json_response(status, json!({ "error": error.to_string() }))
    }

    pub fn detailed_response<E: ToString>(status: StatusCode, error: E, details: Value) -> ServerResponse {
        json_response(status, json!({
            "error": error.to_string(),
            "details": details,
        }))
    }

    pub fn success_response(message: &str, request_id: &str) -> ServerResponse {
        json_response(StatusCode::OK, json!({
            "success": true,
            "message": message,
            "request_id": request_id,
        }))
    }
}

#[allow(non_snake_case)]
pub mod State {
    use ::std::sync::Arc;
    use crate::{
        Config::ContactConfig,
        Email::{EmailTransport, SmtpTransport},
    };

    pub struct InternalAppState<T: EmailTransport = SmtpTransport> {
        pub config: ContactConfig,
        pub transport: T,
    }
    pub type AppState<T = SmtpTransport> = Arc<InternalAppState<T>>;

    pub fn make_state() -> Result<AppState, crate::E> {
        tracing::info!("Loading contact configuration");
        let config = ContactConfig::from_env()?;
        tracing::info!(
            dispatch = ?config.dispatch,
            locale = ?config.locale,
            message_max_length = config.message_max_length,
            "Creating AppState"
        );
        Ok(Arc::new(InternalAppState {
            config,
            transport: SmtpTransport,
        }))
    }
}

#[allow(non_snake_case)]
pub mod Constants {
    // Every contact form message lands in this inbox
    pub const CONTACT_RECIPIENT: &str = "ivan@elkin.pro";

    pub const NAME_MIN_LENGTH: usize = 2;
    pub const NAME_MAX_LENGTH: usize = 100;
    pub const MESSAGE_MIN_LENGTH: usize = 10;
    pub const EMAIL_MESSAGE_MAX_LENGTH: usize = 2000;
    pub const AUDIT_LOG_MESSAGE_MAX_LENGTH: usize = 1000;

    pub const DEFAULT_SMTP_PORT: u16 = 587;
    // Submission port that speaks TLS from the first byte
    pub const IMPLICIT_TLS_PORT: u16 = 465;
    pub const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;

    pub const PREFLIGHT_MAX_AGE_SECS: u32 = 86400;
}

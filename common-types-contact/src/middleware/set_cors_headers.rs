use http::{
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_METHODS,
        ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_MAX_AGE,
    },
    HeaderValue,
    StatusCode,
};

use crate::{
    Response::{ServerResponse, empty_response},
    Constants,
};

pub fn middleware(mut response: ServerResponse) -> ServerResponse {
    response.headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

pub fn preflight() -> ServerResponse {
    let mut response = middleware(empty_response(StatusCode::OK));
    response.headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS"));
    response.headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    response.headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(Constants::PREFLIGHT_MAX_AGE_SECS));
    response
}

use crate::upstream::UpstreamError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Error calling OpenRouter API";

/// JSON error body returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    MethodNotAllowed(String),
    InvalidRequest(String),
    Upstream(UpstreamError),
}

impl fmt::Display for ApiError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ApiError::MethodNotAllowed(method) => write!(f, "Method not allowed: {method}"),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {msg}"),
            ApiError::Upstream(err) => write!(f, "Upstream error: {err}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Upstream(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        ApiError::Upstream(err)
    }
}

impl ApiError {
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        ApiError::MethodNotAllowed(method.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        ApiError::InvalidRequest(msg.into())
    }

    /// HTTP status for this error.
    ///
    /// Clients only ever see two outcomes: a wrong method, or a failed call.
    /// A body that cannot be forwarded counts as a failed call.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::InvalidRequest(_) | ApiError::Upstream(_) => 500,
        }
    }

    /// Public body for this error. Internal detail stays in the logs.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            ApiError::MethodNotAllowed(_) => METHOD_NOT_ALLOWED_MESSAGE,
            ApiError::InvalidRequest(_) | ApiError::Upstream(_) => UPSTREAM_FAILURE_MESSAGE,
        };

        ErrorResponse {
            error: message.to_string(),
        }
    }
}

#[cfg(feature = "server")]
impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(ApiError::status_code(self))
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(actix_web::ResponseError::status_code(self)).json(self.to_response())
    }
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name to list of messages, as carried in the `errors` member of a
/// validation problem.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const PROBLEM_TYPE_RFC7807: &str = "https://tools.ietf.org/html/rfc7807#section-3.1";
pub const PROBLEM_TYPE_BLANK: &str = "about:blank";

const GENERIC_INTERNAL_DETAIL: &str =
    "An unexpected error occurred. Please try again later.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0:?}")]
    ValidationError(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Service Unavailable")]
    ServiceUnavailable,

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    /// Single-field validation failure.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        AppError::ValidationError(errors)
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "ValidationError",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::BadGateway(_) => "BadGateway",
            AppError::ServiceUnavailable => "ServiceUnavailable",
            AppError::InternalError(_) => "InternalError",
            AppError::DatabaseError(_) => "DatabaseError",
            AppError::ConfigError(_) => "ConfigError",
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        for (field, field_errors) in err.field_errors() {
            let messages = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code))
                })
                .collect();
            errors.insert(camel_case(&field), messages);
        }
        AppError::ValidationError(errors)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// RFC 7807 problem-details body used for every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ProblemDetails {
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(rename = "type")]
    pub problem_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(rename = "exceptionType", skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<String>,
    #[serde(rename = "stackTrace", skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

impl ProblemDetails {
    pub fn new(status: StatusCode, title: &str, detail: impl Into<String>, problem_type: &str) -> Self {
        Self {
            title: title.to_string(),
            status: status.as_u16(),
            detail: detail.into(),
            problem_type: problem_type.to_string(),
            errors: None,
            exception_type: None,
            stack_trace: None,
        }
    }
}

/// Internal error context attached to 5xx responses as a response extension.
///
/// Never serialized directly; `expose_error_details` decides whether the
/// running environment may see it.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub message: String,
    pub trace: String,
    pub problem: ProblemDetails,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        let (status, problem) = match &self {
            AppError::ValidationError(errors) => {
                let mut problem = ProblemDetails::new(
                    StatusCode::BAD_REQUEST,
                    "Validation Error",
                    "One or more validation errors occurred. See errors for details.",
                    PROBLEM_TYPE_RFC7807,
                );
                problem.errors = Some(errors.clone());
                (StatusCode::BAD_REQUEST, problem)
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ProblemDetails::new(StatusCode::BAD_REQUEST, "Bad Request", msg.clone(), PROBLEM_TYPE_RFC7807),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ProblemDetails::new(StatusCode::NOT_FOUND, "Resource Not Found", msg.clone(), PROBLEM_TYPE_RFC7807),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ProblemDetails::new(StatusCode::UNAUTHORIZED, "Unauthorized", msg.clone(), PROBLEM_TYPE_BLANK),
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ProblemDetails::new(StatusCode::FORBIDDEN, "Forbidden", msg.clone(), PROBLEM_TYPE_BLANK),
            ),
            AppError::BadGateway(msg) => (
                StatusCode::BAD_GATEWAY,
                ProblemDetails::new(StatusCode::BAD_GATEWAY, "Bad Gateway", msg.clone(), PROBLEM_TYPE_BLANK),
            ),
            AppError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                ProblemDetails::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service Unavailable",
                    "The service is temporarily unavailable.",
                    PROBLEM_TYPE_BLANK,
                ),
            ),
            AppError::InternalError(_) | AppError::DatabaseError(_) | AppError::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ProblemDetails::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    GENERIC_INTERNAL_DETAIL,
                    PROBLEM_TYPE_BLANK,
                ),
            ),
        };

        let detail = match &self {
            AppError::InternalError(err) | AppError::DatabaseError(err) | AppError::ConfigError(err) => {
                tracing::error!(error = %err, kind = kind, "Unhandled error in API");
                Some(ErrorDetail {
                    kind,
                    message: err.to_string(),
                    trace: format!("{:?}", err),
                    problem: problem.clone(),
                })
            }
            AppError::BadGateway(msg) => {
                tracing::warn!(error = %msg, "Upstream dependency failure");
                None
            }
            _ => None,
        };

        let mut res = (status, Json(problem)).into_response();
        if let Some(detail) = detail {
            res.extensions_mut().insert(detail);
        }
        res
    }
}

/// `razon_social` -> `razonSocial`
pub fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

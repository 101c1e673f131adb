use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Seconds a client should wait before retrying after an upstream outage.
const UPSTREAM_RETRY_AFTER_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(anyhow::Error),

    /// The identity authenticated fine but matches no known account.
    #[error("Unrecognized account: {0}")]
    UnrecognizedAccount(String),

    #[error("Forbidden: {0}")]
    Forbidden(anyhow::Error),

    #[error("Not supported: {0}")]
    NotSupported(String),

    /// A backing data source could not be reached after retries.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(anyhow::Error),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
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

impl AppError {
    /// Machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized(_) => "unauthenticated",
            AppError::UnrecognizedAccount(_) => "unrecognized_account",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotSupported(_) => "not_supported",
            AppError::UpstreamUnavailable(_) => "upstream_unavailable",
            AppError::BadGateway(_) => "bad_gateway",
            AppError::InternalError(_) => "internal_error",
            AppError::ConfigError(_) => "configuration_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UnrecognizedAccount(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotSupported(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            code: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let status = self.status();
        let code = self.code();

        let (error_message, details, retry_after) = match self {
            AppError::ValidationError(err) => {
                ("Validation error".to_string(), Some(err.to_string()), None)
            }
            AppError::BadRequest(err) => (err.to_string(), None, None),
            AppError::NotFound(err) => (err.to_string(), None, None),
            AppError::Unauthorized(err) => (err.to_string(), None, None),
            AppError::UnrecognizedAccount(email) => (
                "Unrecognized account".to_string(),
                Some(format!("{} is not registered with the school", email)),
                None,
            ),
            AppError::Forbidden(err) => (err.to_string(), None, None),
            AppError::NotSupported(operation) => (
                format!("{} is not supported yet", operation),
                None,
                None,
            ),
            AppError::UpstreamUnavailable(err) => {
                tracing::error!(error = %err, "Upstream data source unavailable");
                (
                    "School data is temporarily unavailable, please retry".to_string(),
                    Some(err.to_string()),
                    Some(UPSTREAM_RETRY_AFTER_SECS),
                )
            }
            AppError::BadGateway(msg) => (
                "Upstream returned invalid data".to_string(),
                Some(msg),
                None,
            ),
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "Internal server error");
                ("Internal server error".to_string(), None, None)
            }
            AppError::ConfigError(err) => (
                "Configuration error".to_string(),
                Some(err.to_string()),
                None,
            ),
        };

        let mut res = (
            status,
            Json(ErrorResponse {
                error: error_message,
                code,
                details,
            }),
        )
            .into_response();

        if let Some(retry) = retry_after {
            res.headers_mut()
                .insert(axum::http::header::RETRY_AFTER, retry.into());
        }

        res
    }
}

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed required input.
    #[error("{0}")]
    Validation(String),

    /// Bad credentials.
    #[error("{0}")]
    Auth(String),

    /// No usable bearer token on a protected route.
    #[error("Authentication required")]
    Unauthenticated,

    /// A token supplied in a request body failed verification.
    #[error("{0}")]
    InvalidToken(String),

    #[error("{0}")]
    Conflict(String),

    /// Unknown resource, or one owned by somebody else.
    #[error("{0}")]
    NotFound(String),

    #[error("{message}: {source}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Builds a `map_err` adapter that wraps any failure as an internal error
    /// carrying an endpoint-specific message.
    pub fn internal<E>(message: &'static str) -> impl FnOnce(E) -> AppError
    where
        E: Into<anyhow::Error>,
    {
        move |e| AppError::Internal {
            message: message.into(),
            source: e.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidToken(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Auth(_) | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(source: anyhow::Error) -> Self {
        AppError::Internal {
            message: "Internal server error".into(),
            source,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Internal { message, source } => {
                tracing::error!(error = %source, %message, "request failed");
                json!({ "message": message, "error": source.to_string() })
            }
            other => json!({ "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// `Json` extractor whose rejections are rendered as [`AppError::Validation`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

//! Error types for the status pics proxy

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::fmt;

/// Startup and configuration failures
#[derive(Debug)]
pub enum ProxyError {
    Cache(file_image_cache::CacheError),
    ImageSource(http_cat_client::ImageSourceError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::Cache(err) => write!(f, "Cache error: {}", err),
            ProxyError::ImageSource(err) => write!(f, "Image source error: {}", err),
            ProxyError::Io(err) => write!(f, "IO error: {}", err),
            ProxyError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for ProxyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProxyError::Cache(err) => Some(err),
            ProxyError::ImageSource(err) => Some(err),
            ProxyError::Io(err) => Some(err.as_ref()),
            ProxyError::Config(_) => None,
        }
    }
}

impl From<file_image_cache::CacheError> for ProxyError {
    fn from(err: file_image_cache::CacheError) -> Self {
        ProxyError::Cache(err)
    }
}

impl From<http_cat_client::ImageSourceError> for ProxyError {
    fn from(err: http_cat_client::ImageSourceError) -> Self {
        ProxyError::ImageSource(err)
    }
}

impl From<std::io::Error> for ProxyError {
    fn from(err: std::io::Error) -> Self {
        ProxyError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for ProxyError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ProxyError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;

/// Per-request failure, converted straight into a plain-text response
#[derive(Debug)]
pub enum AppError {
    /// Path is not `/` followed by digits
    BadRequest,
    MethodNotAllowed,
    /// Nothing cached and nothing available remotely
    NotFound,
    /// Saving a PUT payload failed; the message is returned to the caller
    Storage(String),
    /// Any other storage failure; details stay in the logs
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest => (StatusCode::BAD_REQUEST, "Bad Request").into_response(),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "GET, PUT, DELETE")],
                "Method Not Allowed",
            )
                .into_response(),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Failed to save image");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to save image: {}", msg),
                )
                    .into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

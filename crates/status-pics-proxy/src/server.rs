//! HTTP server for status images
//!
//! Every request goes through a single handler: the path must be `/<digits>`,
//! then GET reads, PUT writes and DELETE removes the image for that code.

use crate::error::AppError;
use crate::fetcher::ImageFetcher;
use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, FromRequest, Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use file_image_cache::ImageCode;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Content type of every served image
const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Shared state for the HTTP server
pub struct ServerState {
    pub fetcher: ImageFetcher,
    pub max_body_bytes: usize,
}

impl ServerState {
    pub fn new(fetcher: ImageFetcher, max_body_bytes: usize) -> Self {
        Self {
            fetcher,
            max_body_bytes,
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Operation selected by the request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Delete,
}

/// Validate the path and pick the operation.
///
/// The path is checked first, so a malformed path is a 400 whatever the
/// method.
pub fn route(method: &Method, path: &str) -> Result<(ImageCode, Operation), AppError> {
    let code = path
        .strip_prefix('/')
        .and_then(ImageCode::parse)
        .ok_or(AppError::BadRequest)?;

    let operation = match *method {
        Method::GET => Operation::Read,
        Method::PUT => Operation::Write,
        Method::DELETE => Operation::Delete,
        _ => return Err(AppError::MethodNotAllowed),
    };

    Ok((code, operation))
}

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .fallback(handle_request)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until a shutdown signal arrives
pub async fn start_server(state: SharedState, host: &str, port: u16) -> std::io::Result<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Starting HTTP server on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn handle_request(State(state): State<SharedState>, req: Request) -> Response {
    let (code, operation) = match route(req.method(), req.uri().path()) {
        Ok(routed) => routed,
        Err(e) => {
            debug!(
                method = %req.method(),
                path = %req.uri().path(),
                error = ?e,
                "Rejected request"
            );
            return e.into_response();
        }
    };

    match operation {
        Operation::Read => get_image(&state, &code).await,
        Operation::Write => {
            // Buffer the whole body before touching the cache
            let body = match Bytes::from_request(req, &()).await {
                Ok(body) => body,
                Err(rejection) => {
                    warn!(code = %code, error = %rejection, "Failed to read request body");
                    return rejection.into_response();
                }
            };
            put_image(&state, &code, &body).await
        }
        Operation::Delete => delete_image(&state, &code).await,
    }
}

async fn get_image(state: &ServerState, code: &ImageCode) -> Response {
    match state.fetcher.read(code).await {
        Ok((data, cache_status)) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)
            .header(header::CACHE_CONTROL, "public, max-age=86400")
            .header("X-Cache", cache_status.as_header())
            .body(Body::from(data))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => e.into_response(),
    }
}

async fn put_image(state: &ServerState, code: &ImageCode, body: &[u8]) -> Response {
    match state.fetcher.write(code, body).await {
        Ok(()) => (StatusCode::CREATED, format!("Image {} saved", code)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn delete_image(state: &ServerState, code: &ImageCode) -> Response {
    match state.fetcher.delete(code).await {
        Ok(()) => (StatusCode::OK, format!("Image {} deleted", code)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Resolve on Ctrl-C or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

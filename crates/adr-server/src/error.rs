//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use adr_site::RenderError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// No page at the given path.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// No static file at the given path.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Static path escapes the static directory.
    #[error("Forbidden path: {0}")]
    Forbidden(String),

    /// Render error from adr-site.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "path": path}),
            ),
            Self::FileNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "File not found", "path": path}),
            ),
            Self::Forbidden(path) => (
                StatusCode::FORBIDDEN,
                json!({"error": "Forbidden", "path": path}),
            ),
            Self::Render(RenderError::NotFound(number)) => (
                StatusCode::NOT_FOUND,
                json!({"error": "ADR not found", "number": number}),
            ),
            Self::Render(RenderError::DocsMissing(path)) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Documentation not found", "path": path.display().to_string()}),
            ),
            Self::Render(e) => {
                tracing::error!(error = %e, "Render failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string()}),
                )
            }
            Self::Io(e) => {
                tracing::error!(error = %e, "I/O failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string()}),
                )
            }
            Self::Json(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": e.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_not_found_statuses() {
        let cases = [
            ServerError::PageNotFound("/nope".to_owned()),
            ServerError::FileNotFound("css/x.css".to_owned()),
            ServerError::Render(RenderError::NotFound("0042".to_owned())),
            ServerError::Render(RenderError::DocsMissing(PathBuf::from("README.md"))),
        ];
        for error in cases {
            assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_other_errors_are_internal() {
        let error = ServerError::Io(std::io::Error::other("disk on fire"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let error = ServerError::Render(RenderError::Write(std::io::Error::other("closed")));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_forbidden_status() {
        let error = ServerError::Forbidden("../secret".to_owned());
        assert_eq!(error.into_response().status(), StatusCode::FORBIDDEN);
    }
}

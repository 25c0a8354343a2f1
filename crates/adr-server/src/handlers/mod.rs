//! HTTP request handlers.

pub(crate) mod pages;
pub(crate) mod search;

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use md5::{Digest, Md5};

/// Build a `200` response with an `ETag`, or `304` when the client already
/// holds the same body.
pub(crate) fn conditional_response(
    headers: &HeaderMap,
    version: &str,
    content_type: &str,
    body: Vec<u8>,
) -> Response {
    let etag = compute_etag(version, &body);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    (
        [
            (header::CONTENT_TYPE, content_type.to_owned()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        body,
    )
        .into_response()
}

/// Compute `ETag` from version and content.
///
/// MD5 truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(version.as_bytes());
    hasher.update(b":");
    hasher.update(content);
    format!("\"{}\"", &hex::encode(hasher.finalize())[..16])
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_compute_etag_includes_version() {
        assert_ne!(
            compute_etag("1.0.0", b"content"),
            compute_etag("1.0.1", b"content")
        );
    }

    #[test]
    fn test_compute_etag_includes_content() {
        assert_ne!(
            compute_etag("1.0.0", b"content1"),
            compute_etag("1.0.0", b"content2")
        );
    }

    #[test]
    fn test_compute_etag_format() {
        let etag = compute_etag("1.0.0", b"content");
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert_eq!(etag.len(), 18);
    }

    #[test]
    fn test_conditional_response() {
        let body = b"<p>hi</p>".to_vec();
        let response = conditional_response(&HeaderMap::new(), "1", "text/html", body.clone());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        let etag = response.headers()[header::ETAG].clone();

        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, etag);
        let response = conditional_response(&headers, "1", "text/html", body.clone());
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"stale\""));
        let response = conditional_response(&headers, "1", "text/html", body);
        assert_eq!(response.status(), StatusCode::OK);
    }
}

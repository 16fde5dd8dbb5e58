//! Terminal pipeline stages: bypass emission, compressed emission, and
//! the failure redirect.
//!
//! The redirect is the single recovery strategy for the whole
//! pipeline: any stage failing sends the client straight to the origin
//! URL. No partial responses, no error bodies.

use axum::body::Body;
use axum::http::header::{HeaderMap, HeaderValue};
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;

/// Stream the decoded bytes back unchanged, with the projected headers
/// applied.
pub fn bypass(bytes: Bytes, projected: HeaderMap) -> Response {
    let mut response = Response::new(Body::from(bytes));
    *response.headers_mut() = projected;
    response
        .headers_mut()
        .insert("x-proxy-bypass", HeaderValue::from_static("1"));
    response
}

/// Emit a transcoded payload, advertising the achieved savings.
pub fn compressed(
    bytes: Bytes,
    content_type: &'static str,
    original_size: usize,
    projected: HeaderMap,
) -> Response {
    let saved = original_size.saturating_sub(bytes.len());
    let size = bytes.len();

    let mut response = Response::new(Body::from(bytes));
    *response.headers_mut() = projected;
    let headers = response.headers_mut();
    headers.insert("content-type", HeaderValue::from_static(content_type));
    headers.insert("content-length", HeaderValue::from(size));
    headers.insert("x-original-size", HeaderValue::from(original_size));
    headers.insert("x-bytes-saved", HeaderValue::from(saved));
    response
}

/// Redirect the client to fetch the origin directly. Used for every
/// pipeline failure; the user's client experiences added latency, never
/// a broken image.
pub fn redirect(origin_url: &str) -> Response {
    let mut response = Response::new(Body::empty());

    match HeaderValue::from_str(origin_url) {
        Ok(location) => {
            *response.status_mut() = StatusCode::FOUND;
            let headers = response.headers_mut();
            headers.insert("location", location);
            headers.insert("content-length", HeaderValue::from_static("0"));
        }
        Err(_) => {
            // A URL that cannot be a header value cannot be redirected
            // to; an empty 204 is the least-bad terminal answer.
            *response.status_mut() = StatusCode::NO_CONTENT;
        }
    }
    response
}

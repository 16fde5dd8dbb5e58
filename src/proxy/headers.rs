//! Header projection from origin response to outgoing response.

use axum::http::header::{HeaderMap, HeaderValue};

/// Origin headers copied verbatim onto the outgoing response. Caching
/// and validation headers survive so downstream caches keep working;
/// everything else (transfer framing, encodings, origin server
/// identity) is dropped.
const PROJECTED_HEADERS: [&str; 6] = [
    "content-type",
    "cache-control",
    "expires",
    "etag",
    "last-modified",
    "content-disposition",
];

/// Project the allow-listed origin headers, then force
/// `content-encoding: identity` — the payload handed downstream is
/// always decoded. Idempotent.
pub fn project(origin: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for name in PROJECTED_HEADERS {
        if let Some(value) = origin.get(name) {
            out.insert(name, value.clone());
        }
    }
    out.insert("content-encoding", HeaderValue::from_static("identity"));
    out
}

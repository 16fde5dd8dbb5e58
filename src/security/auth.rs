//! Basic-auth gate middleware.
//!
//! Gates access to the proxy route when `LOGIN`/`PASSWORD` are
//! configured; a deployment without gate credentials is open, matching
//! the proxy's historical behavior for personal instances.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::http::server::AppState;

pub async fn gate_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let gate = &state.config.gate;
    if !gate.enabled() {
        return next.run(req).await;
    }

    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic)
        .map(|(user, pass)| {
            Some(user.as_str()) == gate.login.as_deref()
                && Some(pass.as_str()) == gate.password.as_deref()
        })
        .unwrap_or(false);

    if authorized {
        next.run(req).await
    } else {
        tracing::warn!("gate auth rejected request");
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"imgpress\"")],
            "",
        )
            .into_response()
    }
}

/// Decode an `Authorization: Basic <b64>` value into (user, password).
fn parse_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_credentials() {
        // "user:secret"
        let value = format!("Basic {}", BASE64.encode("user:secret"));
        assert_eq!(
            parse_basic(&value),
            Some(("user".into(), "secret".into()))
        );
    }

    #[test]
    fn rejects_non_basic_schemes() {
        assert_eq!(parse_basic("Bearer abc123"), None);
    }

    #[test]
    fn rejects_missing_separator() {
        let value = format!("Basic {}", BASE64.encode("no-colon-here"));
        assert_eq!(parse_basic(&value), None);
    }
}

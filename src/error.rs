//! Error taxonomy for the proxy pipeline.
//!
//! Every stage has its own error enum; the orchestration boundary folds
//! them into [`ProxyError`] and answers with a redirect to the origin
//! URL. No pipeline error ever reaches the client as an HTTP error
//! status.

use thiserror::Error;

/// Failures raised by the origin fetcher.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The domain allow-list check failed or could not be performed.
    #[error("origin domain rejected: {0}")]
    DomainRejected(String),

    /// The request was sent but nothing came back (timeout included).
    #[error("no response from origin: {0}")]
    NoResponse(String),

    /// Connection-level failure, including redirect exhaustion.
    #[error("transport error: {0}")]
    TransportError(String),

    /// The outbound request could not be constructed.
    #[error("request setup failed: {0}")]
    SetupError(String),
}

/// Failures raised by the content-encoding decoder.
///
/// Unknown encodings are deliberately not represented here; they pass
/// the payload through unchanged.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The declared encoding did not match the byte stream.
    #[error("corrupt {encoding} stream: {reason}")]
    Corrupt { encoding: String, reason: String },
}

/// Failures raised by the transcoder.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("image re-encoding failed: {0}")]
    EncodingFailed(String),

    /// The payload is not an image format the transcoder can decode.
    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),
}

/// Pipeline-level error, caught by the orchestrator and converted into
/// a redirect to the origin URL.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    /// Origin answered with a 5xx; surfaced here so the client can
    /// retry directly against the origin.
    #[error("origin responded with status {0}")]
    OriginStatus(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_errors_fold_into_proxy_error() {
        let fetch: ProxyError = FetchError::NoResponse("timed out".into()).into();
        assert!(matches!(fetch, ProxyError::Fetch(_)));

        let decode: ProxyError = DecodeError::Corrupt {
            encoding: "zstd".into(),
            reason: "bad frame".into(),
        }
        .into();
        assert!(matches!(decode, ProxyError::Decode(_)));

        let transcode: ProxyError = TranscodeError::EncodingFailed("oom".into()).into();
        assert!(matches!(transcode, ProxyError::Transcode(_)));
    }

    #[test]
    fn messages_name_the_failing_stage() {
        let err = FetchError::DomainRejected("host \"evil.test\" not in allow-list".into());
        assert!(err.to_string().contains("domain rejected"));

        let err = DecodeError::Corrupt {
            encoding: "gzip".into(),
            reason: "truncated".into(),
        };
        assert!(err.to_string().contains("gzip"));

        assert_eq!(
            ProxyError::OriginStatus(503).to_string(),
            "origin responded with status 503"
        );
    }
}

//! Compress-vs-bypass decision.
//!
//! Pure predicate over request parameters and decoded payload
//! metadata. No I/O, recomputed per request; the rationale travels
//! into the request log so bypasses are explainable after the fact.

use crate::config::TranscodeConfig;
use crate::http::params::ProxyParams;
use crate::proxy::transcode::OutputFormat;
use crate::proxy::DecodedPayload;

/// Why the pipeline compressed or bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rationale {
    ExplicitBypass,
    EmptyPayload,
    NotAnImage,
    BelowSizeThreshold,
    /// png/gif targeting JPEG loses transparency; only worth it for
    /// payloads large enough to meaningfully shrink.
    TransparentBelowThreshold,
    /// Missing/ambiguous content type: attempt compression, the
    /// transcoder failing falls back to bypass.
    AmbiguousContentType,
    Compressible,
}

/// Outcome of the transcode decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub compress: bool,
    pub rationale: Rationale,
}

impl Decision {
    fn bypass(rationale: Rationale) -> Self {
        Self {
            compress: false,
            rationale,
        }
    }

    fn compress(rationale: Rationale) -> Self {
        Self {
            compress: true,
            rationale,
        }
    }
}

/// Decide whether the decoded payload is worth re-encoding.
pub fn should_compress(
    params: &ProxyParams,
    payload: &DecodedPayload,
    config: &TranscodeConfig,
) -> Decision {
    if params.bypass {
        return Decision::bypass(Rationale::ExplicitBypass);
    }
    if payload.original_size == 0 {
        return Decision::bypass(Rationale::EmptyPayload);
    }

    let content_type = payload.content_type.trim();
    if content_type.is_empty() {
        return Decision::compress(Rationale::AmbiguousContentType);
    }
    if !content_type.starts_with("image") {
        return Decision::bypass(Rationale::NotAnImage);
    }

    if payload.original_size < config.min_compress_length {
        return Decision::bypass(Rationale::BelowSizeThreshold);
    }

    let transparent_source =
        content_type.ends_with("png") || content_type.ends_with("gif");
    if params.output == OutputFormat::Jpeg
        && transparent_source
        && payload.original_size < config.min_transparent_compress_length
    {
        return Decision::bypass(Rationale::TransparentBelowThreshold);
    }

    Decision::compress(Rationale::Compressible)
}

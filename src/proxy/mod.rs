//! The fetch → decode → decide → respond pipeline.
//!
//! # Data Flow
//! ```text
//! ProxyParams (parsed query)
//!     → fetch.rs (origin GET, fixed identity profile, domain check)
//!     → decode.rs (single content-encoding step, lenient unknowns)
//!     → headers.rs (project allow-listed origin headers)
//!     → decision.rs (compress vs bypass, pure)
//!     → transcode.rs | respond::bypass
//!
//! Any stage error → respond::redirect (client fetches origin itself)
//! ```
//!
//! # Design Decisions
//! - One task per request; the only shared state is the reqwest client
//!   and config behind Arc
//! - CPU-bound stages (decompression, pixel encoding) run on the
//!   blocking pool
//! - A transcoded payload larger than the decoded original falls back
//!   to bypass; the proxy never inflates traffic

pub mod decode;
pub mod decision;
pub mod fetch;
pub mod headers;
pub mod respond;
pub mod transcode;

use std::sync::Arc;

use axum::http::header::HeaderMap;
use axum::response::Response;
use bytes::Bytes;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::params::ProxyParams;
use decision::Rationale;
use fetch::OriginFetcher;
use transcode::{TranscodeParams, Transcoder};

/// Decoded origin payload plus the metadata the decision stage needs.
/// Produced once per request, consumed by exactly one emitter.
#[derive(Debug, Clone)]
pub struct DecodedPayload {
    pub bytes: Bytes,
    pub content_type: String,
    pub original_size: usize,
}

/// The per-process pipeline: fetcher, transcoder, and the config they
/// were built from.
pub struct Pipeline {
    fetcher: OriginFetcher,
    transcoder: Arc<dyn Transcoder>,
    config: Arc<ProxyConfig>,
}

impl Pipeline {
    pub fn new(
        config: Arc<ProxyConfig>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Result<Self, reqwest::Error> {
        let fetcher = OriginFetcher::new(config.origin.clone())?;
        Ok(Self {
            fetcher,
            transcoder,
            config,
        })
    }

    /// Run one request through the pipeline. The caller converts any
    /// error into a redirect to the origin URL.
    pub async fn run(
        &self,
        params: &ProxyParams,
        inbound: &HeaderMap,
        client_addr: Option<&str>,
    ) -> Result<Response, ProxyError> {
        let origin = self.fetcher.fetch(&params.url, inbound, client_addr).await?;

        if origin.status >= 500 {
            return Err(ProxyError::OriginStatus(origin.status));
        }

        let projected = headers::project(&origin.headers);
        let encoding = decode::Encoding::parse(origin.header("content-encoding"));
        let content_type = origin.header("content-type").unwrap_or("").to_string();

        let decoded = decode::decode(origin.body, encoding).await?;
        let payload = DecodedPayload {
            original_size: decoded.len(),
            content_type,
            bytes: decoded,
        };

        let decision = decision::should_compress(params, &payload, &self.config.transcode);
        tracing::debug!(
            url = %params.url,
            size = payload.original_size,
            content_type = %payload.content_type,
            compress = decision.compress,
            rationale = ?decision.rationale,
            "transcode decision"
        );

        if !decision.compress {
            return Ok(respond::bypass(payload.bytes, projected));
        }

        let transcode_params = TranscodeParams {
            format: params.output,
            quality: params.quality,
            grayscale: params.grayscale,
        };
        let result = transcode::transcode_blocking(
            self.transcoder.clone(),
            payload.bytes.clone(),
            payload.content_type.clone(),
            transcode_params,
        )
        .await;

        match result {
            Ok(out) if out.len() < payload.original_size => Ok(respond::compressed(
                out,
                params.output.content_type(),
                payload.original_size,
                projected,
            )),
            Ok(out) => {
                tracing::debug!(
                    url = %params.url,
                    transcoded = out.len(),
                    original = payload.original_size,
                    "transcoded output not smaller, bypassing"
                );
                Ok(respond::bypass(payload.bytes, projected))
            }
            // An ambiguous content type was only ever a guess; a
            // transcoder refusal means it was not an image after all.
            Err(e) if decision.rationale == Rationale::AmbiguousContentType => {
                tracing::debug!(url = %params.url, error = %e, "ambiguous payload, bypassing");
                Ok(respond::bypass(payload.bytes, projected))
            }
            Err(e) => Err(e.into()),
        }
    }
}

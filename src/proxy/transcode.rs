//! Image transcoding.
//!
//! The pipeline only depends on the [`Transcoder`] trait; the concrete
//! [`ImageTranscoder`] re-encodes through the `image` crate. Encoding
//! is deterministic for identical inputs and parameters, so repeated
//! compression of the same payload yields the same bytes.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;

use crate::error::TranscodeError;

/// Target representation for a transcoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless WebP (the `image` crate does not do lossy WebP).
    Webp,
    /// JPEG at a caller-supplied quality.
    Jpeg,
}

impl OutputFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Webp => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Caller-supplied encoder parameters.
#[derive(Debug, Clone, Copy)]
pub struct TranscodeParams {
    pub format: OutputFormat,
    /// 1-100, only meaningful for JPEG.
    pub quality: u8,
    pub grayscale: bool,
}

/// Re-encodes image bytes into a smaller representation.
pub trait Transcoder: Send + Sync {
    fn transcode(
        &self,
        bytes: &[u8],
        content_type: &str,
        params: &TranscodeParams,
    ) -> Result<Vec<u8>, TranscodeError>;
}

/// Run a transcoder on the blocking pool; pixel work must not stall
/// the async runtime.
pub async fn transcode_blocking(
    transcoder: Arc<dyn Transcoder>,
    bytes: Bytes,
    content_type: String,
    params: TranscodeParams,
) -> Result<Bytes, TranscodeError> {
    tokio::task::spawn_blocking(move || {
        transcoder
            .transcode(&bytes, &content_type, &params)
            .map(Bytes::from)
    })
    .await
    .map_err(|e| TranscodeError::EncodingFailed(format!("transcode task failed: {}", e)))?
}

/// `image`-crate backed transcoder.
#[derive(Debug, Default)]
pub struct ImageTranscoder;

impl Transcoder for ImageTranscoder {
    fn transcode(
        &self,
        bytes: &[u8],
        content_type: &str,
        params: &TranscodeParams,
    ) -> Result<Vec<u8>, TranscodeError> {
        let img = image::load_from_memory(bytes).map_err(|e| {
            TranscodeError::UnsupportedFormat(format!("{} ({})", e, content_type))
        })?;

        let img = if params.grayscale { img.grayscale() } else { img };

        let mut out = Vec::new();
        match params.format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha; luma stays luma, everything else
                // flattens to RGB.
                let img = match img {
                    luma @ DynamicImage::ImageLuma8(_) => luma,
                    other => DynamicImage::ImageRgb8(other.to_rgb8()),
                };
                let encoder =
                    JpegEncoder::new_with_quality(Cursor::new(&mut out), params.quality);
                img.write_with_encoder(encoder)
                    .map_err(|e| TranscodeError::EncodingFailed(e.to_string()))?;
            }
            OutputFormat::Webp => {
                // The lossless WebP encoder accepts RGB8/RGBA8 only.
                let img = if img.color().has_alpha() {
                    DynamicImage::ImageRgba8(img.to_rgba8())
                } else {
                    DynamicImage::ImageRgb8(img.to_rgb8())
                };
                let encoder = WebPEncoder::new_lossless(Cursor::new(&mut out));
                img.write_with_encoder(encoder)
                    .map_err(|e| TranscodeError::EncodingFailed(e.to_string()))?;
            }
        }
        Ok(out)
    }
}

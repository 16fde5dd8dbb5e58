//! Query-parameter parsing for the proxy route.
//!
//! The route is `GET /?url=<origin>` with optional override flags:
//! `jpeg` (prefer JPEG output over WebP), `bw` (grayscale, on unless
//! `bw=0`), `l` (encoder quality 1-100), `raw` (force bypass, no
//! transcoding). Parsing is pure so it can be tested without a server.

use crate::config::TranscodeConfig;
use crate::proxy::transcode::OutputFormat;

/// Decision-relevant parameters of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyParams {
    pub url: String,
    pub output: OutputFormat,
    pub grayscale: bool,
    pub quality: u8,
    /// Explicit client request to skip transcoding.
    pub bypass: bool,
}

impl ProxyParams {
    /// Parse the raw query string. Returns `None` when no `url` is
    /// present, which the route answers with a plain-text banner.
    ///
    /// Origin URLs often embed unescaped `&url=` fragments; repeated
    /// `url` keys are re-joined so such URLs survive the trip.
    pub fn from_query(raw_query: &str, defaults: &TranscodeConfig) -> Option<Self> {
        let mut url_parts: Vec<String> = Vec::new();
        let mut jpeg = false;
        let mut grayscale = true;
        let mut quality = defaults.default_quality;
        let mut bypass = false;

        for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
            match key.as_ref() {
                "url" => url_parts.push(value.into_owned()),
                "jpeg" => jpeg = flag_set(&value),
                "bw" => grayscale = flag_set(&value),
                "l" => {
                    if let Ok(q) = value.parse::<u8>() {
                        quality = q.clamp(1, 100);
                    }
                }
                "raw" => bypass = flag_set(&value),
                _ => {}
            }
        }

        let url = url_parts.join("&url=");
        if url.is_empty() {
            return None;
        }

        Some(Self {
            url,
            output: if jpeg {
                OutputFormat::Jpeg
            } else {
                OutputFormat::Webp
            },
            grayscale,
            quality,
            bypass,
        })
    }
}

/// A flag is set unless explicitly zeroed (`?jpeg` and `?jpeg=1` both
/// count).
fn flag_set(value: &str) -> bool {
    value != "0"
}

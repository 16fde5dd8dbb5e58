//! Content-encoding decoding.
//!
//! The origin advertises at most one encoding token per response; the
//! decoder applies exactly one matching decompression step. Unknown
//! tokens are a lenient pass-through (logged, never fatal) so an origin
//! experimenting with new schemes degrades to "no savings" instead of a
//! broken image.

use std::io::Read;

use bytes::Bytes;

use crate::error::DecodeError;

/// Content-encoding token attached to an origin response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    Identity,
    Gzip,
    Deflate,
    Brotli,
    /// lzma and lzma2 are handled identically.
    Lzma,
    Zstd,
    Unknown(String),
}

impl Encoding {
    /// Map a raw `content-encoding` header value onto a token. Absent
    /// or empty headers mean identity.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("identity") => Encoding::Identity,
            Some("gzip") | Some("x-gzip") => Encoding::Gzip,
            Some("deflate") => Encoding::Deflate,
            Some("br") => Encoding::Brotli,
            Some("lzma") | Some("lzma2") => Encoding::Lzma,
            Some("zstd") => Encoding::Zstd,
            Some(other) => Encoding::Unknown(other.to_string()),
        }
    }

    fn name(&self) -> &str {
        match self {
            Encoding::Identity => "identity",
            Encoding::Gzip => "gzip",
            Encoding::Deflate => "deflate",
            Encoding::Brotli => "br",
            Encoding::Lzma => "lzma",
            Encoding::Zstd => "zstd",
            Encoding::Unknown(raw) => raw,
        }
    }
}

/// Every token the fetcher may advertise in `Accept-Encoding`, i.e.
/// everything [`decode`] can actually undo.
pub const ACCEPTED_ENCODINGS: &str = "gzip, deflate, br, lzma, lzma2, zstd";

/// Decode a payload according to its declared encoding.
///
/// Decompression is CPU-bound, so non-trivial tokens run on the
/// blocking pool; the calling task suspends without stalling the
/// runtime.
pub async fn decode(bytes: Bytes, encoding: Encoding) -> Result<Bytes, DecodeError> {
    match encoding {
        Encoding::Identity => Ok(bytes),
        Encoding::Unknown(raw) => {
            tracing::warn!(encoding = %raw, "unknown content-encoding, passing through");
            Ok(bytes)
        }
        other => {
            let name = other.name().to_string();
            tokio::task::spawn_blocking(move || decode_sync(&bytes, &other))
                .await
                .map_err(|e| DecodeError::Corrupt {
                    encoding: name,
                    reason: format!("decode task failed: {}", e),
                })?
        }
    }
}

fn decode_sync(bytes: &[u8], encoding: &Encoding) -> Result<Bytes, DecodeError> {
    let corrupt = |reason: std::io::Error| DecodeError::Corrupt {
        encoding: encoding.name().to_string(),
        reason: reason.to_string(),
    };

    let mut out = Vec::with_capacity(bytes.len().saturating_mul(2));
    match encoding {
        Encoding::Gzip => {
            flate2::read::GzDecoder::new(bytes)
                .read_to_end(&mut out)
                .map_err(corrupt)?;
        }
        Encoding::Deflate => {
            flate2::read::ZlibDecoder::new(bytes)
                .read_to_end(&mut out)
                .map_err(corrupt)?;
        }
        Encoding::Brotli => {
            brotli::Decompressor::new(bytes, 4096)
                .read_to_end(&mut out)
                .map_err(corrupt)?;
        }
        Encoding::Lzma => {
            xz2::read::XzDecoder::new(bytes)
                .read_to_end(&mut out)
                .map_err(corrupt)?;
        }
        Encoding::Zstd => {
            out = zstd::stream::decode_all(bytes).map_err(corrupt)?;
        }
        // Handled before dispatching to the blocking pool.
        Encoding::Identity | Encoding::Unknown(_) => out.extend_from_slice(bytes),
    }
    Ok(Bytes::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PAYLOAD: &[u8] = b"the quick brown fox jumps over the lazy dog, repeatedly, \
                             because compressible payloads need repetition repetition";

    #[tokio::test]
    async fn gzip_round_trip() {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(PAYLOAD).unwrap();
        let compressed = Bytes::from(encoder.finish().unwrap());

        let decoded = decode(compressed, Encoding::Gzip).await.unwrap();
        assert_eq!(&decoded[..], PAYLOAD);
    }

    #[tokio::test]
    async fn deflate_round_trip() {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(PAYLOAD).unwrap();
        let compressed = Bytes::from(encoder.finish().unwrap());

        let decoded = decode(compressed, Encoding::Deflate).await.unwrap();
        assert_eq!(&decoded[..], PAYLOAD);
    }

    #[tokio::test]
    async fn brotli_round_trip() {
        let mut compressed = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(&mut compressed, 4096, 5, 22);
            writer.write_all(PAYLOAD).unwrap();
        }

        let decoded = decode(Bytes::from(compressed), Encoding::Brotli)
            .await
            .unwrap();
        assert_eq!(&decoded[..], PAYLOAD);
    }

    #[tokio::test]
    async fn lzma_round_trip() {
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
        encoder.write_all(PAYLOAD).unwrap();
        let compressed = Bytes::from(encoder.finish().unwrap());

        // lzma and lzma2 share the same decode path.
        let decoded = decode(compressed, Encoding::Lzma).await.unwrap();
        assert_eq!(&decoded[..], PAYLOAD);
    }

    #[tokio::test]
    async fn zstd_round_trip() {
        let compressed = Bytes::from(zstd::stream::encode_all(PAYLOAD, 3).unwrap());

        let decoded = decode(compressed, Encoding::Zstd).await.unwrap();
        assert_eq!(&decoded[..], PAYLOAD);
    }

    #[tokio::test]
    async fn identity_passes_through() {
        let decoded = decode(Bytes::from_static(PAYLOAD), Encoding::Identity)
            .await
            .unwrap();
        assert_eq!(&decoded[..], PAYLOAD);
    }

    #[tokio::test]
    async fn unknown_token_passes_through() {
        let decoded = decode(
            Bytes::from_static(PAYLOAD),
            Encoding::parse(Some("snappy")),
        )
        .await
        .unwrap();
        assert_eq!(&decoded[..], PAYLOAD);
    }

    #[tokio::test]
    async fn corrupt_zstd_is_an_error() {
        let err = decode(Bytes::from_static(b"definitely not zstd"), Encoding::Zstd)
            .await
            .unwrap_err();
        let crate::error::DecodeError::Corrupt { encoding, .. } = err;
        assert_eq!(encoding, "zstd");
    }

    #[test]
    fn token_parsing() {
        assert_eq!(Encoding::parse(None), Encoding::Identity);
        assert_eq!(Encoding::parse(Some("")), Encoding::Identity);
        assert_eq!(Encoding::parse(Some("GZIP")), Encoding::Gzip);
        assert_eq!(Encoding::parse(Some("br")), Encoding::Brotli);
        assert_eq!(Encoding::parse(Some("lzma")), Encoding::Lzma);
        assert_eq!(Encoding::parse(Some("lzma2")), Encoding::Lzma);
        assert_eq!(Encoding::parse(Some("zstd")), Encoding::Zstd);
        assert_eq!(
            Encoding::parse(Some("snappy")),
            Encoding::Unknown("snappy".into())
        );
    }
}

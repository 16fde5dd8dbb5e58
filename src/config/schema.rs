//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! proxy. All types derive Serde traits; defaults mirror the minimal
//! deployment (no gate auth, no origin credentials).

use serde::{Deserialize, Serialize};

/// Root configuration for the image proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Outbound origin-fetch settings.
    pub origin: OriginConfig,

    /// Transcode decision thresholds and defaults.
    pub transcode: TranscodeConfig,

    /// Optional basic-auth gate in front of the proxy route.
    pub gate: GateConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout applied at the router, seconds. Must
    /// exceed the origin fetch timeout so the redirect fallback wins.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Basic-auth credentials for the upstream origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// Outbound fetch settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Hostnames substrings allowed as fetch targets. A URL is allowed
    /// when its hostname contains any entry.
    pub allowed_domains: Vec<String>,

    /// Origin request timeout, seconds.
    pub timeout_secs: u64,

    /// Maximum redirect hops to follow.
    pub max_redirects: usize,

    /// Optional basic-auth credentials presented to the origin.
    pub credentials: Option<BasicCredentials>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            allowed_domains: Vec::new(),
            timeout_secs: 10,
            max_redirects: 5,
            credentials: None,
        }
    }
}

/// Transcode decision thresholds and encoder defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Payloads below this size are never worth re-encoding.
    pub min_compress_length: usize,

    /// Higher floor for png/gif payloads when the target is JPEG,
    /// which drops transparency; small transparent images are not
    /// worth the trade.
    pub min_transparent_compress_length: usize,

    /// Encoder quality used when the client does not pass one (1-100).
    pub default_quality: u8,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            min_compress_length: 2048,
            min_transparent_compress_length: 102_400,
            default_quality: 40,
        }
    }
}

/// Basic-auth gate in front of the proxy route. Disabled when `login`
/// is `None`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    pub login: Option<String>,
    pub password: Option<String>,
}

impl GateConfig {
    pub fn enabled(&self) -> bool {
        self.login.is_some()
    }
}

//! HTTP surface of the proxy.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, gate auth, tracing, timeout)
//!     → params.rs (query string → ProxyParams)
//!     → proxy::Pipeline (fetch/decode/decide/respond)
//!     → Send to client (image bytes or redirect)
//! ```

pub mod params;
pub mod server;

pub use params::ProxyParams;
pub use server::HttpServer;

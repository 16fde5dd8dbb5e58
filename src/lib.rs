//! Bandwidth-saving image proxy library.
//!
//! Fetches a client-named origin URL, strips transport compression the
//! client cannot reuse, re-encodes the image when that saves bytes, and
//! streams the result back with corrected headers. Every pipeline
//! failure turns into a redirect so the client fetches the origin
//! directly.

pub mod config;
pub mod error;
pub mod http;
pub mod proxy;
pub mod security;

pub use config::ProxyConfig;
pub use http::HttpServer;

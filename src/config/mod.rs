//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (PORT, DOMAIN, USER/PASS, LOGIN/PASSWORD, ...)
//!     → loader.rs (read & coerce)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to the server and pipeline
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and injected; the pipeline never
//!   touches the ambient environment
//! - All fields have defaults so an empty environment still boots a
//!   usable (auth-less) proxy for local testing
//! - Validation separates coercion (loader) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_from_env, ConfigError};
pub use schema::{BasicCredentials, GateConfig, OriginConfig, ProxyConfig, TranscodeConfig};

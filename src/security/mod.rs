//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → auth.rs (basic-auth gate, if configured)
//!     → params parsing
//!     → domain.rs (origin allow-list, consulted by the fetcher)
//!     → Pass to pipeline
//! ```
//!
//! # Design Decisions
//! - Fail closed: unparsable origin URLs are rejected
//! - The fetcher owns the domain check; a request that skips it cannot
//!   reach the network

pub mod auth;
pub mod domain;

pub use auth::gate_middleware;
pub use domain::DomainPolicy;

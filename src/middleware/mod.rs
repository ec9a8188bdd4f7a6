//! Request-pipeline middleware.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → trusted_hosts.rs (peer gate, chain walk, URI/attribute rewrite)
//!         → wrapped handler, or the not-trusted branch (default 412)
//!     → scheme.rs (chain-less scheme resolution for pre-resolved setups)
//! ```
//!
//! # Design Decisions
//! - Middleware are plain axum middleware functions wired with
//!   `middleware::from_fn_with_state`
//! - All state values are immutable; configuration methods return new values
//! - Runtime header anomalies never fail a request; they degrade to the
//!   least-trusting outcome

pub mod scheme;
pub mod trusted_hosts;
mod uri;

pub use scheme::{scheme_resolver_middleware, SchemeResolver};
pub use trusted_hosts::{trusted_hosts_middleware, ForwardedIdentity, TrustedHosts};

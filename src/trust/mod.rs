//! Trust resolution core.
//!
//! # Data Flow
//! ```text
//! Peer address + request headers:
//!     → registry.rs (first entry whose networks contain the peer)
//!     → chain.rs (parse the entry's first present chain header)
//!     → resolver.rs (right-to-left walk via network.rs membership)
//!     → protocol.rs (scheme from separate protocol headers, if needed)
//!     → Resolution consumed by the middleware
//! ```
//!
//! # Design Decisions
//! - No trust in client input: an untrusted peer never gets its headers read
//! - First-matching-entry wins at every membership test; registration order
//!   is semantic
//! - All values are immutable once built and shared read-only across
//!   requests

pub mod chain;
pub mod error;
pub mod network;
pub mod protocol;
pub mod registry;
pub mod resolver;

pub use chain::{parse_chain, ChainEncoding, Hop};
pub use error::{TrustError, TrustResult};
pub use network::NetworkSet;
pub use protocol::{ProtocolResolution, ProtocolStrategy};
pub use registry::{
    NotTrustedBranch, TrustEntry, TrustRegistry, ATTR_CLIENT_IP, ATTR_HOST, ATTR_PATH,
    ATTR_QUERY, ATTR_SCHEME,
};
pub use resolver::{resolve, Resolution};

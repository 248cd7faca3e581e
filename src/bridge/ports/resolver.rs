//! Host address resolution seam.

use std::net::IpAddr;

/// Resolves hostnames to addresses during service derivation.
///
/// Injected rather than called through the system resolver directly so that
/// derivation is deterministic under test. Implementations may block.
pub trait HostResolver: Send + Sync {
    /// Resolves a hostname, returning `None` when resolution fails.
    fn resolve(&self, host: &str) -> Option<IpAddr>;
}

//! Service identifier wire format.
//!
//! The default identifier shape is
//! `<hostname>:<container-name>:<exposed-port>[:udp]`. Cleanup parses this
//! format back out of the registry to decide which entries this host owns;
//! an entry that does not parse is never touched.

use super::Protocol;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

#[expect(clippy::expect_used, reason = "the pattern is a checked constant")]
static SERVICE_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?):([A-Za-z0-9][\w.\-]+):([0-9]+)(?::(udp))?$")
        .expect("service id pattern must compile")
});

/// Identifier of a single registry entry.
///
/// Defaults to the wire format above; a per-port `id` metadata key replaces
/// it with an arbitrary string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(String);

impl ServiceId {
    /// Creates an identifier from an arbitrary override string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds the default wire-format identifier for an exposed port.
    #[must_use]
    pub fn for_port(
        hostname: &str,
        container_name: &str,
        exposed_port: u16,
        protocol: Protocol,
    ) -> Self {
        let mut id = format!("{hostname}:{container_name}:{exposed_port}");
        if protocol.is_udp() {
            id.push_str(":udp");
        }
        Self(id)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registry identifier that parsed as this bridge's wire format, and can
/// therefore be attributed to a host and container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedServiceId {
    /// Hostname component.
    pub hostname: String,
    /// Container name component.
    pub container_name: String,
    /// Exposed port component.
    pub exposed_port: u16,
    /// Whether the identifier carries the `:udp` suffix.
    pub udp: bool,
}

impl OwnedServiceId {
    /// Parses a registry identifier, returning `None` when it does not match
    /// the wire format (and so was not created by a bridge).
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        let captures = SERVICE_ID_PATTERN.captures(id)?;
        let exposed_port = captures.get(3)?.as_str().parse().ok()?;
        Some(Self {
            hostname: captures.get(1)?.as_str().to_string(),
            container_name: captures.get(2)?.as_str().to_string(),
            exposed_port,
            udp: captures.get(4).is_some(),
        })
    }

    /// Returns the protocol the identifier encodes.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        if self.udp { Protocol::Udp } else { Protocol::Tcp }
    }
}

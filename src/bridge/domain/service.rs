//! Service records and the dead-container grace holder.

use super::{ContainerRef, ServiceId, ServicePort};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One registry entry derived from a container port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Stable unique identifier, default wire format unless overridden.
    pub id: ServiceId,
    /// Logical service name.
    pub name: String,
    /// Address to advertise.
    pub ip: String,
    /// Port to advertise.
    pub port: u16,
    /// Alternate registration address, only set on the VPC label path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_ip: Option<String>,
    /// Sidecar proxy port from `proxyport` metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_port: Option<u16>,
    /// Ordered tag list.
    pub tags: Vec<String>,
    /// Free-form attributes, metadata minus the reserved keys.
    pub attrs: HashMap<String, String>,
    /// Time-to-live in seconds reported to the registry, zero when disabled.
    pub ttl: i64,
    /// The port tuple the service was built from.
    pub origin: ServicePort,
}

impl Service {
    /// Returns the source container reference.
    #[must_use]
    pub const fn container(&self) -> &ContainerRef {
        &self.origin.container
    }
}

/// Grace-period holder for a container that exited or disappeared.
///
/// Retains the container's services for a countdown so a quick restart can
/// resurrect them without re-registering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadContainer {
    ttl_remaining: i64,
    services: Vec<Service>,
}

impl DeadContainer {
    /// Creates a grace entry holding the given services.
    #[must_use]
    pub const fn new(ttl: i64, services: Vec<Service>) -> Self {
        Self {
            ttl_remaining: ttl,
            services,
        }
    }

    /// Remaining grace time in seconds.
    #[must_use]
    pub const fn ttl_remaining(&self) -> i64 {
        self.ttl_remaining
    }

    /// Returns the retained services.
    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Consumes the holder, yielding the retained services.
    #[must_use]
    pub fn into_services(self) -> Vec<Service> {
        self.services
    }

    /// Counts down by one refresh step, returning true once expired.
    pub const fn tick(&mut self, step: i64) -> bool {
        self.ttl_remaining -= step;
        self.ttl_remaining <= 0
    }
}

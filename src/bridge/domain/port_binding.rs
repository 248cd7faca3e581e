//! Port specifications, published bindings, and the pre-service tuple.

use super::{BridgeDomainError, ContainerInspect, ContainerRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Transport protocol of an exposed container port.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TCP, the runtime's default when no protocol is given.
    #[default]
    Tcp,
    /// UDP; services on UDP ports carry a `udp` tag and ID suffix.
    Udp,
}

impl Protocol {
    /// Returns true for UDP ports.
    #[must_use]
    pub const fn is_udp(self) -> bool {
        matches!(self, Self::Udp)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Udp => f.write_str("udp"),
        }
    }
}

impl FromStr for Protocol {
    type Err = BridgeDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            other => Err(BridgeDomainError::InvalidProtocol(other.to_string())),
        }
    }
}

/// A runtime-style port key, e.g. `80/tcp` or `53/udp`.
///
/// A bare port number parses as TCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortSpec {
    /// Container-side port number.
    pub port: u16,
    /// Transport protocol.
    pub protocol: Protocol,
}

impl PortSpec {
    /// Creates a TCP port specification.
    #[must_use]
    pub const fn tcp(port: u16) -> Self {
        Self {
            port,
            protocol: Protocol::Tcp,
        }
    }

    /// Creates a UDP port specification.
    #[must_use]
    pub const fn udp(port: u16) -> Self {
        Self {
            port,
            protocol: Protocol::Udp,
        }
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

impl FromStr for PortSpec {
    type Err = BridgeDomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (port, protocol) = match value.split_once('/') {
            Some((port, protocol)) => (port, protocol.parse()?),
            None => (value, Protocol::Tcp),
        };
        let port = port
            .parse()
            .map_err(|_| BridgeDomainError::InvalidPortSpec(value.to_string()))?;
        Ok(Self { port, protocol })
    }
}

/// A published host-side binding as reported by the runtime.
///
/// Both fields keep the runtime's string form; an empty host port means the
/// port is exposed but not published.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    /// Host interface address, empty when the runtime reports none.
    pub host_ip: String,
    /// Host port number, empty when the port is unpublished.
    pub host_port: String,
}

impl PortBinding {
    /// Creates a binding from host address and port strings.
    #[must_use]
    pub fn new(host_ip: impl Into<String>, host_port: impl Into<String>) -> Self {
        Self {
            host_ip: host_ip.into(),
            host_port: host_port.into(),
        }
    }
}

/// The pre-service tuple: one exposed port joined with its host publication
/// and a back-reference to the source container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    /// Container-side port number.
    pub exposed_port: u16,
    /// Container-internal address, used in internal mode.
    pub exposed_ip: String,
    /// Published host port, `None` when the port is unpublished.
    pub host_port: Option<u16>,
    /// Published host interface address.
    pub host_ip: String,
    /// Transport protocol.
    pub protocol: Protocol,
    /// Source container.
    pub container: ContainerRef,
}

/// Merges declared exposed ports and runtime bindings into the port set a
/// container offers.
///
/// Declared exposed ports are synthesized as published on `0.0.0.0` at the
/// exposed port itself (the host-networking case); runtime bindings then
/// overlay them keyed by port specification (the bridge-networking case).
/// Iteration order is deterministic.
#[must_use]
pub fn collect_service_ports(container: &ContainerInspect) -> BTreeMap<PortSpec, ServicePort> {
    let container_ref = container.container_ref();
    let mut ports = BTreeMap::new();

    for spec in &container.exposed_ports {
        let synthesized = PortBinding::new("0.0.0.0", spec.port.to_string());
        ports.insert(
            *spec,
            service_port(container, &container_ref, *spec, Some(&synthesized)),
        );
    }

    for (spec, bindings) in &container.port_bindings {
        ports.insert(
            *spec,
            service_port(container, &container_ref, *spec, bindings.first()),
        );
    }

    ports
}

fn service_port(
    container: &ContainerInspect,
    container_ref: &ContainerRef,
    spec: PortSpec,
    binding: Option<&PortBinding>,
) -> ServicePort {
    let host_ip = binding
        .map(|b| b.host_ip.clone())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let host_port = binding.and_then(|b| b.host_port.parse().ok());

    ServicePort {
        exposed_port: spec.port,
        exposed_ip: container.ip_address.clone(),
        host_port,
        host_ip,
        protocol: spec.protocol,
        container: container_ref.clone(),
    }
}

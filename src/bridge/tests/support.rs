//! Shared harness for bridge engine tests.

use crate::bridge::adapters::{InMemoryRegistry, InMemoryRuntime, StaticResolver};
use crate::bridge::domain::{
    BridgeConfig, ContainerId, ContainerRef, PortSpec, Protocol, Service, ServiceId, ServicePort,
};
use crate::bridge::services::Bridge;
use std::sync::Arc;

/// Hostname the test bridge runs under.
pub const HOSTNAME: &str = "myhost";

/// A bridge wired to in-memory adapters, with handles kept for observation.
pub struct Harness {
    pub registry: InMemoryRegistry,
    pub runtime: InMemoryRuntime,
    pub bridge: Bridge,
}

/// Builds a harness with an empty resolver table.
pub fn harness(config: BridgeConfig) -> Harness {
    harness_with_resolver(config, StaticResolver::new())
}

/// Builds a harness with the given resolver table.
pub fn harness_with_resolver(config: BridgeConfig, resolver: StaticResolver) -> Harness {
    let registry = InMemoryRegistry::new();
    let runtime = InMemoryRuntime::new();
    let bridge = Bridge::with_adapter(
        Arc::new(registry.clone()),
        Arc::new(runtime.clone()),
        Arc::new(resolver),
        HOSTNAME,
        config,
    );
    Harness {
        registry,
        runtime,
        bridge,
    }
}

/// Builds a standalone service record, as another bridge would have
/// registered it. Used to seed pre-existing registry content.
pub fn seeded_service(
    hostname: &str,
    container_name: &str,
    exposed_port: u16,
    name: &str,
) -> Service {
    let container = ContainerRef::new(ContainerId::new(format!("{container_name}-id")), container_name);
    Service {
        id: ServiceId::for_port(hostname, container_name, exposed_port, Protocol::Tcp),
        name: name.to_string(),
        ip: "10.0.0.9".to_string(),
        port: exposed_port,
        register_ip: None,
        proxy_port: None,
        tags: Vec::new(),
        attrs: std::collections::HashMap::new(),
        ttl: 0,
        origin: ServicePort {
            exposed_port,
            exposed_ip: String::new(),
            host_port: Some(exposed_port),
            host_ip: "10.0.0.9".to_string(),
            protocol: Protocol::Tcp,
            container,
        },
    }
}

/// Shorthand for a TCP port spec.
pub const fn tcp(port: u16) -> PortSpec {
    PortSpec::tcp(port)
}

/// Shorthand for a UDP port spec.
pub const fn udp(port: u16) -> PortSpec {
    PortSpec::udp(port)
}

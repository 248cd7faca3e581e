//! Service derivation: container snapshots into registry records.
//!
//! Pure per-port rules live in the domain; this module orchestrates them
//! together with the two effectful inputs derivation needs, host address
//! resolution and linked-container inspection.

use crate::bridge::domain::{
    BridgeConfig, ContainerId, ContainerInspect, Service, ServiceId, ServiceMetadata, ServicePort,
    collect_service_ports, combine_tags,
};
use crate::bridge::ports::{ContainerRuntime, HostResolver};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

const ECS_TASK_ARN_LABEL: &str = "com.amazonaws.ecs.task-arn";

#[expect(clippy::expect_used, reason = "the pattern is a checked constant")]
static EC2_INTERNAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ip-\S+\.ec2\.internal").expect("ec2 hostname pattern must compile")
});

/// Derives the services a container should register, under one engine
/// configuration and process hostname.
pub(crate) struct ServiceDeriver<'a> {
    config: &'a BridgeConfig,
    hostname: &'a str,
    runtime: &'a dyn ContainerRuntime,
    resolver: &'a dyn HostResolver,
}

impl<'a> ServiceDeriver<'a> {
    pub(crate) const fn new(
        config: &'a BridgeConfig,
        hostname: &'a str,
        runtime: &'a dyn ContainerRuntime,
        resolver: &'a dyn HostResolver,
    ) -> Self {
        Self {
            config,
            hostname,
            runtime,
            resolver,
        }
    }

    /// Produces the service records for a container, zero or more.
    ///
    /// Ports without a host publication are dropped outside internal mode;
    /// ports carrying `ignore` metadata, or lacking `name` metadata in
    /// explicit mode, produce no service.
    pub(crate) async fn derive(&self, container: &ContainerInspect, quiet: bool) -> Vec<Service> {
        let ports = collect_service_ports(container);
        if ports.is_empty() {
            if !quiet {
                info!(container = %container.id.short(), "ignored, no published ports");
            }
            return Vec::new();
        }

        let mut published = Vec::new();
        for port in ports.into_values() {
            if !self.config.internal && port.host_port.is_none() {
                if !quiet {
                    info!(
                        container = %container.id.short(),
                        port = port.exposed_port,
                        "ignored, port not published on host"
                    );
                }
                continue;
            }
            published.push(port);
        }

        let group = published.len() > 1;
        let mut services = Vec::new();
        for port in published {
            let exposed_port = port.exposed_port;
            match self.build_service(container, port, group).await {
                Some(service) => services.push(service),
                None => {
                    if !quiet {
                        debug!(
                            container = %container.id.short(),
                            port = exposed_port,
                            "ignored service on port"
                        );
                    }
                }
            }
        }
        services
    }

    async fn build_service(
        &self,
        container: &ContainerInspect,
        mut port: ServicePort,
        group: bool,
    ) -> Option<Service> {
        let default_name = container.image_base_name().to_string();

        let mut hostname =
            if self.config.awsvpc && EC2_INTERNAL_PATTERN.is_match(&container.hostname) {
                container.hostname.clone()
            } else {
                self.hostname.to_string()
            };
        if hostname.is_empty() {
            hostname = port.host_ip.clone();
        }

        if port.host_ip == "0.0.0.0" {
            match self.resolver.resolve(&hostname) {
                Some(address) => port.host_ip = address.to_string(),
                None => debug!(host = %hostname, "host address did not resolve, keeping 0.0.0.0"),
            }
        }

        if let Some(host_ip) = &self.config.host_ip {
            port.host_ip.clone_from(host_ip);
        }

        let metadata =
            ServiceMetadata::extract(&container.env, &container.labels, port.exposed_port);
        if metadata.get_non_empty("ignore").is_some() {
            return None;
        }

        let mut name = match metadata.get_non_empty("name") {
            Some(name) => name.to_string(),
            None if self.config.explicit => return None,
            None => default_name,
        };
        if group && !metadata.is_port_scoped("name") {
            name = format!("{name}-{}", port.exposed_port);
        }

        let mut id = ServiceId::for_port(
            &hostname,
            &port.container.name,
            port.exposed_port,
            port.protocol,
        );

        let mut register_ip = None;
        let (mut ip, advertised_port) = if self.config.internal {
            (port.exposed_ip.clone(), port.exposed_port)
        } else if self.config.awsvpc {
            if let Some(label) = &self.config.use_ip_from_label
                && let Some(value) = container.labels.get(label).filter(|value| !value.is_empty())
            {
                let address = strip_mask(value);
                info!(address = %address, label = %label, "registering container address from label");
                register_ip = Some(address.to_string());
            }
            match self.resolver.resolve(&hostname) {
                Some(address) => (address.to_string(), port.host_port.unwrap_or_default()),
                None => {
                    debug!(host = %hostname, "hostname did not resolve in awsvpc mode");
                    (String::new(), 0)
                }
            }
        } else {
            (port.host_ip.clone(), port.host_port.unwrap_or_default())
        };

        let proxy_port = metadata
            .get_non_empty("proxyport")
            .and_then(|value| value.parse().ok());

        // Label override first, linked-container override second; the
        // linked container wins when both apply.
        if !self.config.awsvpc
            && let Some(label) = &self.config.use_ip_from_label
        {
            match container.labels.get(label).filter(|value| !value.is_empty()) {
                Some(value) => {
                    ip = strip_mask(value).to_string();
                    info!(address = %ip, label = %label, "using container address from label");
                }
                None => info!(label = %label, "label not found in container configuration"),
            }
        }

        if !self.config.awsvpc
            && let Some(reference) = container.network_mode.strip_prefix("container:")
        {
            let network_id = ContainerId::new(reference.split(':').next().unwrap_or(reference));
            info!(
                service = %name,
                network_container = %network_id.short(),
                "container network mode, following linked container"
            );
            match self.runtime.inspect(&network_id).await {
                Ok(network_container) => {
                    ip = network_container.ip_address.clone();
                    info!(service = %name, address = %ip, "using network container address");
                }
                Err(err) => warn!(
                    container = %network_id.short(),
                    error = %err,
                    "unable to inspect network container"
                ),
            }
        }

        let meta_tags = metadata.get("tags").unwrap_or_default();
        let mut tags = if port.protocol.is_udp() {
            combine_tags(&[meta_tags, &self.config.force_tags, "udp"])
        } else {
            combine_tags(&[meta_tags, &self.config.force_tags])
        };
        if self.config.awsvpc {
            let task_arn = container
                .labels
                .get(ECS_TASK_ARN_LABEL)
                .cloned()
                .unwrap_or_default();
            tags.push(format!("{}={task_arn}", self.config.ecs_task_arn_tag));
        }

        if let Some(custom) = metadata.get_non_empty("id") {
            id = ServiceId::new(custom);
        }

        let ttl = self.config.refresh_ttl;
        let attrs = metadata.into_attrs();

        Some(Service {
            id,
            name,
            ip,
            port: advertised_port,
            register_ip,
            proxy_port,
            tags,
            attrs,
            ttl,
            origin: port,
        })
    }
}

fn strip_mask(value: &str) -> &str {
    value.rsplit_once('/').map_or(value, |(address, _)| address)
}

//! Narrow container snapshot types returned by the runtime port.

use super::{ContainerId, ContainerRef, PortBinding, PortSpec};
use std::collections::{BTreeMap, HashMap};

/// Bit set in an exit code when the container died from a signal.
pub const SIGNALED_EXIT_BIT: i64 = 0x80;

/// One entry of a container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    /// Container identifier.
    pub id: ContainerId,
}

impl ContainerSummary {
    /// Creates a listing entry.
    #[must_use]
    pub fn new(id: ContainerId) -> Self {
        Self { id }
    }
}

/// Terminal state of a container as reported by inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerState {
    /// Whether the container is currently running.
    pub running: bool,
    /// Exit code of the last run, zero while running.
    pub exit_code: i64,
}

impl ContainerState {
    /// Returns true when the exit code reports a clean exit.
    #[must_use]
    pub const fn is_clean_exit(self) -> bool {
        self.exit_code == 0
    }

    /// Returns true when the exit code carries the signal bit.
    #[must_use]
    pub const fn is_signaled(self) -> bool {
        self.exit_code & SIGNALED_EXIT_BIT == SIGNALED_EXIT_BIT
    }
}

/// Inspection snapshot of a single container.
///
/// This is the narrow view the bridge needs: identity, image, metadata
/// sources, port configuration, and network placement. The runtime adapter
/// is responsible for projecting its client's inspection result into this
/// shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInspect {
    /// Container identifier.
    pub id: ContainerId,
    /// Container name as reported, possibly with a leading slash.
    pub name: String,
    /// Image reference the container was created from.
    pub image: String,
    /// Configured container hostname.
    pub hostname: String,
    /// Environment entries in `KEY=VALUE` form.
    pub env: Vec<String>,
    /// Container labels.
    pub labels: HashMap<String, String>,
    /// Ports declared exposed by the image or container config.
    pub exposed_ports: Vec<PortSpec>,
    /// Runtime port bindings from the network settings.
    pub port_bindings: BTreeMap<PortSpec, Vec<PortBinding>>,
    /// Network mode string, e.g. `bridge`, `host`, or `container:<id>`.
    pub network_mode: String,
    /// Container network address.
    pub ip_address: String,
    /// Run state and exit code.
    pub state: ContainerState,
}

impl ContainerInspect {
    /// Creates a running container snapshot with the given identity and
    /// image; everything else starts empty.
    #[must_use]
    pub fn new(id: ContainerId, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image: image.into(),
            hostname: String::new(),
            env: Vec::new(),
            labels: HashMap::new(),
            exposed_ports: Vec::new(),
            port_bindings: BTreeMap::new(),
            network_mode: String::new(),
            ip_address: String::new(),
            state: ContainerState {
                running: true,
                exit_code: 0,
            },
        }
    }

    /// Sets the configured hostname.
    #[must_use]
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Appends an environment entry in `KEY=VALUE` form.
    #[must_use]
    pub fn with_env(mut self, entry: impl Into<String>) -> Self {
        self.env.push(entry.into());
        self
    }

    /// Sets a container label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Declares an exposed port.
    #[must_use]
    pub fn with_exposed_port(mut self, spec: PortSpec) -> Self {
        self.exposed_ports.push(spec);
        self
    }

    /// Records a runtime port binding.
    #[must_use]
    pub fn with_port_binding(
        mut self,
        spec: PortSpec,
        host_ip: impl Into<String>,
        host_port: impl Into<String>,
    ) -> Self {
        self.port_bindings
            .entry(spec)
            .or_default()
            .push(PortBinding::new(host_ip, host_port));
        self
    }

    /// Sets the network mode string.
    #[must_use]
    pub fn with_network_mode(mut self, mode: impl Into<String>) -> Self {
        self.network_mode = mode.into();
        self
    }

    /// Sets the container network address.
    #[must_use]
    pub fn with_ip_address(mut self, address: impl Into<String>) -> Self {
        self.ip_address = address.into();
        self
    }

    /// Sets run state and exit code.
    #[must_use]
    pub const fn with_state(mut self, running: bool, exit_code: i64) -> Self {
        self.state = ContainerState { running, exit_code };
        self
    }

    /// Returns the back-reference used on derived services.
    #[must_use]
    pub fn container_ref(&self) -> ContainerRef {
        ContainerRef::new(self.id.clone(), self.name.clone())
    }

    /// Returns the image basename without registry path or tag, the default
    /// service name.
    #[must_use]
    pub fn image_base_name(&self) -> &str {
        let base = self.image.rsplit('/').next().unwrap_or(&self.image);
        base.split(':').next().unwrap_or(base)
    }
}

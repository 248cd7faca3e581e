//! Bridge engine configuration.

use serde::{Deserialize, Serialize};

/// Policy for deciding whether a container exit fully deregisters its
/// services or enters the grace period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeregisterCheck {
    /// Deregister on clean or signaled exits; otherwise enter grace.
    #[default]
    OnSuccessfulExit,
    /// Always deregister immediately on exit.
    Always,
}

/// Configuration recognized by the bridge engine.
///
/// All options default to off; the zero value is a plain bridge that
/// advertises host-published addresses with no TTL refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Overrides the advertised address for every service.
    pub host_ip: Option<String>,
    /// Advertise container-internal address/port instead of host-published.
    pub internal: bool,
    /// Only register ports that carry `name` metadata.
    pub explicit: bool,
    /// Enable AWS VPC hostname and address selection rules.
    pub awsvpc: bool,
    /// Container label to source the advertised address from.
    pub use_ip_from_label: Option<String>,
    /// Tag key carrying the ECS task ARN in AWS VPC mode.
    pub ecs_task_arn_tag: String,
    /// Comma-separated tags appended to every service.
    pub force_tags: String,
    /// TTL in seconds reported to the registry and used as the grace-period
    /// length; zero disables both.
    pub refresh_ttl: i64,
    /// Seconds between refresh ticks; each tick decrements grace countdowns
    /// by this amount.
    pub refresh_interval: i64,
    /// Evict dangling registry entries during sync.
    pub cleanup: bool,
    /// Exit-status policy for container-died events.
    pub deregister_check: DeregisterCheck,
    /// Seconds between periodic quiet syncs; zero disables them.
    pub resync_interval: i64,
}

//! Domain model for container-to-registry service derivation.
//!
//! The bridge domain models service records, the container snapshots they
//! are derived from, and the pure rules that connect the two. All
//! infrastructure concerns are kept outside the domain boundary.

mod config;
mod container;
mod error;
mod ids;
mod metadata;
mod port_binding;
mod service;
mod service_id;
mod tags;

pub use config::{BridgeConfig, DeregisterCheck};
pub use container::{
    ContainerInspect, ContainerState, ContainerSummary, SIGNALED_EXIT_BIT,
};
pub use error::BridgeDomainError;
pub use ids::{ContainerId, ContainerRef};
pub use metadata::ServiceMetadata;
pub use port_binding::{PortBinding, PortSpec, Protocol, ServicePort, collect_service_ports};
pub use service::{DeadContainer, Service};
pub use service_id::{OwnedServiceId, ServiceId};
pub use tags::combine_tags;

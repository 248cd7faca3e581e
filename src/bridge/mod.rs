//! Service-registration bridge between the container runtime and a registry.
//!
//! The bridge observes containers on the local runtime, derives service
//! records from their configuration and published ports, and keeps a
//! pluggable external registry in sync with the set of running containers.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

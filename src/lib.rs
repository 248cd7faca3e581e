//! Herald: a service-registration bridge for container runtimes.
//!
//! Herald observes the local container runtime, derives service records
//! from each container's configuration and published ports, and keeps a
//! pluggable external service registry in sync with the actual set of
//! running containers. It resurrects services across brief restarts,
//! renews registry TTLs, and evicts dangling registrations it can prove
//! it created.
//!
//! # Architecture
//!
//! Herald follows hexagonal architecture principles:
//!
//! - **Domain**: Pure derivation rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the registry backend, the
//!   container runtime, and host resolution
//! - **Adapters**: Concrete implementations of ports (in-memory driver,
//!   scheme-keyed adapter factories, system resolver)
//!
//! # Modules
//!
//! - [`bridge`]: the reconciliation engine and everything it is built from

pub mod bridge;

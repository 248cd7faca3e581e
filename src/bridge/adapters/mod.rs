//! Adapter implementations for the bridge ports.

pub mod factory;
pub mod memory;
pub mod resolver;

pub use factory::{AdapterError, AdapterFactory, AdapterRegistry};
pub use memory::{InMemoryRegistry, InMemoryRuntime, MemoryAdapterFactory, RegistryOp};
pub use resolver::{StaticResolver, SystemResolver};

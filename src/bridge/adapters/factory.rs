//! Adapter selection: a process-wide mapping from URI scheme to driver
//! factory.
//!
//! The configured adapter URI's scheme selects the factory; the factory
//! receives the full URI and produces the driver instance. Registration is
//! explicit at construction, never a side effect of module loading.

use crate::bridge::adapters::memory::MemoryAdapterFactory;
use crate::bridge::ports::RegistryAdapter;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors raised while selecting and constructing a registry adapter.
///
/// These are startup errors: the bridge cannot be built without a working
/// adapter.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// The adapter URI could not be parsed.
    #[error("bad adapter uri '{0}'")]
    InvalidUri(String),

    /// No factory is registered for the URI scheme.
    #[error("unrecognized adapter scheme '{0}'")]
    UnknownScheme(String),

    /// The factory failed to construct the driver.
    #[error("adapter construction failed: {0}")]
    Construction(Arc<dyn std::error::Error + Send + Sync>),
}

impl AdapterError {
    /// Wraps a driver construction failure.
    pub fn construction(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Construction(Arc::new(err))
    }
}

/// Produces a registry driver from an adapter URI.
pub trait AdapterFactory: Send + Sync {
    /// Builds the driver for the given URI.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Construction`] when the URI is valid for the
    /// scheme but the driver cannot be built from it.
    fn create(&self, uri: &Url) -> Result<Arc<dyn RegistryAdapter>, AdapterError>;
}

/// Scheme → factory mapping used at bridge construction.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    factories: HashMap<String, Arc<dyn AdapterFactory>>,
}

impl AdapterRegistry {
    /// Creates an empty adapter registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in drivers: `memory`.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("memory", Arc::new(MemoryAdapterFactory));
        registry
    }

    /// Registers a factory under a URI scheme, replacing any previous
    /// factory for that scheme.
    pub fn register(&mut self, scheme: impl Into<String>, factory: Arc<dyn AdapterFactory>) {
        self.factories.insert(scheme.into(), factory);
    }

    /// Parses an adapter URI, selects the factory by scheme, and builds the
    /// driver.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidUri`] when the URI does not parse,
    /// [`AdapterError::UnknownScheme`] when no factory matches, or the
    /// factory's own construction error.
    pub fn create(&self, adapter_uri: &str) -> Result<Arc<dyn RegistryAdapter>, AdapterError> {
        let uri = Url::parse(adapter_uri)
            .map_err(|_| AdapterError::InvalidUri(adapter_uri.to_string()))?;
        let factory = self
            .factories
            .get(uri.scheme())
            .ok_or_else(|| AdapterError::UnknownScheme(uri.scheme().to_string()))?;
        factory.create(&uri)
    }
}

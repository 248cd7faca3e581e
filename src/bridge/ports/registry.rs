//! Registry adapter port: the pluggable driver contract for one backend.

use crate::bridge::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for registry adapter operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Driver contract to a concrete service registry backend.
///
/// The bridge serializes calls, so adapters only need to be safe for one
/// caller at a time. `register` and `deregister` must be idempotent: the
/// bridge re-registers live services on every sync and may deregister
/// entries that are already gone.
#[async_trait]
pub trait RegistryAdapter: Send + Sync {
    /// Probes backend liveness.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the backend is unreachable.
    async fn ping(&self) -> RegistryResult<()>;

    /// Creates or updates a registry entry for the service.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the backend refuses or cannot store
    /// the entry.
    async fn register(&self, service: &Service) -> RegistryResult<()>;

    /// Deletes the entry for the service identity; absent entries are not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] on backend failure.
    async fn deregister(&self, service: &ExternalService) -> RegistryResult<()>;

    /// Renews the entry's TTL. Drivers for backends without a TTL concept
    /// may treat this as a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the entry cannot be renewed.
    async fn refresh(&self, service: &Service) -> RegistryResult<()>;

    /// Enumerates the entries the backend currently holds. Used solely by
    /// dangling-entry cleanup.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the backend cannot be enumerated.
    async fn services(&self) -> RegistryResult<Vec<ExternalService>>;
}

/// Identity projection of a registry entry: what enumeration returns and
/// what deregistration needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalService {
    /// Entry identifier as stored in the backend.
    pub id: String,
    /// Logical service name.
    pub name: String,
}

impl ExternalService {
    /// Creates an identity projection.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&Service> for ExternalService {
    fn from(service: &Service) -> Self {
        Self {
            id: service.id.as_str().to_string(),
            name: service.name.clone(),
        }
    }
}

/// Errors returned by registry adapter implementations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Transport or backend-side failure.
    #[error("registry backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),

    /// The backend refused the operation for this entry.
    #[error("registry rejected service '{0}'")]
    Rejected(String),
}

impl RegistryError {
    /// Wraps a backend failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

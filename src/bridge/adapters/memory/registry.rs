//! In-memory registry driver.
//!
//! A complete [`RegistryAdapter`] backed by process memory, registered
//! under the `memory` URI scheme. Tests and embedders can observe the
//! stored entries and the operation log.

use crate::bridge::adapters::factory::{AdapterError, AdapterFactory};
use crate::bridge::domain::Service;
use crate::bridge::ports::{ExternalService, RegistryAdapter, RegistryError, RegistryResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};
use url::Url;

/// One recorded adapter invocation, by service identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryOp {
    /// A `register` call.
    Register(String),
    /// A `deregister` call.
    Deregister(String),
    /// A `refresh` call.
    Refresh(String),
}

#[derive(Debug, Clone)]
struct StoredService {
    service: Service,
    registered_at: DateTime<Utc>,
    refreshed_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryRegistryState {
    services: BTreeMap<String, StoredService>,
    ops: Vec<RegistryOp>,
    failing: BTreeSet<String>,
}

/// Thread-safe in-memory registry driver.
#[derive(Clone)]
pub struct InMemoryRegistry {
    state: Arc<RwLock<MemoryRegistryState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl InMemoryRegistry {
    /// Creates an empty registry using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty registry with an injected clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Arc::new(RwLock::new(MemoryRegistryState::default())),
            clock,
        }
    }

    /// Returns the identifiers of all stored entries, in order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Backend`] when the store lock is poisoned.
    pub fn registered_ids(&self) -> RegistryResult<Vec<String>> {
        let state = self.read()?;
        Ok(state.services.keys().cloned().collect())
    }

    /// Returns the stored service record for an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Backend`] when the store lock is poisoned.
    pub fn get(&self, id: &str) -> RegistryResult<Option<Service>> {
        let state = self.read()?;
        Ok(state.services.get(id).map(|stored| stored.service.clone()))
    }

    /// Returns when the entry was last refreshed or (re-)registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Backend`] when the store lock is poisoned.
    pub fn refreshed_at(&self, id: &str) -> RegistryResult<Option<DateTime<Utc>>> {
        let state = self.read()?;
        Ok(state.services.get(id).map(|stored| stored.refreshed_at))
    }

    /// Returns the full operation log.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Backend`] when the store lock is poisoned.
    pub fn operations(&self) -> RegistryResult<Vec<RegistryOp>> {
        let state = self.read()?;
        Ok(state.ops.clone())
    }

    /// Makes `register` fail for one service identifier until cleared,
    /// letting callers exercise partial registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Backend`] when the store lock is poisoned.
    pub fn fail_register(&self, id: impl Into<String>) -> RegistryResult<()> {
        let mut state = self.write()?;
        state.failing.insert(id.into());
        Ok(())
    }

    /// Clears every injected registration failure.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Backend`] when the store lock is poisoned.
    pub fn clear_failures(&self) -> RegistryResult<()> {
        let mut state = self.write()?;
        state.failing.clear();
        Ok(())
    }

    /// Seeds an entry directly, bypassing the adapter contract. Lets tests
    /// stage pre-existing registry content such as dangling entries.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Backend`] when the store lock is poisoned.
    pub fn seed(&self, service: Service) -> RegistryResult<()> {
        let now = self.clock.utc();
        let mut state = self.write()?;
        state.services.insert(
            service.id.as_str().to_string(),
            StoredService {
                service,
                registered_at: now,
                refreshed_at: now,
            },
        );
        Ok(())
    }

    fn read(&self) -> RegistryResult<std::sync::RwLockReadGuard<'_, MemoryRegistryState>> {
        self.state
            .read()
            .map_err(|err| RegistryError::backend(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> RegistryResult<std::sync::RwLockWriteGuard<'_, MemoryRegistryState>> {
        self.state
            .write()
            .map_err(|err| RegistryError::backend(std::io::Error::other(err.to_string())))
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryAdapter for InMemoryRegistry {
    async fn ping(&self) -> RegistryResult<()> {
        self.read().map(|_| ())
    }

    async fn register(&self, service: &Service) -> RegistryResult<()> {
        let now = self.clock.utc();
        let mut state = self.write()?;
        let id = service.id.as_str().to_string();
        state.ops.push(RegistryOp::Register(id.clone()));
        if state.failing.contains(&id) {
            return Err(RegistryError::Rejected(id));
        }
        let registered_at = state
            .services
            .get(&id)
            .map_or(now, |existing| existing.registered_at);
        state.services.insert(
            id,
            StoredService {
                service: service.clone(),
                registered_at,
                refreshed_at: now,
            },
        );
        Ok(())
    }

    async fn deregister(&self, service: &ExternalService) -> RegistryResult<()> {
        let mut state = self.write()?;
        state.ops.push(RegistryOp::Deregister(service.id.clone()));
        state.services.remove(&service.id);
        Ok(())
    }

    async fn refresh(&self, service: &Service) -> RegistryResult<()> {
        let now = self.clock.utc();
        let mut state = self.write()?;
        let id = service.id.as_str().to_string();
        state.ops.push(RegistryOp::Refresh(id.clone()));
        match state.services.get_mut(&id) {
            Some(stored) => {
                stored.refreshed_at = now;
                Ok(())
            }
            None => Err(RegistryError::Rejected(id)),
        }
    }

    async fn services(&self) -> RegistryResult<Vec<ExternalService>> {
        let state = self.read()?;
        Ok(state
            .services
            .values()
            .map(|stored| ExternalService::from(&stored.service))
            .collect())
    }
}

/// Factory for the `memory` URI scheme.
pub struct MemoryAdapterFactory;

impl AdapterFactory for MemoryAdapterFactory {
    fn create(&self, _uri: &Url) -> Result<Arc<dyn RegistryAdapter>, AdapterError> {
        Ok(Arc::new(InMemoryRegistry::new()))
    }
}

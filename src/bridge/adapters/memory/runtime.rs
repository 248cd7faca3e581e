//! In-memory container runtime stub.

use crate::bridge::domain::{ContainerId, ContainerInspect, ContainerSummary};
use crate::bridge::ports::{ContainerRuntime, RuntimeError, RuntimeResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct MemoryRuntimeState {
    containers: BTreeMap<ContainerId, ContainerInspect>,
    fail_listing: bool,
    fail_non_exited_listing: bool,
    fail_inspect: bool,
}

/// Thread-safe in-memory [`ContainerRuntime`], used by tests and as an
/// embedder stub.
///
/// Containers are staged with [`insert`](Self::insert) and manipulated
/// through state setters; listing failures can be injected to exercise the
/// engine's quiet-sync policy.
#[derive(Clone, Default)]
pub struct InMemoryRuntime {
    state: Arc<RwLock<MemoryRuntimeState>>,
}

impl InMemoryRuntime {
    /// Creates an empty runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a container snapshot, replacing any existing one with the
    /// same identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Transport`] when the store lock is poisoned.
    pub fn insert(&self, container: ContainerInspect) -> RuntimeResult<()> {
        let mut state = self.write()?;
        state.containers.insert(container.id.clone(), container);
        Ok(())
    }

    /// Removes a container entirely, as if the runtime deleted it.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Transport`] when the store lock is poisoned.
    pub fn remove(&self, id: &ContainerId) -> RuntimeResult<()> {
        let mut state = self.write()?;
        state.containers.remove(id);
        Ok(())
    }

    /// Updates a container's run state and exit code.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Transport`] when the store lock is poisoned
    /// or [`RuntimeError::NotFound`] when the container is not staged.
    pub fn set_state(&self, id: &ContainerId, running: bool, exit_code: i64) -> RuntimeResult<()> {
        let mut state = self.write()?;
        let container = state
            .containers
            .get_mut(id)
            .ok_or_else(|| RuntimeError::NotFound(id.clone()))?;
        container.state.running = running;
        container.state.exit_code = exit_code;
        Ok(())
    }

    /// Makes `list_containers` fail until reset.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Transport`] when the store lock is poisoned.
    pub fn set_fail_listing(&self, fail: bool) -> RuntimeResult<()> {
        let mut state = self.write()?;
        state.fail_listing = fail;
        Ok(())
    }

    /// Makes `list_non_exited` fail until reset.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Transport`] when the store lock is poisoned.
    pub fn set_fail_non_exited_listing(&self, fail: bool) -> RuntimeResult<()> {
        let mut state = self.write()?;
        state.fail_non_exited_listing = fail;
        Ok(())
    }

    /// Makes `inspect` fail with a transport error until reset.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Transport`] when the store lock is poisoned.
    pub fn set_fail_inspect(&self, fail: bool) -> RuntimeResult<()> {
        let mut state = self.write()?;
        state.fail_inspect = fail;
        Ok(())
    }

    fn read(&self) -> RuntimeResult<std::sync::RwLockReadGuard<'_, MemoryRuntimeState>> {
        self.state
            .read()
            .map_err(|err| RuntimeError::transport(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> RuntimeResult<std::sync::RwLockWriteGuard<'_, MemoryRuntimeState>> {
        self.state
            .write()
            .map_err(|err| RuntimeError::transport(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl ContainerRuntime for InMemoryRuntime {
    async fn list_containers(&self) -> RuntimeResult<Vec<ContainerSummary>> {
        let state = self.read()?;
        if state.fail_listing {
            return Err(RuntimeError::transport(std::io::Error::other(
                "listing unavailable",
            )));
        }
        Ok(state
            .containers
            .values()
            .filter(|container| container.state.running)
            .map(|container| ContainerSummary::new(container.id.clone()))
            .collect())
    }

    async fn list_non_exited(&self) -> RuntimeResult<Vec<ContainerSummary>> {
        let state = self.read()?;
        if state.fail_non_exited_listing {
            return Err(RuntimeError::transport(std::io::Error::other(
                "listing unavailable",
            )));
        }
        Ok(state
            .containers
            .values()
            .filter(|container| container.state.running)
            .map(|container| ContainerSummary::new(container.id.clone()))
            .collect())
    }

    async fn inspect(&self, id: &ContainerId) -> RuntimeResult<ContainerInspect> {
        let state = self.read()?;
        if state.fail_inspect {
            return Err(RuntimeError::transport(std::io::Error::other(
                "inspection unavailable",
            )));
        }
        state
            .containers
            .get(id)
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound(id.clone()))
    }
}

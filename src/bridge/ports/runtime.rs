//! Container runtime port: listing and inspection.

use crate::bridge::domain::{ContainerId, ContainerInspect, ContainerSummary};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for container runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// The slice of the container runtime the bridge consumes.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lists running containers.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the runtime cannot be queried.
    async fn list_containers(&self) -> RuntimeResult<Vec<ContainerSummary>>;

    /// Lists containers that have not exited (created, restarting, running,
    /// or paused). Used by cleanup to find stale registrations.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the runtime cannot be queried.
    async fn list_non_exited(&self) -> RuntimeResult<Vec<ContainerSummary>>;

    /// Inspects a single container.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::NotFound`] when the runtime no longer knows
    /// the container, or [`RuntimeError::Transport`] on query failure.
    async fn inspect(&self, id: &ContainerId) -> RuntimeResult<ContainerInspect>;
}

/// Errors returned by container runtime implementations.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// The container is not known to the runtime, e.g. already removed.
    #[error("container not found: {0}")]
    NotFound(ContainerId),

    /// The runtime could not be queried.
    #[error("container runtime error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl RuntimeError {
    /// Wraps a transport failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

//! The bridge engine: container lifecycle in, registry mutations out.

use crate::bridge::adapters::{AdapterError, AdapterRegistry};
use crate::bridge::domain::{
    BridgeConfig, ContainerId, DeadContainer, DeregisterCheck, OwnedServiceId, Service,
};
use crate::bridge::ports::{
    ContainerRuntime, ExternalService, HostResolver, RegistryAdapter, RegistryResult,
    RuntimeError, RuntimeResult,
};
use crate::bridge::services::derive::ServiceDeriver;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Default)]
struct BridgeState {
    services: HashMap<ContainerId, Vec<Service>>,
    dead_containers: HashMap<ContainerId, DeadContainer>,
}

/// Outcome of consulting a dead container's exit status.
enum ExitDecision {
    /// Deregister everything now.
    Deregister,
    /// Stop refreshing but retain services for the grace period.
    Grace,
    /// Leave the container tracked, e.g. it is actually still running.
    Keep,
}

/// The reconciliation engine.
///
/// Owns the live `container → services` mapping and the dead-container
/// grace table, both guarded by a single engine-wide lock that is held for
/// the whole of each public operation, adapter calls included. The handle
/// is cheap to clone; clones share state.
///
/// Registry and inspection failures are logged and retried on the next
/// lifecycle event or sync rather than propagated; only container listing
/// during a non-quiet [`sync`](Self::sync) is fatal.
#[derive(Clone)]
pub struct Bridge {
    registry: Arc<dyn RegistryAdapter>,
    runtime: Arc<dyn ContainerRuntime>,
    resolver: Arc<dyn HostResolver>,
    hostname: String,
    config: BridgeConfig,
    state: Arc<Mutex<BridgeState>>,
}

impl Bridge {
    /// Builds a bridge whose registry driver is selected by adapter URI.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the URI does not parse, its scheme has
    /// no registered factory, or the factory fails.
    pub fn new(
        adapters: &AdapterRegistry,
        adapter_uri: &str,
        runtime: Arc<dyn ContainerRuntime>,
        resolver: Arc<dyn HostResolver>,
        hostname: impl Into<String>,
        config: BridgeConfig,
    ) -> Result<Self, AdapterError> {
        let registry = adapters.create(adapter_uri)?;
        info!(uri = %adapter_uri, "using registry adapter");
        Ok(Self::with_adapter(
            registry, runtime, resolver, hostname, config,
        ))
    }

    /// Builds a bridge around an already constructed registry driver.
    #[must_use]
    pub fn with_adapter(
        registry: Arc<dyn RegistryAdapter>,
        runtime: Arc<dyn ContainerRuntime>,
        resolver: Arc<dyn HostResolver>,
        hostname: impl Into<String>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            registry,
            runtime,
            resolver,
            hostname: hostname.into(),
            config,
            state: Arc::new(Mutex::new(BridgeState::default())),
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Probes the registry backend.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error when the backend is unreachable.
    pub async fn ping(&self) -> RegistryResult<()> {
        self.registry.ping().await
    }

    /// Registers the services of a newly started container.
    ///
    /// A container still in its grace period is resurrected without
    /// touching the registry; a container already tracked is ignored.
    pub async fn add(&self, container_id: &ContainerId) {
        let mut state = self.state.lock().await;
        self.add_locked(&mut state, container_id, false).await;
    }

    /// Deregisters and forgets a container unconditionally.
    pub async fn remove(&self, container_id: &ContainerId) {
        self.remove_inner(container_id, true).await;
    }

    /// Handles a container-died event, consulting the exit status to choose
    /// between full deregistration and the grace period.
    ///
    /// A container that cannot be inspected, or that turns out to still be
    /// running, is left untouched.
    pub async fn remove_on_exit(&self, container_id: &ContainerId) {
        match self.exit_decision(container_id).await {
            ExitDecision::Deregister => self.remove_inner(container_id, true).await,
            ExitDecision::Grace => self.remove_inner(container_id, false).await,
            ExitDecision::Keep => {}
        }
    }

    /// Runs one refresh tick: counts down grace periods and renews the TTL
    /// of every live service.
    pub async fn refresh(&self) {
        let mut state = self.state.lock().await;

        let step = self.config.refresh_interval;
        state.dead_containers.retain(|container_id, dead| {
            let expired = dead.tick(step);
            if expired {
                debug!(container = %container_id.short(), "grace period expired, dropping services");
            }
            !expired
        });

        for (container_id, services) in &state.services {
            for service in services {
                match self.registry.refresh(service).await {
                    Ok(()) => {
                        debug!(container = %container_id.short(), service = %service.id, "refreshed");
                    }
                    Err(err) => {
                        warn!(service = %service.id, error = %err, "refresh failed");
                    }
                }
            }
        }
    }

    /// Reconciles the engine and registry against the runtime's container
    /// set: unknown containers are added, known ones re-registered, and,
    /// when cleanup is enabled, stale tracked containers are scheduled for
    /// removal and dangling registry entries owned by this host are
    /// deregistered.
    ///
    /// # Errors
    ///
    /// Returns the listing error when the runtime cannot be enumerated and
    /// `quiet` is false; in quiet mode listing failures are logged and
    /// swallowed.
    pub async fn sync(&self, quiet: bool) -> RuntimeResult<()> {
        let mut state = self.state.lock().await;

        let containers = match self.runtime.list_containers().await {
            Ok(containers) => containers,
            Err(err) if quiet => {
                warn!(error = %err, "error listing containers, skipping sync");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        info!(count = containers.len(), "syncing services");
        for listing in &containers {
            let known = state.services.get(&listing.id).cloned();
            match known {
                Some(services) => {
                    for service in &services {
                        if let Err(err) = self.registry.register(service).await {
                            warn!(service = %service.id, error = %err, "sync register failed");
                        }
                    }
                }
                None => self.add_locked(&mut state, &listing.id, quiet).await,
            }
        }

        if !self.config.cleanup {
            return Ok(());
        }

        debug!("listing non-exited containers");
        let non_exited = match self.runtime.list_non_exited().await {
            Ok(listed) => listed,
            Err(err) => {
                warn!(error = %err, "error listing non-exited containers, skipping cleanup");
                return Ok(());
            }
        };
        let live: HashSet<&ContainerId> = non_exited.iter().map(|listing| &listing.id).collect();
        let stale: Vec<ContainerId> = state
            .services
            .keys()
            .filter(|container_id| !live.contains(container_id))
            .cloned()
            .collect();

        debug!("cleaning up dangling services");
        match self.registry.services().await {
            Err(err) => warn!(error = %err, "cleanup failed"),
            Ok(external) => {
                for entry in &external {
                    if self.is_dangling(&state, entry) {
                        info!(service = %entry.id, "dangling service");
                        match self.registry.deregister(entry).await {
                            Ok(()) => info!(service = %entry.id, "removed"),
                            Err(err) => {
                                warn!(service = %entry.id, error = %err, "deregister failed");
                            }
                        }
                    }
                }
            }
        }

        drop(state);
        for container_id in stale {
            info!(container = %container_id.short(), "stale tracked container, scheduling removal");
            let bridge = self.clone();
            tokio::spawn(async move {
                bridge.remove_on_exit(&container_id).await;
            });
        }
        Ok(())
    }

    /// Returns the tracked services for a container, `None` when untracked.
    pub async fn tracked_services(&self, container_id: &ContainerId) -> Option<Vec<Service>> {
        let state = self.state.lock().await;
        state.services.get(container_id).cloned()
    }

    /// Returns the remaining grace time for a dead container, `None` when
    /// it has no grace entry.
    pub async fn grace_ttl(&self, container_id: &ContainerId) -> Option<i64> {
        let state = self.state.lock().await;
        state
            .dead_containers
            .get(container_id)
            .map(DeadContainer::ttl_remaining)
    }

    async fn add_locked(&self, state: &mut BridgeState, container_id: &ContainerId, quiet: bool) {
        if let Some(dead) = state.dead_containers.remove(container_id) {
            info!(container = %container_id.short(), "container returned within grace period");
            state
                .services
                .insert(container_id.clone(), dead.into_services());
            return;
        }

        if state.services.contains_key(container_id) {
            info!(container = %container_id.short(), "container already tracked, ignoring");
            return;
        }

        let container = match self.runtime.inspect(container_id).await {
            Ok(container) => container,
            Err(err) => {
                warn!(container = %container_id.short(), error = %err, "unable to inspect container");
                return;
            }
        };

        let deriver = ServiceDeriver::new(
            &self.config,
            &self.hostname,
            self.runtime.as_ref(),
            self.resolver.as_ref(),
        );
        let candidates = deriver.derive(&container, quiet).await;
        if candidates.is_empty() {
            state.services.insert(container_id.clone(), Vec::new());
            return;
        }

        let mut registered = Vec::new();
        for service in candidates {
            if self.config.awsvpc
                && let Some(host_ip) = &self.config.host_ip
                && *host_ip != service.ip
            {
                warn!(
                    container = %container_id.short(),
                    service_ip = %service.ip,
                    bridge_ip = %host_ip,
                    "container awsvpc address does not match bridge address"
                );
            }
            match self.registry.register(&service).await {
                Ok(()) => {
                    info!(container = %container_id.short(), service = %service.id, "added");
                    registered.push(service);
                }
                Err(err) => warn!(service = %service.id, error = %err, "register failed"),
            }
        }
        if !registered.is_empty() {
            state.services.insert(container_id.clone(), registered);
        }
    }

    async fn remove_inner(&self, container_id: &ContainerId, deregister: bool) {
        let mut state = self.state.lock().await;

        if deregister {
            if let Some(services) = state.services.remove(container_id) {
                self.deregister_all(container_id, &services).await;
            }
            if let Some(dead) = state.dead_containers.remove(container_id) {
                self.deregister_all(container_id, dead.services()).await;
            }
        } else if self.config.refresh_ttl != 0 {
            if let Some(services) = state.services.remove(container_id)
                && !services.is_empty()
            {
                state.dead_containers.insert(
                    container_id.clone(),
                    DeadContainer::new(self.config.refresh_ttl, services),
                );
            }
        } else {
            state.services.remove(container_id);
        }
    }

    async fn deregister_all(&self, container_id: &ContainerId, services: &[Service]) {
        for service in services {
            let entry = ExternalService::from(service);
            match self.registry.deregister(&entry).await {
                Ok(()) => info!(container = %container_id.short(), service = %service.id, "removed"),
                Err(err) => warn!(service = %service.id, error = %err, "deregister failed"),
            }
        }
    }

    async fn exit_decision(&self, container_id: &ContainerId) -> ExitDecision {
        if self.config.deregister_check == DeregisterCheck::Always {
            return ExitDecision::Deregister;
        }
        match self.runtime.inspect(container_id).await {
            Err(RuntimeError::NotFound(_)) => {
                info!(
                    container = %container_id.short(),
                    "container already removed, exit status unavailable"
                );
                ExitDecision::Deregister
            }
            Err(err) => {
                warn!(
                    container = %container_id.short(),
                    error = %err,
                    "error fetching container status on exit"
                );
                ExitDecision::Keep
            }
            Ok(container) if container.state.running => {
                info!(container = %container_id.short(), "container still running, keeping services");
                ExitDecision::Keep
            }
            Ok(container) if container.state.is_clean_exit() || container.state.is_signaled() => {
                ExitDecision::Deregister
            }
            Ok(_) => ExitDecision::Grace,
        }
    }

    fn is_dangling(&self, state: &BridgeState, entry: &ExternalService) -> bool {
        // Never deregister anything we cannot positively attribute to this
        // bridge on this host.
        let Some(owned) = OwnedServiceId::parse(&entry.id) else {
            return false;
        };
        if owned.hostname != self.hostname {
            return false;
        }
        let tracked = state.services.values().flatten().any(|service| {
            service.name == entry.name && service.container().name == owned.container_name
        });
        !tracked
    }
}

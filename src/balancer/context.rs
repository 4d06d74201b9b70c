//! Routing context: the server pool plus the active selection strategy.

use crate::balancer::error::check_load_signal;
use crate::balancer::strategies::{RoundRobin, SelectionStrategy};
use crate::balancer::{RoutingError, ServerEntry, ServerStatus};
use arc_swap::ArcSwap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingDecision {
    /// Label of the routed request.
    pub request: String,
    /// Name of the chosen server.
    pub server: String,
    /// Endpoint handed to the transport layer.
    pub endpoint: String,
}

/// Owns the server pool and the active strategy.
///
/// Routing takes a shared lock on the pool and bumps the chosen server's
/// counter atomically, so any number of threads can route at once.
/// Registration, removal and resets take the exclusive lock and are never
/// observed half-applied. The strategy lives in an [`ArcSwap`]; a call that
/// already loaded it finishes with that strategy even if it is swapped out.
pub struct RoutingContext {
    servers: RwLock<Vec<Arc<ServerEntry>>>,
    strategy: ArcSwap<Box<dyn SelectionStrategy>>,
}

impl RoutingContext {
    /// Create an empty context using the given strategy.
    pub fn new(strategy: Box<dyn SelectionStrategy>) -> Self {
        Self {
            servers: RwLock::new(Vec::new()),
            strategy: ArcSwap::from_pointee(strategy),
        }
    }

    /// Register a server at the end of the pool.
    pub fn add_server(&self, entry: ServerEntry) -> Result<(), RoutingError> {
        check_load_signal(entry.name(), "processing_power", entry.processing_power())?;
        check_load_signal(
            entry.name(),
            "average_response_time_ms",
            entry.average_response_time_ms(),
        )?;

        let mut servers = self.servers.write();
        if servers.iter().any(|s| s.name() == entry.name()) {
            return Err(RoutingError::DuplicateServer(entry.name().to_string()));
        }

        info!(
            server = %entry.name(),
            endpoint = %entry.endpoint(),
            processing_power = entry.processing_power(),
            "registered server"
        );
        servers.push(Arc::new(entry));
        Ok(())
    }

    /// Remove a server from the pool, returning its entry.
    pub fn remove_server(&self, name: &str) -> Result<Arc<ServerEntry>, RoutingError> {
        let mut servers = self.servers.write();
        let idx = servers
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| RoutingError::UnknownServer(name.to_string()))?;

        let entry = servers.remove(idx);
        info!(server = %name, "removed server");
        Ok(entry)
    }

    /// Route one request.
    ///
    /// # Returns
    ///
    /// The chosen server, or `RoutingError::NoServers` if the pool is empty.
    pub fn route_request(&self, request: &str) -> Result<RoutingDecision, RoutingError> {
        let strategy = self.strategy.load();
        let servers = self.servers.read();

        if servers.is_empty() {
            warn!(request = %request, "no servers available");
            return Err(RoutingError::NoServers);
        }

        let entry = strategy.select(&servers)?;
        let active = entry.increment_active();

        debug!(
            request = %request,
            server = %entry.name(),
            strategy = strategy.name(),
            active_requests = active,
            "routed request"
        );

        Ok(RoutingDecision {
            request: request.to_string(),
            server: entry.name().to_string(),
            endpoint: entry.endpoint().to_string(),
        })
    }

    /// Replace the active strategy. Takes effect on the next routed request.
    pub fn change_strategy(&self, strategy: Box<dyn SelectionStrategy>) {
        let new_name = strategy.name();
        let previous = self.strategy.swap(Arc::new(strategy));
        info!(from = previous.name(), to = new_name, "changed selection strategy");
    }

    /// Name of the active strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.load().name()
    }

    /// Snapshot of every server's active request count, in pool order.
    pub fn server_status(&self) -> Vec<ServerStatus> {
        self.servers
            .read()
            .iter()
            .map(|s| ServerStatus {
                name: s.name().to_string(),
                active_requests: s.active_requests(),
            })
            .collect()
    }

    /// Set every server's active request count to zero.
    pub fn reset_counters(&self) {
        let servers = self.servers.write();
        for server in servers.iter() {
            server.reset_active();
        }
        info!(servers = servers.len(), "reset active request counters");
    }

    /// Set every server's average response time to zero.
    pub fn reset_average_response_times(&self) {
        let servers = self.servers.write();
        for server in servers.iter() {
            server.set_average_response_time(0.0);
        }
        info!(servers = servers.len(), "reset average response times");
    }

    /// Record a new average response time reported for a server.
    pub fn update_response_time(&self, name: &str, millis: f64) -> Result<(), RoutingError> {
        check_load_signal(name, "average_response_time_ms", millis)?;

        let servers = self.servers.read();
        let entry = servers
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| RoutingError::UnknownServer(name.to_string()))?;

        entry.set_average_response_time(millis);
        debug!(server = %name, average_response_time_ms = millis, "updated response time");
        Ok(())
    }

    /// Snapshot of the registered entries, in pool order.
    pub fn servers(&self) -> Vec<Arc<ServerEntry>> {
        self.servers.read().clone()
    }

    /// Look up a server by name.
    pub fn server(&self, name: &str) -> Option<Arc<ServerEntry>> {
        self.servers.read().iter().find(|s| s.name() == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.servers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.read().is_empty()
    }
}

impl Default for RoutingContext {
    fn default() -> Self {
        Self::new(Box::new(RoundRobin::new()))
    }
}

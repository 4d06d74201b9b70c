//! Shared application state.
//!
//! Wraps the routing context with metrics and applies reloaded
//! configuration to the running pool.

use crate::balancer::{
    RoutingContext, RoutingDecision, RoutingError, ServerEntry, ServerStatus, build_strategy,
};
use crate::config::{Config, ServerConfig, StrategyConfig};
use crate::metrics::{MetricsCollector, ResetTarget};
use crate::util::ShutdownSignal;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state accessible from all tasks.
#[derive(Clone)]
pub struct AppState {
    context: Arc<RoutingContext>,
    /// Strategy settings currently in effect, to detect changes on reload.
    strategy: Arc<Mutex<StrategyConfig>>,
    metrics: MetricsCollector,
    shutdown: ShutdownSignal,
}

impl AppState {
    /// Build the routing context described by the configuration.
    pub fn new(config: &Config) -> Result<Self, RoutingError> {
        let context = RoutingContext::new(build_strategy(&config.strategy));
        for server in &config.servers {
            context.add_server(entry_from_config(server))?;
        }

        Ok(Self {
            context: Arc::new(context),
            strategy: Arc::new(Mutex::new(config.strategy.clone())),
            metrics: MetricsCollector::new(),
            shutdown: ShutdownSignal::new(),
        })
    }

    /// Get the routing context.
    pub fn context(&self) -> &Arc<RoutingContext> {
        &self.context
    }

    /// Get the metrics collector.
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Get the shutdown signal.
    pub fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Trigger shutdown.
    pub fn trigger_shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Route a request and record the outcome.
    pub fn route(&self, request: &str) -> Result<RoutingDecision, RoutingError> {
        match self.context.route_request(request) {
            Ok(decision) => {
                self.metrics.record_routed(&decision.server);
                Ok(decision)
            }
            Err(e) => {
                if e == RoutingError::NoServers {
                    self.metrics.record_no_servers();
                }
                Err(e)
            }
        }
    }

    /// Snapshot of server load, mirrored into the metrics gauges.
    pub fn status(&self) -> Vec<ServerStatus> {
        let status = self.context.server_status();
        self.metrics.observe_status(&status);
        status
    }

    /// Swap in a new strategy.
    pub fn change_strategy(&self, config: StrategyConfig) {
        let strategy = build_strategy(&config);
        self.metrics.record_strategy_change(strategy.name());
        self.context.change_strategy(strategy);
        *self.strategy.lock() = config;
    }

    pub fn reset_counters(&self) {
        self.context.reset_counters();
        self.metrics.record_reset(ResetTarget::ActiveRequests);
    }

    pub fn reset_average_response_times(&self) {
        self.context.reset_average_response_times();
        self.metrics.record_reset(ResetTarget::ResponseTimes);
    }

    /// Reconcile the running pool with a reloaded configuration.
    ///
    /// The strategy is replaced only if its settings changed, so rotation
    /// state survives unrelated edits. Servers missing from the file are
    /// removed, new ones are appended and response times are refreshed.
    /// Processing power is fixed at registration; a changed value is
    /// reported and ignored.
    pub fn apply_config(&self, config: &Config) {
        let current = self.strategy.lock().clone();
        if current != config.strategy {
            self.change_strategy(config.strategy.clone());
        }

        let wanted: HashSet<&str> = config.servers.iter().map(|s| s.name.as_str()).collect();
        for entry in self.context.servers() {
            if !wanted.contains(entry.name()) {
                let _ = self.context.remove_server(entry.name());
            }
        }

        for server in &config.servers {
            match self.context.server(&server.name) {
                Some(entry) => {
                    if entry.processing_power() != server.processing_power {
                        warn!(
                            server = %server.name,
                            current = entry.processing_power(),
                            requested = server.processing_power,
                            "processing power is fixed once registered, ignoring change"
                        );
                    }
                    if let Err(e) = self
                        .context
                        .update_response_time(&server.name, server.average_response_time_ms)
                    {
                        warn!(server = %server.name, error = %e, "failed to update response time");
                    }
                }
                None => {
                    if let Err(e) = self.context.add_server(entry_from_config(server)) {
                        warn!(server = %server.name, error = %e, "failed to add server");
                    }
                }
            }
        }

        info!(
            servers = self.context.len(),
            strategy = self.context.strategy_name(),
            "applied configuration"
        );
    }
}

fn entry_from_config(server: &ServerConfig) -> ServerEntry {
    ServerEntry::new(&server.name, &server.endpoint)
        .with_processing_power(server.processing_power)
        .with_average_response_time(server.average_response_time_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Algorithm, WeightedMode};

    fn server(name: &str) -> ServerConfig {
        ServerConfig {
            name: name.to_string(),
            endpoint: format!("http://{name}:8080"),
            processing_power: 1.0,
            average_response_time_ms: 0.0,
        }
    }

    fn config(servers: &[&str], algorithm: Algorithm) -> Config {
        Config {
            strategy: StrategyConfig {
                algorithm,
                weighted_mode: WeightedMode::Smooth,
            },
            servers: servers.iter().map(|n| server(n)).collect(),
            ..Config::default()
        }
    }

    fn names(state: &AppState) -> Vec<String> {
        state.status().into_iter().map(|s| s.name).collect()
    }

    #[test]
    fn test_state_from_config() {
        let state = AppState::new(&config(&["a", "b"], Algorithm::LeastBusy)).unwrap();
        assert_eq!(names(&state), ["a", "b"]);
        assert_eq!(state.context().strategy_name(), "least_busy");
    }

    #[test]
    fn test_state_rejects_duplicate_servers() {
        let result = AppState::new(&config(&["a", "a"], Algorithm::RoundRobin));
        assert!(matches!(result, Err(RoutingError::DuplicateServer(_))));
    }

    #[test]
    fn test_route_records_metrics() {
        let state = AppState::new(&config(&["a"], Algorithm::RoundRobin)).unwrap();
        state.route("r1").unwrap();

        let empty = AppState::new(&config(&[], Algorithm::RoundRobin)).unwrap();
        assert_eq!(empty.route("r1").unwrap_err(), RoutingError::NoServers);

        let text = state.metrics().encode().unwrap();
        assert!(text.contains(r#"routelb_routed_requests_total{server="a"} 1"#));
        assert!(empty.metrics().encode().unwrap().contains("routelb_no_servers_total 1"));
    }

    #[test]
    fn test_apply_config_reconciles_pool() {
        let state = AppState::new(&config(&["a", "b", "c"], Algorithm::RoundRobin)).unwrap();

        let mut next = config(&["a", "c", "d"], Algorithm::RoundRobin);
        next.servers[0].average_response_time_ms = 25.0;
        state.apply_config(&next);

        assert_eq!(names(&state), ["a", "c", "d"]);
        assert_eq!(
            state.context().server("a").unwrap().average_response_time_ms(),
            25.0
        );
    }

    #[test]
    fn test_apply_config_keeps_strategy_when_unchanged() {
        let state = AppState::new(&config(&["a", "b", "c"], Algorithm::RoundRobin)).unwrap();
        assert_eq!(state.route("r1").unwrap().server, "a");

        state.apply_config(&config(&["a", "b", "c"], Algorithm::RoundRobin));

        // Same strategy object, so the cursor carries on.
        assert_eq!(state.route("r2").unwrap().server, "b");
    }

    #[test]
    fn test_apply_config_swaps_strategy() {
        let state = AppState::new(&config(&["a", "b"], Algorithm::RoundRobin)).unwrap();
        state.apply_config(&config(&["a", "b"], Algorithm::WeightedResponseTime));
        assert_eq!(state.context().strategy_name(), "weighted_response_time");

        let text = state.metrics().encode().unwrap();
        assert!(text.contains(
            r#"routelb_strategy_changes_total{strategy="weighted_response_time"} 1"#
        ));
    }

    #[test]
    fn test_apply_config_ignores_processing_power_change() {
        let state = AppState::new(&config(&["a"], Algorithm::WeightedRoundRobin)).unwrap();

        let mut next = config(&["a"], Algorithm::WeightedRoundRobin);
        next.servers[0].processing_power = 8.0;
        state.apply_config(&next);

        assert_eq!(state.context().server("a").unwrap().processing_power(), 1.0);
    }

    #[test]
    fn test_resets_record_metrics() {
        let state = AppState::new(&config(&["a"], Algorithm::RoundRobin)).unwrap();
        state.route("r1").unwrap();
        state.reset_counters();
        state.reset_average_response_times();

        assert_eq!(state.status()[0].active_requests, 0);
        let text = state.metrics().encode().unwrap();
        assert!(text.contains(r#"routelb_resets_total{target="ActiveRequests"} 1"#));
    }
}

//! Routing metrics using prometheus-client.
//!
//! Tracks routing decisions, failures, strategy swaps and resets, plus the
//! active request count per server.

use crate::balancer::ServerStatus;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::Arc;

/// Labels for per-server metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ServerLabels {
    pub server: String,
}

/// Labels for strategy metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct StrategyLabels {
    pub strategy: String,
}

/// Labels for administrative reset metrics.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ResetLabels {
    pub target: ResetTarget,
}

/// Which load signal was reset.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum ResetTarget {
    ActiveRequests,
    ResponseTimes,
}

/// Collects and stores all metrics.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsCollectorInner>,
}

struct MetricsCollectorInner {
    /// Requests routed, per chosen server.
    routed_total: Family<ServerLabels, Counter>,
    /// Routing calls that found no servers.
    no_servers_total: Counter,
    /// Active requests per server, as last observed.
    active_requests: Family<ServerLabels, Gauge>,
    /// Strategy swaps, by the strategy swapped in.
    strategy_changes_total: Family<StrategyLabels, Counter>,
    /// Administrative resets.
    resets_total: Family<ResetLabels, Counter>,
    registry: Registry,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let routed_total = Family::<ServerLabels, Counter>::default();
        let no_servers_total = Counter::default();
        let active_requests = Family::<ServerLabels, Gauge>::default();
        let strategy_changes_total = Family::<StrategyLabels, Counter>::default();
        let resets_total = Family::<ResetLabels, Counter>::default();

        registry.register(
            "routelb_routed_requests",
            "Total number of requests routed to each server",
            routed_total.clone(),
        );
        registry.register(
            "routelb_no_servers",
            "Total number of routing calls made against an empty pool",
            no_servers_total.clone(),
        );
        registry.register(
            "routelb_active_requests",
            "Active request counter per server",
            active_requests.clone(),
        );
        registry.register(
            "routelb_strategy_changes",
            "Total number of selection strategy swaps",
            strategy_changes_total.clone(),
        );
        registry.register(
            "routelb_resets",
            "Total number of administrative load signal resets",
            resets_total.clone(),
        );

        Self {
            inner: Arc::new(MetricsCollectorInner {
                routed_total,
                no_servers_total,
                active_requests,
                strategy_changes_total,
                resets_total,
                registry,
            }),
        }
    }

    /// Get the prometheus registry for encoding.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Record a successful routing decision.
    pub fn record_routed(&self, server: &str) {
        let labels = ServerLabels {
            server: server.to_string(),
        };
        self.inner.routed_total.get_or_create(&labels).inc();
    }

    /// Record a routing call against an empty pool.
    pub fn record_no_servers(&self) {
        self.inner.no_servers_total.inc();
    }

    /// Record a strategy swap.
    pub fn record_strategy_change(&self, strategy: &str) {
        let labels = StrategyLabels {
            strategy: strategy.to_string(),
        };
        self.inner.strategy_changes_total.get_or_create(&labels).inc();
    }

    /// Record an administrative reset.
    pub fn record_reset(&self, target: ResetTarget) {
        self.inner
            .resets_total
            .get_or_create(&ResetLabels { target })
            .inc();
    }

    /// Mirror a status snapshot into the active request gauges.
    pub fn observe_status(&self, status: &[ServerStatus]) {
        for server in status {
            let labels = ServerLabels {
                server: server.name.clone(),
            };
            self.inner
                .active_requests
                .get_or_create(&labels)
                .set(i64::try_from(server.active_requests).unwrap_or(i64::MAX));
        }
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.inner.registry)?;
        Ok(buffer)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

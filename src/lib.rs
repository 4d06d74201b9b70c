//! routelb - A pluggable server-selection engine for request routing
//!
//! This crate provides the decision engine of a load balancer:
//! - A routing context owning the server pool and its load counters
//! - Five interchangeable selection strategies (round robin, random,
//!   least busy, weighted response time, weighted round robin)
//! - Atomic strategy hot-swap while requests are being routed
//! - YAML seeding with hot reload, and Prometheus metrics
//!
//! Network transport is left to the caller: a routing decision names the
//! chosen server and its endpoint.

pub mod balancer;
pub mod config;
pub mod metrics;
pub mod state;
pub mod util;

pub use balancer::{RoutingContext, RoutingDecision, RoutingError, SelectionStrategy, ServerEntry};
pub use config::Config;

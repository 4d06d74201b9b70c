//! Server selection strategies.

mod least_busy;
mod random;
mod round_robin;
mod weighted_response_time;
mod weighted_round_robin;

pub use least_busy::LeastBusy;
pub use random::Random;
pub use round_robin::RoundRobin;
pub use weighted_response_time::WeightedResponseTime;
pub use weighted_round_robin::WeightedRoundRobin;

use crate::balancer::{SelectError, ServerEntry};
use crate::config::{Algorithm, StrategyConfig, WeightedMode};
use std::sync::Arc;

/// Trait for server selection algorithms.
pub trait SelectionStrategy: Send + Sync {
    /// Short identifier used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Select the next server.
    ///
    /// # Arguments
    ///
    /// * `servers` - The current pool, in registration order
    ///
    /// # Returns
    ///
    /// A reference into `servers`, or `SelectError::EmptyPool`.
    fn select<'a>(&self, servers: &'a [Arc<ServerEntry>])
        -> Result<&'a Arc<ServerEntry>, SelectError>;
}

/// Build a strategy from its configuration.
pub fn build_strategy(config: &StrategyConfig) -> Box<dyn SelectionStrategy> {
    match config.algorithm {
        Algorithm::RoundRobin => Box::new(RoundRobin::new()),
        Algorithm::Random => Box::new(Random::new()),
        Algorithm::LeastBusy => Box::new(LeastBusy::new()),
        Algorithm::WeightedResponseTime => Box::new(WeightedResponseTime::new()),
        Algorithm::WeightedRoundRobin => match config.weighted_mode {
            WeightedMode::Smooth => Box::new(WeightedRoundRobin::smooth()),
            WeightedMode::SortedRotation => Box::new(WeightedRoundRobin::sorted_rotation()),
        },
    }
}

/// Index of the first minimum of `key` over `servers`.
fn first_min_by<F>(servers: &[Arc<ServerEntry>], key: F) -> Option<usize>
where
    F: Fn(&ServerEntry) -> f64,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, server) in servers.iter().enumerate() {
        let score = key(server.as_ref());
        match best {
            Some((_, min)) if score >= min => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

//! Weighted response-time selection.

use super::{SelectionStrategy, first_min_by};
use crate::balancer::{SelectError, ServerEntry};
use std::sync::Arc;

/// Picks the server minimizing `active_requests * average_response_time_ms`.
///
/// An idle server scores zero whatever its response time, so it always
/// wins over a busy one. Ties go to the earliest server in the pool.
pub struct WeightedResponseTime;

impl WeightedResponseTime {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WeightedResponseTime {
    fn default() -> Self {
        Self::new()
    }
}

fn score(server: &ServerEntry) -> f64 {
    let active = server.active_requests();
    if active == 0 {
        return 0.0;
    }
    active as f64 * server.average_response_time_ms()
}

impl SelectionStrategy for WeightedResponseTime {
    fn name(&self) -> &'static str {
        "weighted_response_time"
    }

    fn select<'a>(
        &self,
        servers: &'a [Arc<ServerEntry>],
    ) -> Result<&'a Arc<ServerEntry>, SelectError> {
        first_min_by(servers, score)
            .map(|idx| &servers[idx])
            .ok_or(SelectError::EmptyPool)
    }
}

//! Least-busy selection.

use super::{SelectionStrategy, first_min_by};
use crate::balancer::{SelectError, ServerEntry};
use std::sync::Arc;

/// Least-busy strategy.
///
/// Sends the request to the server with the fewest active requests.
/// Ties go to the earliest server in the pool.
pub struct LeastBusy;

impl LeastBusy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LeastBusy {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStrategy for LeastBusy {
    fn name(&self) -> &'static str {
        "least_busy"
    }

    fn select<'a>(
        &self,
        servers: &'a [Arc<ServerEntry>],
    ) -> Result<&'a Arc<ServerEntry>, SelectError> {
        first_min_by(servers, |s| s.active_requests() as f64)
            .map(|idx| &servers[idx])
            .ok_or(SelectError::EmptyPool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_servers(active: &[u64]) -> Vec<Arc<ServerEntry>> {
        active
            .iter()
            .enumerate()
            .map(|(i, count)| {
                let entry = ServerEntry::new(format!("s{i}"), format!("http://s{i}:80"));
                entry.set_active_requests(*count);
                Arc::new(entry)
            })
            .collect()
    }

    #[test]
    fn test_least_busy_selects_lowest() {
        let servers = test_servers(&[5, 2, 0]);
        let lb = LeastBusy::new();

        for _ in 0..5 {
            assert_eq!(lb.select(&servers).unwrap().name(), "s2");
        }
    }

    #[test]
    fn test_least_busy_equal_counts() {
        let servers = test_servers(&[5, 2, 0]);
        for server in &servers {
            server.set_active_requests(3);
        }

        // All equal, should pick first
        let selected = LeastBusy::new().select(&servers).unwrap();
        assert_eq!(selected.name(), "s0");
    }

    #[test]
    fn test_least_busy_tie_after_minimum() {
        let servers = test_servers(&[4, 1, 1]);
        assert_eq!(LeastBusy::new().select(&servers).unwrap().name(), "s1");
    }

    #[test]
    fn test_least_busy_empty() {
        assert_eq!(LeastBusy::new().select(&[]).unwrap_err(), SelectError::EmptyPool);
    }
}

//! Round-robin selection.

use super::SelectionStrategy;
use crate::balancer::{SelectError, ServerEntry};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Round-robin strategy.
///
/// Walks the pool in registration order. The cursor is positional, so
/// adding or removing servers between calls can skip or repeat a server
/// once.
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    /// Create a new round-robin strategy with its cursor at the first server.
    pub fn new() -> Self {
        Self {
            counter: AtomicUsize::new(0),
        }
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStrategy for RoundRobin {
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn select<'a>(
        &self,
        servers: &'a [Arc<ServerEntry>],
    ) -> Result<&'a Arc<ServerEntry>, SelectError> {
        if servers.is_empty() {
            return Err(SelectError::EmptyPool);
        }

        let idx = self.counter.fetch_add(1, Ordering::Relaxed) % servers.len();
        Ok(&servers[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn test_servers() -> Vec<Arc<ServerEntry>> {
        ["a", "b", "c"]
            .iter()
            .map(|n| Arc::new(ServerEntry::new(*n, format!("http://{n}:80"))))
            .collect()
    }

    #[test]
    fn test_round_robin_cycles() {
        let rr = RoundRobin::new();
        let servers = test_servers();

        let s1 = rr.select(&servers).unwrap();
        let s2 = rr.select(&servers).unwrap();
        let s3 = rr.select(&servers).unwrap();
        let s4 = rr.select(&servers).unwrap();

        assert_eq!(s1.name(), "a");
        assert_eq!(s2.name(), "b");
        assert_eq!(s3.name(), "c");
        assert_eq!(s4.name(), "a"); // Cycles back
    }

    #[test]
    fn test_round_robin_covers_pool() {
        let rr = RoundRobin::new();
        let servers = test_servers();

        let seen: HashSet<&str> = (0..servers.len())
            .map(|_| rr.select(&servers).unwrap().name())
            .collect();
        assert_eq!(seen.len(), servers.len());
    }

    #[test]
    fn test_round_robin_cursor_survives_pool_growth() {
        let rr = RoundRobin::new();
        let mut servers = test_servers();

        rr.select(&servers).unwrap();
        rr.select(&servers).unwrap();
        servers.push(Arc::new(ServerEntry::new("d", "http://d:80")));

        // Cursor is at 2, so the next pick is positional.
        assert_eq!(rr.select(&servers).unwrap().name(), "c");
        assert_eq!(rr.select(&servers).unwrap().name(), "d");
    }

    #[test]
    fn test_round_robin_empty() {
        let rr = RoundRobin::new();
        assert_eq!(rr.select(&[]).unwrap_err(), SelectError::EmptyPool);
    }
}

//! Weighted round-robin selection.
//!
//! Two modes are available:
//!
//! - [`WeightedRoundRobin::smooth`] (the default) gives each server a share
//!   of selections proportional to its `processing_power`, interleaving the
//!   picks the way nginx's smooth weighted round robin does. With weights
//!   `[5, 1, 1]` the sequence is `a a b a c a a` rather than `a a a a a b c`.
//! - [`WeightedRoundRobin::sorted_rotation`] orders servers by descending
//!   `processing_power` and rotates through that order. Every server still
//!   gets exactly one turn per rotation; weight only decides who goes first.
//!
//! Both modes keep purely positional state and never hold on to entries.

use super::SelectionStrategy;
use crate::balancer::{SelectError, ServerEntry};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Mode {
    /// Current weight per pool slot.
    Smooth(Mutex<Vec<f64>>),
    SortedRotation,
}

/// Weighted round-robin strategy over `processing_power`.
pub struct WeightedRoundRobin {
    mode: Mode,
    /// Rotation cursor for sorted rotation, and the fallback when every
    /// weight is zero in smooth mode.
    counter: AtomicUsize,
}

impl WeightedRoundRobin {
    /// Proportional-frequency weighting.
    pub fn smooth() -> Self {
        Self {
            mode: Mode::Smooth(Mutex::new(Vec::new())),
            counter: AtomicUsize::new(0),
        }
    }

    /// Rotation over servers sorted by descending weight.
    pub fn sorted_rotation() -> Self {
        Self {
            mode: Mode::SortedRotation,
            counter: AtomicUsize::new(0),
        }
    }

    fn next_position(&self, len: usize) -> usize {
        self.counter.fetch_add(1, Ordering::Relaxed) % len
    }

    fn select_smooth(&self, current: &Mutex<Vec<f64>>, servers: &[Arc<ServerEntry>]) -> usize {
        let total: f64 = servers.iter().map(|s| s.processing_power()).sum();
        if total <= 0.0 {
            return self.next_position(servers.len());
        }

        let mut current = current.lock();
        if current.len() != servers.len() {
            current.clear();
            current.resize(servers.len(), 0.0);
        }

        let mut best = 0;
        for (idx, server) in servers.iter().enumerate() {
            current[idx] += server.processing_power();
            if current[idx] > current[best] {
                best = idx;
            }
        }
        current[best] -= total;
        best
    }

    fn select_sorted<'a>(&self, servers: &'a [Arc<ServerEntry>]) -> &'a Arc<ServerEntry> {
        let mut ordered: Vec<&'a Arc<ServerEntry>> = servers.iter().collect();
        // Stable, so equal weights keep registration order.
        ordered.sort_by(|a, b| b.processing_power().total_cmp(&a.processing_power()));
        ordered[self.next_position(ordered.len())]
    }
}

impl Default for WeightedRoundRobin {
    fn default() -> Self {
        Self::smooth()
    }
}

impl SelectionStrategy for WeightedRoundRobin {
    fn name(&self) -> &'static str {
        match self.mode {
            Mode::Smooth(_) => "weighted_round_robin",
            Mode::SortedRotation => "weighted_round_robin_sorted",
        }
    }

    fn select<'a>(
        &self,
        servers: &'a [Arc<ServerEntry>],
    ) -> Result<&'a Arc<ServerEntry>, SelectError> {
        if servers.is_empty() {
            return Err(SelectError::EmptyPool);
        }

        match &self.mode {
            Mode::Smooth(current) => Ok(&servers[self.select_smooth(current, servers)]),
            Mode::SortedRotation => Ok(self.select_sorted(servers)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_servers(weights: &[f64]) -> Vec<Arc<ServerEntry>> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let name = ((b'a' + i as u8) as char).to_string();
                Arc::new(ServerEntry::new(name, format!("http://s{i}:80")).with_processing_power(*w))
            })
            .collect()
    }

    fn picks(strategy: &WeightedRoundRobin, servers: &[Arc<ServerEntry>], n: usize) -> String {
        (0..n)
            .map(|_| strategy.select(servers).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_smooth_distribution_matches_weights() {
        let servers = test_servers(&[3.0, 1.0]);
        let wrr = WeightedRoundRobin::smooth();

        let sequence = picks(&wrr, &servers, 40);
        let a_count = sequence.chars().filter(|c| *c == 'a').count();
        let b_count = sequence.chars().filter(|c| *c == 'b').count();

        // With 3:1 weights, a should get 30, b should get 10
        assert_eq!(a_count, 30);
        assert_eq!(b_count, 10);
    }

    #[test]
    fn test_smooth_interleaves() {
        let servers = test_servers(&[5.0, 1.0, 1.0]);
        let wrr = WeightedRoundRobin::smooth();

        assert_eq!(picks(&wrr, &servers, 7), "aabacaa");
    }

    #[test]
    fn test_smooth_equal_weights_is_plain_rotation() {
        let servers = test_servers(&[1.0, 1.0, 1.0]);
        let wrr = WeightedRoundRobin::smooth();

        assert_eq!(picks(&wrr, &servers, 6), "abcabc");
    }

    #[test]
    fn test_smooth_zero_weight_server_never_picked() {
        let servers = test_servers(&[2.0, 0.0, 1.0]);
        let wrr = WeightedRoundRobin::smooth();

        assert!(!picks(&wrr, &servers, 30).contains('b'));
    }

    #[test]
    fn test_smooth_all_zero_weights_rotates() {
        let servers = test_servers(&[0.0, 0.0, 0.0]);
        let wrr = WeightedRoundRobin::smooth();

        assert_eq!(picks(&wrr, &servers, 4), "abca");
    }

    #[test]
    fn test_smooth_resets_when_pool_changes() {
        let mut servers = test_servers(&[1.0, 1.0]);
        let wrr = WeightedRoundRobin::smooth();
        assert_eq!(picks(&wrr, &servers, 1), "a");

        servers.push(Arc::new(ServerEntry::new("c", "http://c:80")));
        assert_eq!(picks(&wrr, &servers, 3), "abc");
    }

    #[test]
    fn test_sorted_rotation_orders_by_weight() {
        let servers = test_servers(&[1.0, 4.0, 2.0]);
        let wrr = WeightedRoundRobin::sorted_rotation();

        // One turn each per rotation, heaviest first.
        assert_eq!(picks(&wrr, &servers, 6), "bcabca");
    }

    #[test]
    fn test_sorted_rotation_stable_for_equal_weights() {
        let servers = test_servers(&[2.0, 2.0, 1.0]);
        let wrr = WeightedRoundRobin::sorted_rotation();

        assert_eq!(picks(&wrr, &servers, 3), "abc");
    }

    #[test]
    fn test_weighted_empty() {
        assert_eq!(
            WeightedRoundRobin::smooth().select(&[]).unwrap_err(),
            SelectError::EmptyPool
        );
        assert_eq!(
            WeightedRoundRobin::sorted_rotation().select(&[]).unwrap_err(),
            SelectError::EmptyPool
        );
    }
}

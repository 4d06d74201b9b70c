//! Server registry entries.
//!
//! An entry carries a backend's identity plus the live load signals the
//! weighted strategies read. Counters are atomics so routing can update
//! them while holding only a shared borrow of the pool.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// One backend server and its load signals.
pub struct ServerEntry {
    name: String,
    endpoint: String,
    /// Capacity weight, fixed once the entry is registered.
    processing_power: f64,
    active_requests: AtomicU64,
    /// `f64` bit pattern of the average response time in milliseconds.
    average_response_time: AtomicU64,
}

impl ServerEntry {
    /// Create an entry with a processing power of 1.0 and no load.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            processing_power: 1.0,
            active_requests: AtomicU64::new(0),
            average_response_time: AtomicU64::new(0f64.to_bits()),
        }
    }

    /// Set the capacity weight used by weighted round robin.
    pub fn with_processing_power(mut self, processing_power: f64) -> Self {
        self.processing_power = processing_power;
        self
    }

    /// Set the initial average response time.
    pub fn with_average_response_time(self, millis: f64) -> Self {
        self.average_response_time
            .store(millis.to_bits(), Ordering::Relaxed);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn processing_power(&self) -> f64 {
        self.processing_power
    }

    /// Number of requests routed to this server since the last reset.
    pub fn active_requests(&self) -> u64 {
        self.active_requests.load(Ordering::Acquire)
    }

    pub fn average_response_time_ms(&self) -> f64 {
        f64::from_bits(self.average_response_time.load(Ordering::Acquire))
    }

    /// Record one routed request. Returns the new count.
    pub(crate) fn increment_active(&self) -> u64 {
        self.active_requests.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn reset_active(&self) {
        self.active_requests.store(0, Ordering::Release);
    }

    pub(crate) fn set_average_response_time(&self, millis: f64) {
        self.average_response_time
            .store(millis.to_bits(), Ordering::Release);
    }

    #[cfg(test)]
    pub(crate) fn set_active_requests(&self, count: u64) {
        self.active_requests.store(count, Ordering::Release);
    }
}

impl fmt::Debug for ServerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerEntry")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("processing_power", &self.processing_power)
            .field("active_requests", &self.active_requests())
            .field("average_response_time_ms", &self.average_response_time_ms())
            .finish()
    }
}

/// Point-in-time view of one server's routing load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    pub name: String,
    pub active_requests: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_defaults() {
        let entry = ServerEntry::new("a", "http://10.0.0.1:8080");
        assert_eq!(entry.name(), "a");
        assert_eq!(entry.endpoint(), "http://10.0.0.1:8080");
        assert_eq!(entry.processing_power(), 1.0);
        assert_eq!(entry.active_requests(), 0);
        assert_eq!(entry.average_response_time_ms(), 0.0);
    }

    #[test]
    fn test_builder_signals() {
        let entry = ServerEntry::new("a", "x")
            .with_processing_power(2.5)
            .with_average_response_time(40.0);
        assert_eq!(entry.processing_power(), 2.5);
        assert_eq!(entry.average_response_time_ms(), 40.0);
    }

    #[test]
    fn test_counter_increment_and_reset() {
        let entry = ServerEntry::new("a", "x");
        assert_eq!(entry.increment_active(), 1);
        assert_eq!(entry.increment_active(), 2);
        assert_eq!(entry.active_requests(), 2);

        entry.reset_active();
        assert_eq!(entry.active_requests(), 0);
    }

    #[test]
    fn test_response_time_update() {
        let entry = ServerEntry::new("a", "x");
        entry.set_average_response_time(12.75);
        assert_eq!(entry.average_response_time_ms(), 12.75);
    }
}

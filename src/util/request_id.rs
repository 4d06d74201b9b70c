//! Request labels for routed requests.
//!
//! Each routed request carries a label so its decision can be followed
//! through the logs. Labels are either random UUIDs or short, process-local
//! sequence numbers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Label attached to a routed request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// A globally unique label.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// A short label, unique within this process: `req-{counter:016x}`.
    pub fn short() -> Self {
        let count = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("req-{count:016x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_labels_differ() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_short_labels_unique() {
        let ids: HashSet<RequestId> = (0..1000).map(|_| RequestId::short()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| id.as_str().starts_with("req-")));
    }

    #[test]
    fn test_label_from_string() {
        let id = RequestId::from("checkout-42".to_string());
        assert_eq!(id.to_string(), "checkout-42");
    }
}

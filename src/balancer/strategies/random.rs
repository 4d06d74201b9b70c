//! Uniform random selection.

use super::SelectionStrategy;
use crate::balancer::{SelectError, ServerEntry};
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Picks a server uniformly at random on every call.
pub struct Random;

impl Random {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStrategy for Random {
    fn name(&self) -> &'static str {
        "random"
    }

    fn select<'a>(
        &self,
        servers: &'a [Arc<ServerEntry>],
    ) -> Result<&'a Arc<ServerEntry>, SelectError> {
        servers
            .choose(&mut rand::thread_rng())
            .ok_or(SelectError::EmptyPool)
    }
}

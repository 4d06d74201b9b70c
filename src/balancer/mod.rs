//! Server pool management and selection strategies.

mod context;
mod entry;
mod error;
pub mod strategies;

pub use context::{RoutingContext, RoutingDecision};
pub use entry::{ServerEntry, ServerStatus};
pub use error::{RoutingError, SelectError};
pub use strategies::{SelectionStrategy, build_strategy};

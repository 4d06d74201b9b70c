//! Errors surfaced by server selection and the routing context.

use thiserror::Error;

/// Errors returned by a selection strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("cannot select a server from an empty pool")]
    EmptyPool,
}

/// Errors returned by the routing context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error("no servers available")]
    NoServers,

    #[error("server '{0}' is already registered")]
    DuplicateServer(String),

    #[error("server '{0}' is not registered")]
    UnknownServer(String),

    #[error("invalid {field} for server '{server}': {value} (must be finite and >= 0)")]
    InvalidLoadSignal {
        server: String,
        field: &'static str,
        value: f64,
    },
}

impl From<SelectError> for RoutingError {
    fn from(err: SelectError) -> Self {
        match err {
            SelectError::EmptyPool => RoutingError::NoServers,
        }
    }
}

/// Check that a load signal is usable by the weighted strategies.
pub(crate) fn check_load_signal(
    server: &str,
    field: &'static str,
    value: f64,
) -> Result<(), RoutingError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RoutingError::InvalidLoadSignal {
            server: server.to_string(),
            field,
            value,
        })
    }
}

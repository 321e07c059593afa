//! Error types for the quadtree culling crate
//!
//! The index itself never fails: insertions outside the root are dropped and
//! empty trees answer queries with empty sets. These errors are only produced
//! by the opt-in validation entry points (`QuadTreeConfig::validate`,
//! `QuadTree::try_with_config`, `Frustum::try_update`).

use std::fmt;

/// Result type for validated quadtree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Quadtree culling errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Tree configuration rejected (zero capacity, zero depth, ...)
    InvalidConfig(String),

    /// Bounding box is empty or degenerate where an extent is required
    InvalidBounds(String),

    /// Frustum parameters cannot produce a view volume
    InvalidFrustum(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Error::InvalidBounds(msg) => write!(f, "Invalid bounds: {}", msg),
            Error::InvalidFrustum(msg) => write!(f, "Invalid frustum: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error through `quad_error!` and hand it back for `Err(...)`.
pub(crate) fn log_and_return_error(source: &str, error: Error) -> Error {
    crate::quad_error!(source, "{}", error);
    error
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

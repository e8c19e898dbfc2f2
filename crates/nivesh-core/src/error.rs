//! Error types for nivesh-core

use thiserror::Error;

/// Result type alias for nivesh-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for driver-facing operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// No tool registered under the requested name
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),
}

//! Error types for the battle simulation.
//!
//! Only setup can fail: loading stat tables, validating configuration and
//! host lookups. Rejected deploys, missing targets and repeated end-of-match
//! calls are ordinary outcomes and never surface here.

use thiserror::Error;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Top-level error type for battle setup and host-facing lookups.
#[derive(Debug, Error)]
pub enum BattleError {
    /// Data text failed to parse.
    #[error("Failed to parse '{source_name}': {message}")]
    DataParseError {
        /// Name of the data source (file name or table label).
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Data parsed but failed validation.
    #[error("Invalid data: {}", .0.join("; "))]
    InvalidData(Vec<String>),

    /// Battle configuration rejected.
    #[error("Invalid battle configuration: {0}")]
    InvalidConfig(String),

    /// Arena geometry rejected.
    #[error("Invalid arena layout: {0}")]
    InvalidLayout(String),

    /// An archetype has no registered constructor.
    #[error("No constructor registered for archetype '{0}'")]
    MissingConstructor(String),

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),
}

//! Error definitions for the mapping module
//!
//! Only table construction and configuration can fail. Frame translation
//! itself is infallible.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    /// Invalid configuration entry
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A raw button name that the peripheral cannot produce
    #[error("Unknown raw button '{name}' for {peripheral}")]
    UnknownRawButton { peripheral: String, name: String },

    /// A logical button name the target system does not define
    #[error("Unknown logical button '{name}' for {system}")]
    UnknownLogicalButton { system: String, name: String },

    /// The system defines more logical buttons than a table can hold
    #[error("Too many logical buttons: {count} (max {max})")]
    TooManyButtons { count: usize, max: usize },

    /// A table built for one system was handed to another
    #[error("Button table has {table} entries, system expects {expected}")]
    TableMismatch { table: usize, expected: usize },

    /// The requested target system does not exist
    #[error("Unknown target system: {0}")]
    UnknownSystem(String),
}

//! Error types for routing and dispatch.

use thiserror::Error;

/// Failures that escape dispatch as `Err`.
///
/// "No route" and "action not found" are not here: both are ordinary 404
/// outcomes produced through the dispatcher's error path.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The controller identifier stayed unresolved after every fallback
    /// candidate was tried.
    #[error("controller not found: {controller}")]
    ControllerUnresolved {
        /// The last candidate that was attempted.
        controller: String,
    },

    /// A `(class, method)` filter reference could not be resolved.
    #[error("filter not found: {class}::{method}")]
    FilterUnresolved {
        /// Filter class identifier.
        class: String,
        /// Filter method name.
        method: String,
    },

    /// A required handler parameter had no value in the pool.
    #[error("no value for parameter '{parameter}' of {target}")]
    ParameterUnresolved {
        /// Controller (and action) being resolved.
        target: String,
        /// Parameter name.
        parameter: String,
    },

    /// A pool value could not be coerced to the declared parameter kind.
    #[error("invalid value '{value}' for parameter '{parameter}': expected {expected}")]
    InvalidParameter {
        /// Parameter name.
        parameter: String,
        /// Raw value found in the pool.
        value: String,
        /// Human readable kind that was expected.
        expected: &'static str,
    },

    /// A route manifest could not be parsed.
    #[error("invalid route manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// A route manifest could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;

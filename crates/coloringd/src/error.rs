//! Error types for coloringd operations.
//!
//! All errors implement `std::error::Error` via `thiserror`. Failures are
//! contained within a single reconciliation pass; none of these are fatal
//! to the daemon.

use thiserror::Error;

/// Result type alias for coloringd operations.
pub type Result<T> = std::result::Result<T, ColoringError>;

/// Errors that can occur while coloring the topology.
#[derive(Debug, Error)]
pub enum ColoringError {
    /// A datapath id whose suffix cannot be parsed as hexadecimal.
    #[error("Invalid datapath id '{dpid}': color suffix is not hexadecimal")]
    InvalidDpid {
        /// The offending datapath id.
        dpid: String,
    },

    /// The flow manager returned a non-success status for a push.
    #[error("Flow manager rejected flow for switch '{dpid}' (status {status})")]
    FlowPush {
        /// Switch the flow was destined for.
        dpid: String,
        /// HTTP-like status code returned by the flow manager.
        status: u16,
    },

    /// The topology source could not be reached or returned garbage.
    #[error("Topology source unavailable: {message}")]
    TopologySource {
        /// Error message.
        message: String,
    },

    /// Underlying HTTP transport error.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    Config {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },
}

impl ColoringError {
    /// Creates an invalid datapath id error.
    pub fn invalid_dpid(dpid: impl Into<String>) -> Self {
        Self::InvalidDpid { dpid: dpid.into() }
    }

    /// Creates a flow push error.
    pub fn flow_push(dpid: impl Into<String>, status: u16) -> Self {
        Self::FlowPush {
            dpid: dpid.into(),
            status,
        }
    }

    /// Creates a topology source error.
    pub fn topology_source(message: impl Into<String>) -> Self {
        Self::TopologySource {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition that the
    /// next reconciliation pass may clear.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ColoringError::FlowPush { .. }
                | ColoringError::TopologySource { .. }
                | ColoringError::Http(_)
        )
    }
}

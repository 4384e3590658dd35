// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for AXI register access

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for AXI operations
pub type Result<T> = std::result::Result<T, AxiError>;

/// Errors that can occur while mapping or driving the peripherals
#[derive(Debug, Error)]
pub enum AxiError {
    /// The caller is not allowed to map physical memory
    #[error("Permission denied mapping {} at {base:#010x}", path.display())]
    PermissionDenied {
        /// Device that refused access
        path: PathBuf,
        /// Physical base address requested
        base: u64,
    },

    /// Mapping or device I/O failed for any other reason
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted
        context: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A device did not become ready in time
    #[error("Timeout waiting for {what} after {duration_ms}ms")]
    Timeout {
        /// What was being waited on
        what: String,
        /// Timeout duration in milliseconds
        duration_ms: u64,
    },

    /// A configuration value could not be used
    #[error("Invalid configuration {key}: {reason}")]
    InvalidConfig {
        /// Setting name (environment variable or flag)
        key: String,
        /// Reason for rejection
        reason: String,
    },
}

impl AxiError {
    /// Create a permission denied error
    pub fn permission_denied(path: impl Into<PathBuf>, base: u64) -> Self {
        Self::PermissionDenied {
            path: path.into(),
            base,
        }
    }

    /// Create an I/O error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a timeout error
    pub fn timeout(what: impl Into<String>, duration: std::time::Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is a privilege failure
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// What the user can do about it, if anything
    pub const fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::PermissionDenied { .. } => {
                Some("Run with sudo (mapping /dev/mem needs CAP_SYS_RAWIO)")
            }
            _ => None,
        }
    }
}

//! Unified error handling for NWN2MDK
//!
//! Every fallible operation in the metadata and pipeline crates returns
//! this error type. Staging cleanup never produces one.

use std::path::PathBuf;
use thiserror::Error;

/// Opaque error raised by the host scene collaborator
pub type HostError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for all NWN2MDK operations
#[derive(Error, Debug)]
pub enum Error {
    // ==================== I/O Errors ====================

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Target path is empty or has no file name
    #[error("Invalid target path: {path:?}")]
    InvalidPath {
        path: PathBuf,
    },

    // ==================== Converter Errors ====================

    /// Converter executable could not be started
    #[error("Failed to launch converter {executable:?}: {source}")]
    Launch {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Expected interchange file is absent after a converter run
    #[error("Converter did not produce {0:?}")]
    MissingArtifact(PathBuf),

    /// Converter exited with a nonzero status
    #[error("Converter failed (exit code {}), see {log:?} for errors", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ConverterFailure {
        code: Option<i32>,
        log: PathBuf,
    },

    // ==================== Host Errors ====================

    /// Error raised by the host scene collaborator, passed through unmodified
    #[error(transparent)]
    Host(HostError),

    // ==================== Data Errors ====================

    /// Value rejected by a typed setter
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: String,
        message: String,
    },

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ==================== Configuration Errors ====================

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
    },

    // ==================== General Errors ====================

    /// Custom error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

/// Result type using the unified Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error with additional context
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }

    /// Wrap a host collaborator error
    pub fn host(error: impl Into<HostError>) -> Self {
        Error::Host(error.into())
    }

    /// Strip any `WithContext` layers
    pub fn root(&self) -> &Error {
        match self {
            Error::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this error stems from the converter process
    pub fn is_converter_error(&self) -> bool {
        matches!(
            self.root(),
            Error::Launch { .. } | Error::MissingArtifact(_) | Error::ConverterFailure { .. }
        )
    }

    /// Check if this error was raised by the host collaborator
    pub fn is_host_error(&self) -> bool {
        matches!(self.root(), Error::Host(_))
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

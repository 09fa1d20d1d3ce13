//! SFS-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SfsError>;

/// Top-level error type for the source file scanner.
#[derive(Debug, Error)]
pub enum SfsError {
    #[error("[SFS-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[SFS-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SFS-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SFS-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[SFS-3000] source directory not set")]
    DirectoryUnset,

    #[error("[SFS-3001] source directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("[SFS-3002] permission denied for {path}")]
    PermissionDenied { path: PathBuf },

    #[error("[SFS-3003] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SFS-3004] skipped entry with non-UTF-8 name: {path}")]
    NonUtf8Name { path: PathBuf },
}

impl SfsError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SFS-1001",
            Self::MissingConfig { .. } => "SFS-1002",
            Self::ConfigParse { .. } => "SFS-1003",
            Self::Serialization { .. } => "SFS-2101",
            Self::DirectoryUnset => "SFS-3000",
            Self::DirectoryNotFound { .. } => "SFS-3001",
            Self::PermissionDenied { .. } => "SFS-3002",
            Self::Io { .. } => "SFS-3003",
            Self::NonUtf8Name { .. } => "SFS-3004",
        }
    }

    /// Whether the error came out of a directory listing rather than config handling.
    #[must_use]
    pub const fn is_listing_failure(&self) -> bool {
        matches!(
            self,
            Self::DirectoryUnset
                | Self::DirectoryNotFound { .. }
                | Self::PermissionDenied { .. }
                | Self::Io { .. }
        )
    }

    /// Whether the error is a per-entry notice that did not stop the listing.
    #[must_use]
    pub const fn is_skipped_entry(&self) -> bool {
        matches!(self, Self::NonUtf8Name { .. })
    }

    /// One-line diagnostic printed by the best-effort listing.
    ///
    /// Unset and missing directories share a message; use [`Self::code`] to
    /// tell them apart.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            Self::DirectoryUnset | Self::DirectoryNotFound { .. } => {
                "directory not found or RAW_DATA_BASE_DIR not set".to_string()
            }
            Self::PermissionDenied { .. } => "permission denied to access the directory".to_string(),
            Self::Io { source, .. } => format!("an error occurred: {source}"),
            Self::NonUtf8Name { path } => {
                format!("skipped entry with non-UTF-8 name: {}", path.display())
            }
            other => format!("an error occurred: {other}"),
        }
    }

    /// Convenience constructor for IO errors with a known path.
    ///
    /// `PermissionDenied` IO errors are lifted into their own variant.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path }
        } else {
            Self::Io { path, source }
        }
    }
}

impl From<serde_json::Error> for SfsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for SfsError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SfsError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}

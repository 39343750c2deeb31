//! Error types for download list builds.
//!
//! Every failure in this crate is fatal to the build that produced it; the
//! orchestrator turns the first one into a process-wide abort. Errors carry
//! the table, field or target that failed so the final log line is enough to
//! locate the problem.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for download list operations.
#[derive(Error, Debug)]
pub enum DllistError {
    // =========================================================================
    // Configuration Errors (E001-E099)
    // =========================================================================
    /// Invalid configuration value.
    #[error("E001: Invalid configuration '{field}': {cause}")]
    ConfigValue {
        /// The configuration field that is invalid.
        field: String,
        /// Reason why the value is invalid.
        cause: String,
    },

    /// A configuration file could not be read or parsed.
    #[error("E002: Failed to parse configuration at {path}: {cause}")]
    ConfigParse {
        /// The path of the configuration file.
        path: PathBuf,
        /// Reason for the parse failure.
        cause: String,
    },

    /// The data source could not be reached or prepared.
    #[error("E003: Data source unavailable: {cause}")]
    Connection {
        /// Reason for the connection failure.
        cause: String,
    },

    // =========================================================================
    // Build Sequence Errors (E100-E199)
    // =========================================================================
    /// A table collaborator failed.
    #[error("E101: Building table '{table}' failed for {target}: {cause}")]
    Source {
        /// The table being built.
        table: &'static str,
        /// The build target, in display form.
        target: String,
        /// Reason for the failure.
        cause: String,
    },

    /// A table was filled out of canonical order.
    #[error("E102: Table '{actual}' filled out of order, expected '{expected}'")]
    TableOrder {
        /// The table that should have been filled next.
        expected: &'static str,
        /// The table that was filled.
        actual: &'static str,
    },

    /// An index table referenced a record that does not exist.
    #[error("E103: Index into '{table}' out of range: position {position}, table has {len} records")]
    IndexOutOfRange {
        /// The referenced table.
        table: &'static str,
        /// The requested position.
        position: usize,
        /// Number of records in the referenced table.
        len: usize,
    },

    // =========================================================================
    // Encoding Errors (E200-E299)
    // =========================================================================
    /// A value cannot be represented in its fixed-width field.
    #[error("E201: Cannot encode '{field}': {cause}")]
    Encoding {
        /// The field being encoded.
        field: &'static str,
        /// Why the value does not fit.
        cause: String,
    },

    /// The self-referential header could not be resolved.
    #[error("E202: Header invariant violated: {cause}")]
    HeaderInvariant {
        /// Description of the violation.
        cause: String,
    },

    /// A payload's stored size does not match its length.
    #[error("E203: Size mismatch: header says {expected} bytes, payload has {actual}")]
    SizeMismatch {
        /// Size stored in the header.
        expected: u64,
        /// Actual payload length.
        actual: u64,
    },

    /// A payload's stored checksum does not match its contents.
    #[error("E204: Checksum mismatch: header says {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the header.
        expected: u32,
        /// Checksum recomputed over the payload.
        actual: u32,
    },

    // =========================================================================
    // Compression Errors (E300-E399)
    // =========================================================================
    /// Compression failed.
    #[error("E301: Compression failed: {cause}")]
    Compression {
        /// Reason for the failure.
        cause: String,
    },

    /// Decompression failed.
    #[error("E302: Decompression failed: {cause}")]
    Decompression {
        /// Reason for the failure.
        cause: String,
    },

    // =========================================================================
    // Storage Errors (E400-E499)
    // =========================================================================
    /// Writing an artifact failed.
    #[error("E401: Failed to store list at {path}: {cause}")]
    Storage {
        /// Destination of the artifact.
        path: PathBuf,
        /// Reason for the failure.
        cause: String,
    },

    // =========================================================================
    // Orchestration Errors (E500-E599)
    // =========================================================================
    /// A build task panicked.
    #[error("E501: Build for {target} panicked: {message}")]
    BuildPanic {
        /// The build target, in display form.
        target: String,
        /// Panic description.
        message: String,
    },

    // =========================================================================
    // System Errors (E900-E999)
    // =========================================================================
    /// I/O error.
    #[error("E901: I/O error: {cause}")]
    Io {
        /// Reason for the I/O failure.
        cause: String,
    },
}

impl DllistError {
    /// Get the error code (e.g., "E001").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigValue { .. } => "E001",
            Self::ConfigParse { .. } => "E002",
            Self::Connection { .. } => "E003",
            Self::Source { .. } => "E101",
            Self::TableOrder { .. } => "E102",
            Self::IndexOutOfRange { .. } => "E103",
            Self::Encoding { .. } => "E201",
            Self::HeaderInvariant { .. } => "E202",
            Self::SizeMismatch { .. } => "E203",
            Self::ChecksumMismatch { .. } => "E204",
            Self::Compression { .. } => "E301",
            Self::Decompression { .. } => "E302",
            Self::Storage { .. } => "E401",
            Self::BuildPanic { .. } => "E501",
            Self::Io { .. } => "E901",
        }
    }

    /// Check if this error comes from configuration or connectivity.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigValue { .. } | Self::ConfigParse { .. } | Self::Connection { .. }
        )
    }

    /// Check if this error means a payload failed verification.
    #[must_use]
    pub fn is_verification_error(&self) -> bool {
        matches!(
            self,
            Self::SizeMismatch { .. } | Self::ChecksumMismatch { .. }
        )
    }

    /// Shorthand for an [`DllistError::Encoding`] error.
    pub fn encoding(field: &'static str, cause: impl Into<String>) -> Self {
        Self::Encoding {
            field,
            cause: cause.into(),
        }
    }
}

impl From<std::io::Error> for DllistError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            cause: err.to_string(),
        }
    }
}

/// Result type alias using `DllistError`.
pub type Result<T> = std::result::Result<T, DllistError>;

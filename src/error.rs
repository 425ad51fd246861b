//! Error types for the sourcemap publisher CLI.
//!
//! This module defines the semantic failures that terminate a publish run.
//! Per-file extraction problems are not errors: they are typed skip reasons
//! carried as data in extraction results (see [`crate::extractor`]), so a
//! single bad file can never abort a batch.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during a publish run.
#[derive(Debug, Error)]
pub enum PublisherError {
    /// The package manifest file could not be read.
    #[error("could not load `package.json` at {path}: {reason}")]
    ManifestRead {
        /// Path where the manifest was expected.
        path: Utf8PathBuf,
        /// Description of the underlying read failure.
        reason: String,
    },

    /// The package manifest file was not valid JSON.
    #[error("could not parse `package.json` at {path}: {reason}")]
    ManifestParse {
        /// Path of the unparseable manifest.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// The package manifest parsed but failed structural validation.
    #[error("invalid `package.json` file: {reason}")]
    ManifestInvalid {
        /// Description of the structural problem (e.g. "missing name").
        reason: String,
    },

    /// Failed to prepare or populate the staging directory.
    #[error("staging failed: {reason}")]
    StagingFailed {
        /// Description of the staging failure.
        reason: String,
    },

    /// No eligible source files were found under the publish paths.
    #[error("no files were found to publish")]
    NoSourceFiles,

    /// The registry client invocation failed.
    #[error("npm {operation} failed: {message}")]
    Registry {
        /// The registry operation that failed (publish, etc.).
        operation: &'static str,
        /// Description of the failure, usually the client's stderr.
        message: String,
    },

    /// Failed to write progress or report output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`PublisherError`].
pub type Result<T> = std::result::Result<T, PublisherError>;

//! Staging directory lifecycle and best-effort file copying.
//!
//! The pipeline never mutates the caller's working tree: everything to be
//! published is copied into a staging directory owned exclusively by one
//! run, rewritten there, published from there, and the directory removed on
//! every exit path. Copying is best-effort — entries legitimately absent
//! from the working tree are skipped, not errors.

use crate::error::{PublisherError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace};
use std::fs;
use std::io;

/// Name of the staging directory created under the caller's directory.
pub const STAGING_DIR_NAME: &str = ".sourcemap-publish";

/// Entries always copied into the stage alongside the publish paths:
/// the manifest and the registry configuration files.
pub const FILES_TO_KEEP: &[&str] = &[".npmrc", ".npmignore", "package.json"];

/// A process-owned temporary directory scoped to one pipeline run.
#[derive(Debug)]
pub struct StagingDirectory {
    root: Utf8PathBuf,
}

impl StagingDirectory {
    /// Create a handle for the staging directory under `cwd`.
    ///
    /// Nothing touches the filesystem until [`prepare`](Self::prepare).
    #[must_use]
    pub fn new(cwd: &Utf8Path) -> Self {
        Self {
            root: cwd.join(STAGING_DIR_NAME),
        }
    }

    /// Full path of the staging directory.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Create the staging directory empty.
    ///
    /// Idempotent: any stale directory of the same name is forcibly removed
    /// first, so two consecutive calls both yield an empty directory.
    ///
    /// # Errors
    ///
    /// Returns [`PublisherError::StagingFailed`] when the stale directory
    /// cannot be removed or the new one cannot be created.
    pub fn prepare(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(PublisherError::StagingFailed {
                    reason: format!("failed to remove stale {}: {e}", self.root),
                });
            }
        }

        fs::create_dir_all(&self.root).map_err(|e| PublisherError::StagingFailed {
            reason: format!("failed to create {}: {e}", self.root),
        })
    }

    /// Copy `entries` (paths relative to `source_root`) into the stage,
    /// preserving their relative layout.
    ///
    /// Directories are copied recursively; parent directories are created
    /// as needed; entries missing from `source_root` are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns an error when an entry that exists cannot be copied.
    pub fn copy_relative(&self, entries: &[String], source_root: &Utf8Path) -> Result<()> {
        for entry in entries {
            let source = source_root.join(entry);
            if !source.exists() {
                trace!("nothing to stage at {source}, skipping");
                continue;
            }

            let target = self.root.join(entry);
            copy_recursively(&source, &target)?;
            debug!("staged {entry}");
        }

        Ok(())
    }

    /// Remove the staging directory and everything in it.
    ///
    /// Best-effort and infallible: removal failures are logged and
    /// swallowed so cleanup can run on every exit path, including after an
    /// earlier failure whose error is about to be surfaced.
    pub fn cleanup(&self) {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => debug!("removed staging directory {}", self.root),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => debug!("could not remove staging directory {}: {e}", self.root),
        }
    }
}

fn copy_recursively(source: &Utf8Path, target: &Utf8Path) -> Result<()> {
    if source.is_dir() {
        fs::create_dir_all(target)?;
        for entry in source.read_dir_utf8()? {
            let entry = entry?;
            copy_recursively(entry.path(), &target.join(entry.file_name()))?;
        }
        return Ok(());
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target).map_err(|e| PublisherError::StagingFailed {
        reason: format!("failed to copy {source} to {target}: {e}"),
    })?;

    Ok(())
}

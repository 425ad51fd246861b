//! Manifest transformation for the maps-only publish.
//!
//! The derived package must be installable yet inert: it ships an empty
//! entry module and the map artifacts, nothing else. This module derives
//! that manifest from the staged original — renamed version, rebuilt file
//! list, stripped entry surfaces — and writes both the manifest and the
//! placeholder entry module into the staging directory.

use crate::error::{PublisherError, Result};
use crate::manifest::PackageManifest;
use camino::Utf8Path;
use serde_json::{Map, Value};
use std::fs;

/// Manifest keys that must not exist in the derived manifest.
///
/// These describe executable or module entry surfaces; the placeholder
/// module offers none of them, so they are removed entirely rather than
/// emptied.
pub const STRIPPED_KEYS: &[&str] = &["exports", "bin"];

/// Filename of the no-op entry module written into the staging directory.
pub const STUB_FILENAME: &str = "stub.js";

/// Suffix marking the derived package version.
const VERSION_SUFFIX: &str = "sourcemaps";

/// Derive the maps-only version string from the original.
///
/// A stable version gains a pre-release marker (`1.0.0` becomes
/// `1.0.0-sourcemaps`); a version that is already a pre-release gains a
/// dot-separated identifier instead (`1.0.0-alpha` becomes
/// `1.0.0-alpha.sourcemaps`), keeping the result syntactically valid.
///
/// # Examples
///
/// ```
/// use sourcemap_publisher::transform::derived_version;
///
/// assert_eq!(derived_version("1.0.0"), "1.0.0-sourcemaps");
/// assert_eq!(derived_version("1.0.0-alpha"), "1.0.0-alpha.sourcemaps");
/// ```
#[must_use]
pub fn derived_version(version: &str) -> String {
    let separator = if version.contains('-') { '.' } else { '-' };
    format!("{version}{separator}{VERSION_SUFFIX}")
}

/// Build the derived `files` list: the stub module plus map globs.
///
/// With publish paths, one `<path>/**/*.map` glob is emitted per path
/// (trailing slashes trimmed so `dist/` and `dist` agree); without any,
/// a single catch-all `./**/*.map` covers the stage.
#[must_use]
pub fn derived_files(publish_paths: &[String]) -> Vec<String> {
    let mut files = vec![format!("./{STUB_FILENAME}")];

    if publish_paths.is_empty() {
        files.push("./**/*.map".to_owned());
    } else {
        for path in publish_paths {
            files.push(format!("{}/**/*.map", path.trim_end_matches('/')));
        }
    }

    files
}

/// Derive the maps-only manifest and write it plus the stub module into
/// the staging directory.
///
/// The transformation:
/// - suffixes the version per [`derived_version`],
/// - rebuilds `files` per [`derived_files`],
/// - forces `main` to the stub module,
/// - empties `scripts` so no lifecycle hook can fire during the publish,
/// - removes every key in [`STRIPPED_KEYS`],
/// - passes all other fields through unmodified.
///
/// The transformed manifest is written over `manifest_path` (the staged
/// copy, never the original) as pretty-printed JSON, and an empty
/// `stub.js` is written at the staging root so `main` resolves.
///
/// # Errors
///
/// Returns [`PublisherError::StagingFailed`] when either file cannot be
/// written.
pub fn prepare_manifest(
    stage_root: &Utf8Path,
    manifest_path: &Utf8Path,
    manifest: &PackageManifest,
    publish_paths: &[String],
) -> Result<PackageManifest> {
    let mut extra: Map<String, Value> = manifest
        .extra
        .iter()
        .filter(|(key, _)| !STRIPPED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    extra.insert(
        "main".to_owned(),
        Value::String(format!("./{STUB_FILENAME}")),
    );
    extra.insert("scripts".to_owned(), Value::Object(Map::new()));

    let prepared = PackageManifest {
        name: manifest.name.clone(),
        version: derived_version(&manifest.version),
        files: derived_files(publish_paths),
        extra,
    };

    let serialized =
        serde_json::to_string_pretty(&prepared).map_err(|e| PublisherError::StagingFailed {
            reason: format!("failed to serialize derived manifest: {e}"),
        })?;

    fs::write(manifest_path, serialized).map_err(|e| PublisherError::StagingFailed {
        reason: format!("failed to write {manifest_path}: {e}"),
    })?;

    let stub_path = stage_root.join(STUB_FILENAME);
    fs::write(&stub_path, "").map_err(|e| PublisherError::StagingFailed {
        reason: format!("failed to write {stub_path}: {e}"),
    })?;

    Ok(prepared)
}

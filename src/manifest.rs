//! Package manifest loading and structural validation.
//!
//! The manifest is the `package.json` of the package being published. Only
//! three fields matter to this tool — `name`, `version`, and `files` — but
//! every other field is carried through opaquely so the derived manifest can
//! reproduce them. Validation is wholesale: a manifest missing any required
//! field is rejected outright rather than partially accepted.

use crate::error::{PublisherError, Result};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;

/// A validated package manifest.
///
/// Fields beyond the required triple are preserved verbatim in [`extra`]
/// (`main`, `scripts`, `exports`, and anything else the package declares)
/// and round-trip through serialization untouched unless the transform step
/// rewrites them.
///
/// [`extra`]: PackageManifest::extra
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name as published to the registry.
    pub name: String,
    /// Package version string (semantic-version-shaped, not validated
    /// beyond being a non-empty string field).
    pub version: String,
    /// Glob patterns selecting the files that belong to the package.
    pub files: Vec<String>,
    /// All remaining manifest fields, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Read and validate a package manifest from `path`.
///
/// Load, parse, and shape failures each carry their own cause so the user
/// can tell a missing file from a malformed one from a structurally invalid
/// one.
///
/// # Errors
///
/// Returns [`PublisherError::ManifestRead`] when the file cannot be read,
/// [`PublisherError::ManifestParse`] when it is not valid JSON, and
/// [`PublisherError::ManifestInvalid`] when it is not an object or lacks a
/// string `name`, string `version`, or array `files`.
pub fn read_manifest(path: &Utf8Path) -> Result<PackageManifest> {
    let contents = fs::read_to_string(path).map_err(|e| PublisherError::ManifestRead {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;

    let value: Value =
        serde_json::from_str(&contents).map_err(|e| PublisherError::ManifestParse {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;

    validate_shape(&value)?;

    serde_json::from_value(value).map_err(|e| PublisherError::ManifestInvalid {
        reason: e.to_string(),
    })
}

/// Check the required fields before typed deserialization so each rejection
/// names the offending field.
fn validate_shape(value: &Value) -> Result<()> {
    let Some(object) = value.as_object() else {
        return Err(invalid("not a JSON object"));
    };

    if !object.get("name").is_some_and(Value::is_string) {
        return Err(invalid("missing name"));
    }

    if !object.get("version").is_some_and(Value::is_string) {
        return Err(invalid("missing version"));
    }

    if !object.get("files").is_some_and(Value::is_array) {
        return Err(invalid("missing files list"));
    }

    Ok(())
}

fn invalid(reason: &str) -> PublisherError {
    PublisherError::ManifestInvalid {
        reason: reason.to_owned(),
    }
}

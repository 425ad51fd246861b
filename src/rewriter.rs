//! Sourcemap URL templating and reference rewriting.
//!
//! Once references have been extracted, this module points them at the
//! externally-hosted copies: each source file is re-read, the URL span is
//! spliced with the templated CDN address, and the result written back.
//! Per-file failures are recorded and skipped — a fault in one file must
//! never prevent the remaining files from updating.

use crate::extractor::ExtractedReference;
use crate::manifest::PackageManifest;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// Host serving the externally-published maps.
const EXTERNAL_HOST: &str = "https://unpkg.com";

/// Outcome of a batch rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// Source files whose rewrite failed at write time (unreadable,
    /// unwritable, or changed shape since extraction). Reported, not fatal.
    pub skipped: Vec<Utf8PathBuf>,
}

/// Template the externally-hosted URL for a map path relative to the
/// package root.
///
/// Pure and total: the relative path and the manifest's `name`/`version`
/// are interpolated verbatim, with no escaping.
///
/// # Examples
///
/// ```
/// use sourcemap_publisher::manifest::PackageManifest;
/// use sourcemap_publisher::rewriter::external_sourcemap_url;
///
/// let manifest = PackageManifest {
///     name: "test-package".to_owned(),
///     version: "1.0.0-sourcemaps".to_owned(),
///     files: Vec::new(),
///     extra: serde_json::Map::new(),
/// };
/// assert_eq!(
///     external_sourcemap_url("foo/bar.js.map", &manifest),
///     "https://unpkg.com/test-package@1.0.0-sourcemaps/foo/bar.js.map"
/// );
/// ```
#[must_use]
pub fn external_sourcemap_url(relative_map_path: &str, manifest: &PackageManifest) -> String {
    format!(
        "{EXTERNAL_HOST}/{}@{}/{relative_map_path}",
        manifest.name, manifest.version
    )
}

/// Rewrite every reference in `references` to its external URL.
///
/// Files are processed strictly sequentially. Each file is re-read rather
/// than reusing the content captured at extraction time, since other
/// staging steps may run in between. Any per-file failure appends the
/// source path to the outcome's `skipped` list and processing continues;
/// files not present in `references` are never touched.
#[must_use]
pub fn rewrite_sourcemap_urls(
    root: &Utf8Path,
    references: &[ExtractedReference],
    manifest: &PackageManifest,
) -> RewriteOutcome {
    let mut outcome = RewriteOutcome::default();

    for reference in references {
        let Ok(contents) = fs::read_to_string(&reference.source) else {
            outcome.skipped.push(reference.source.clone());
            continue;
        };

        let relative = relative_to(&reference.map_path, root);
        let url = external_sourcemap_url(&forward_slashed(&relative), manifest);

        // The span was measured against an earlier read; if the file has
        // changed shape since, degrade to a skip instead of corrupting it.
        let (Some(head), Some(tail)) = (
            contents.get(..reference.span.start),
            contents.get(reference.span.end..),
        ) else {
            outcome.skipped.push(reference.source.clone());
            continue;
        };

        let updated = format!("{head}{url}{tail}");

        if fs::write(&reference.source, updated).is_err() {
            outcome.skipped.push(reference.source.clone());
            continue;
        }

        debug!("rewrote sourcemap reference in {}", reference.source);
    }

    outcome
}

/// Express `path` relative to `root`, climbing with `..` segments when the
/// path lies outside it.
fn relative_to(path: &Utf8Path, root: &Utf8Path) -> Utf8PathBuf {
    if let Ok(stripped) = path.strip_prefix(root) {
        return stripped.to_owned();
    }

    let mut ancestor = root.to_owned();
    let mut hops = Utf8PathBuf::new();
    while !ancestor.as_str().is_empty() {
        if let Ok(stripped) = path.strip_prefix(&ancestor) {
            return hops.join(stripped);
        }
        if !ancestor.pop() {
            break;
        }
        hops.push("..");
    }

    path.to_owned()
}

/// Render a path with forward-slash separators regardless of platform.
fn forward_slashed(path: &Utf8Path) -> String {
    path.as_str().replace('\\', "/")
}

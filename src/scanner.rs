//! Discovery of compiled source files eligible for reference rewriting.
//!
//! Walks the staged publish paths and collects every file that may carry a
//! sourcemap reference: anything ending in `.js`, or in `.ts` so long as it
//! is not a `.d.ts` declaration file. Paths that do not exist are tolerated
//! silently — staging is best-effort and a path legitimately absent from
//! the working tree simply contributes nothing.

use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use std::io;

/// Check whether a filename is an eligible compiled source.
///
/// Declaration files (`.d.ts`) are always excluded.
///
/// # Examples
///
/// ```
/// use sourcemap_publisher::scanner::is_eligible_source;
///
/// assert!(is_eligible_source("main.js"));
/// assert!(is_eligible_source("util.ts"));
/// assert!(!is_eligible_source("types.d.ts"));
/// assert!(!is_eligible_source("main.js.map"));
/// ```
#[must_use]
pub fn is_eligible_source(filename: &str) -> bool {
    if filename.ends_with(".d.ts") {
        return false;
    }
    filename.ends_with(".js") || filename.ends_with(".ts")
}

/// Collect every eligible source file under `paths`, recursively.
///
/// A path that is itself an eligible file is included directly. Missing
/// paths are skipped. Results are sorted for deterministic processing
/// order.
///
/// # Errors
///
/// Returns an error if a directory that exists cannot be read.
pub fn collect_source_files(paths: &[Utf8PathBuf]) -> io::Result<Vec<Utf8PathBuf>> {
    let mut sources = Vec::new();

    for path in paths {
        if !path.exists() {
            trace!("publish path {path} does not exist, skipping");
            continue;
        }

        if path.is_dir() {
            collect_from_dir(path, &mut sources)?;
        } else if path.file_name().is_some_and(is_eligible_source) {
            sources.push(path.clone());
        }
    }

    sources.sort();
    Ok(sources)
}

fn collect_from_dir(dir: &Utf8Path, sources: &mut Vec<Utf8PathBuf>) -> io::Result<()> {
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_from_dir(path, sources)?;
        } else if is_eligible_source(entry.file_name()) {
            sources.push(path.to_owned());
        }
    }

    Ok(())
}

//! Output formatting for the publisher CLI.
//!
//! The core pipeline returns structured outcomes; this module renders them.
//! Keeping every user-facing string here keeps extraction and rewriting
//! pure and lets tests assert on messages without exercising I/O.

use crate::extractor::SkippedSource;
use camino::Utf8Path;
use std::io::Write;

/// Banner printed when a publish run starts.
#[must_use]
pub fn intro_message() -> &'static str {
    "Publishing sourcemaps..."
}

/// Closing message for a completed run.
#[must_use]
pub fn outro_message(dry_run: bool) -> String {
    let suffix = if dry_run { " (dry run)" } else { "" };
    format!("Published sourcemaps successfully!{suffix}")
}

/// Summary line reporting how many references were updated and skipped.
#[must_use]
pub fn update_summary(updated: usize, skipped: usize, dry_run: bool) -> String {
    let suffix = if dry_run { " (dry run)" } else { "" };
    format!("Updated {updated} sourcemap URLs, skipped {skipped} files{suffix}")
}

/// Warning line for a file whose extraction produced no rewritable
/// reference.
#[must_use]
pub fn extraction_skip_message(skip: &SkippedSource) -> String {
    format!("Skipped {} ({})", skip.source, skip.reason)
}

/// Warning line for a file that failed at rewrite time.
#[must_use]
pub fn rewrite_skip_message(source: &Utf8Path) -> String {
    format!("Skipped {source} (could not load file or sourcemap)")
}

/// Echo line naming the registry command about to run.
#[must_use]
pub fn registry_command_message(args: &[&str]) -> String {
    format!("Running npm {}", args.join(" "))
}

/// Write one line to the given writer, swallowing write failures.
///
/// Progress output is best-effort; a broken stderr must not fail the run.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

//! Sourcemap reference extraction from compiled source files.
//!
//! A compiled file advertises its debug map with a trailing comment of the
//! form `//# sourceMappingURL=<url>`. This module locates that comment on
//! the last non-blank line of a file, validates that the URL is a relative
//! path to an existing map, and reports the exact byte span of the URL text
//! so the rewriter can splice in a replacement without disturbing any other
//! byte of the file.
//!
//! Extraction never fails with an error: every file yields either a
//! rewritable [`ExtractedReference`] or a [`SkippedSource`] carrying one of
//! the closed [`SkipReason`] codes. Callers decide how to present skips.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::fs;
use std::ops::Range;

/// The literal comment marker that introduces a sourcemap reference.
pub const SOURCE_MAP_MARKER: &str = "//# sourceMappingURL=";

/// Why a source file did not produce a rewritable reference.
///
/// This is a closed set carried as data, not an error type: extraction
/// degrades to a skip-and-report outcome per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The source file could not be read.
    CouldNotLoadSource,
    /// The last non-blank line carries no sourcemap reference.
    NoSourcemapFound,
    /// The reference is a path-absolute or protocol-qualified URL.
    AbsoluteOrExternalUrl,
    /// The reference is an inline `data:` URL.
    DataUrl,
    /// The referenced map file does not exist next to the source.
    SourcemapNotFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::CouldNotLoadSource => "could not load source file",
            Self::NoSourcemapFound => "no sourcemap found",
            Self::AbsoluteOrExternalUrl => "absolute and external URLs not supported",
            Self::DataUrl => "data URLs not supported",
            Self::SourcemapNotFound => "sourcemap not found",
        };
        write!(f, "{text}")
    }
}

/// A rewritable sourcemap reference found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedReference {
    /// The source file owning the reference.
    pub source: Utf8PathBuf,
    /// Resolved path of the map file the reference points at.
    pub map_path: Utf8PathBuf,
    /// Half-open byte range of the URL text within the file's original
    /// content. Replacing exactly this range leaves every other byte of the
    /// file untouched, including the newline structure around the comment.
    pub span: Range<usize>,
}

/// A source file that produced no rewritable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    /// The source file that was skipped.
    pub source: Utf8PathBuf,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Outcome of extracting one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A rewritable reference was found.
    Reference(ExtractedReference),
    /// The file was skipped for a typed reason.
    Skipped(SkippedSource),
}

/// Locate and validate the sourcemap reference in `source`.
///
/// The reference is honored only in trailing-comment position: the content
/// is trimmed of trailing whitespace and the final line of the trimmed text
/// is matched against [`SOURCE_MAP_MARKER`]. A `sourceMappingURL` comment
/// anywhere else in the file is deliberately ignored. Because only trailing
/// whitespace is trimmed, offsets computed in the trimmed text are valid
/// offsets in the original content, so the reported span needs no further
/// translation.
#[must_use]
pub fn extract(source: &Utf8Path) -> Extraction {
    let Ok(contents) = fs::read_to_string(source) else {
        return skipped(source, SkipReason::CouldNotLoadSource);
    };

    let trimmed = contents.trim_end();
    let line_start = trimmed.rfind('\n').map_or(0, |pos| pos + 1);
    let last_line = &trimmed[line_start..];

    let Some(url) = last_line.strip_prefix(SOURCE_MAP_MARKER) else {
        return skipped(source, SkipReason::NoSourcemapFound);
    };

    if url.is_empty() {
        return skipped(source, SkipReason::NoSourcemapFound);
    }

    if url.starts_with('/') || has_url_scheme(url) {
        return skipped(source, SkipReason::AbsoluteOrExternalUrl);
    }

    if url.starts_with("data:") {
        return skipped(source, SkipReason::DataUrl);
    }

    let source_dir = source.parent().unwrap_or(Utf8Path::new(""));
    let map_path = resolve_relative(source_dir, url);

    if !map_path.exists() {
        return skipped(source, SkipReason::SourcemapNotFound);
    }

    let url_start = line_start + SOURCE_MAP_MARKER.len();
    Extraction::Reference(ExtractedReference {
        source: source.to_owned(),
        map_path,
        span: url_start..url_start + url.len(),
    })
}

/// Extract every file in `sources`, one at a time, preserving order.
///
/// Processing is strictly sequential so file contents are never retained
/// across files and a single unreadable file affects only its own slot.
#[must_use]
pub fn extract_all(sources: &[Utf8PathBuf]) -> Vec<Extraction> {
    sources.iter().map(|source| extract(source)).collect()
}

fn skipped(source: &Utf8Path, reason: SkipReason) -> Extraction {
    Extraction::Skipped(SkippedSource {
        source: source.to_owned(),
        reason,
    })
}

/// True when the URL opens with a `scheme://` prefix.
///
/// The scheme grammar matches one or more ASCII alphanumeric or underscore
/// characters, so `https://...` and `webpack://...` qualify while a
/// relative path containing `://` later on does not.
fn has_url_scheme(url: &str) -> bool {
    url.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Join `url` onto `dir` with lexical `.`/`..` normalisation.
///
/// Mirrors the path join the reference comment was authored against: the
/// URL uses forward slashes and may climb out of the source's directory.
fn resolve_relative(dir: &Utf8Path, url: &str) -> Utf8PathBuf {
    let mut resolved = dir.to_owned();
    for segment in url.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if !resolved.pop() {
                    resolved.push("..");
                }
            }
            other => resolved.push(other),
        }
    }
    resolved
}

//! Staged-publish pipeline orchestration.
//!
//! This module wires the staging, manifest, extraction, rewrite, and
//! registry steps into one run: stage the publishable files into an
//! isolated directory, derive the maps-only manifest, rewrite the staged
//! sourcemap references to their external URLs, and hand the directory to
//! the registry client. The caller's working tree is never mutated, and
//! the staging directory is removed on every exit path — success, early
//! return, or error — before control returns to the caller.

use crate::error::{PublisherError, Result};
use crate::extractor::{Extraction, ExtractedReference, extract_all};
use crate::manifest::read_manifest;
use crate::npm::{CommandExecutor, PublishOptions, publish_args, run_registry_publish};
use crate::output::{
    extraction_skip_message, registry_command_message, rewrite_skip_message, update_summary,
    write_stderr_line,
};
use crate::rewriter::rewrite_sourcemap_urls;
use crate::scanner::collect_source_files;
use crate::stager::{FILES_TO_KEEP, StagingDirectory};
use crate::transform::prepare_manifest;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::io::Write;

/// Context for one publish pipeline run.
#[derive(Debug)]
pub struct PipelineContext<'a> {
    /// The package directory being published from.
    pub cwd: &'a Utf8Path,
    /// Publish paths relative to `cwd` (e.g. `dist/`).
    pub paths: &'a [String],
    /// Skip file mutation and ask the registry client to simulate.
    pub dry_run: bool,
    /// Enable provenance attestation on the publish.
    pub provenance: bool,
    /// Suppress progress output.
    pub quiet: bool,
}

/// Statistics reported by a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishSummary {
    /// Number of sourcemap references rewritten (or, in a dry run, that
    /// would have been rewritten).
    pub updated: usize,
    /// Number of files skipped at rewrite time.
    pub skipped: usize,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

/// Run the full staged-publish pipeline.
///
/// Whatever happens inside the staged body, the staging directory is
/// removed before this function returns; cleanup relies on normal
/// control flow only, so it holds for every success and error path but
/// not for process-level termination.
///
/// # Errors
///
/// Returns an error when staging fails, the manifest is missing or
/// invalid, no eligible source files exist under the publish paths, or
/// the registry client fails. Per-file extraction and rewrite problems
/// degrade to reported skips instead.
pub fn run_publish(
    context: &PipelineContext<'_>,
    executor: &dyn CommandExecutor,
    stderr: &mut dyn Write,
) -> Result<PublishSummary> {
    let stage = StagingDirectory::new(context.cwd);

    let result = stage
        .prepare()
        .and_then(|()| publish_staged(context, &stage, executor, stderr));

    stage.cleanup();
    result
}

/// Body of the run, executed between staging setup and teardown.
fn publish_staged(
    context: &PipelineContext<'_>,
    stage: &StagingDirectory,
    executor: &dyn CommandExecutor,
    stderr: &mut dyn Write,
) -> Result<PublishSummary> {
    let mut entries: Vec<String> = FILES_TO_KEEP.iter().map(|&f| f.to_owned()).collect();
    entries.extend(context.paths.iter().cloned());
    stage.copy_relative(&entries, context.cwd)?;

    let manifest_path = stage.root().join("package.json");
    let manifest = read_manifest(&manifest_path)?;

    let staged_paths: Vec<Utf8PathBuf> = context
        .paths
        .iter()
        .map(|path| stage.root().join(path))
        .collect();
    let sources = collect_source_files(&staged_paths)?;
    debug!("found {} eligible source file(s)", sources.len());

    if sources.is_empty() {
        return Err(PublisherError::NoSourceFiles);
    }

    let prepared = prepare_manifest(stage.root(), &manifest_path, &manifest, context.paths)?;

    let mut references: Vec<ExtractedReference> = Vec::new();
    for extraction in extract_all(&sources) {
        match extraction {
            Extraction::Reference(reference) => references.push(reference),
            Extraction::Skipped(skip) => {
                if !context.quiet {
                    write_stderr_line(stderr, extraction_skip_message(&skip));
                }
            }
        }
    }

    let summary = if context.dry_run {
        PublishSummary {
            updated: references.len(),
            skipped: 0,
            dry_run: true,
        }
    } else {
        let outcome = rewrite_sourcemap_urls(stage.root(), &references, &prepared);
        if !context.quiet {
            for source in &outcome.skipped {
                write_stderr_line(stderr, rewrite_skip_message(source));
            }
        }
        PublishSummary {
            updated: references.len() - outcome.skipped.len(),
            skipped: outcome.skipped.len(),
            dry_run: false,
        }
    };

    if !context.quiet {
        write_stderr_line(
            stderr,
            update_summary(summary.updated, summary.skipped, summary.dry_run),
        );
    }

    let options = PublishOptions {
        dry_run: context.dry_run,
        provenance: context.provenance,
    };

    if !context.quiet {
        write_stderr_line(stderr, registry_command_message(&publish_args(&options)));
    }

    let output = run_registry_publish(executor, stage.root(), &options)?;

    if !context.quiet {
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            write_stderr_line(stderr, line);
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

//! CLI argument definitions for the sourcemap publisher.
//!
//! This module defines the command-line interface using clap. It is
//! separated from the main entrypoint to keep the binary small and focused
//! on orchestration.

use clap::{Parser, Subcommand};

/// Default publish path used when no positionals are given.
pub const DEFAULT_PUBLISH_PATH: &str = "dist/";

/// Publish a package's sourcemaps externally.
#[derive(Parser, Debug)]
#[command(name = "sourcemap-publisher")]
#[command(version, about)]
#[command(long_about = concat!(
    "Publishes a package's sourcemaps externally.\n\n",
    "Production consumers should not have to download debug maps with every ",
    "install. This tool republishes the maps as a separate package under a ",
    "derived version (1.2.3 becomes 1.2.3-sourcemaps) and rewrites the ",
    "trailing sourceMappingURL comments in the published files to point at ",
    "the externally-hosted copies, so debugging tools can still resolve ",
    "them.\n\n",
    "All work happens in an isolated staging directory; the files in your ",
    "working tree are never modified.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Publish sourcemaps for the dist/ directory:\n",
    "    $ sourcemap-publisher publish\n\n",
    "  Publish sourcemaps for specific paths:\n",
    "    $ sourcemap-publisher publish lib/ dist/\n\n",
    "  Preview without publishing:\n",
    "    $ sourcemap-publisher publish --dry-run\n\n",
    "  Publish with provenance attestation:\n",
    "    $ sourcemap-publisher publish --provenance\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Publish sourcemaps externally.
    Publish(PublishArgs),
}

/// Arguments for the publish command.
#[derive(Parser, Debug, Clone)]
pub struct PublishArgs {
    /// Paths to scan for compiled sources [default: dist/].
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Dry run, do not publish.
    #[arg(long)]
    pub dry_run: bool,

    /// Enable provenance when publishing to npm.
    #[arg(long)]
    pub provenance: bool,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

impl PublishArgs {
    /// Return the effective publish paths, falling back to the default
    /// when none were given.
    ///
    /// # Examples
    ///
    /// ```
    /// use sourcemap_publisher::cli::PublishArgs;
    ///
    /// let args = PublishArgs::default();
    /// assert_eq!(args.publish_paths(), vec!["dist/".to_owned()]);
    /// ```
    #[must_use]
    pub fn publish_paths(&self) -> Vec<String> {
        if self.paths.is_empty() {
            vec![DEFAULT_PUBLISH_PATH.to_owned()]
        } else {
            self.paths.clone()
        }
    }
}

impl Default for PublishArgs {
    /// Creates a `PublishArgs` instance with all flags disabled and no
    /// paths selected.
    ///
    /// This is useful for testing or programmatic construction where only
    /// specific fields need to be set.
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            dry_run: false,
            provenance: false,
            quiet: false,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

//! Sourcemap publisher CLI entrypoint.
//!
//! This binary stages a built package into an isolated directory, rewrites
//! its trailing sourcemap references to externally-hosted URLs, and invokes
//! the registry client to publish the maps-only artifact.

use camino::Utf8PathBuf;
use clap::Parser;
use sourcemap_publisher::cli::{Cli, Command, PublishArgs};
use sourcemap_publisher::error::{PublisherError, Result};
use sourcemap_publisher::npm::{CommandExecutor, SystemCommandExecutor};
use sourcemap_publisher::output::{intro_message, outro_message, write_stderr_line};
use sourcemap_publisher::pipeline::{PipelineContext, run_publish};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let exit_code = match cli.command {
        Some(Command::Publish(args)) => {
            let run_result = run(&args, &SystemCommandExecutor, &mut stderr);
            exit_code_for_run_result(run_result, &mut stderr)
        }
        None => {
            write_stderr_line(
                &mut stderr,
                "No command specified. See --help for available commands.",
            );
            0
        }
    };
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(args: &PublishArgs, executor: &dyn CommandExecutor, stderr: &mut dyn Write) -> Result<()> {
    let cwd = current_dir_utf8()?;
    let paths = args.publish_paths();

    let context = PipelineContext {
        cwd: &cwd,
        paths: &paths,
        dry_run: args.dry_run,
        provenance: args.provenance,
        quiet: args.quiet,
    };

    if !args.quiet {
        write_stderr_line(stderr, intro_message());
    }

    let summary = run_publish(&context, executor, stderr)?;

    if !args.quiet {
        write_stderr_line(stderr, outro_message(summary.dry_run));
    }

    Ok(())
}

/// Resolve the current directory as a UTF-8 path.
fn current_dir_utf8() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| PublisherError::StagingFailed {
        reason: format!("current directory is not valid UTF-8: {e}"),
    })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

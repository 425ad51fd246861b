//! Registry client invocation for the staged publish.
//!
//! The actual network publish is delegated to the `npm` executable, invoked
//! as an opaque subprocess with its working directory set to the staging
//! directory. Invocations go through the [`CommandExecutor`] seam so tests
//! can substitute a stub; the system implementation guards against hangs
//! with a hard timeout.

use crate::error::{PublisherError, Result};
use camino::Utf8Path;
use std::process::{Command, Output, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Hard timeout for registry invocations (10 minutes).
const PUBLISH_TIMEOUT: Duration = Duration::from_secs(600);

/// Abstraction for running external commands in a working directory.
pub trait CommandExecutor {
    /// Runs a command with arguments in `cwd` and returns the captured
    /// output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the
    /// command.
    fn run(&self, cmd: &str, args: &[&str], cwd: &Utf8Path) -> Result<Output>;
}

/// Executes commands on the host system with a timeout guard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str], cwd: &Utf8Path) -> Result<Output> {
        let mut command = Command::new(cmd);
        command
            .args(args)
            .current_dir(cwd.as_std_path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn()?;

        match child.wait_timeout(PUBLISH_TIMEOUT)? {
            Some(status) => {
                let stdout = child
                    .stdout
                    .take()
                    .map(std::io::read_to_string)
                    .transpose()?
                    .unwrap_or_default();
                let stderr = child
                    .stderr
                    .take()
                    .map(std::io::read_to_string)
                    .transpose()?
                    .unwrap_or_default();

                Ok(Output {
                    status,
                    stdout: stdout.into_bytes(),
                    stderr: stderr.into_bytes(),
                })
            }
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(PublisherError::Registry {
                    operation: "publish",
                    message: format!(
                        "operation timed out after {} seconds",
                        PUBLISH_TIMEOUT.as_secs()
                    ),
                })
            }
        }
    }
}

/// Flags controlling a registry publish invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Ask the registry client to simulate the publish without uploading.
    pub dry_run: bool,
    /// Enable provenance attestation on the publish.
    pub provenance: bool,
}

/// Build the argument list for a publish invocation.
///
/// # Examples
///
/// ```
/// use sourcemap_publisher::npm::{PublishOptions, publish_args};
///
/// let args = publish_args(&PublishOptions { dry_run: true, provenance: false });
/// assert_eq!(args, vec!["publish", "--tag=sourcemaps", "--dry-run"]);
/// ```
#[must_use]
pub fn publish_args(options: &PublishOptions) -> Vec<&'static str> {
    let mut args = vec!["publish", "--tag=sourcemaps"];

    if options.dry_run {
        args.push("--dry-run");
    }

    if options.provenance {
        args.push("--provenance");
    }

    args
}

/// Invoke the registry client against the staging directory.
///
/// Returns the captured output on success so the caller can present the
/// client's own report.
///
/// # Errors
///
/// Returns [`PublisherError::Registry`] when the client exits non-zero
/// (carrying its trimmed stderr), or the executor's error when the process
/// cannot be run at all.
pub fn run_registry_publish(
    executor: &dyn CommandExecutor,
    staging_dir: &Utf8Path,
    options: &PublishOptions,
) -> Result<Output> {
    let args = publish_args(options);
    let output = executor.run("npm", &args, staging_dir)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PublisherError::Registry {
            operation: "publish",
            message: stderr.trim().to_owned(),
        });
    }

    Ok(output)
}

//! End-to-end tests for the staged-publish pipeline.
//!
//! These run the whole pipeline against a real temporary project tree,
//! substituting only the registry client. The snapshot executor inspects
//! the staging directory at publish time, which is the only window in
//! which staged state is observable — cleanup removes it before
//! `run_publish` returns.

use super::*;
use crate::test_utils::{failure_output, success_output, success_output_with};
use camino::Utf8PathBuf;
use std::cell::RefCell;
use std::fs;
use std::process::Output;
use tempfile::TempDir;

const FOO_JS: &str = "const answer = 42;\n//# sourceMappingURL=foo.js.map\n";

struct ProjectFixture {
    _temp: TempDir,
    cwd: Utf8PathBuf,
}

impl ProjectFixture {
    fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let cwd = Utf8PathBuf::try_from(temp.path().to_owned()).expect("non-UTF8 temp path");

        let fixture = Self { _temp: temp, cwd };
        fixture.write(
            "package.json",
            r#"{"name":"test-package","version":"1.0.0","files":["dist"]}"#,
        );
        fixture.write("dist/foo.js", FOO_JS);
        fixture.write("dist/foo.js.map", "{}");
        fixture
    }

    fn write(&self, name: &str, contents: &str) {
        let path = self.cwd.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dirs");
        }
        fs::write(&path, contents).expect("failed to write file");
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.cwd.join(name)).expect("failed to read file")
    }

    fn staging_root(&self) -> Utf8PathBuf {
        self.cwd.join(crate::stager::STAGING_DIR_NAME)
    }
}

/// Snapshot of the staging directory taken when the registry client runs.
#[derive(Debug, Default, Clone)]
struct StageSnapshot {
    args: Vec<String>,
    cwd: Utf8PathBuf,
    staged_foo: Option<String>,
    staged_manifest: Option<String>,
    stub_exists: bool,
}

/// Registry stub that captures staged state at invocation time.
struct SnapshotExecutor {
    result: RefCell<Option<Result<Output>>>,
    snapshot: RefCell<Option<StageSnapshot>>,
}

impl SnapshotExecutor {
    fn new(result: Result<Output>) -> Self {
        Self {
            result: RefCell::new(Some(result)),
            snapshot: RefCell::new(None),
        }
    }

    fn snapshot(&self) -> StageSnapshot {
        self.snapshot
            .borrow()
            .clone()
            .expect("registry client was never invoked")
    }

    fn was_invoked(&self) -> bool {
        self.snapshot.borrow().is_some()
    }
}

impl CommandExecutor for SnapshotExecutor {
    fn run(&self, cmd: &str, args: &[&str], cwd: &Utf8Path) -> Result<Output> {
        assert_eq!(cmd, "npm");
        *self.snapshot.borrow_mut() = Some(StageSnapshot {
            args: args.iter().map(|&a| a.to_owned()).collect(),
            cwd: cwd.to_owned(),
            staged_foo: fs::read_to_string(cwd.join("dist/foo.js")).ok(),
            staged_manifest: fs::read_to_string(cwd.join("package.json")).ok(),
            stub_exists: cwd.join("stub.js").is_file(),
        });
        self.result
            .borrow_mut()
            .take()
            .expect("registry client invoked more than once")
    }
}

fn dist_paths() -> Vec<String> {
    vec!["dist/".to_owned()]
}

fn context<'a>(fixture: &'a ProjectFixture, paths: &'a [String]) -> PipelineContext<'a> {
    PipelineContext {
        cwd: &fixture.cwd,
        paths,
        dry_run: false,
        provenance: false,
        quiet: false,
    }
}

#[test]
fn rewrites_staged_sources_and_publishes_from_the_stage() {
    let fixture = ProjectFixture::new();
    let paths = dist_paths();
    let executor = SnapshotExecutor::new(Ok(success_output()));
    let mut stderr = Vec::new();

    let summary = run_publish(&context(&fixture, &paths), &executor, &mut stderr)
        .expect("publish should succeed");

    assert_eq!(
        summary,
        PublishSummary {
            updated: 1,
            skipped: 0,
            dry_run: false,
        }
    );

    let snapshot = executor.snapshot();
    assert_eq!(snapshot.cwd, fixture.staging_root());
    assert_eq!(snapshot.args, vec!["publish", "--tag=sourcemaps"]);
    assert_eq!(
        snapshot.staged_foo.as_deref(),
        Some(concat!(
            "const answer = 42;\n",
            "//# sourceMappingURL=",
            "https://unpkg.com/test-package@1.0.0-sourcemaps/dist/foo.js.map\n",
        ))
    );
    assert!(snapshot.stub_exists, "stub.js must exist in the stage");

    let manifest: serde_json::Value = serde_json::from_str(
        snapshot
            .staged_manifest
            .as_deref()
            .expect("staged manifest should exist"),
    )
    .expect("staged manifest should be valid JSON");
    assert_eq!(manifest["version"], "1.0.0-sourcemaps");
    assert_eq!(manifest["main"], "./stub.js");
}

#[test]
fn original_files_are_byte_identical_after_a_run() {
    let fixture = ProjectFixture::new();
    let paths = dist_paths();
    let executor = SnapshotExecutor::new(Ok(success_output()));
    let mut stderr = Vec::new();

    run_publish(&context(&fixture, &paths), &executor, &mut stderr)
        .expect("publish should succeed");

    assert_eq!(fixture.read("dist/foo.js"), FOO_JS);
    assert_eq!(fixture.read("dist/foo.js.map"), "{}");
    assert_eq!(
        fixture.read("package.json"),
        r#"{"name":"test-package","version":"1.0.0","files":["dist"]}"#
    );
}

#[test]
fn staging_directory_is_removed_after_success() {
    let fixture = ProjectFixture::new();
    let paths = dist_paths();
    let executor = SnapshotExecutor::new(Ok(success_output()));
    let mut stderr = Vec::new();

    run_publish(&context(&fixture, &paths), &executor, &mut stderr)
        .expect("publish should succeed");

    assert!(!fixture.staging_root().exists());
}

#[test]
fn dry_run_skips_mutation_but_still_invokes_the_client() {
    let fixture = ProjectFixture::new();
    let paths = dist_paths();
    let executor = SnapshotExecutor::new(Ok(success_output()));
    let mut stderr = Vec::new();

    let mut ctx = context(&fixture, &paths);
    ctx.dry_run = true;

    let summary = run_publish(&ctx, &executor, &mut stderr).expect("dry run should succeed");

    assert_eq!(
        summary,
        PublishSummary {
            updated: 1,
            skipped: 0,
            dry_run: true,
        }
    );

    let snapshot = executor.snapshot();
    assert_eq!(
        snapshot.args,
        vec!["publish", "--tag=sourcemaps", "--dry-run"]
    );
    assert_eq!(
        snapshot.staged_foo.as_deref(),
        Some(FOO_JS),
        "dry run must not mutate staged sources"
    );
}

#[test]
fn provenance_flag_reaches_the_client() {
    let fixture = ProjectFixture::new();
    let paths = dist_paths();
    let executor = SnapshotExecutor::new(Ok(success_output()));
    let mut stderr = Vec::new();

    let mut ctx = context(&fixture, &paths);
    ctx.provenance = true;

    run_publish(&ctx, &executor, &mut stderr).expect("publish should succeed");

    assert_eq!(
        executor.snapshot().args,
        vec!["publish", "--tag=sourcemaps", "--provenance"]
    );
}

#[test]
fn publish_failure_surfaces_and_the_stage_is_still_removed() {
    let fixture = ProjectFixture::new();
    let paths = dist_paths();
    let executor = SnapshotExecutor::new(Ok(failure_output("npm ERR! 403\n")));
    let mut stderr = Vec::new();

    let err = run_publish(&context(&fixture, &paths), &executor, &mut stderr)
        .expect_err("publish should fail");

    assert!(matches!(err, PublisherError::Registry { .. }));
    assert!(!fixture.staging_root().exists());
    assert_eq!(fixture.read("dist/foo.js"), FOO_JS);
}

#[test]
fn invalid_manifest_terminates_before_any_client_invocation() {
    let fixture = ProjectFixture::new();
    fixture.write("package.json", r#"{"name":"test-package","files":[]}"#);
    let paths = dist_paths();
    let executor = SnapshotExecutor::new(Ok(success_output()));
    let mut stderr = Vec::new();

    let err = run_publish(&context(&fixture, &paths), &executor, &mut stderr)
        .expect_err("publish should fail");

    assert!(matches!(err, PublisherError::ManifestInvalid { .. }));
    assert!(!executor.was_invoked(), "client must not run without a manifest");
    assert!(!fixture.staging_root().exists());
}

#[test]
fn empty_publish_paths_are_a_surfaced_failure() {
    let fixture = ProjectFixture::new();
    let paths = vec!["empty/".to_owned()];
    let executor = SnapshotExecutor::new(Ok(success_output()));
    let mut stderr = Vec::new();

    let err = run_publish(&context(&fixture, &paths), &executor, &mut stderr)
        .expect_err("publish should fail");

    assert!(matches!(err, PublisherError::NoSourceFiles));
    assert!(!executor.was_invoked());
    assert!(!fixture.staging_root().exists());
}

#[test]
fn extraction_failures_are_reported_without_aborting() {
    let fixture = ProjectFixture::new();
    fixture.write("dist/plain.js", "// nothing to see here\n");
    let paths = dist_paths();
    let executor = SnapshotExecutor::new(Ok(success_output()));
    let mut stderr = Vec::new();

    let summary = run_publish(&context(&fixture, &paths), &executor, &mut stderr)
        .expect("publish should succeed");

    assert_eq!(summary.updated, 1);

    let output = String::from_utf8_lossy(&stderr);
    assert!(output.contains("Skipped"), "expected a skip warning: {output}");
    assert!(output.contains("no sourcemap found"));
    assert!(output.contains("Updated 1 sourcemap URLs, skipped 0 files"));
}

#[test]
fn client_output_is_streamed_to_the_progress_writer() {
    let fixture = ProjectFixture::new();
    let paths = dist_paths();
    let executor =
        SnapshotExecutor::new(Ok(success_output_with("+ test-package@1.0.0-sourcemaps\n")));
    let mut stderr = Vec::new();

    run_publish(&context(&fixture, &paths), &executor, &mut stderr)
        .expect("publish should succeed");

    let output = String::from_utf8_lossy(&stderr);
    assert!(output.contains("Running npm publish --tag=sourcemaps"));
    assert!(output.contains("+ test-package@1.0.0-sourcemaps"));
}

#[test]
fn quiet_mode_suppresses_progress_output() {
    let fixture = ProjectFixture::new();
    fixture.write("dist/plain.js", "// no reference\n");
    let paths = dist_paths();
    let executor = SnapshotExecutor::new(Ok(success_output_with("+ published\n")));
    let mut stderr = Vec::new();

    let mut ctx = context(&fixture, &paths);
    ctx.quiet = true;

    run_publish(&ctx, &executor, &mut stderr).expect("publish should succeed");

    assert!(stderr.is_empty(), "expected no output in quiet mode");
}

//! Running `bazel build` and capturing its build event file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::error::BazelError;

/// Invokes the build tool inside a workspace.
#[derive(Debug, Clone)]
pub struct BazelClient {
    program: PathBuf,
    workspace: PathBuf,
    bazelrc: Option<PathBuf>,
    forward_stderr: bool,
}

impl BazelClient {
    /// Creates a client running `program` with `workspace` as working directory.
    pub fn new(program: impl Into<PathBuf>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workspace: workspace.into(),
            bazelrc: None,
            forward_stderr: false,
        }
    }

    /// Creates a client for the first `bazel` found on `PATH`.
    pub fn locate(workspace: impl Into<PathBuf>) -> Result<Self, BazelError> {
        let program = which::which("bazel")?;
        Ok(Self::new(program, workspace))
    }

    /// Passes `--bazelrc=<file>` as a startup option when set.
    pub fn with_bazelrc(mut self, bazelrc: Option<PathBuf>) -> Self {
        self.bazelrc = bazelrc;
        self
    }

    /// Forwards the build tool's stderr to ours instead of discarding it.
    pub fn with_stderr(mut self, forward: bool) -> Self {
        self.forward_stderr = forward;
        self
    }

    /// The executable this client runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for a build of `expression` that writes its events to
    /// `event_file` and requests `output_group`.
    ///
    /// Startup options precede the `build` verb.
    pub fn build_args(
        &self,
        event_file: &Path,
        expression: &str,
        output_group: &str,
    ) -> Vec<OsString> {
        let mut args = Vec::with_capacity(5);
        if let Some(rc) = &self.bazelrc {
            let mut arg = OsString::from("--bazelrc=");
            arg.push(rc);
            args.push(arg);
        }
        args.push(OsString::from("build"));

        let mut events_arg = OsString::from("--build_event_json_file=");
        events_arg.push(event_file);
        args.push(events_arg);

        args.push(OsString::from(expression));
        args.push(OsString::from(format!("--output_groups={output_group}")));
        args
    }

    /// Runs the build tool with `args` and returns its stdout.
    ///
    /// The child is killed if the returned future is dropped before it exits.
    pub async fn run(&self, args: &[OsString]) -> Result<Vec<u8>, BazelError> {
        let stderr = if self.forward_stderr {
            Stdio::inherit()
        } else {
            Stdio::null()
        };

        tracing::debug!(program = %self.program.display(), ?args, "running build tool");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BazelError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(BazelError::Failed {
                command: render_args(args),
                status: output.status,
            });
        }
        Ok(output.stdout)
    }

    /// Builds `expression` and returns the temporary file holding its build
    /// events.
    ///
    /// The file is removed when the returned handle is dropped.
    pub async fn build_events(
        &self,
        expression: &str,
        output_group: &str,
    ) -> Result<NamedTempFile, BazelError> {
        let event_file = NamedTempFile::new().map_err(BazelError::TempFile)?;
        let args = self.build_args(event_file.path(), expression, output_group);

        tracing::info!(expression, output_group, "building targets");
        self.run(&args).await?;
        Ok(event_file)
    }
}

fn render_args(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

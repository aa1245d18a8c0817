//! Workspace discovery and configuration shared by the subcommands.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use snap_config::{load_config_file, load_config_or_default, validate_config, SnapshotsConfig};
use snap_storage::SnapshotStore;
use tracing::debug;

use crate::GlobalArgs;

/// Environment variable set by `bazel run` to the workspace root.
pub const WORKSPACE_ENV: &str = "BUILD_WORKSPACE_DIRECTORY";

/// The resolved workspace and its effective configuration.
#[derive(Debug)]
pub struct Context {
    /// Workspace root directory.
    pub workspace: PathBuf,
    /// Configuration file values with global flag overrides applied.
    pub config: SnapshotsConfig,
}

impl Context {
    /// Resolves the workspace and loads its configuration.
    pub fn load(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let workspace = pick_workspace(
            global.workspace_path.as_deref(),
            std::env::var_os(WORKSPACE_ENV),
            std::env::current_dir()?,
        );

        let mut config = match &global.config {
            Some(path) => load_config_file(path)?,
            None => load_config_or_default(&workspace)?,
        };

        if let Some(url) = &global.storage_url {
            config.storage.url = Some(url.clone());
        }
        if let Some(name) = &global.workspace_name {
            config.storage.workspace_name = Some(name.clone());
        }
        validate_config(&config)?;

        debug!("workspace: {}", workspace.display());
        Ok(Self { workspace, config })
    }

    /// Resolves `path` against the workspace unless it is absolute.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.workspace.join(path)
    }

    /// Opens the configured snapshot storage.
    pub fn store(&self) -> Result<SnapshotStore, Box<dyn std::error::Error>> {
        let url = self.config.storage.url.as_deref().ok_or(
            "no storage URL configured; pass --storage-url or set [storage] url in snapshots.toml",
        )?;
        Ok(SnapshotStore::open(
            url,
            self.config.storage.workspace_name.as_deref(),
        )?)
    }

    /// Returns `name`, or the workspace's git `HEAD` commit when absent.
    pub async fn snapshot_name(
        &self,
        name: Option<&str>,
    ) -> Result<String, Box<dyn std::error::Error>> {
        match name {
            Some(name) => Ok(name.to_string()),
            None => git_head(&self.workspace).await,
        }
    }
}

fn pick_workspace(explicit: Option<&Path>, env: Option<OsString>, cwd: PathBuf) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => cwd,
    }
}

/// Reads the commit hash checked out in `dir`.
pub async fn git_head(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let output = tokio::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| format!("failed to run git: {e}"))?;

    if !output.status.success() {
        return Err(format!(
            "failed to get name from git ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

//! `snapshots push`: stores a snapshot file under a name.

use snap_common::Snapshot;
use tracing::info;

use crate::workspace::Context;
use crate::{GlobalArgs, PushArgs};

/// Runs the `snapshots push` command.
pub async fn run(args: &PushArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = Context::load(global)?;
    let name = ctx.snapshot_name(args.name.as_deref()).await?;

    let path = ctx.resolve_path(&args.snapshot_path);
    info!("reading snapshot from {}", path.display());
    let bytes = std::fs::read(&path)
        .map_err(|e| format!("failed to read snapshot {}: {e}", path.display()))?;
    let snapshot = Snapshot::from_json(&bytes)?;

    let meta = ctx.store()?.push(&name, &snapshot)?;
    info!("pushed snapshot of {} bytes: {}", meta.size, meta.path);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::tests::globals_for;

    #[tokio::test]
    async fn pushes_workspace_relative_file() {
        let ws = tempfile::tempdir().unwrap();
        std::fs::write(
            ws.path().join("snapshot.json"),
            r#"{"labels":{"//a":{"digest":"1"}}}"#,
        )
        .unwrap();

        let mut global = globals_for(ws.path());
        global.workspace_name = Some("repo".to_string());
        let args = PushArgs {
            snapshot_path: "snapshot.json".to_string(),
            name: Some("abc123".to_string()),
        };
        assert_eq!(run(&args, &global).await.unwrap(), 0);

        let stored = std::fs::read(ws.path().join("storage/repo/snapshots/abc123.json")).unwrap();
        assert_eq!(Snapshot::from_json(&stored).unwrap().get("//a").unwrap().digest, "1");
    }

    #[tokio::test]
    async fn invalid_snapshot_file_fails() {
        let ws = tempfile::tempdir().unwrap();
        std::fs::write(ws.path().join("bad.json"), "not json").unwrap();
        let args = PushArgs {
            snapshot_path: "bad.json".to_string(),
            name: Some("x".to_string()),
        };
        assert!(run(&args, &globals_for(ws.path())).await.is_err());
        assert!(!ws.path().join("storage/snapshots/x.json").exists());
    }
}

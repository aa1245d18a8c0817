//! `snapshots diff`: compares two snapshots, collecting the second if needed.

use std::io::Write;
use std::path::Path;

use snap_common::Snapshot;
use snap_diff::{diff_or_collect, DiffFormat, DiffRenderer, TableRenderer};
use snap_storage::GetArgs as Lookup;
use tracing::debug;

use crate::collect::collect_snapshot;
use crate::workspace::Context;
use crate::{DiffArgs, GlobalArgs};

/// Runs the `snapshots diff` command.
pub async fn run(args: &DiffArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = Context::load(global)?;

    let from = resolve_snapshot(&args.from, &ctx)
        .map_err(|e| format!("failed to get snapshot {}: {e}", args.from))?;
    let to = match &args.to {
        Some(reference) => Some(
            resolve_snapshot(reference, &ctx)
                .map_err(|e| format!("failed to get snapshot {reference}: {e}"))?,
        ),
        None => None,
    };

    let changes = diff_or_collect(&from, to, || collect_snapshot(&args.build, &ctx)).await?;

    if args.stderr_pretty {
        eprint!("{}", TableRenderer.render(&changes)?);
    }
    let rendered = DiffFormat::from(args.format).renderer().render(&changes)?;
    std::io::stdout().lock().write_all(rendered.as_bytes())?;
    Ok(0)
}

/// Loads a snapshot from a file if one exists at `reference`, otherwise
/// looks it up in storage as a tag or name.
///
/// Relative file paths are tried against the current directory first, then
/// against the workspace.
fn resolve_snapshot(reference: &str, ctx: &Context) -> Result<Snapshot, Box<dyn std::error::Error>> {
    for candidate in [Path::new(reference).to_path_buf(), ctx.resolve_path(reference)] {
        if candidate.is_file() {
            debug!("reading snapshot from {}", candidate.display());
            let bytes = std::fs::read(&candidate)
                .map_err(|e| format!("failed to read {}: {e}", candidate.display()))?;
            return Ok(Snapshot::from_json(&bytes)?);
        }
    }
    Ok(ctx.store()?.get(&Lookup::new(reference))?)
}

#[cfg(test)]
mod tests {
    use snap_common::Tracker;

    use super::*;
    use crate::workspace::tests::globals_for;
    use crate::{BuildArgs, OutputFormat};

    fn snapshot(digest: &str) -> Snapshot {
        [("//a".to_string(), Tracker::new(digest))].into_iter().collect()
    }

    fn diff_args(from: &str, to: Option<&str>) -> DiffArgs {
        DiffArgs {
            from: from.to_string(),
            to: to.map(str::to_string),
            format: OutputFormat::Json,
            stderr_pretty: false,
            build: BuildArgs::default(),
        }
    }

    #[test]
    fn reference_as_workspace_file() {
        let ws = tempfile::tempdir().unwrap();
        std::fs::write(
            ws.path().join("old.json"),
            snapshot("1").to_json_pretty().unwrap(),
        )
        .unwrap();
        let ctx = Context::load(&globals_for(ws.path())).unwrap();

        assert_eq!(resolve_snapshot("old.json", &ctx).unwrap(), snapshot("1"));
    }

    #[test]
    fn reference_as_stored_tag() {
        let ws = tempfile::tempdir().unwrap();
        let ctx = Context::load(&globals_for(ws.path())).unwrap();
        let store = ctx.store().unwrap();
        store.push("abc123", &snapshot("2")).unwrap();
        store.tag("abc123", "deployed").unwrap();

        assert_eq!(resolve_snapshot("deployed", &ctx).unwrap(), snapshot("2"));
    }

    #[test]
    fn unknown_reference_fails() {
        let ws = tempfile::tempdir().unwrap();
        let ctx = Context::load(&globals_for(ws.path())).unwrap();
        assert!(resolve_snapshot("nothing-here", &ctx).is_err());
    }

    #[tokio::test]
    async fn diff_two_files() {
        let ws = tempfile::tempdir().unwrap();
        for (name, digest) in [("a.json", "1"), ("b.json", "2")] {
            std::fs::write(ws.path().join(name), snapshot(digest).to_json_pretty().unwrap()).unwrap();
        }

        let code = run(&diff_args("a.json", Some("b.json")), &globals_for(ws.path()))
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn missing_from_snapshot_names_reference() {
        let ws = tempfile::tempdir().unwrap();
        let err = run(&diff_args("gone", Some("gone-too")), &globals_for(ws.path()))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to get snapshot gone:"));
    }
}

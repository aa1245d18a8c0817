//! `snapshots tag`: points a tag at a stored snapshot.

use tracing::info;

use crate::workspace::Context;
use crate::{GlobalArgs, TagArgs};

/// Runs the `snapshots tag` command.
pub async fn run(args: &TagArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = Context::load(global)?;
    let name = ctx.snapshot_name(args.name.as_deref()).await?;

    let meta = ctx.store()?.tag(&name, &args.tag)?;
    info!("tagged snapshot {name} as {}: {}", args.tag, meta.path);
    Ok(0)
}

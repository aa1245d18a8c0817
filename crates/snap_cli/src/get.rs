//! `snapshots get`: prints a stored snapshot.

use std::io::Write;

use snap_storage::GetArgs as Lookup;

use crate::workspace::Context;
use crate::{GetArgs, GlobalArgs};

/// Runs the `snapshots get` command.
pub fn run(args: &GetArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let ctx = Context::load(global)?;
    let lookup = Lookup {
        name: args.name.clone(),
        skip_tags: args.skip_tags,
        skip_names: args.skip_names,
    };
    let snapshot = ctx.store()?.get(&lookup)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&snapshot.to_json_pretty()?)?;
    writeln!(stdout)?;
    Ok(0)
}

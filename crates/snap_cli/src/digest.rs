//! `snapshots digest`: writes a tracker file for a set of inputs.
//!
//! Runs inside a build action, so it reads no workspace configuration.

use std::io::Write;

use snap_digest::{digest, read_inputs_file, write_tracker, DigestError};

use crate::DigestArgs;

/// Runs the `snapshots digest` command.
pub fn run(args: &DigestArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut inputs = args.paths.clone();
    inputs.extend(args.in_paths.iter().cloned());
    if let Some(file) = &args.inputs_file {
        inputs.extend(read_inputs_file(file)?);
    }
    if inputs.is_empty() {
        return Err(DigestError::NoInputs.into());
    }

    let tracker = digest(&inputs, &args.run, &args.tags)?;
    match &args.out {
        Some(out) => write_tracker(out, &tracker)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer(&mut stdout, &tracker)?;
            writeln!(stdout)?;
        }
    }
    Ok(0)
}

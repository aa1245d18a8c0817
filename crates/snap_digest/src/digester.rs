//! Streaming SHA-256 digests over a set of named input files.
//!
//! The digest covers each file's base name followed by its full contents,
//! visiting files in lexicographic path order. Sorting is the only source of
//! determinism: callers may pass paths in any order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use snap_common::Tracker;

use crate::error::DigestError;

/// Computes the tracker for a set of input files.
///
/// `run` and `tags` are copied into the tracker unchanged. Fails on the first
/// input that cannot be opened or read; no partial digest is returned.
pub fn digest<P: AsRef<Path>>(
    input_paths: &[P],
    run: &[String],
    tags: &[String],
) -> Result<Tracker, DigestError> {
    let mut sorted: Vec<&Path> = input_paths.iter().map(AsRef::as_ref).collect();
    sorted.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    let mut hasher = Sha256::new();
    for path in sorted {
        if let Some(name) = path.file_name() {
            hasher.update(name.as_encoded_bytes());
        }

        let mut file = File::open(path).map_err(|e| DigestError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::io::copy(&mut file, &mut hasher).map_err(|e| DigestError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(Tracker {
        digest: hex::encode(hasher.finalize()),
        run: run.to_vec(),
        tags: tags.to_vec(),
    })
}

/// Writes a tracker as compact JSON to `out_path`.
pub fn write_tracker(out_path: &Path, tracker: &Tracker) -> Result<(), DigestError> {
    let content = serde_json::to_vec(tracker)?;
    std::fs::write(out_path, content).map_err(|e| DigestError::Write {
        path: out_path.to_path_buf(),
        source: e,
    })
}

/// Reads input paths from a file, one per line. Blank lines are skipped.
pub fn read_inputs_file(path: &Path) -> Result<Vec<PathBuf>, DigestError> {
    let read_err = |e| DigestError::Read {
        path: path.to_path_buf(),
        source: e,
    };
    let file = File::open(path).map_err(read_err)?;

    let mut inputs = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(read_err)?;
        if !line.is_empty() {
            inputs.push(PathBuf::from(line));
        }
    }
    Ok(inputs)
}

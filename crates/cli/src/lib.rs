use std::env;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

pub mod commands;
pub mod logging;

/// Resolve a user-supplied path to an absolute one.
///
/// Existing paths are canonicalized. Paths that do not exist yet (output
/// directories, mostly) are joined onto the current directory instead.
pub fn canonicalize_or_current(path: &str) -> Result<PathBuf> {
    let path = Path::new(path);
    if path != Path::new(".") {
        if let Ok(resolved) = path.canonicalize() {
            return Ok(resolved);
        }
    }
    let cwd = env::current_dir().context("Failed to get current directory")?;
    Ok(if path == Path::new(".") { cwd } else { cwd.join(path) })
}

/// Hex-encoded SHA-256 digest of the file at `path`.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open sample for hashing: {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read sample for hashing: {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

//! reset and measure the files a candidate leaves on disk

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

use crate::error::BenchError;
use crate::Result;

/// Recursively delete every path of the artifact set.
///
/// Paths that do not exist are skipped, which is the normal state after a
/// previous reset. Symbolic links are removed, never followed.
pub fn remove_all(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        remove_path(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

fn remove_path(path: &Path) -> std::io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Sum of the byte sizes of every regular file under the artifact set.
///
/// A declared path that does not exist counts as zero; any other failure to
/// read the tree is fatal. Links are not followed, so they add nothing.
pub fn total_size(paths: &[PathBuf]) -> Result<u64> {
    let mut sum = 0;
    for path in paths {
        if !exists(path)? {
            continue;
        }
        for entry in WalkDir::new(path).follow_links(false) {
            let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
            if entry.file_type().is_file() {
                let meta = entry
                    .metadata()
                    .with_context(|| format!("Failed to stat {}", entry.path().display()))?;
                sum += meta.len();
            }
        }
    }
    Ok(sum)
}

/// Fail unless every declared path exists.
pub fn ensure_present(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        if !exists(path)? {
            Err(BenchError::MissingArtifact {
                path: path.display().to_string(),
            })?
        }
    }
    Ok(())
}

fn exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to stat {}", path.display())),
    }
}

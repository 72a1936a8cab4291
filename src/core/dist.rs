//! Destination directory operations.
//!
//! Every canonical name maps to at most one entry: the old entry is purged
//! before the fresh artifact is copied in.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::domain::{CopiedArtifact, NameMatcher};
use crate::error::PackagerError;

/// Shared output directory for version-stamped artifacts
#[derive(Debug, Clone)]
pub struct Destination {
    root: PathBuf,
}

impl Destination {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a canonical name resolves to
    pub fn path_for(&self, canonical_name: &str) -> PathBuf {
        self.root.join(canonical_name)
    }

    /// Remove whatever sits at `canonical_name`, file or directory
    ///
    /// Returns whether something was removed. A missing entry is not an error.
    pub async fn purge_stale(&self, canonical_name: &str) -> Result<bool, PackagerError> {
        let path = self.path_for(canonical_name);

        let metadata = match fs::symlink_metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Nothing to purge");
                return Ok(false);
            }
            Err(e) => return Err(PackagerError::io(path, e)),
        };

        let removed = if metadata.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };

        match removed {
            Ok(()) => {
                info!(path = %path.display(), "Purged stale output");
                Ok(true)
            }
            // Raced with another removal
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PackagerError::io(path, e)),
        }
    }

    /// Create the destination directory (and parents) if needed
    pub async fn ensure_exists(&self) -> Result<(), PackagerError> {
        if fs::metadata(&self.root).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Ok(());
        }
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PackagerError::io(&self.root, e))?;
        info!(path = %self.root.display(), "Created destination directory");
        Ok(())
    }

    /// Copy every entry of `search_dir` matching `matcher` to `canonical_name`
    ///
    /// Entries are visited in file name order, so when several match the last
    /// one wins. A missing search directory or no match copies nothing.
    pub async fn locate_and_copy(
        &self,
        project: &str,
        search_dir: &Path,
        matcher: &NameMatcher,
        canonical_name: &str,
    ) -> Result<Vec<CopiedArtifact>, PackagerError> {
        let candidates = match find_matches(search_dir, matcher).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(project, dir = %search_dir.display(), "Build output directory not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(PackagerError::io(search_dir, e)),
        };

        if candidates.is_empty() {
            warn!(
                project,
                dir = %search_dir.display(),
                pattern = %matcher,
                "No artifact matched"
            );
            return Ok(Vec::new());
        }

        let target = self.path_for(canonical_name);
        let mut copied = Vec::with_capacity(candidates.len());

        for source in candidates {
            let size_bytes = fs::copy(&source, &target)
                .await
                .map_err(|e| PackagerError::io(&source, e))?;
            let sha256 = sha256_file(&target)
                .await
                .map_err(|e| PackagerError::io(&target, e))?;

            info!(
                project,
                from = %source.display(),
                to = %target.display(),
                size_bytes,
                "Copied artifact"
            );

            copied.push(CopiedArtifact {
                project: project.to_string(),
                source,
                destination: target.clone(),
                size_bytes,
                sha256,
            });
        }

        Ok(copied)
    }
}

/// Read size for hashing copied artifacts
const HASH_CHUNK: usize = 64 * 1024;

/// Regular files directly inside `dir` whose name satisfies `matcher`, sorted
///
/// Symlinks are followed: a link to a directory is skipped like a directory,
/// a dangling link is skipped as if it were absent.
async fn find_matches(dir: &Path, matcher: &NameMatcher) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut matches = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !matcher.matches(name) {
            continue;
        }
        let path = entry.path();
        match fs::metadata(&path).await {
            Ok(m) if m.is_dir() => {
                debug!(entry = %path.display(), "Skipping matching directory");
                continue;
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(entry = %path.display(), "Skipping dangling link");
                continue;
            }
            Err(e) => return Err(e),
        }
        matches.push(path);
    }

    matches.sort();
    Ok(matches)
}

/// Hex SHA-256 of a file's contents
pub async fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_CHUNK];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

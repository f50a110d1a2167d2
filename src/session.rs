//! Session state: the current directory and the optional display name.

use crate::error::{FmError, Result};
use crate::path::resolve;
use std::path::{Path, PathBuf};
use tokio::fs;

/// The single long-lived REPL context.
#[derive(Debug, Clone)]
pub struct Session {
    current_dir: PathBuf,
    display_name: Option<String>,
}

impl Session {
    /// Open a session rooted at `start_dir`, which must be an existing,
    /// accessible directory. Relative paths are rejected.
    pub async fn open(start_dir: impl Into<PathBuf>, display_name: Option<String>) -> Result<Self> {
        let start_dir = start_dir.into();
        if !start_dir.is_absolute() {
            return Err(FmError::PathIo {
                path: start_dir,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "session directory must be absolute",
                ),
            });
        }
        let start_dir = crate::path::normalize(&start_dir);
        ensure_directory(&start_dir).await?;

        Ok(Self {
            current_dir: start_dir,
            display_name,
        })
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Resolve a user-supplied path against the current directory.
    pub fn resolve(&self, input: impl AsRef<Path>) -> PathBuf {
        resolve(&self.current_dir, input)
    }

    /// Move to `target`. The current directory is only replaced once the new
    /// path is known to be a readable directory.
    pub async fn change_directory(&mut self, target: &str) -> Result<&Path> {
        let path = self.resolve(target);
        ensure_directory(&path).await?;
        tracing::debug!("cd {} -> {}", self.current_dir.display(), path.display());
        self.current_dir = path;
        Ok(&self.current_dir)
    }

    /// Move to the parent directory.
    ///
    /// The root check is lexical: a parent equal to the current directory
    /// (or no parent at all) means we are at the root.
    pub fn go_up(&mut self) -> Result<&Path> {
        let parent = self
            .current_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.current_dir.clone());

        if parent == self.current_dir {
            return Err(FmError::AtRoot);
        }

        self.current_dir = parent;
        Ok(&self.current_dir)
    }
}

async fn ensure_directory(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path).await.map_err(|e| FmError::io(path, e))?;
    if !metadata.is_dir() {
        return Err(FmError::NotADirectory(path.to_path_buf()));
    }
    // Must also be listable, not just stat-able
    let _entries = fs::read_dir(path).await.map_err(|e| FmError::io(path, e))?;
    Ok(())
}

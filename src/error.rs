use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FmError {
    #[error("{}: {reason}", .path.display())]
    InvalidSource { path: PathBuf, reason: &'static str },

    #[error("{}: no such file or directory", .0.display())]
    PathNotFound(PathBuf),

    #[error("{}: permission denied", .0.display())]
    PermissionDenied(PathBuf),

    #[error("{}: not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("{}: already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("{}: source and destination are the same file", .0.display())]
    SameFile(PathBuf),

    #[error("Transfer from {} to {} failed: {source}", .from.display(), .to.display())]
    TransferFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to hash {}: {source}", .path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unknown operation: {0}.")]
    UnknownCommand(String),

    #[error("Unknown operating system command: {0}.")]
    UnknownFlag(String),

    #[error("Missing argument. Usage: {0}")]
    MissingArgument(&'static str),

    #[error("You cannot go higher than the root directory.")]
    AtRoot,

    #[error("{0} is not available on this host")]
    HostInfo(&'static str),

    #[error("{}: {source}", .path.display())]
    PathIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FmError>;

impl FmError {
    /// Map an I/O error on `path` to the matching navigation/access error.
    pub fn io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => FmError::PathNotFound(path),
            io::ErrorKind::PermissionDenied => FmError::PermissionDenied(path),
            io::ErrorKind::AlreadyExists => FmError::AlreadyExists(path),
            _ => FmError::PathIo { path, source: err },
        }
    }

    /// Errors caused by what the user typed rather than by the filesystem.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            FmError::UnknownCommand(_)
                | FmError::UnknownFlag(_)
                | FmError::MissingArgument(_)
                | FmError::AtRoot
        )
    }

    /// The single line printed to the console for this error.
    pub fn console_line(&self) -> String {
        if self.is_invalid_input() {
            format!("Invalid input. {}", self)
        } else {
            format!("Operation failed: {}", self)
        }
    }
}

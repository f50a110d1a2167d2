//! Streaming file transfer.
//!
//! Copy, move, compress and decompress all go through [`transfer`]: a
//! buffered source is pumped chunk by chunk through an optional Brotli
//! codec into a buffered destination, so memory use stays bounded by
//! [`CHUNK_SIZE`] regardless of file size.
//!
//! ```text
//! +--------+     +-----------------+     +-------------+
//! | source | --> | codec (optional) | --> | destination |
//! +--------+     +-----------------+     +-------------+
//! ```

use crate::error::{FmError, Result};
use async_compression::tokio::bufread::BrotliDecoder;
use async_compression::tokio::write::BrotliEncoder;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{
    self, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter,
};

/// Chunk size for streamed reads and hashing
pub const CHUNK_SIZE: usize = 256 * 1024; // 256KB

/// Suffix appended by compress and stripped by decompress
pub const ARCHIVE_SUFFIX: &str = ".br";

/// Codec applied between source and destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Identity,
    Compress,
    Decompress,
}

/// The four user-facing operations built on a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Copy,
    Move,
    Compress,
    Decompress,
}

impl TransferMode {
    pub fn transform(self) -> Transform {
        match self {
            TransferMode::Copy | TransferMode::Move => Transform::Identity,
            TransferMode::Compress => Transform::Compress,
            TransferMode::Decompress => Transform::Decompress,
        }
    }

    pub fn deletes_source(self) -> bool {
        matches!(self, TransferMode::Move)
    }
}

/// One streaming operation. Paths are absolute.
#[derive(Debug, Clone)]
pub struct TransferJob {
    pub source: PathBuf,
    /// Directory the destination file is created in
    pub destination_dir: PathBuf,
    pub transform: Transform,
    pub delete_source: bool,
}

impl TransferJob {
    pub fn new(mode: TransferMode, source: PathBuf, destination_dir: PathBuf) -> Self {
        Self {
            source,
            destination_dir,
            transform: mode.transform(),
            delete_source: mode.deletes_source(),
        }
    }
}

/// Result of a completed transfer
#[derive(Debug)]
pub struct TransferOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Bytes pushed through the pipe (uncompressed side)
    pub bytes_streamed: u64,
    /// Size of the destination file on disk, if it could be read back
    pub bytes_written: Option<u64>,
    /// Set when the source should have been removed but could not be
    pub cleanup_error: Option<FmError>,
}

/// File name the destination gets for `source` under `transform`.
pub fn destination_name(source: &Path, transform: Transform) -> Option<OsString> {
    let name = source.file_name()?;
    match transform {
        Transform::Identity => Some(name.to_os_string()),
        Transform::Compress => {
            let mut name = name.to_os_string();
            name.push(ARCHIVE_SUFFIX);
            Some(name)
        }
        Transform::Decompress => {
            let lossy = name.to_string_lossy();
            match lossy.strip_suffix(ARCHIVE_SUFFIX) {
                Some(stem) if !stem.is_empty() => Some(OsString::from(stem)),
                _ => Some(name.to_os_string()),
            }
        }
    }
}

/// Run `job` to completion or to its first error.
///
/// The source must be a regular file; otherwise nothing is created. A
/// failure once the destination is open leaves the partial file in place.
pub async fn transfer(job: &TransferJob) -> Result<TransferOutcome> {
    let metadata = match fs::metadata(&job.source).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(FmError::InvalidSource {
                path: job.source.clone(),
                reason: "no such file",
            });
        }
        Err(e) => return Err(FmError::io(&job.source, e)),
    };
    if !metadata.is_file() {
        return Err(FmError::InvalidSource {
            path: job.source.clone(),
            reason: "only regular files can be transferred",
        });
    }

    let name = destination_name(&job.source, job.transform).ok_or_else(|| {
        FmError::InvalidSource {
            path: job.source.clone(),
            reason: "path has no file name",
        }
    })?;
    let destination = job.destination_dir.join(name);

    // Opening the destination would truncate the source out from under us
    if same_file(&job.source, &destination).await {
        return Err(FmError::SameFile(destination));
    }

    tracing::debug!(
        "{:?} {} -> {}",
        job.transform,
        job.source.display(),
        destination.display()
    );

    let bytes_streamed = stream(&job.source, &destination, job.transform)
        .await
        .map_err(|source| FmError::TransferFailed {
            from: job.source.clone(),
            to: destination.clone(),
            source,
        })?;

    let bytes_written = match fs::metadata(&destination).await {
        Ok(metadata) => Some(metadata.len()),
        Err(e) => {
            tracing::debug!("Failed to stat {}: {}", destination.display(), e);
            None
        }
    };

    let cleanup_error = if job.delete_source {
        match fs::remove_file(&job.source).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    "Failed to remove {} after transfer: {}",
                    job.source.display(),
                    e
                );
                Some(FmError::io(&job.source, e))
            }
        }
    } else {
        None
    };

    Ok(TransferOutcome {
        source: job.source.clone(),
        destination,
        bytes_streamed,
        bytes_written,
        cleanup_error,
    })
}

async fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Open both ends, wire up the codec and pump. Both handles are owned here
/// and dropped on every return path.
async fn stream(source: &Path, destination: &Path, transform: Transform) -> io::Result<u64> {
    let input = BufReader::with_capacity(CHUNK_SIZE, File::open(source).await?);
    let output = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(destination)
        .await?;
    let output = BufWriter::with_capacity(CHUNK_SIZE, output);

    let (mut reader, mut writer): (
        Box<dyn AsyncRead + Unpin + Send>,
        Box<dyn AsyncWrite + Unpin + Send>,
    ) = match transform {
        Transform::Identity => (Box::new(input), Box::new(output)),
        Transform::Compress => (Box::new(input), Box::new(BrotliEncoder::new(output))),
        Transform::Decompress => (Box::new(BrotliDecoder::new(input)), Box::new(output)),
    };

    pump(&mut reader, &mut writer).await
}

/// Copy `reader` into `writer` in `CHUNK_SIZE` pieces, then shut the writer
/// down so codecs emit their trailer and buffers reach the file.
pub async fn pump<R, W>(reader: &mut R, writer: &mut W) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
    }

    writer.shutdown().await?;
    Ok(total)
}

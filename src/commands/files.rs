use super::{one_arg, two_args, write_line, Handler, Output};
use crate::error::{FmError, Result};
use crate::hash::hash_file;
use crate::listing::{list_directory, render};
use crate::session::Session;
use crate::transfer::{transfer, TransferJob, TransferMode, CHUNK_SIZE};
use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

pub struct Ls;

#[async_trait]
impl Handler for Ls {
    async fn run(&self, session: &mut Session, _args: &str, out: &mut Output) -> Result<()> {
        let listing = list_directory(session.current_dir()).await?;
        for skipped in &listing.skipped {
            let line = format!("Operation failed: {}: {}", skipped.name, skipped.error);
            write_line(out, &line).await?;
        }
        out.write_all(render(&listing.entries).as_bytes()).await?;
        Ok(())
    }
}

/// Streams the file to the console rather than reading it whole.
pub struct Cat;

#[async_trait]
impl Handler for Cat {
    async fn run(&self, session: &mut Session, args: &str, out: &mut Output) -> Result<()> {
        let path = session.resolve(one_arg(args, "cat <path>")?);
        let metadata = fs::metadata(&path).await.map_err(|e| FmError::io(&path, e))?;
        if metadata.is_dir() {
            return Err(FmError::InvalidSource {
                path,
                reason: "cannot read a directory",
            });
        }

        let file = File::open(&path).await.map_err(|e| FmError::io(&path, e))?;
        let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut last = None;

        loop {
            let n = reader
                .read(&mut buf)
                .await
                .map_err(|e| FmError::io(&path, e))?;
            if n == 0 {
                break;
            }
            out.write_all(&buf[..n]).await?;
            last = Some(buf[n - 1]);
        }

        if last != Some(b'\n') {
            out.write_all(b"\n").await?;
        }
        Ok(())
    }
}

/// Creates an empty file. An existing file is never truncated.
pub struct Add;

#[async_trait]
impl Handler for Add {
    async fn run(&self, session: &mut Session, args: &str, out: &mut Output) -> Result<()> {
        let path = session.resolve(one_arg(args, "add <name>")?);
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| FmError::io(&path, e))?;
        write_line(out, "File is created.").await
    }
}

pub struct Rename;

#[async_trait]
impl Handler for Rename {
    async fn run(&self, session: &mut Session, args: &str, out: &mut Output) -> Result<()> {
        let (old, new) = two_args(args, "rn <old> <new>")?;
        let from = session.resolve(old);
        let to = session.resolve(new);

        // Check the source first so a missing file is reported against it
        fs::symlink_metadata(&from)
            .await
            .map_err(|e| FmError::io(&from, e))?;
        fs::rename(&from, &to)
            .await
            .map_err(|e| FmError::io(&to, e))?;

        write_line(out, &format!("File is renamed to {}.", new)).await
    }
}

pub struct Remove;

#[async_trait]
impl Handler for Remove {
    async fn run(&self, session: &mut Session, args: &str, out: &mut Output) -> Result<()> {
        let path = session.resolve(one_arg(args, "rm <path>")?);
        fs::remove_file(&path)
            .await
            .map_err(|e| FmError::io(&path, e))?;
        write_line(out, &format!("{} is deleted", path.display())).await
    }
}

pub struct Hash;

#[async_trait]
impl Handler for Hash {
    async fn run(&self, session: &mut Session, args: &str, out: &mut Output) -> Result<()> {
        let arg = one_arg(args, "hash <path>")?;
        let digest = hash_file(&session.resolve(arg)).await?;
        write_line(out, &format!("Hash '{}': {}", arg, digest)).await
    }
}

/// cp, mv, compress and decompress: one streaming transfer each.
pub struct Transfer(pub TransferMode);

impl Transfer {
    fn usage(&self) -> &'static str {
        match self.0 {
            TransferMode::Copy => "cp <source> <destination_dir>",
            TransferMode::Move => "mv <source> <destination_dir>",
            TransferMode::Compress => "compress <source> <destination_dir>",
            TransferMode::Decompress => "decompress <source> <destination_dir>",
        }
    }
}

#[async_trait]
impl Handler for Transfer {
    async fn run(&self, session: &mut Session, args: &str, out: &mut Output) -> Result<()> {
        let (source, destination_dir) = two_args(args, self.usage())?;
        let job = TransferJob::new(
            self.0,
            session.resolve(source),
            session.resolve(destination_dir),
        );

        let outcome = transfer(&job).await?;
        tracing::debug!(
            "{} -> {}: {} bytes streamed, {:?} bytes written",
            outcome.source.display(),
            outcome.destination.display(),
            outcome.bytes_streamed,
            outcome.bytes_written
        );

        let name = outcome
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let line = match (self.0, &outcome.cleanup_error) {
            (TransferMode::Move, Some(err)) => format!(
                "File is copied to {}, but the source could not be removed: {}",
                outcome.destination.display(),
                err
            ),
            (TransferMode::Copy, _) => "File is copied!".to_string(),
            (TransferMode::Move, None) => "File is moved!".to_string(),
            (TransferMode::Compress, _) => format!(
                "File '{}' compressed to '{}'.",
                name,
                outcome.destination.display()
            ),
            (TransferMode::Decompress, _) => format!(
                "File '{}' decompressed to '{}'.",
                name,
                outcome.destination.display()
            ),
        };
        write_line(out, &line).await
    }
}

//! SHA-256 content hashing, streamed in chunks.

use crate::error::{FmError, Result};
use crate::transfer::CHUNK_SIZE;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, BufReader};

/// Hex digest of `path`'s contents. Memory use is bounded by one chunk.
pub async fn hash_file(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).await.map_err(|e| FmError::io(path, e))?;
    if metadata.is_dir() {
        return Err(FmError::InvalidSource {
            path: path.to_path_buf(),
            reason: "cannot hash a directory",
        });
    }

    let hash_err = |source| FmError::Hash {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).await.map_err(hash_err)?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buf).await.map_err(hash_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

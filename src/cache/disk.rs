// SPDX-License-Identifier: MPL-2.0

//! On-disk cache tier: files named by the hex SHA-256 of their key, written
//! atomically via a temp file + rename in the same directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use data_encoding::HEXLOWER;
use sha2::{Digest, Sha256};

use super::CacheError;

/// Atomic-write disk cache tier, rooted at a single directory.
pub struct DiskTier {
    dir: PathBuf,
    ttl: Duration,
}

impl DiskTier {
    /// Creates a disk tier rooted at `dir`. The directory is created lazily,
    /// on first write, rather than eagerly here.
    pub fn new(dir: PathBuf, ttl: Duration) -> Self {
        Self { dir, ttl }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = HEXLOWER.encode(&hasher.finalize());
        self.dir.join(digest)
    }

    /// Returns the cached bytes for `key`, or `None` on a miss or expiry.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.path_for(key);
        let metadata = match fs_err::tokio::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::DiskIo { path, source }),
        };
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .unwrap_or(Duration::MAX);
        if age > self.ttl {
            return Ok(None);
        }
        match fs_err::tokio::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::DiskIo { path, source }),
        }
    }

    /// Writes `data` under `key`, atomically: a sibling temp file is written
    /// and flushed, then renamed into place so readers never see a partial file.
    pub async fn put(&self, key: &str, data: &[u8]) -> Result<(), CacheError> {
        fs_err::tokio::create_dir_all(&self.dir)
            .await
            .map_err(|source| CacheError::DiskIo {
                path: self.dir.clone(),
                source,
            })?;
        let path = self.path_for(key);
        let dir = self.dir.clone();
        let data = data.to_vec();
        let final_path = path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &final_path, &data))
            .await
            .expect("disk cache write task panicked")
            .map_err(|source| CacheError::DiskIo { path, source })
    }
}

fn write_atomic(dir: &Path, final_path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::io::Write::write_all(&mut tmp, data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(final_path)
        .map_err(|persist_err| persist_err.error)?;
    Ok(())
}

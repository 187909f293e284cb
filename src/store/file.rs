//! FileBackend - JSON Document on Disk
//!
//! TigerStyle: One pretty-printed array, replaced whole on every write.
//!
//! The entire collection lives in a single human-readable JSON file. A
//! missing file is not an error: `load` initializes an empty `[]` and
//! carries on, so a fresh deployment needs no setup step. Writes go to a
//! temp sibling first and rename into place, so a crash or full disk mid
//! write leaves the previous document untouched.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::{StoreError, StoreResult};
use super::StoreBackend;
use crate::post::Post;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Suffix for the temp sibling written before rename
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

// =============================================================================
// FileBackend
// =============================================================================

/// File-backed store: the whole collection as one JSON array on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Create a backend for the given file path.
    ///
    /// The file itself is created lazily on first `load` or `persist`; the
    /// parent directory must already exist.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        assert!(
            path.file_name().is_some(),
            "store path must name a file, got {}",
            path.display()
        );
        Self { path }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .expect("checked in new")
            .to_os_string();
        name.push(TEMP_FILE_SUFFIX);
        self.path.with_file_name(name)
    }

    /// Serialize, write to the temp sibling, rename over the real file.
    ///
    /// The rename is the commit point: readers see the old document until
    /// it happens and the new one after, never a partial write.
    async fn write_atomic(&self, posts: &[Post]) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(posts)
            .map_err(|e| StoreError::write(format!("serialize posts: {e}")))?;

        let temp = self.temp_path();
        fs::write(&temp, &bytes)
            .await
            .map_err(|e| StoreError::write(format!("{}: {e}", temp.display())))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::write(format!("rename into {}: {e}", self.path.display())))?;

        Ok(())
    }
}

#[async_trait]
impl StoreBackend for FileBackend {
    async fn load(&self) -> StoreResult<Vec<Post>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Self-heal: no prior state means an empty collection.
                tracing::info!(path = %self.path.display(), "initializing empty store file");
                self.write_atomic(&[]).await?;
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StoreError::read(format!("{}: {e}", self.path.display())));
            }
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::read(format!("parse {}: {e}", self.path.display())))
    }

    async fn persist(&self, posts: &[Post]) -> StoreResult<()> {
        self.write_atomic(posts).await?;
        tracing::debug!(
            path = %self.path.display(),
            posts = posts.len(),
            "persisted collection"
        );
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Post Repository - The Core Load-Modify-Persist Layer
//!
//! TigerStyle: One writer at a time, durable before returning.
//!
//! Every mutation is a whole-collection cycle: load current state through
//! the backend, transform it in memory, persist it in full. Two such cycles
//! interleaving would lose one of the updates (both load the same prior
//! state, the second persist overwrites the first), so the repository holds
//! a single mutex across the entire cycle: at most one load-modify-persist
//! is in flight store-wide. Reads take no lock; the backend's atomic
//! `persist` guarantees they observe a before-or-after snapshot, never a
//! torn one.
//!
//! No success is ever returned for a change that was not durably persisted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::id::IdPolicy;
use crate::post::{Comment, Post};
use crate::store::{FileBackend, StoreBackend, StoreError, StoreResult};

#[cfg(feature = "postgres")]
use crate::store::PostgresBackend;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Upper bound on any single backend load or persist
pub const STORE_IO_TIMEOUT_MS: u64 = 5_000;

// =============================================================================
// Configuration
// =============================================================================

/// Which backing medium to run on.
///
/// The two mediums have identical repository semantics; this enum is the
/// only place the choice appears.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// One JSON document at the given path.
    File {
        /// Path of the store file
        path: PathBuf,
    },
    /// A posts/comments table pair in Postgres.
    #[cfg(feature = "postgres")]
    Postgres {
        /// Connection URL
        url: String,
    },
}

// =============================================================================
// PostRepository
// =============================================================================

/// The post/comment store.
///
/// Cheap to share: wrap in an [`Arc`] and clone the handle into each request
/// handler. All handles serialize their mutations through the same lock.
pub struct PostRepository {
    backend: Arc<dyn StoreBackend>,
    policy: IdPolicy,
    /// Guards the full load-modify-persist cycle of every mutation.
    write_lock: Mutex<()>,
}

impl PostRepository {
    /// Create a repository over an existing backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StoreBackend>, policy: IdPolicy) -> Self {
        Self {
            backend,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a repository from configuration.
    ///
    /// # Errors
    /// Returns `Unavailable` if the Postgres variant cannot connect.
    pub async fn connect(config: StoreConfig, policy: IdPolicy) -> StoreResult<Self> {
        let backend: Arc<dyn StoreBackend> = match config {
            StoreConfig::File { path } => Arc::new(FileBackend::new(path)),
            #[cfg(feature = "postgres")]
            StoreConfig::Postgres { url } => Arc::new(PostgresBackend::new(&url).await?),
        };
        Ok(Self::new(backend, policy))
    }

    /// The id policy in effect.
    #[must_use]
    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Create a post. Input is pre-validated by the caller: title and
    /// content non-empty, image optional.
    ///
    /// # Errors
    /// `Unavailable` if the medium cannot be read or written.
    pub async fn create_post(
        &self,
        title: String,
        content: String,
        image: Option<String>,
    ) -> StoreResult<Post> {
        let _guard = self.write_lock.lock().await;

        let mut posts = self.load().await?;
        let id = self.policy.next_post_id(&posts);
        let post = Post::new(id, title, content, image);
        posts.push(post.clone());
        self.persist(&posts).await?;

        tracing::info!(post_id = %post.id, "created post");
        Ok(post)
    }

    /// List all posts in creation order.
    ///
    /// # Errors
    /// `Unavailable` if the medium cannot be read.
    pub async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        self.load().await
    }

    /// Get one post by id.
    ///
    /// # Errors
    /// `NotFound` if no post has that id; `Unavailable` on medium failure.
    pub async fn get_post(&self, id: &str) -> StoreResult<Post> {
        let posts = self.load().await?;
        posts
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found(id))
    }

    /// Delete a post and, with it, all its comments.
    ///
    /// Deleting an id that does not exist is a no-op success, not an error.
    ///
    /// # Errors
    /// `Unavailable` if the medium cannot be read or written.
    pub async fn delete_post(&self, id: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut posts = self.load().await?;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        self.persist(&posts).await?;

        if posts.len() < before {
            tracing::info!(post_id = %id, "deleted post");
        }
        Ok(())
    }

    /// Append a comment to an existing post. Text is pre-validated by the
    /// caller as non-empty.
    ///
    /// # Errors
    /// `NotFound` if the post is absent (the store is left unchanged);
    /// `Unavailable` on medium failure.
    pub async fn add_comment(&self, post_id: &str, text: String) -> StoreResult<Comment> {
        let _guard = self.write_lock.lock().await;

        let mut posts = self.load().await?;
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| StoreError::not_found(post_id))?;

        let id = self.policy.next_comment_id(&post.comments);
        let comment = Comment::new(id, text);
        post.push_comment(comment.clone());
        self.persist(&posts).await?;

        tracing::info!(post_id = %post_id, comment_id = %comment.id, "added comment");
        Ok(comment)
    }

    // -------------------------------------------------------------------------
    // Bounded backend I/O
    // -------------------------------------------------------------------------

    /// Load through the backend, bounded so an unreachable medium surfaces
    /// `Unavailable` instead of hanging the caller forever.
    async fn load(&self) -> StoreResult<Vec<Post>> {
        timeout(
            Duration::from_millis(STORE_IO_TIMEOUT_MS),
            self.backend.load(),
        )
        .await
        .map_err(|_| StoreError::read(format!("timed out after {STORE_IO_TIMEOUT_MS}ms")))?
    }

    /// Persist through the backend, bounded like [`Self::load`].
    async fn persist(&self, posts: &[Post]) -> StoreResult<()> {
        timeout(
            Duration::from_millis(STORE_IO_TIMEOUT_MS),
            self.backend.persist(posts),
        )
        .await
        .map_err(|_| StoreError::write(format!("timed out after {STORE_IO_TIMEOUT_MS}ms")))?
    }
}

// =============================================================================
// Tests
// =============================================================================

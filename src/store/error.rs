//! Store Errors
//!
//! TigerStyle: A small, explicit taxonomy.
//!
//! Two conditions exist: the referenced post is absent (`NotFound`, an
//! expected outcome, never a fault) or the backing medium cannot be read or
//! written (`Unavailable`). Everything the OS, serde, or the database throws
//! folds into `Unavailable`; the core never retries, that is the caller's
//! decision.

use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No post with the given id exists.
    #[error("post not found: {post_id}")]
    NotFound {
        /// The id that was looked up
        post_id: String,
    },

    /// The backing medium could not be read or written.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// What failed
        message: String,
    },
}

impl StoreError {
    /// A post lookup missed.
    #[must_use]
    pub fn not_found(post_id: impl Into<String>) -> Self {
        Self::NotFound {
            post_id: post_id.into(),
        }
    }

    /// The medium could not be read.
    #[must_use]
    pub fn read(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: format!("read failed: {}", message.into()),
        }
    }

    /// The medium could not be written.
    #[must_use]
    pub fn write(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: format!("write failed: {}", message.into()),
        }
    }

    /// The medium could not be reached at all.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: format!("connection failed: {}", message.into()),
        }
    }

    /// HTTP-equivalent status for the routing layer to map onto.
    ///
    /// Success statuses (201/200/204) belong to the caller; the store only
    /// knows its failure modes.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Unavailable { .. } => 500,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

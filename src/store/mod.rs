//! Store - Backend Trait and Implementations
//!
//! TigerStyle: One adapter trait, two mediums, identical semantics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StoreBackend Trait                       │
//! │              load() -> Vec<Post>  /  persist(&[Post])        │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                              ↑
//!          │                              │
//! ┌────────┴────────┐           ┌────────┴────────┐
//! │   FileBackend   │           │ PostgresBackend │
//! │  (JSON on disk) │           │  (table pair)   │
//! └─────────────────┘           └─────────────────┘
//! ```
//!
//! The adapter owns the backing medium outright; nothing else in the crate
//! touches the file or the tables. `persist` must be atomic from a reader's
//! viewpoint: a failed write leaves the prior durable state intact, and a
//! concurrent `load` observes either the old collection or the new one,
//! never a torn intermediate.

mod error;
mod file;

#[cfg(feature = "postgres")]
mod postgres;

use async_trait::async_trait;

pub use error::{StoreError, StoreResult};
pub use file::FileBackend;

#[cfg(feature = "postgres")]
pub use postgres::PostgresBackend;

use crate::post::Post;

/// Durable storage for the full post collection.
///
/// Every mutation in the repository is a whole-collection round trip:
/// `load`, transform in memory, `persist`. This is O(total data size) per
/// operation by design and is the scalability ceiling of the store;
/// acceptable because the expected collection is small.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Load the full current collection.
    ///
    /// Backends self-heal where the medium allows it: the file variant
    /// initializes an empty collection when no prior state exists, which is
    /// part of the contract and not an error.
    async fn load(&self) -> StoreResult<Vec<Post>>;

    /// Overwrite durable state with the given collection in full.
    ///
    /// On failure the prior durable state must remain intact; no partial
    /// write may ever be observable to a subsequent `load`.
    async fn persist(&self, posts: &[Post]) -> StoreResult<()>;
}

//! Kiji - Post/Comment Store
//!
//! TigerStyle: One repository, two backing mediums, no lost updates.
//!
//! Kiji is the persistence and identity layer of a blog service: it owns the
//! canonical collection of posts (each with embedded comments), assigns
//! identifiers, and provides durable create/read/delete operations. Routing,
//! validation, and process bootstrap live outside; the crate consumes
//! pre-validated fields and hands back entities or typed errors the caller
//! serializes as JSON.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              PostRepository                  │
//! │   load → modify → persist, one writer at     │
//! │   a time, durable before returning           │
//! ├──────────────────────┬──────────────────────┤
//! │      IdPolicy        │    StoreBackend      │
//! │ sequential/timestamp │  file  /  postgres   │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use kiji::{IdPolicy, PostRepository, StoreConfig};
//!
//! # async fn run() -> kiji::StoreResult<()> {
//! let repo = PostRepository::connect(
//!     StoreConfig::File { path: "posts.json".into() },
//!     IdPolicy::Sequential,
//! )
//! .await?;
//!
//! let post = repo.create_post("Hello".into(), "World".into(), None).await?;
//! let comment = repo.add_comment(&post.id, "hi".into()).await?;
//! assert_eq!(comment.id, "1");
//! # Ok(())
//! # }
//! ```
//!
//! Migrating a JSON store into Postgres is the adapter contract applied
//! twice: `pg.persist(&file.load().await?).await?`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod id;
pub mod post;
pub mod repository;
pub mod store;

// Re-export common types
pub use id::IdPolicy;
pub use post::{Comment, Post};
pub use repository::{PostRepository, StoreConfig, STORE_IO_TIMEOUT_MS};
pub use store::{FileBackend, StoreBackend, StoreError, StoreResult};

#[cfg(feature = "postgres")]
pub use store::PostgresBackend;

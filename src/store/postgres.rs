//! PostgresBackend - Relational Table Pair
//!
//! TigerStyle: Explicit schema, one transaction per persist.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS posts (
//!     id TEXT PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     content TEXT NOT NULL,
//!     image TEXT,
//!     seq BIGINT NOT NULL
//! );
//! CREATE TABLE IF NOT EXISTS comments (
//!     id TEXT NOT NULL,
//!     post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
//!     text TEXT NOT NULL,
//!     seq BIGINT NOT NULL,
//!     PRIMARY KEY (post_id, id)
//! );
//! ```
//!
//! Comment ids are unique per post, not globally, hence the composite
//! primary key. The `seq` columns carry insertion order, which the JSON
//! variant encodes positionally and SQL result sets otherwise would not
//! preserve. Deleting a post cascades to its comments.
//!
//! `persist` expresses the whole-collection overwrite as row-level CRUD
//! inside a single transaction: vanished posts are deleted by id, surviving
//! posts upserted, and each post's comment rows replaced. A reader sees the
//! collection before the commit or after it, never in between.
//!
//! Because the adapter contract is symmetric, migrating a JSON store into
//! Postgres is one line: `pg.persist(&file.load().await?).await?`.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use super::error::{StoreError, StoreResult};
use super::StoreBackend;
use crate::post::{Comment, Post};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Maximum pooled connections
pub const PG_POOL_CONNECTIONS_MAX: u32 = 10;

// =============================================================================
// PostgresBackend
// =============================================================================

/// Postgres-backed store: a posts table and a comments table.
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Connect and initialize the schema.
    ///
    /// # Errors
    /// Returns `Unavailable` if the connection or schema setup fails.
    pub async fn new(connection_string: &str) -> StoreResult<Self> {
        assert!(
            connection_string.starts_with("postgres://")
                || connection_string.starts_with("postgresql://"),
            "connection string must be a postgres URL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_CONNECTIONS_MAX)
            .connect(connection_string)
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let backend = Self { pool };
        backend.init_schema().await?;
        Ok(backend)
    }

    /// Create from an existing pool, initializing the schema.
    pub async fn from_pool(pool: PgPool) -> StoreResult<Self> {
        let backend = Self { pool };
        backend.init_schema().await?;
        Ok(backend)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        // One statement per query: prepared statements take a single command.
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                image TEXT,
                seq BIGINT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id TEXT NOT NULL,
                post_id TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                text TEXT NOT NULL,
                seq BIGINT NOT NULL,
                PRIMARY KEY (post_id, id)
            )
            "#,
            "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, seq)",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::connection(format!("create schema: {e}")))?;
        }

        Ok(())
    }

    /// Close all pooled connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_post(row: &PgRow) -> StoreResult<Post> {
    Ok(Post {
        id: row
            .try_get("id")
            .map_err(|e| StoreError::read(e.to_string()))?,
        title: row
            .try_get("title")
            .map_err(|e| StoreError::read(e.to_string()))?,
        content: row
            .try_get("content")
            .map_err(|e| StoreError::read(e.to_string()))?,
        image: row
            .try_get("image")
            .map_err(|e| StoreError::read(e.to_string()))?,
        comments: Vec::new(),
    })
}

#[async_trait]
impl StoreBackend for PostgresBackend {
    async fn load(&self) -> StoreResult<Vec<Post>> {
        let post_rows = sqlx::query("SELECT id, title, content, image FROM posts ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::read(format!("load posts: {e}")))?;

        let mut posts = Vec::with_capacity(post_rows.len());
        for row in &post_rows {
            posts.push(row_to_post(row)?);
        }

        let comment_rows = sqlx::query("SELECT id, post_id, text FROM comments ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::read(format!("load comments: {e}")))?;

        for row in &comment_rows {
            let post_id: String = row
                .try_get("post_id")
                .map_err(|e| StoreError::read(e.to_string()))?;
            let comment = Comment {
                id: row
                    .try_get("id")
                    .map_err(|e| StoreError::read(e.to_string()))?,
                text: row
                    .try_get("text")
                    .map_err(|e| StoreError::read(e.to_string()))?,
            };
            // Orphan rows cannot exist under the foreign key.
            if let Some(post) = posts.iter_mut().find(|p| p.id == post_id) {
                post.comments.push(comment);
            }
        }

        Ok(posts)
    }

    async fn persist(&self, posts: &[Post]) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::write(format!("begin transaction: {e}")))?;

        let keep_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        sqlx::query("DELETE FROM posts WHERE id <> ALL($1)")
            .bind(&keep_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::write(format!("delete vanished posts: {e}")))?;

        for (seq, post) in posts.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO posts (id, title, content, image, seq)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO UPDATE SET
                    title = EXCLUDED.title,
                    content = EXCLUDED.content,
                    image = EXCLUDED.image,
                    seq = EXCLUDED.seq
                "#,
            )
            .bind(&post.id)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.image)
            .bind(seq as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::write(format!("upsert post {}: {e}", post.id)))?;

            sqlx::query("DELETE FROM comments WHERE post_id = $1")
                .bind(&post.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::write(format!("clear comments of {}: {e}", post.id)))?;

            for (seq, comment) in post.comments.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO comments (id, post_id, text, seq) VALUES ($1, $2, $3, $4)",
                )
                .bind(&comment.id)
                .bind(&post.id)
                .bind(&comment.text)
                .bind(seq as i64)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::write(format!("insert comment {}: {e}", comment.id)))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::write(format!("commit: {e}")))?;

        tracing::debug!(posts = posts.len(), "persisted collection");
        Ok(())
    }
}

// =============================================================================
// Tests (require running Postgres)
// =============================================================================

//! Post and Comment - The Stored Entities
//!
//! TigerStyle: Explicit fields, bounded sizes, serde-faithful layout.
//!
//! A `Post` owns its comments outright. Comments never exist outside a post
//! and are destroyed with it; there is no standalone comment delete anywhere
//! in the store. The JSON layout on disk is exactly these structs, so `image`
//! is skipped when absent to match store files written without the field.

use serde::{Deserialize, Serialize};

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Maximum post title length in bytes
pub const POST_TITLE_BYTES_MAX: usize = 1_000;

/// Maximum post content length in bytes
pub const POST_CONTENT_BYTES_MAX: usize = 100_000;

/// Maximum comment text length in bytes
pub const COMMENT_TEXT_BYTES_MAX: usize = 10_000;

// =============================================================================
// Types
// =============================================================================

/// A comment on a post.
///
/// The `id` is unique within the parent post's comment sequence only, not
/// across posts; the id allocator works per-post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Identifier, unique within the parent post
    pub id: String,
    /// Comment text
    pub text: String,
}

impl Comment {
    /// Create a comment with an already-allocated id.
    ///
    /// # Panics
    /// Panics if text is empty or exceeds the byte limit. The caller
    /// validates user input before reaching the store.
    #[must_use]
    pub fn new(id: String, text: String) -> Self {
        assert!(!id.is_empty(), "comment id cannot be empty");
        assert!(!text.is_empty(), "comment text cannot be empty");
        assert!(
            text.len() <= COMMENT_TEXT_BYTES_MAX,
            "comment text {} bytes exceeds max {}",
            text.len(),
            COMMENT_TEXT_BYTES_MAX
        );

        Self { id, text }
    }
}

/// A blog post with its embedded comments.
///
/// Comment order is insertion order and is significant; the JSON array
/// encodes it positionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Identifier, unique across the whole store
    pub id: String,
    /// Post title
    pub title: String,
    /// Post body
    pub content: String,
    /// Optional image URL or path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Comments in insertion order, empty at creation
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    /// Create a post with an already-allocated id and no comments.
    ///
    /// # Panics
    /// Panics if title or content are empty or exceed their byte limits.
    /// The caller validates user input before reaching the store.
    #[must_use]
    pub fn new(id: String, title: String, content: String, image: Option<String>) -> Self {
        assert!(!id.is_empty(), "post id cannot be empty");
        assert!(!title.is_empty(), "post title cannot be empty");
        assert!(!content.is_empty(), "post content cannot be empty");
        assert!(
            title.len() <= POST_TITLE_BYTES_MAX,
            "title {} bytes exceeds max {}",
            title.len(),
            POST_TITLE_BYTES_MAX
        );
        assert!(
            content.len() <= POST_CONTENT_BYTES_MAX,
            "content {} bytes exceeds max {}",
            content.len(),
            POST_CONTENT_BYTES_MAX
        );

        Self {
            id,
            title,
            content,
            image,
            comments: Vec::new(),
        }
    }

    /// Append an already-built comment.
    ///
    /// # Panics
    /// Panics if the comment id duplicates one already on this post.
    pub fn push_comment(&mut self, comment: Comment) {
        assert!(
            !self.comments.iter().any(|c| c.id == comment.id),
            "duplicate comment id {} on post {}",
            comment.id,
            self.id
        );
        self.comments.push(comment);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_new() {
        let post = Post::new(
            "1".to_string(),
            "Hello".to_string(),
            "World".to_string(),
            None,
        );

        assert_eq!(post.id, "1");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "World");
        assert!(post.image.is_none());
        assert!(post.comments.is_empty());
    }

    #[test]
    fn test_push_comment_preserves_order() {
        let mut post = Post::new(
            "1".to_string(),
            "Hello".to_string(),
            "World".to_string(),
            None,
        );
        post.push_comment(Comment::new("1".to_string(), "first".to_string()));
        post.push_comment(Comment::new("2".to_string(), "second".to_string()));

        let texts: Vec<&str> = post.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    #[should_panic(expected = "duplicate comment id")]
    fn test_push_comment_rejects_duplicate_id() {
        let mut post = Post::new(
            "1".to_string(),
            "Hello".to_string(),
            "World".to_string(),
            None,
        );
        post.push_comment(Comment::new("1".to_string(), "first".to_string()));
        post.push_comment(Comment::new("1".to_string(), "again".to_string()));
    }

    #[test]
    #[should_panic(expected = "title")]
    fn test_post_title_too_long() {
        let long_title = "x".repeat(POST_TITLE_BYTES_MAX + 1);
        let _ = Post::new("1".to_string(), long_title, "content".to_string(), None);
    }

    #[test]
    fn test_image_absent_from_json_when_none() {
        let post = Post::new(
            "1".to_string(),
            "Hello".to_string(),
            "World".to_string(),
            None,
        );
        let json = serde_json::to_string(&post).unwrap();
        assert!(!json.contains("image"));

        // And a store file written without the field still parses.
        let parsed: Post =
            serde_json::from_str(r#"{"id":"1","title":"Hello","content":"World"}"#).unwrap();
        assert_eq!(parsed, post);
    }
}

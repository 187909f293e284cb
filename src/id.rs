//! Identifier Allocation Policies
//!
//! TigerStyle: Two explicit policies, both with documented hazards.
//!
//! The repository allocates every post and comment id through one of these
//! policies. Neither is bulletproof and neither pretends to be:
//!
//! - [`IdPolicy::Sequential`] reads only the *last* element of the
//!   collection, not the maximum. After a deletion the last element may not
//!   be the historical maximum, so a previously-issued id can be reissued.
//!   This mirrors the counter behavior the store has always had and callers
//!   that delete entities must use [`IdPolicy::Timestamp`] instead.
//! - [`IdPolicy::Timestamp`] issues epoch milliseconds as a decimal string.
//!   When the clock has not advanced past the last element's id (two
//!   allocations inside one millisecond), the policy issues last + 1 so
//!   back-to-back writes never collide with the element they follow. Like
//!   the counter, only the last element is inspected: after a deletion an
//!   id issued further back can in principle be reissued.

use serde::{Deserialize, Serialize};

use crate::post::{Comment, Post};

/// Policy for allocating post and comment identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Numeric counter: last element's id + 1, `"1"` when empty.
    Sequential,
    /// Unix epoch milliseconds as a decimal string.
    #[default]
    Timestamp,
}

impl IdPolicy {
    /// Allocate an id for a new post.
    #[must_use]
    pub fn next_post_id(&self, posts: &[Post]) -> String {
        match self {
            Self::Sequential => next_sequential(posts.last().map(|p| p.id.as_str())),
            Self::Timestamp => next_timestamp(posts.last().map(|p| p.id.as_str())),
        }
    }

    /// Allocate an id for a new comment within one post.
    #[must_use]
    pub fn next_comment_id(&self, comments: &[Comment]) -> String {
        match self {
            Self::Sequential => next_sequential(comments.last().map(|c| c.id.as_str())),
            Self::Timestamp => next_timestamp(comments.last().map(|c| c.id.as_str())),
        }
    }
}

/// Last-element counter. Non-numeric or absent last id restarts at 1.
fn next_sequential(last_id: Option<&str>) -> String {
    let next = last_id
        .and_then(|id| id.parse::<u64>().ok())
        .map_or(1, |n| n + 1);
    next.to_string()
}

/// Epoch millis, bumped past the last element's id when the clock has not
/// advanced since it was issued.
fn next_timestamp(last_id: Option<&str>) -> String {
    let now = chrono::Utc::now().timestamp_millis();
    let next = match last_id.and_then(|id| id.parse::<i64>().ok()) {
        Some(last) if now <= last => last + 1,
        _ => now,
    };
    next.to_string()
}

// =============================================================================
// Tests
// =============================================================================

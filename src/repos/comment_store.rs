//! Comment store contract.
//!
//! Responsibility:
//! - Define the persistence interface the handlers depend on
//!   (find-all / find-by-id / insert / update-by-id).
//! - Keep the driver (sqlx) out of the handler layer; `pg.rs` is the real
//!   implementation, tests provide in-memory ones.
//!
//! Notes:
//! - `update` has merge semantics: only fields present in `CommentPatch`
//!   change. `post` and `user_id` are immutable by construction (the patch
//!   cannot carry them).
//! - Implementations are used behind `Arc<dyn CommentStore>`.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    #[sqlx(rename = "commentId")]
    pub comment_id: i64,

    pub text: String,

    // 親 post の識別子 (この service にとっては opaque)
    pub post: String,

    #[sqlx(rename = "userId")]
    pub user_id: Uuid,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Insert input. `user_id` always comes from the authenticated identity,
/// never from the request body.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub post: String,
    pub user_id: Uuid,
}

/// Field-sparse partial update, applied as a merge onto the stored record.
/// Only mutable fields appear here (currently just `text`).
#[derive(Debug, Clone, Default)]
pub struct CommentPatch {
    pub text: Option<String>,
}

#[async_trait]
pub trait CommentStore: Send + Sync + std::fmt::Debug {
    // Every comment, store-native order (ascending id).
    async fn list(&self) -> Result<Vec<CommentRow>, RepoError>;

    async fn get(&self, comment_id: i64) -> Result<Option<CommentRow>, RepoError>;

    // Assigns the id; returns the persisted row.
    async fn insert(&self, new: NewComment) -> Result<CommentRow, RepoError>;

    // Merge `patch` into the row; `Ok(None)` if the row no longer exists.
    async fn update(
        &self,
        comment_id: i64,
        patch: CommentPatch,
    ) -> Result<Option<CommentRow>, RepoError>;
}

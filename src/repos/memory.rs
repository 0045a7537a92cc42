//! In-memory `CommentStore` implementations for tests.
//!
//! `MemoryCommentStore` mirrors the merge semantics of the SQL in `pg.rs`
//! so handler tests exercise the same contract the production store honors.
//! `FailingCommentStore` errors on every call (500-path tests).
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::repos::comment_store::{CommentPatch, CommentRow, CommentStore, NewComment};
use crate::repos::error::RepoError;

#[derive(Debug, Default)]
pub struct MemoryCommentStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<CommentRow>,
    next_id: i64,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a comment directly, bypassing the HTTP surface.
    pub fn seed(&self, text: &str, post: &str, user_id: Uuid) -> CommentRow {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let row = CommentRow {
            comment_id: inner.next_id,
            text: text.to_string(),
            post: post.to_string(),
            user_id,
            created_at: Utc::now(),
        };
        inner.rows.push(row.clone());
        row
    }

    pub fn snapshot(&self) -> Vec<CommentRow> {
        self.inner.lock().unwrap().rows.clone()
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn list(&self) -> Result<Vec<CommentRow>, RepoError> {
        Ok(self.snapshot())
    }

    async fn get(&self, comment_id: i64) -> Result<Option<CommentRow>, RepoError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|r| r.comment_id == comment_id)
            .cloned())
    }

    async fn insert(&self, new: NewComment) -> Result<CommentRow, RepoError> {
        Ok(self.seed(&new.text, &new.post, new.user_id))
    }

    async fn update(
        &self,
        comment_id: i64,
        patch: CommentPatch,
    ) -> Result<Option<CommentRow>, RepoError> {
        let mut inner = self.inner.lock().unwrap();
        let row = inner.rows.iter_mut().find(|r| r.comment_id == comment_id);

        Ok(row.map(|r| {
            if let Some(text) = patch.text {
                r.text = text;
            }
            r.clone()
        }))
    }
}

#[derive(Debug, Default)]
pub struct FailingCommentStore;

impl FailingCommentStore {
    fn fail<T>(&self) -> Result<T, RepoError> {
        Err(RepoError::Backend("store unreachable".to_string()))
    }
}

#[async_trait]
impl CommentStore for FailingCommentStore {
    async fn list(&self) -> Result<Vec<CommentRow>, RepoError> {
        self.fail()
    }

    async fn get(&self, _comment_id: i64) -> Result<Option<CommentRow>, RepoError> {
        self.fail()
    }

    async fn insert(&self, _new: NewComment) -> Result<CommentRow, RepoError> {
        self.fail()
    }

    async fn update(
        &self,
        _comment_id: i64,
        _patch: CommentPatch,
    ) -> Result<Option<CommentRow>, RepoError> {
        self.fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let store = MemoryCommentStore::new();
        let user = Uuid::new_v4();
        let row = store.seed("first", "post-1", user);

        // text supplied → changed
        let updated = store
            .update(
                row.comment_id,
                CommentPatch {
                    text: Some("second".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.text, "second");
        assert_eq!(updated.post, "post-1");
        assert_eq!(updated.user_id, user);

        // empty patch → no-op
        let unchanged = store
            .update(row.comment_id, CommentPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.text, "second");
    }

    #[tokio::test]
    async fn update_of_missing_row_is_none() {
        let store = MemoryCommentStore::new();
        let res = store.update(999, CommentPatch::default()).await.unwrap();
        assert!(res.is_none());
    }
}

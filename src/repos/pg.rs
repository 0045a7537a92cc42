/*
 * Responsibility
 * - comments テーブル向け SQLx 実装 (CommentStore の本番実装)
 * - PgPool を内部に持ち、DB エラーは RepoError として返す
 */
use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::comment_store::{CommentPatch, CommentRow, CommentStore, NewComment};
use crate::repos::error::RepoError;

#[derive(Debug, Clone)]
pub struct PgCommentStore {
    pool: PgPool,
}

impl PgCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn list(&self) -> Result<Vec<CommentRow>, RepoError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT "commentId", text, post, "userId", "createdAt"
            FROM comments
            ORDER BY "commentId" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get(&self, comment_id: i64) -> Result<Option<CommentRow>, RepoError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT "commentId", text, post, "userId", "createdAt"
            FROM comments
            WHERE "commentId" = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn insert(&self, new: NewComment) -> Result<CommentRow, RepoError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (text, post, "userId")
            VALUES ($1, $2, $3)
            RETURNING "commentId", text, post, "userId", "createdAt"
            "#,
        )
        .bind(&new.text)
        .bind(&new.post)
        .bind(new.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(
        &self,
        comment_id: i64,
        patch: CommentPatch,
    ) -> Result<Option<CommentRow>, RepoError> {
        // patch.text: None → 既存値を維持 (COALESCE)
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            UPDATE comments
            SET text = COALESCE($2, text)
            WHERE "commentId" = $1
            RETURNING "commentId", text, post, "userId", "createdAt"
            "#,
        )
        .bind(comment_id)
        .bind(patch.text.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

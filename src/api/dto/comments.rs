/*
 * Responsibility
 * - Comments の request/response DTO
 * - validation (field-presence チェック) をここに持たせる
 *
 * Notes
 * - Create の必須フィールドは Option + #[serde(default)] で受ける:
 *   フィールド欠落を serde の reject (422) ではなく、集約した 400
 *   validation エラーとして返すため
 * - body に "user" が入っていても無視される (serde が未知フィールドを捨てる)
 */
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::repos::{CommentPatch, NewComment};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub post: Option<String>,
}

impl CreateCommentRequest {
    /// 全フィールドを検査し、失敗を 1 回のレスポンスに集約する。
    /// 成功時は validated な insert 入力を返す (user_id は認証側から)。
    pub fn validate(self, user_id: Uuid) -> Result<NewComment, Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.text.as_deref().is_none_or(str::is_empty) {
            errors.push(FieldError {
                param: "text",
                msg: "Text is required",
            });
        }
        if self.post.as_deref().is_none_or(str::is_empty) {
            errors.push(FieldError {
                param: "post",
                msg: "Post is required",
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        // 上の presence チェックを通った時点で両方 Some
        Ok(NewComment {
            text: self.text.unwrap_or_default(),
            post: self.post.unwrap_or_default(),
            user_id,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl UpdateCommentRequest {
    /// 部分更新セットを組み立てる。
    /// `text` が無い、または空文字の場合は「変更しない」の扱い。
    pub fn into_patch(self) -> CommentPatch {
        CommentPatch {
            text: self.text.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub text: String,
    pub post: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

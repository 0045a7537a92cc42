/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは middleware/services 側の責務
 * - comment の owner 判定はこの user_id と stored row の userId の比較で行う
 */

use uuid::Uuid;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `user_id` は内部ユーザーID（ここでは UUID を採用）
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: Uuid,
}

impl AuthCtx {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

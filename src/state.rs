/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - store: CommentStore (Pg 実装 or テスト用 in-memory)
 *   - id_codec: 公開 ID ↔ 内部 ID 変換
 *   - auth: access token 検証サービス
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::CommentStore;
use crate::services::{auth::AuthService, id_codec::IdCodec};

#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<dyn CommentStore>,
    pub id_codec: IdCodec,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(store: Arc<dyn CommentStore>, id_codec: IdCodec, auth: Arc<AuthService>) -> Self {
        Self {
            store,
            id_codec,
            auth,
        }
    }
}

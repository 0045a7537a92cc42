/*
 * Responsibility
 * - Path の String を公開 ID 型として受け、復号して内部 ID 型へ変換する
 * - 失敗時は AppError::bad_request へ変換 (store には一切触らない)
 *
 * 置くもの
 *  - PublicId<T> の定義（ジェネリック本体）
 *  - impl FromRequestParts<AppState> for PublicId<T>
 *
 * 置かないもの
 *  - Comment といった具体リソース名 (types 側)
 */
use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Clone, Copy)]
pub struct PublicId<T> {
    pub id: i64,
    _marker: PhantomData<T>,
}

impl<T> PublicId<T> {
    fn new(id: i64) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Handler を直接呼ぶテスト用 (extractor を経由しない)
    #[cfg(test)]
    pub fn for_test(id: i64) -> Self {
        Self::new(id)
    }
}

impl<T> FromRequestParts<AppState> for PublicId<T>
where
    T: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(public_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("INVALID_PUBLIC_ID", "invalid id"))?;

        let id = state.id_codec.decode(&public_id)?;
        Ok(Self::new(id))
    }
}

impl<T> std::fmt::Debug for PublicId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicId").field("id", &self.id).finish()
    }
}

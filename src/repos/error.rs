/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),

    // テスト用ストアなど、driver 以外の実装が失敗を表すための variant
    #[error("store backend error: {0}")]
    Backend(String),
}

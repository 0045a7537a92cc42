/*
 * Responsibility
 * - 永続化層の公開インターフェース
 * - handler からは CommentStore (契約) だけが見える
 */
pub mod comment_store;
pub mod error;
pub mod pg;

#[cfg(test)]
pub mod memory;

pub use comment_store::{CommentPatch, CommentRow, CommentStore, NewComment};

/*
 * Responsibility
 * - handler が受け取る extractor 群の公開
 */
pub mod auth_ctx;
pub mod public_id;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use public_id::PublicCommentId;

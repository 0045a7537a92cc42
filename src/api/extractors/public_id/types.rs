/**
 * Responsibility
 *
 * 主な責務
 *  - リソースごとの「意味付きID型」を宣言する
 *
 * 置くもの
 *  - CommentTag などのタグ型
 *  - type PublicCommentId = PublicId<CommentTag> のような alias
 *
 * 置かないもの
 *  - decode ロジック
 *  - extractor 実装
 */
use super::core::PublicId;

// comments
pub enum CommentTag {}
pub type PublicCommentId = PublicId<CommentTag>;

/*
 * Responsibility
 * - handler 群の公開
 */
pub mod comments;
pub mod health;

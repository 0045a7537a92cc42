/*
 * Responsibility
 * - route ごとの request/response DTO の公開
 */
pub mod comments;

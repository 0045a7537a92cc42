/*
 * Responsibility
 * - ドメイン横断の service (auth, id_codec) の公開
 */
pub mod auth;
pub mod id_codec;

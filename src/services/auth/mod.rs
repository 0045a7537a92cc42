/*
 * Responsibility
 * - access token 検証サービスの公開
 */
pub mod access_jwt;

pub use access_jwt::AuthService;

#[cfg(test)]
pub mod test_tokens;

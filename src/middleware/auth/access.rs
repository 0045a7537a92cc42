//! access token (JWT) 検証 → AuthCtx を extensions に入れる
//!
//! - `Authorization: Bearer <jwt>` を AuthService で検証し、sub を user_id
//!   として AuthCtx に入れる
//! - 失敗理由は warn ログのみ。クライアントには guard の 401 ボディだけを返す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// 認証を掛けたい sub-router に middleware を適用する。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/comments", post(create_comment));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

    // JWT 署名検証 + iss/aud/exp/leeway などは AuthService 側で実施
    let claims = match state.auth.verify_verified(token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                error = ?err,
                "access token verification failed"
            );
            return Err(AppError::Unauthorized);
        }
    };

    let auth_ctx = AuthCtx::new(claims.user_id);

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

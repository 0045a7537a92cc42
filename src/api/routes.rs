/*
 * Responsibility
 * - /api 配下の URL 構造を定義
 * - guard (auth middleware) が必要な範囲をここで決める:
 *   list は public、create/update は guard → validation → handler の順
 */
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware;
use crate::state::AppState;

use crate::api::handlers::comments::{create_comment, list_comments, update_comment};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/comments", get(list_comments));

    let protected = Router::new()
        .route("/comments", post(create_comment))
        .route("/comments/{comment_id}", put(update_comment));
    let protected = middleware::auth::access::apply(protected, state);

    // 同一 path でもメソッドが重ならなければ merge できる
    public.merge(protected)
}

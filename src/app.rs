/*
 * Responsibility
 * - Config 読み込み → 依存生成 → Router 組み立て
 * - Middleware の適用 (HTTP infra / CORS / security headers)
 * - axum::serve() で起動
 */
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    api::handlers::health::health,
    config::Config,
    middleware,
    repos::pg::PgCommentStore,
    services::{auth::AuthService, id_codec::IdCodec},
    state::AppState,
};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,comments_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;

    let auth = AuthService::new(
        &config.access_jwt_public_key_pem,
        &config.auth_issuer,
        &config.auth_audience,
        config.access_token_leeway_seconds,
    )
    .map_err(|e| anyhow::anyhow!(e))?;

    Ok(AppState::new(
        Arc::new(PgCommentStore::new(pool)),
        id_codec,
        Arc::new(auth),
    ))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api", api::routes(state.clone()))
        .with_state(state);

    let router = middleware::http::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::security_headers::apply(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::AppEnv;
    use crate::repos::CommentStore;
    use crate::repos::memory::{FailingCommentStore, MemoryCommentStore};
    use crate::services::auth::test_tokens;

    const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    fn test_config() -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: String::new(),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            sqids_min_length: 10,
            sqids_alphabet: ALPHABET.to_string(),
            auth_issuer: test_tokens::ISSUER.to_string(),
            auth_audience: test_tokens::AUDIENCE.to_string(),
            access_token_leeway_seconds: 60,
            access_jwt_public_key_pem: test_tokens::PUBLIC_KEY_PEM.to_string(),
        }
    }

    fn codec() -> IdCodec {
        IdCodec::new(10, ALPHABET).unwrap()
    }

    fn test_app(store: Arc<dyn CommentStore>) -> Router {
        let config = test_config();
        let id_codec = codec();
        let auth = AuthService::new(
            &config.access_jwt_public_key_pem,
            &config.auth_issuer,
            &config.auth_audience,
            config.access_token_leeway_seconds,
        )
        .unwrap();

        build_router(AppState::new(store, id_codec, Arc::new(auth)), &config)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app(Arc::new(MemoryCommentStore::new()));
        let res = app.oneshot(get_req("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn list_is_public_and_returns_an_array() {
        let app = test_app(Arc::new(MemoryCommentStore::new()));
        let res = app.oneshot(get_req("/api/comments")).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await, json!([]));
    }

    #[tokio::test]
    async fn list_returns_comments_in_store_order() {
        let store = Arc::new(MemoryCommentStore::new());
        let user = Uuid::parse_str(test_tokens::OWNER_ID).unwrap();
        store.seed("first", "p1", user);
        store.seed("second", "p1", user);

        let app = test_app(store);
        let res = app.oneshot(get_req("/api/comments")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json = body_json(res).await;
        let items = json.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["text"], "first");
        assert_eq!(items[1]["text"], "second");
        assert_eq!(items[0]["user"], test_tokens::OWNER_ID);
        // public id は内部 id に復号できる
        assert_eq!(codec().decode(items[0]["id"].as_str().unwrap()).unwrap(), 1);
    }

    #[tokio::test]
    async fn create_without_credential_is_rejected_by_the_guard() {
        let store = Arc::new(MemoryCommentStore::new());
        let app = test_app(store.clone());

        let res = app
            .oneshot(json_req(
                "POST",
                "/api/comments",
                None,
                json!({"text": "hi", "post": "p1"}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn create_with_garbage_token_is_rejected() {
        let app = test_app(Arc::new(MemoryCommentStore::new()));
        let res = app
            .oneshot(json_req(
                "POST",
                "/api/comments",
                Some("not.a.jwt"),
                json!({"text": "hi", "post": "p1"}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_persists_and_ignores_client_supplied_user() {
        let store = Arc::new(MemoryCommentStore::new());
        let app = test_app(store.clone());

        let res = app
            .oneshot(json_req(
                "POST",
                "/api/comments",
                Some(test_tokens::OWNER_TOKEN),
                // body の user は無視され、認証済み identity が使われる
                json!({"text": "hi", "post": "p1", "user": test_tokens::INTRUDER_ID}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);

        let json = body_json(res).await;
        assert_eq!(json["text"], "hi");
        assert_eq!(json["post"], "p1");
        assert_eq!(json["user"], test_tokens::OWNER_ID);

        let rows = store.snapshot();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id.to_string(), test_tokens::OWNER_ID);
    }

    #[tokio::test]
    async fn create_with_missing_fields_is_400_and_writes_nothing() {
        let store = Arc::new(MemoryCommentStore::new());
        let app = test_app(store.clone());

        let res = app
            .oneshot(json_req(
                "POST",
                "/api/comments",
                Some(test_tokens::OWNER_TOKEN),
                json!({}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let json = body_json(res).await;
        let errors = json["error"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["msg"], "Text is required");
        assert_eq!(errors[1]["msg"], "Post is required");

        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn update_of_nonexistent_comment_is_404() {
        let app = test_app(Arc::new(MemoryCommentStore::new()));
        let public_id = codec().encode(999).unwrap();

        let res = app
            .oneshot(json_req(
                "PUT",
                &format!("/api/comments/{public_id}"),
                Some(test_tokens::OWNER_TOKEN),
                json!({"text": "new"}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(res).await["msg"], "Comment not found");
    }

    #[tokio::test]
    async fn update_by_non_owner_is_401_and_leaves_row_unchanged() {
        let store = Arc::new(MemoryCommentStore::new());
        let owner = Uuid::parse_str(test_tokens::OWNER_ID).unwrap();
        let row = store.seed("hello", "p1", owner);
        let public_id = codec().encode(row.comment_id).unwrap();

        let app = test_app(store.clone());
        let res = app
            .oneshot(json_req(
                "PUT",
                &format!("/api/comments/{public_id}"),
                Some(test_tokens::INTRUDER_TOKEN),
                json!({"text": "hijacked"}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(res).await["msg"], "Not authorized");
        assert_eq!(store.snapshot()[0].text, "hello");
    }

    #[tokio::test]
    async fn update_by_owner_changes_text_and_nothing_else() {
        let store = Arc::new(MemoryCommentStore::new());
        let owner = Uuid::parse_str(test_tokens::OWNER_ID).unwrap();
        let row = store.seed("hello", "p1", owner);
        let public_id = codec().encode(row.comment_id).unwrap();

        let app = test_app(store.clone());
        let req = || {
            json_req(
                "PUT",
                &format!("/api/comments/{public_id}"),
                Some(test_tokens::OWNER_TOKEN),
                json!({"text": "new"}),
            )
        };

        let res = app.clone().oneshot(req()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let json = body_json(res).await;
        assert_eq!(json["text"], "new");
        assert_eq!(json["post"], "p1");
        assert_eq!(json["user"], test_tokens::OWNER_ID);

        // 同じ更新をもう一度かけても最終状態は変わらない
        let res = app.oneshot(req()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let rows = store.snapshot();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "new");
        assert_eq!(rows[0].post, "p1");
        assert_eq!(rows[0].user_id, owner);
    }

    #[tokio::test]
    async fn update_without_text_keeps_the_existing_value() {
        let store = Arc::new(MemoryCommentStore::new());
        let owner = Uuid::parse_str(test_tokens::OWNER_ID).unwrap();
        let row = store.seed("hello", "p1", owner);
        let public_id = codec().encode(row.comment_id).unwrap();

        let app = test_app(store.clone());

        // body に text なし → 変更しない
        let res = app
            .clone()
            .oneshot(json_req(
                "PUT",
                &format!("/api/comments/{public_id}"),
                Some(test_tokens::OWNER_TOKEN),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["text"], "hello");

        // 空文字も「指定なし」の扱い
        let res = app
            .oneshot(json_req(
                "PUT",
                &format!("/api/comments/{public_id}"),
                Some(test_tokens::OWNER_TOKEN),
                json!({"text": ""}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(store.snapshot()[0].text, "hello");
    }

    #[tokio::test]
    async fn malformed_public_id_is_rejected_before_the_store() {
        let app = test_app(Arc::new(FailingCommentStore));

        let res = app
            .oneshot(json_req(
                "PUT",
                "/api/comments/!!!",
                Some(test_tokens::OWNER_TOKEN),
                json!({"text": "new"}),
            ))
            .await
            .unwrap();

        // store は一切呼ばれない (呼ばれたら 500 になるはず)
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"]["code"], "INVALID_PUBLIC_ID");
    }

    #[tokio::test]
    async fn store_failure_degrades_to_a_generic_500() {
        let app = test_app(Arc::new(FailingCommentStore));

        let res = app.clone().oneshot(get_req("/api/comments")).await.unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(res).await["error"]["message"], "Server error");

        let res = app
            .oneshot(json_req(
                "POST",
                "/api/comments",
                Some(test_tokens::OWNER_TOKEN),
                json!({"text": "hi", "post": "p1"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(res).await;
        // 内部のエラーテキストはクライアントに出ない
        assert_eq!(json["error"]["message"], "Server error");
    }

    #[tokio::test]
    async fn update_store_failure_is_also_a_generic_500() {
        let app = test_app(Arc::new(FailingCommentStore));
        let public_id = codec().encode(1).unwrap();

        // 正規の owner token + 正規の public id でも store が落ちれば 500
        let res = app
            .oneshot(json_req(
                "PUT",
                &format!("/api/comments/{public_id}"),
                Some(test_tokens::OWNER_TOKEN),
                json!({"text": "new"}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(res).await["error"]["message"], "Server error");
    }
}

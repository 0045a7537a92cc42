/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - RepoError / validation error / auth error を統一的に変換
 *
 * クライアントに見えるエラーボディはこのファイルに閉じる:
 * - validation   → 400 { "error": [ { "param", "msg" }, ... ] }
 * - bad request  → 400 { "error": { "code", "message" } }
 * - not found    → 404 { "msg": "... not found" }
 * - not owner    → 401 { "msg": "Not authorized" }
 * - guard 拒否   → 401 { "error": { "code": "UNAUTHORIZED", ... } }
 * - それ以外     → 500 汎用ボディ (原因はログのみ)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::id_codec::IdCodecError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// validation 1 件分 (フィールド名 + メッセージ)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub param: &'static str,
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
struct ValidationResponse {
    error: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
struct MsgResponse {
    msg: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("validation failed")]
    Validation { errors: Vec<FieldError> },
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    // 認証済みだがリソースの owner ではない
    #[error("not authorized")]
    NotAuthorized,
    // guard が弾く (credential なし/不正)
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation { errors }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest { code, message } => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: ErrorBody { code, message },
                }),
            )
                .into_response(),

            AppError::Validation { errors } => (
                StatusCode::BAD_REQUEST,
                Json(ValidationResponse { error: errors }),
            )
                .into_response(),

            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                Json(MsgResponse {
                    msg: format!("{resource} not found"),
                }),
            )
                .into_response(),

            AppError::NotAuthorized => (
                StatusCode::UNAUTHORIZED,
                Json(MsgResponse {
                    msg: "Not authorized".to_string(),
                }),
            )
                .into_response(),

            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: ErrorBody {
                        code: "UNAUTHORIZED",
                        message: "unauthorized".into(),
                    },
                }),
            )
                .into_response(),

            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: ErrorBody {
                        code: "INTERNAL_SERVER_ERROR",
                        message: "Server error".into(),
                    },
                }),
            )
                .into_response(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        // 原因はここでログに残し、クライアントには汎用 500 だけを返す
        tracing::error!(error = ?e, "comment store failure");
        AppError::Internal
    }
}

impl From<IdCodecError> for AppError {
    fn from(e: IdCodecError) -> Self {
        match e {
            // Client supplied a malformed public id (e.g. /comments/{id})
            IdCodecError::DecodeInvalidFormat | IdCodecError::DecodeOutOfRange => {
                AppError::bad_request("INVALID_PUBLIC_ID", "invalid id")
            }

            // These indicate server-side config / programming errors
            _ => {
                tracing::error!(error = ?e, "id codec failure");
                AppError::Internal
            }
        }
    }
}

/*
 * Responsibility
 * - /comments 系 handler (list / create / update)
 * - Path の id は公開 ID → extractor で復号して内部 ID として受け取る
 * - 認可 (owner チェック) は update の中で AuthCtx と stored row を比較して行う
 *
 * Update の gate 順は固定:
 *   存在チェック → owner チェック → 部分更新
 * 存在しない id への非 owner アクセスは 404 (owner より先に存在が分かる)。
 * lookup と conditional write はトランザクションではない: 間に消された行は
 * update 側の Not-Found として表面化する。
 */
use axum::{Json, extract::State};

use crate::{
    api::{
        dto::comments::{CommentResponse, CreateCommentRequest, UpdateCommentRequest},
        extractors::{AuthCtxExtractor, PublicCommentId},
    },
    error::AppError,
    repos::CommentRow,
    state::AppState,
};

fn row_to_response(state: &AppState, row: CommentRow) -> Result<CommentResponse, AppError> {
    let public_id = state.id_codec.encode(row.comment_id)?;

    Ok(CommentResponse {
        id: public_id,
        text: row.text,
        post: row.post,
        user: row.user_id.to_string(),
        created_at: row.created_at,
    })
}

/// GET /api/comments (public)
pub async fn list_comments(
    State(state): State<AppState>,
) -> Result<Json<Vec<CommentResponse>>, AppError> {
    let rows = state.store.list().await?;

    let mut res = Vec::with_capacity(rows.len());
    for row in rows {
        res.push(row_to_response(&state, row)?);
    }

    Ok(Json(res))
}

/// POST /api/comments (auth required; guard は middleware 側)
pub async fn create_comment(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    // validation は store アクセスより前。user は body からではなく AuthCtx から
    let new = req.validate(auth.user_id).map_err(AppError::validation)?;

    let row = state.store.insert(new).await?;

    Ok(Json(row_to_response(&state, row)?))
}

/// PUT /api/comments/{id} (auth required)
pub async fn update_comment(
    State(state): State<AppState>,
    AuthCtxExtractor(auth): AuthCtxExtractor,
    comment_id: PublicCommentId,
    Json(req): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, AppError> {
    let patch = req.into_patch();

    let existing = state
        .store
        .get(comment_id.id)
        .await?
        .ok_or_else(|| AppError::not_found("Comment"))?;

    if existing.user_id != auth.user_id {
        return Err(AppError::NotAuthorized);
    }

    let updated = state
        .store
        .update(comment_id.id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Comment"))?;

    Ok(Json(row_to_response(&state, updated)?))
}

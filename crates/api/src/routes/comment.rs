use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{load_task_scope, parse_oid, validate_body},
    state::AppState,
};
use workhive_db::models::Comment;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "Comment cannot be empty"))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub content: String,
    pub task_id: String,
    pub user_id: String,
    pub user_name: String,
    pub created_at: String,
}

fn to_response(c: Comment, user_name: String) -> CommentResponse {
    CommentResponse {
        id: c.id.unwrap().to_hex(),
        content: c.content,
        task_id: c.task_id.to_hex(),
        user_id: c.user_id.to_hex(),
        user_name,
        created_at: c.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id, task_id)): Path<(String, String, String)>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let pid = parse_oid(&project_id, "project_id")?;
    let tid = parse_oid(&task_id, "task_id")?;

    load_task_scope(&state, auth.user_id, wid, pid, tid).await?;

    let comments = state.comments.find_by_task(tid).await?;

    let mut response = Vec::with_capacity(comments.len());
    for comment in comments {
        let user_name = match state.users.base.find_by_id(comment.user_id).await {
            Ok(user) => user.name,
            Err(_) => String::new(),
        };
        response.push(to_response(comment, user_name));
    }

    Ok(Json(response))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id, task_id)): Path<(String, String, String)>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    validate_body(&body)?;
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let pid = parse_oid(&project_id, "project_id")?;
    let tid = parse_oid(&task_id, "task_id")?;

    load_task_scope(&state, auth.user_id, wid, pid, tid).await?;

    let comment = state.comments.create(tid, auth.user_id, body.content).await?;
    let user_name = auth.user.name.clone();

    Ok((StatusCode::CREATED, Json(to_response(comment, user_name))))
}

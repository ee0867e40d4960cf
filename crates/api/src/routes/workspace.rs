use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{parse_oid, validate_body},
    state::AppState,
};
use workhive_db::models::{MemberRole, Workspace};
use workhive_services::authz;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkspaceRequest {
    #[validate(length(min = 1, message = "Please provide a workspace name"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub members: Vec<MemberResponse>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub role: String,
}

pub(crate) fn to_response(w: Workspace) -> WorkspaceResponse {
    WorkspaceResponse {
        id: w.id.unwrap().to_hex(),
        name: w.name,
        description: w.description,
        members: w
            .members
            .into_iter()
            .map(|m| MemberResponse {
                user_id: m.user_id.to_hex(),
                role: format!("{:?}", m.role),
            })
            .collect(),
        created_at: w.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<WorkspaceResponse>>, ApiError> {
    let workspaces = state.workspaces.find_for_user(auth.user_id).await?;
    Ok(Json(workspaces.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateWorkspaceRequest>,
) -> Result<(StatusCode, Json<WorkspaceResponse>), ApiError> {
    validate_body(&body)?;

    let workspace = state
        .workspaces
        .create(body.name, body.description, auth.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(workspace))))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<String>,
) -> Result<Json<WorkspaceResponse>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;

    let workspace = state.workspaces.base.find_by_id(wid).await?;
    authz::require_member(&workspace, auth.user_id)?;

    Ok(Json(to_response(workspace)))
}

/// Admin: permanently deletes the workspace and everything under it.
/// Any other member: leaves the workspace, which never deletes it.
pub async fn delete_or_leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;

    let workspace = state.workspaces.base.find_by_id(wid).await?;
    let role = authz::require_member(&workspace, auth.user_id)?;

    match role {
        MemberRole::Admin => {
            cascade_delete(&state, wid).await?;
            info!(workspace_id = %wid, "Workspace deleted");
            Ok(Json(serde_json::json!({
                "message": "Workspace and all its data have been permanently deleted."
            })))
        }
        MemberRole::Collaborator => {
            state.workspaces.remove_member(wid, auth.user_id).await?;
            Ok(Json(serde_json::json!({
                "message": "You have successfully left the workspace."
            })))
        }
    }
}

/// Two-phase, best-effort: blobs first, then documents leaf-to-root. A
/// crash mid-way leaves orphans rather than dangling references.
pub(crate) async fn cascade_delete(state: &AppState, workspace_id: ObjectId) -> Result<(), ApiError> {
    let projects = state.projects.find_by_workspace(workspace_id).await?;
    let project_ids: Vec<ObjectId> = projects.iter().filter_map(|p| p.id).collect();

    let tasks = state.tasks.find_by_projects(&project_ids).await?;
    let task_ids: Vec<ObjectId> = tasks.iter().filter_map(|t| t.id).collect();

    for task in &tasks {
        for attachment in &task.attachments {
            state.storage.delete(&attachment.storage_key).await?;
        }
    }

    state.comments.delete_by_tasks(&task_ids).await?;
    state.tasks.delete_by_projects(&project_ids).await?;
    state.projects.delete_by_workspace(workspace_id).await?;
    state.invitations.delete_by_workspace(workspace_id).await?;
    state.workspaces.base.delete_by_id(workspace_id).await?;

    Ok(())
}

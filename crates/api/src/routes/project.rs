use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{parse_oid, validate_body},
    state::AppState,
};
use workhive_db::models::Project;
use workhive_services::authz;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "Project name is required"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub lead_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
    pub lead_id: String,
    pub created_at: String,
}

fn to_response(p: Project) -> ProjectResponse {
    ProjectResponse {
        id: p.id.unwrap().to_hex(),
        name: p.name,
        workspace_id: p.workspace_id.to_hex(),
        lead_id: p.lead_id.to_hex(),
        created_at: p.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;

    let workspace = state.workspaces.base.find_by_id(wid).await?;
    authz::require_member(&workspace, auth.user_id)?;

    let projects = state.projects.find_by_workspace(wid).await?;
    Ok(Json(projects.into_iter().map(to_response).collect()))
}

/// Any member; the requester becomes the project lead.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<String>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    validate_body(&body)?;
    let wid = parse_oid(&workspace_id, "workspace_id")?;

    let workspace = state.workspaces.base.find_by_id(wid).await?;
    authz::require_member(&workspace, auth.user_id)?;

    let project = state.projects.create(wid, body.name, auth.user_id).await?;

    Ok((StatusCode::CREATED, Json(to_response(project))))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id)): Path<(String, String)>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let pid = parse_oid(&project_id, "project_id")?;

    let workspace = state.workspaces.base.find_by_id(wid).await?;
    authz::require_admin(&workspace, auth.user_id)?;

    state.projects.find_in_workspace(wid, pid).await?;

    let lead_id = body
        .lead_id
        .as_deref()
        .map(|l| parse_oid(l, "lead_id"))
        .transpose()?;

    state.projects.update(wid, pid, body.name, lead_id).await?;

    let project = state.projects.find_in_workspace(wid, pid).await?;
    Ok(Json(to_response(project)))
}

/// Admin only. Deletes the project's tasks (releasing attachment blobs)
/// and their comments, then the project.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let pid = parse_oid(&project_id, "project_id")?;

    let workspace = state.workspaces.base.find_by_id(wid).await?;
    authz::require_admin(&workspace, auth.user_id)?;

    state.projects.find_in_workspace(wid, pid).await?;

    let project_ids: Vec<ObjectId> = vec![pid];
    let tasks = state.tasks.find_by_projects(&project_ids).await?;
    let task_ids: Vec<ObjectId> = tasks.iter().filter_map(|t| t.id).collect();

    for task in &tasks {
        for attachment in &task.attachments {
            state.storage.delete(&attachment.storage_key).await?;
        }
    }

    state.comments.delete_by_tasks(&task_ids).await?;
    state.tasks.delete_by_projects(&project_ids).await?;
    state.projects.delete(pid).await?;

    Ok(Json(serde_json::json!({ "message": "Project and tasks deleted" })))
}

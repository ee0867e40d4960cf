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
    routes::{load_project_scope, load_task_scope, parse_oid, validate_body},
    state::AppState,
};
use workhive_db::models::{Task, TaskPriority, TaskStatus};
use workhive_services::authz;
use workhive_services::dao::task::TaskUpdate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, message = "Please provide a task title"))]
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    /// Empty string means unassigned, matching form submissions.
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Empty string clears the assignee.
    pub assigned_to: Option<String>,
    /// Empty string clears the due date.
    pub due_date: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub project_id: String,
    pub assigned_to: Option<String>,
    pub created_by: Option<String>,
    pub due_date: Option<String>,
    pub tags: Vec<String>,
    pub attachments: Vec<AttachmentResponse>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub url: String,
    pub name: String,
    pub storage_key: String,
}

pub(crate) fn to_response(t: Task) -> TaskResponse {
    TaskResponse {
        id: t.id.unwrap().to_hex(),
        title: t.title,
        description: t.description,
        status: t.status,
        priority: t.priority,
        project_id: t.project_id.to_hex(),
        assigned_to: t.assigned_to.map(|a| a.to_hex()),
        created_by: t.created_by.map(|c| c.to_hex()),
        due_date: t
            .due_date
            .map(|d| d.try_to_rfc3339_string().unwrap_or_default()),
        tags: t.tags,
        attachments: t
            .attachments
            .into_iter()
            .map(|a| AttachmentResponse {
                url: a.url,
                name: a.name,
                storage_key: a.storage_key,
            })
            .collect(),
        created_at: t.created_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}

fn parse_assignee(value: Option<&str>) -> Result<Option<Option<ObjectId>>, ApiError> {
    match value {
        None => Ok(None),
        Some("") => Ok(Some(None)),
        Some(id) => Ok(Some(Some(parse_oid(id, "assigned_to")?))),
    }
}

fn parse_due_date(value: Option<&str>) -> Result<Option<Option<bson::DateTime>>, ApiError> {
    match value {
        None => Ok(None),
        Some("") => Ok(Some(None)),
        Some(raw) => {
            let parsed = chrono::DateTime::parse_from_rfc3339(raw)
                .map_err(|_| ApiError::BadRequest("Invalid due_date".to_string()))?;
            Ok(Some(Some(bson::DateTime::from_chrono(
                parsed.with_timezone(&chrono::Utc),
            ))))
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id)): Path<(String, String)>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let pid = parse_oid(&project_id, "project_id")?;

    load_project_scope(&state, auth.user_id, wid, pid).await?;

    let tasks = state.tasks.find_by_project(pid).await?;
    Ok(Json(tasks.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id)): Path<(String, String)>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    validate_body(&body)?;
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let pid = parse_oid(&project_id, "project_id")?;

    load_project_scope(&state, auth.user_id, wid, pid).await?;

    let assigned_to = parse_assignee(body.assigned_to.as_deref())?.flatten();
    let due_date = parse_due_date(body.due_date.as_deref())?.flatten();

    let task = state
        .tasks
        .create(
            pid,
            body.title,
            body.description,
            body.priority.unwrap_or_default(),
            assigned_to,
            auth.user_id,
            due_date,
            body.tags,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_response(task))))
}

/// Any member may update a task (Kanban moves); `created_by` and
/// `project_id` are never touched.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id, task_id)): Path<(String, String, String)>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let pid = parse_oid(&project_id, "project_id")?;
    let tid = parse_oid(&task_id, "task_id")?;

    load_task_scope(&state, auth.user_id, wid, pid, tid).await?;

    let update = TaskUpdate {
        title: body.title,
        description: body.description,
        status: body.status,
        priority: body.priority,
        assigned_to: parse_assignee(body.assigned_to.as_deref())?,
        due_date: parse_due_date(body.due_date.as_deref())?,
        tags: body.tags,
    };

    state.tasks.update(tid, update).await?;

    let task = state.tasks.find_in_project(pid, tid).await?;
    Ok(Json(to_response(task)))
}

/// Workspace Admin or the task's creator; attachment blobs are released
/// before the document goes away.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id, task_id)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let pid = parse_oid(&project_id, "project_id")?;
    let tid = parse_oid(&task_id, "task_id")?;

    let (workspace, _project, task, _role) =
        load_task_scope(&state, auth.user_id, wid, pid, tid).await?;

    authz::require_task_delete(&workspace, &task, auth.user_id)?;

    for attachment in &task.attachments {
        state.storage.delete(&attachment.storage_key).await?;
    }

    state.comments.delete_by_tasks(&[tid]).await?;
    state.tasks.delete(tid).await?;

    Ok(Json(serde_json::json!({ "message": "Task removed" })))
}

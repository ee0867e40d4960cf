use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use bson::DateTime;
use serde::Serialize;

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{load_task_scope, parse_oid},
    state::AppState,
};
use workhive_db::models::Attachment;

#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub url: String,
    pub name: String,
    pub storage_key: String,
}

/// Multipart form with a single `file` field. The blob is written first;
/// only then is the attachment recorded on the task.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id, task_id)): Path<(String, String, String)>,
    mut multipart: Multipart,
) -> Result<Json<AttachmentResponse>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let pid = parse_oid(&project_id, "project_id")?;
    let tid = parse_oid(&task_id, "task_id")?;

    load_task_scope(&state, auth.user_id, wid, pid, tid).await?;

    let mut file_data: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("unnamed").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
            file_data = Some((filename, bytes.to_vec()));
        }
    }

    let (filename, bytes) =
        file_data.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let key = state
        .storage
        .put(&format!("tasks/{}", tid.to_hex()), &bytes)
        .await?;

    let attachment = Attachment {
        url: format!("/uploads/{}", key),
        name: filename,
        storage_key: key,
        created_at: DateTime::now(),
    };

    state.tasks.push_attachment(tid, &attachment).await?;

    Ok(Json(AttachmentResponse {
        url: attachment.url,
        name: attachment.name,
        storage_key: attachment.storage_key,
    }))
}

/// The blob is removed from storage before the entry leaves the list; a
/// crash in between leaves a list entry pointing nowhere rather than an
/// unreferenced blob.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id, task_id, attachment_id)): Path<(
        String,
        String,
        String,
        String,
    )>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let pid = parse_oid(&project_id, "project_id")?;
    let tid = parse_oid(&task_id, "task_id")?;

    let (_workspace, _project, task, _role) =
        load_task_scope(&state, auth.user_id, wid, pid, tid).await?;

    let storage_key = format!("tasks/{}/{}", tid.to_hex(), attachment_id);
    if !task.attachments.iter().any(|a| a.storage_key == storage_key) {
        return Err(ApiError::NotFound("Attachment not found".to_string()));
    }

    state.storage.delete(&storage_key).await?;
    state.tasks.pull_attachment(tid, &storage_key).await?;

    Ok(Json(serde_json::json!({ "message": "Attachment removed" })))
}

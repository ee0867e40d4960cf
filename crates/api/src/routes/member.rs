use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::doc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::auth::AuthUser,
    routes::{parse_oid, validate_body},
    state::AppState,
};
use workhive_services::authz;
use workhive_services::dao::base::DaoError;

#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceMemberResponse {
    pub user_id: String,
    pub role: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<WorkspaceMemberResponse>>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;

    let workspace = state.workspaces.base.find_by_id(wid).await?;
    authz::require_member(&workspace, auth.user_id)?;

    let user_ids: Vec<_> = workspace.members.iter().map(|m| m.user_id).collect();
    let users = state
        .users
        .base
        .find_many(doc! { "_id": { "$in": user_ids } }, None)
        .await?;

    // Members whose user record vanished are dropped from the listing.
    let response = workspace
        .members
        .iter()
        .filter_map(|m| {
            users
                .iter()
                .find(|u| u.id == Some(m.user_id))
                .map(|u| WorkspaceMemberResponse {
                    user_id: m.user_id.to_hex(),
                    role: format!("{:?}", m.role),
                    name: u.name.clone(),
                    email: u.email.clone(),
                    avatar: u.avatar.clone(),
                })
        })
        .collect();

    Ok(Json(response))
}

/// Creates a Pending invitation; membership is only granted when the
/// invited user accepts.
pub async fn invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<String>,
    Json(body): Json<InviteMemberRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    validate_body(&body)?;
    let wid = parse_oid(&workspace_id, "workspace_id")?;

    let workspace = state.workspaces.base.find_by_id(wid).await?;
    authz::require_admin(&workspace, auth.user_id)?;

    let invited = state
        .users
        .find_by_email(&body.email)
        .await
        .map_err(|e| match e {
            DaoError::NotFound => ApiError::NotFound("User not found".to_string()),
            other => ApiError::from(other),
        })?;
    let invited_id = invited.id.unwrap();

    if authz::role_of(&workspace, invited_id).is_some() {
        return Err(ApiError::Conflict("User is already a member".to_string()));
    }

    let invitation = state
        .invitations
        .create(wid, invited_id, auth.user_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "invitation_id": invitation.id.unwrap().to_hex(),
            "message": format!("Successfully invited {}.", invited.name),
        })),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, user_id)): Path<(String, String)>,
) -> Result<Json<WorkspaceMemberResponse>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let uid = parse_oid(&user_id, "user_id")?;

    let workspace = state.workspaces.base.find_by_id(wid).await?;
    authz::require_member(&workspace, auth.user_id)?;

    let role = authz::role_of(&workspace, uid)
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;
    let user = state.users.base.find_by_id(uid).await?;

    Ok(Json(WorkspaceMemberResponse {
        user_id: uid.to_hex(),
        role: format!("{:?}", role),
        name: user.name,
        email: user.email,
        avatar: user.avatar,
    }))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, user_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let wid = parse_oid(&workspace_id, "workspace_id")?;
    let uid = parse_oid(&user_id, "user_id")?;

    let workspace = state.workspaces.base.find_by_id(wid).await?;
    authz::require_admin(&workspace, auth.user_id)?;

    if uid == auth.user_id {
        return Err(ApiError::BadRequest(
            "Admins cannot remove themselves; delete the workspace instead".to_string(),
        ));
    }

    let removed = state.workspaces.remove_member(wid, uid).await?;
    if !removed {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Member removed" })))
}

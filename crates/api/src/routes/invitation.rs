use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::{error::ApiError, extractors::auth::AuthUser, routes::parse_oid, state::AppState};
use workhive_db::models::{Invitation, InvitationStatus, MemberRole};
use workhive_services::dao::base::DaoError;

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub workspace_id: String,
    pub workspace_name: String,
    pub sender_id: String,
    pub sender_name: String,
    pub status: String,
    pub created_at: String,
}

pub async fn mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<InvitationResponse>>, ApiError> {
    let invitations = state.invitations.find_pending_for_user(auth.user_id).await?;

    let mut response = Vec::with_capacity(invitations.len());
    for invitation in invitations {
        // Enrich with names; skip entries whose workspace disappeared
        // under us (cascade delete race).
        let Ok(workspace) = state
            .workspaces
            .base
            .find_by_id(invitation.workspace_id)
            .await
        else {
            continue;
        };
        let sender_name = match state.users.base.find_by_id(invitation.sender_id).await {
            Ok(sender) => sender.name,
            Err(_) => String::new(),
        };

        response.push(InvitationResponse {
            id: invitation.id.unwrap().to_hex(),
            workspace_id: invitation.workspace_id.to_hex(),
            workspace_name: workspace.name,
            sender_id: invitation.sender_id.to_hex(),
            sender_name,
            status: format!("{:?}", invitation.status),
            created_at: invitation
                .created_at
                .try_to_rfc3339_string()
                .unwrap_or_default(),
        });
    }

    Ok(Json(response))
}

/// Invited user only. Transitions Pending -> Accepted, then adds the
/// membership; the guarded push makes a replayed accept a no-op on the
/// member list.
pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invitation_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let invitation = load_own_invitation(&state, &auth, &invitation_id).await?;
    let iid = invitation.id.unwrap();

    // Workspace must still exist before we consume the invitation.
    state
        .workspaces
        .base
        .find_by_id(invitation.workspace_id)
        .await
        .map_err(|e| match e {
            DaoError::NotFound => ApiError::NotFound("Workspace not found".to_string()),
            other => ApiError::from(other),
        })?;

    state
        .invitations
        .transition(iid, InvitationStatus::Accepted)
        .await?;

    state
        .workspaces
        .add_member(invitation.workspace_id, auth.user_id, MemberRole::Collaborator)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Invitation accepted" })))
}

/// Invited user only. Flips the status; nothing else changes.
pub async fn decline(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invitation_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let invitation = load_own_invitation(&state, &auth, &invitation_id).await?;

    state
        .invitations
        .transition(invitation.id.unwrap(), InvitationStatus::Declined)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Invitation declined" })))
}

async fn load_own_invitation(
    state: &AppState,
    auth: &AuthUser,
    invitation_id: &str,
) -> Result<Invitation, ApiError> {
    let iid = parse_oid(invitation_id, "invitation_id")?;

    let invitation = state.invitations.base.find_by_id(iid).await?;
    if invitation.invited_user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "This invitation is not addressed to you".to_string(),
        ));
    }
    Ok(invitation)
}

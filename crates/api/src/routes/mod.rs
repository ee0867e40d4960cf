pub mod attachment;
pub mod auth;
pub mod comment;
pub mod file;
pub mod invitation;
pub mod member;
pub mod project;
pub mod task;
pub mod workspace;

use bson::oid::ObjectId;
use validator::Validate;
use workhive_db::models::{MemberRole, Project, Task, Workspace};

use crate::{error::ApiError, state::AppState};

pub(crate) fn parse_oid(value: &str, name: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(value).map_err(|_| ApiError::BadRequest(format!("Invalid {}", name)))
}

pub(crate) fn validate_body<T: Validate>(body: &T) -> Result<(), ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))
}

/// Loads the workspace, gates on membership, and resolves the project
/// within it. Missing entities are NotFound; a non-member is Forbidden.
pub(crate) async fn load_project_scope(
    state: &AppState,
    user_id: ObjectId,
    workspace_id: ObjectId,
    project_id: ObjectId,
) -> Result<(Workspace, Project, MemberRole), ApiError> {
    let workspace = state.workspaces.base.find_by_id(workspace_id).await?;
    let role = workhive_services::authz::require_member(&workspace, user_id)?;
    let project = state
        .projects
        .find_in_workspace(workspace_id, project_id)
        .await?;
    Ok((workspace, project, role))
}

pub(crate) async fn load_task_scope(
    state: &AppState,
    user_id: ObjectId,
    workspace_id: ObjectId,
    project_id: ObjectId,
    task_id: ObjectId,
) -> Result<(Workspace, Project, Task, MemberRole), ApiError> {
    let (workspace, project, role) =
        load_project_scope(state, user_id, workspace_id, project_id).await?;
    let task = state.tasks.find_in_project(project_id, task_id).await?;
    Ok((workspace, project, task, role))
}

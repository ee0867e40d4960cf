//! Role checks for workspace-scoped operations.
//!
//! Every mutating route loads the workspace document and gates on the
//! requester's role in its embedded member list before touching anything
//! else. Failures are classified as Forbidden (member exists, lacks role)
//! and never silently no-op; absent entities are the caller's NotFound.

use bson::oid::ObjectId;
use workhive_db::models::{MemberRole, Task, Workspace};

use crate::dao::base::{DaoError, DaoResult};

pub fn role_of(workspace: &Workspace, user_id: ObjectId) -> Option<MemberRole> {
    workspace
        .members
        .iter()
        .find(|m| m.user_id == user_id)
        .map(|m| m.role)
}

pub fn require_member(workspace: &Workspace, user_id: ObjectId) -> DaoResult<MemberRole> {
    role_of(workspace, user_id).ok_or_else(|| {
        DaoError::Forbidden("You are not a member of this workspace".to_string())
    })
}

/// Admin-only gate: inviting/removing members, deleting the workspace,
/// editing or deleting projects.
pub fn require_admin(workspace: &Workspace, user_id: ObjectId) -> DaoResult<()> {
    match require_member(workspace, user_id)? {
        MemberRole::Admin => Ok(()),
        MemberRole::Collaborator => Err(DaoError::Forbidden(
            "Only Admins can perform this action".to_string(),
        )),
    }
}

/// Workspace Admin, or the task's creator. Tasks without a recorded creator
/// (documents predating ownership tracking) are owned by no one, so only
/// Admins may delete them.
pub fn can_delete_task(workspace: &Workspace, task: &Task, user_id: ObjectId) -> bool {
    if role_of(workspace, user_id) == Some(MemberRole::Admin) {
        return true;
    }
    task.created_by == Some(user_id)
}

pub fn require_task_delete(
    workspace: &Workspace,
    task: &Task,
    user_id: ObjectId,
) -> DaoResult<()> {
    if can_delete_task(workspace, task, user_id) {
        Ok(())
    } else {
        Err(DaoError::Forbidden(
            "Permission denied: you are not the Admin or the task creator".to_string(),
        ))
    }
}

use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use workhive_db::models::{Invitation, InvitationStatus};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct InvitationDao {
    pub base: BaseDao<Invitation>,
}

impl InvitationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Invitation::COLLECTION),
        }
    }

    /// Rejects when a Pending invitation for the same (workspace, user)
    /// pair already exists.
    pub async fn create(
        &self,
        workspace_id: ObjectId,
        invited_user_id: ObjectId,
        sender_id: ObjectId,
    ) -> DaoResult<Invitation> {
        let existing = self
            .base
            .count(doc! {
                "workspace_id": workspace_id,
                "invited_user_id": invited_user_id,
                "status": "pending",
            })
            .await?;
        if existing > 0 {
            return Err(DaoError::Conflict(
                "User already has a pending invitation to this workspace".to_string(),
            ));
        }

        let now = DateTime::now();
        let invitation = Invitation {
            id: None,
            workspace_id,
            invited_user_id,
            sender_id,
            status: InvitationStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&invitation).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_pending_for_user(&self, user_id: ObjectId) -> DaoResult<Vec<Invitation>> {
        self.base
            .find_many(
                doc! { "invited_user_id": user_id, "status": "pending" },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    /// Pending -> Accepted/Declined. The filter pins the current status, so
    /// a reused invitation is a no-op and reported as a conflict. The
    /// document is kept as history.
    pub async fn transition(
        &self,
        invitation_id: ObjectId,
        to: InvitationStatus,
    ) -> DaoResult<()> {
        let to = bson::to_bson(&to).map_err(bson::ser::Error::from)?;
        let updated = self
            .base
            .update_one(
                doc! { "_id": invitation_id, "status": "pending" },
                doc! { "$set": { "status": to } },
            )
            .await?;

        if !updated {
            return Err(DaoError::Conflict(
                "Invitation is no longer pending".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn delete_by_workspace(&self, workspace_id: ObjectId) -> DaoResult<u64> {
        self.base
            .delete_many(doc! { "workspace_id": workspace_id })
            .await
    }
}

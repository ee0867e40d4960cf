use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use workhive_db::models::{Member, MemberRole, Workspace};

use super::base::{BaseDao, DaoResult};

pub struct WorkspaceDao {
    pub base: BaseDao<Workspace>,
}

impl WorkspaceDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Workspace::COLLECTION),
        }
    }

    /// The creator becomes the sole Admin member.
    pub async fn create(
        &self,
        name: String,
        description: String,
        creator_id: ObjectId,
    ) -> DaoResult<Workspace> {
        let now = DateTime::now();
        let workspace = Workspace {
            id: None,
            name,
            description,
            members: vec![Member {
                user_id: creator_id,
                role: MemberRole::Admin,
            }],
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&workspace).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_for_user(&self, user_id: ObjectId) -> DaoResult<Vec<Workspace>> {
        self.base
            .find_many(
                doc! { "members.user_id": user_id },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    /// Guarded push: the filter excludes workspaces already holding the user,
    /// so a concurrent or repeated add can never produce a duplicate entry.
    /// Returns `false` when the user was already a member.
    pub async fn add_member(
        &self,
        workspace_id: ObjectId,
        user_id: ObjectId,
        role: MemberRole,
    ) -> DaoResult<bool> {
        let role = bson::to_bson(&role).map_err(bson::ser::Error::from)?;
        self.base
            .update_one(
                doc! { "_id": workspace_id, "members.user_id": { "$ne": user_id } },
                doc! { "$push": { "members": { "user_id": user_id, "role": role } } },
            )
            .await
    }

    /// Returns `false` when the user was not a member. The filter requires
    /// membership so the write never reports success for a no-op.
    pub async fn remove_member(
        &self,
        workspace_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! { "_id": workspace_id, "members.user_id": user_id },
                doc! { "$pull": { "members": { "user_id": user_id } } },
            )
            .await
    }
}

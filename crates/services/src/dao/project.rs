use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use workhive_db::models::Project;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct ProjectDao {
    pub base: BaseDao<Project>,
}

impl ProjectDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Project::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        workspace_id: ObjectId,
        name: String,
        lead_id: ObjectId,
    ) -> DaoResult<Project> {
        let now = DateTime::now();
        let project = Project {
            id: None,
            name,
            workspace_id,
            lead_id,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&project).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_workspace(&self, workspace_id: ObjectId) -> DaoResult<Vec<Project>> {
        self.base
            .find_many(
                doc! { "workspace_id": workspace_id },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    pub async fn find_in_workspace(
        &self,
        workspace_id: ObjectId,
        project_id: ObjectId,
    ) -> DaoResult<Project> {
        self.base
            .find_one(doc! { "_id": project_id, "workspace_id": workspace_id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    /// `workspace_id` is immutable; only name and lead are updatable.
    pub async fn update(
        &self,
        workspace_id: ObjectId,
        project_id: ObjectId,
        name: Option<String>,
        lead_id: Option<ObjectId>,
    ) -> DaoResult<bool> {
        let mut set_doc = doc! {};
        if let Some(name) = name {
            set_doc.insert("name", name);
        }
        if let Some(lead_id) = lead_id {
            set_doc.insert("lead_id", lead_id);
        }

        if set_doc.is_empty() {
            return Ok(false);
        }

        self.base
            .update_one(
                doc! { "_id": project_id, "workspace_id": workspace_id },
                doc! { "$set": set_doc },
            )
            .await
    }

    pub async fn delete(&self, project_id: ObjectId) -> DaoResult<bool> {
        self.base.delete_by_id(project_id).await
    }

    pub async fn delete_by_workspace(&self, workspace_id: ObjectId) -> DaoResult<u64> {
        self.base
            .delete_many(doc! { "workspace_id": workspace_id })
            .await
    }
}

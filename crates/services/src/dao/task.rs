use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use workhive_db::models::{Attachment, Task, TaskPriority, TaskStatus};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct TaskDao {
    pub base: BaseDao<Task>,
}

#[derive(Debug, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Option<ObjectId>>,
    pub due_date: Option<Option<DateTime>>,
    pub tags: Option<Vec<String>>,
}

impl TaskDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Task::COLLECTION),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        project_id: ObjectId,
        title: String,
        description: Option<String>,
        priority: TaskPriority,
        assigned_to: Option<ObjectId>,
        created_by: ObjectId,
        due_date: Option<DateTime>,
        tags: Vec<String>,
    ) -> DaoResult<Task> {
        let now = DateTime::now();
        let task = Task {
            id: None,
            title,
            description,
            status: TaskStatus::Todo,
            priority,
            project_id,
            assigned_to,
            created_by: Some(created_by),
            due_date,
            tags,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&task).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_project(&self, project_id: ObjectId) -> DaoResult<Vec<Task>> {
        self.base
            .find_many(
                doc! { "project_id": project_id },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    pub async fn find_in_project(
        &self,
        project_id: ObjectId,
        task_id: ObjectId,
    ) -> DaoResult<Task> {
        self.base
            .find_one(doc! { "_id": task_id, "project_id": project_id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_by_projects(&self, project_ids: &[ObjectId]) -> DaoResult<Vec<Task>> {
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(doc! { "project_id": { "$in": project_ids } }, None)
            .await
    }

    /// `created_by` and `project_id` are immutable and never part of the
    /// update document.
    pub async fn update(&self, task_id: ObjectId, update: TaskUpdate) -> DaoResult<bool> {
        let mut set_doc = doc! {};

        if let Some(title) = update.title {
            set_doc.insert("title", title);
        }
        if let Some(description) = update.description {
            set_doc.insert("description", description);
        }
        if let Some(status) = update.status {
            set_doc.insert("status", bson::to_bson(&status).map_err(bson::ser::Error::from)?);
        }
        if let Some(priority) = update.priority {
            set_doc.insert(
                "priority",
                bson::to_bson(&priority).map_err(bson::ser::Error::from)?,
            );
        }
        if let Some(assigned_to) = update.assigned_to {
            set_doc.insert("assigned_to", assigned_to);
        }
        if let Some(due_date) = update.due_date {
            set_doc.insert("due_date", due_date);
        }
        if let Some(tags) = update.tags {
            set_doc.insert("tags", tags);
        }

        if set_doc.is_empty() {
            return Ok(false);
        }

        self.base
            .update_by_id(task_id, doc! { "$set": set_doc })
            .await
    }

    pub async fn push_attachment(
        &self,
        task_id: ObjectId,
        attachment: &Attachment,
    ) -> DaoResult<bool> {
        let attachment = bson::to_bson(attachment).map_err(bson::ser::Error::from)?;
        self.base
            .update_by_id(task_id, doc! { "$push": { "attachments": attachment } })
            .await
    }

    pub async fn pull_attachment(
        &self,
        task_id: ObjectId,
        storage_key: &str,
    ) -> DaoResult<bool> {
        self.base
            .update_by_id(
                task_id,
                doc! { "$pull": { "attachments": { "storage_key": storage_key } } },
            )
            .await
    }

    pub async fn delete(&self, task_id: ObjectId) -> DaoResult<bool> {
        self.base.delete_by_id(task_id).await
    }

    pub async fn delete_by_projects(&self, project_ids: &[ObjectId]) -> DaoResult<u64> {
        if project_ids.is_empty() {
            return Ok(0);
        }
        self.base
            .delete_many(doc! { "project_id": { "$in": project_ids } })
            .await
    }
}

use bson::{DateTime, doc, oid::ObjectId};
use mongodb::Database;
use workhive_db::models::Comment;

use super::base::{BaseDao, DaoResult};

pub struct CommentDao {
    pub base: BaseDao<Comment>,
}

impl CommentDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Comment::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        task_id: ObjectId,
        user_id: ObjectId,
        content: String,
    ) -> DaoResult<Comment> {
        let comment = Comment {
            id: None,
            content,
            task_id,
            user_id,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&comment).await?;
        self.base.find_by_id(id).await
    }

    /// Oldest first, chat style.
    pub async fn find_by_task(&self, task_id: ObjectId) -> DaoResult<Vec<Comment>> {
        self.base
            .find_many(doc! { "task_id": task_id }, Some(doc! { "created_at": 1 }))
            .await
    }

    pub async fn delete_by_tasks(&self, task_ids: &[ObjectId]) -> DaoResult<u64> {
        if task_ids.is_empty() {
            return Ok(0);
        }
        self.base
            .delete_many(doc! { "task_id": { "$in": task_ids } })
            .await
    }
}

use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Immutable after creation; there is no edit endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub content: String,
    pub task_id: ObjectId,
    pub user_id: ObjectId,
    pub created_at: DateTime,
}

impl Comment {
    pub const COLLECTION: &'static str = "comments";
}

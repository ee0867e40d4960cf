use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    /// Immutable after creation.
    pub workspace_id: ObjectId,
    pub lead_id: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Project {
    pub const COLLECTION: &'static str = "projects";
}

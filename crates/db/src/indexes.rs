use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        "users",
        vec![index_unique(bson::doc! { "email": 1 })],
    )
    .await?;

    // Workspaces
    create_indexes(
        db,
        "workspaces",
        vec![index(bson::doc! { "members.user_id": 1 })],
    )
    .await?;

    // Invitations
    create_indexes(
        db,
        "invitations",
        vec![
            index(bson::doc! { "invited_user_id": 1, "status": 1 }),
            index(bson::doc! { "workspace_id": 1, "invited_user_id": 1, "status": 1 }),
        ],
    )
    .await?;

    // Projects
    create_indexes(
        db,
        "projects",
        vec![index(bson::doc! { "workspace_id": 1, "created_at": -1 })],
    )
    .await?;

    // Tasks
    create_indexes(
        db,
        "tasks",
        vec![
            index(bson::doc! { "project_id": 1, "created_at": -1 }),
            index(bson::doc! { "assigned_to": 1 }),
        ],
    )
    .await?;

    // Comments
    create_indexes(
        db,
        "comments",
        vec![index(bson::doc! { "task_id": 1, "created_at": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}

use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn created_task_has_defaults_and_creator() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_workspace("taskdef").await;

    let project_id = app
        .create_project(&seeded.admin.token, &seeded.workspace_id, "Board")
        .await;

    let resp = app
        .auth_post(
            &format!(
                "/api/v1/workspaces/{}/projects/{}/tasks",
                seeded.workspace_id, project_id
            ),
            &seeded.collaborator.token,
        )
        .json(&serde_json::json!({
            "title": "Write the docs",
            "priority": "high",
            "tags": ["docs"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"].as_str(), Some("todo"));
    assert_eq!(json["priority"].as_str(), Some("high"));
    assert_eq!(
        json["created_by"].as_str(),
        Some(seeded.collaborator.id.as_str())
    );
    assert!(json["assigned_to"].is_null());
}

#[tokio::test]
async fn kanban_move_updates_status() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_workspace("kanban").await;

    let project_id = app
        .create_project(&seeded.admin.token, &seeded.workspace_id, "Board")
        .await;
    let task_id = app
        .create_task(
            &seeded.admin.token,
            &seeded.workspace_id,
            &project_id,
            "Move me",
        )
        .await;

    // Any member can move tasks between columns
    let resp = app
        .auth_patch(
            &format!(
                "/api/v1/workspaces/{}/projects/{}/tasks/{}",
                seeded.workspace_id, project_id, task_id
            ),
            &seeded.collaborator.token,
        )
        .json(&serde_json::json!({ "status": "in_progress" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"].as_str(), Some("in_progress"));
}

#[tokio::test]
async fn created_by_is_immutable_across_updates() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_workspace("immut").await;

    let project_id = app
        .create_project(&seeded.admin.token, &seeded.workspace_id, "Board")
        .await;
    let task_id = app
        .create_task(
            &seeded.collaborator.token,
            &seeded.workspace_id,
            &project_id,
            "Owned",
        )
        .await;

    // A hostile update naming created_by is ignored
    let resp = app
        .auth_patch(
            &format!(
                "/api/v1/workspaces/{}/projects/{}/tasks/{}",
                seeded.workspace_id, project_id, task_id
            ),
            &seeded.admin.token,
        )
        .json(&serde_json::json!({
            "title": "Still owned",
            "created_by": seeded.admin.id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(
        json["created_by"].as_str(),
        Some(seeded.collaborator.id.as_str())
    );
}

#[tokio::test]
async fn task_deletion_respects_ownership_override() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_workspace("taskdel").await;

    let other = app
        .register_user("Third", "third@taskdel.test", "Secret123!")
        .await;
    // Add the third member via the normal invite+accept flow
    let resp = app
        .auth_post(
            &format!("/api/v1/workspaces/{}/members", seeded.workspace_id),
            &seeded.admin.token,
        )
        .json(&serde_json::json!({ "email": other.email }))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let invitation_id = json["invitation_id"].as_str().unwrap();
    app.auth_post(
        &format!("/api/v1/workspaces/invitations/{}/accept", invitation_id),
        &other.token,
    )
    .send()
    .await
    .unwrap();

    let project_id = app
        .create_project(&seeded.admin.token, &seeded.workspace_id, "Board")
        .await;

    let task_id = app
        .create_task(
            &seeded.collaborator.token,
            &seeded.workspace_id,
            &project_id,
            "Creator-owned",
        )
        .await;
    let task_url = format!(
        "/api/v1/workspaces/{}/projects/{}/tasks/{}",
        seeded.workspace_id, project_id, task_id
    );

    // A member who is neither Admin nor creator is denied
    let resp = app.auth_delete(&task_url, &other.token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // The creator may delete their own task
    let resp = app
        .auth_delete(&task_url, &seeded.collaborator.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // The admin may delete anyone's task
    let task_id = app
        .create_task(
            &seeded.collaborator.token,
            &seeded.workspace_id,
            &project_id,
            "Admin-deletable",
        )
        .await;
    let resp = app
        .auth_delete(
            &format!(
                "/api/v1/workspaces/{}/projects/{}/tasks/{}",
                seeded.workspace_id, project_id, task_id
            ),
            &seeded.admin.token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn legacy_task_without_creator_denies_non_admins() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_workspace("legacy").await;

    let project_id = app
        .create_project(&seeded.admin.token, &seeded.workspace_id, "Board")
        .await;

    // A document written before ownership tracking: no created_by field
    let pid = bson::oid::ObjectId::parse_str(&project_id).unwrap();
    let now = bson::DateTime::now();
    let insert = app
        .db
        .collection::<bson::Document>("tasks")
        .insert_one(bson::doc! {
            "title": "Ancient task",
            "description": bson::Bson::Null,
            "status": "todo",
            "priority": "medium",
            "project_id": pid,
            "assigned_to": bson::Bson::Null,
            "due_date": bson::Bson::Null,
            "tags": [],
            "attachments": [],
            "created_at": now,
            "updated_at": now,
        })
        .await
        .unwrap();
    let task_id = insert.inserted_id.as_object_id().unwrap().to_hex();
    let task_url = format!(
        "/api/v1/workspaces/{}/projects/{}/tasks/{}",
        seeded.workspace_id, project_id, task_id
    );

    let resp = app
        .auth_delete(&task_url, &seeded.collaborator.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_delete(&task_url, &seeded.admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

/// The full collaboration scenario: workspace -> invite -> accept ->
/// task -> admin delete.
#[tokio::test]
async fn q1_planning_scenario() {
    let app = TestApp::spawn().await;

    let admin = app
        .register_user("Alice", "alice@q1.test", "Secret123!")
        .await;
    let workspace_id = app.create_workspace(&admin.token, "Q1 Planning").await;

    let b = app.register_user("Bob", "bob@q1.test", "Secret123!").await;

    let resp = app
        .auth_post(
            &format!("/api/v1/workspaces/{}/members", workspace_id),
            &admin.token,
        )
        .json(&serde_json::json!({ "email": b.email }))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let invitation_id = json["invitation_id"].as_str().unwrap();

    app.auth_post(
        &format!("/api/v1/workspaces/invitations/{}/accept", invitation_id),
        &b.token,
    )
    .send()
    .await
    .unwrap();

    // B appears as Collaborator
    let resp = app
        .auth_get(&format!("/api/v1/workspaces/{}", workspace_id), &b.token)
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    let member = json["members"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["user_id"].as_str() == Some(b.id.as_str()))
        .unwrap();
    assert_eq!(member["role"].as_str(), Some("Collaborator"));

    // B creates a task, the admin deletes it
    let project_id = app
        .create_project(&b.token, &workspace_id, "Launch Prep")
        .await;
    let task_id = app
        .create_task(&b.token, &workspace_id, &project_id, "Draft announcement")
        .await;

    let resp = app
        .auth_delete(
            &format!(
                "/api/v1/workspaces/{}/projects/{}/tasks/{}",
                workspace_id, project_id, task_id
            ),
            &admin.token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(
            &format!(
                "/api/v1/workspaces/{}/projects/{}/tasks",
                workspace_id, project_id
            ),
            &b.token,
        )
        .send()
        .await
        .unwrap();
    let tasks: Vec<Value> = resp.json().await.unwrap();
    assert!(
        tasks.iter().all(|t| t["id"].as_str() != Some(task_id.as_str())),
        "deleted task still listed"
    );
}

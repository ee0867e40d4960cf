use crate::fixtures::test_app::TestApp;
use serde_json::Value;

async fn upload_attachment(
    app: &TestApp,
    token: &str,
    url: &str,
    filename: &str,
    bytes: &[u8],
) -> Value {
    let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name(filename.to_string());
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = app
        .auth_post(url, token)
        .multipart(form)
        .send()
        .await
        .expect("Upload failed");
    assert_eq!(
        resp.status().as_u16(),
        200,
        "Upload failed: {}",
        resp.text().await.unwrap_or_default()
    );
    resp.json().await.unwrap()
}

#[tokio::test]
async fn upload_records_attachment_and_stores_blob() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_workspace("upload").await;

    let project_id = app
        .create_project(&seeded.admin.token, &seeded.workspace_id, "Board")
        .await;
    let task_id = app
        .create_task(
            &seeded.admin.token,
            &seeded.workspace_id,
            &project_id,
            "Has files",
        )
        .await;
    let attachments_url = format!(
        "/api/v1/workspaces/{}/projects/{}/tasks/{}/attachments",
        seeded.workspace_id, project_id, task_id
    );

    let json = upload_attachment(
        &app,
        &seeded.admin.token,
        &attachments_url,
        "notes.txt",
        b"meeting notes",
    )
    .await;

    assert_eq!(json["name"].as_str(), Some("notes.txt"));
    let storage_key = json["storage_key"].as_str().unwrap().to_string();
    assert!(storage_key.starts_with(&format!("tasks/{}/", task_id)));

    // Blob is on disk under the app's upload dir
    assert!(app.upload_dir.join(&storage_key).exists());

    // Attachment appears on the task
    let resp = app
        .auth_get(
            &format!(
                "/api/v1/workspaces/{}/projects/{}/tasks",
                seeded.workspace_id, project_id
            ),
            &seeded.admin.token,
        )
        .send()
        .await
        .unwrap();
    let tasks: Vec<Value> = resp.json().await.unwrap();
    let attachments = tasks[0]["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(
        attachments[0]["url"].as_str(),
        Some(format!("/uploads/{}", storage_key).as_str())
    );

    // The public URL serves the bytes back
    let resp = app
        .client
        .get(app.url(&format!("/uploads/{}", storage_key)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"meeting notes");
}

#[tokio::test]
async fn deleting_attachment_releases_blob_then_list_entry() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_workspace("attdel").await;

    let project_id = app
        .create_project(&seeded.admin.token, &seeded.workspace_id, "Board")
        .await;
    let task_id = app
        .create_task(
            &seeded.admin.token,
            &seeded.workspace_id,
            &project_id,
            "Ephemeral",
        )
        .await;
    let attachments_url = format!(
        "/api/v1/workspaces/{}/projects/{}/tasks/{}/attachments",
        seeded.workspace_id, project_id, task_id
    );

    let json = upload_attachment(
        &app,
        &seeded.admin.token,
        &attachments_url,
        "drop.bin",
        b"bytes",
    )
    .await;
    let storage_key = json["storage_key"].as_str().unwrap().to_string();
    let attachment_id = storage_key.rsplit('/').next().unwrap();

    let resp = app
        .auth_delete(
            &format!("{}/{}", attachments_url, attachment_id),
            &seeded.admin.token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    assert!(!app.upload_dir.join(&storage_key).exists());

    let resp = app
        .auth_get(
            &format!(
                "/api/v1/workspaces/{}/projects/{}/tasks",
                seeded.workspace_id, project_id
            ),
            &seeded.admin.token,
        )
        .send()
        .await
        .unwrap();
    let tasks: Vec<Value> = resp.json().await.unwrap();
    assert!(tasks[0]["attachments"].as_array().unwrap().is_empty());

    // Deleting it again is a 404, not a crash
    let resp = app
        .auth_delete(
            &format!("{}/{}", attachments_url, attachment_id),
            &seeded.admin.token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn deleting_task_releases_its_blobs() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_workspace("taskblob").await;

    let project_id = app
        .create_project(&seeded.admin.token, &seeded.workspace_id, "Board")
        .await;
    let task_id = app
        .create_task(
            &seeded.admin.token,
            &seeded.workspace_id,
            &project_id,
            "Doomed",
        )
        .await;
    let attachments_url = format!(
        "/api/v1/workspaces/{}/projects/{}/tasks/{}/attachments",
        seeded.workspace_id, project_id, task_id
    );

    let json = upload_attachment(
        &app,
        &seeded.admin.token,
        &attachments_url,
        "gone.txt",
        b"soon gone",
    )
    .await;
    let storage_key = json["storage_key"].as_str().unwrap().to_string();
    assert!(app.upload_dir.join(&storage_key).exists());

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

    assert!(!app.upload_dir.join(&storage_key).exists());
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    // Small cap so the request clears the HTTP body limit and hits the
    // storage-level check.
    let app = TestApp::spawn_with_settings(|s| s.storage.max_upload_bytes = 1024).await;
    let seeded = app.seed_workspace("toobig").await;

    let project_id = app
        .create_project(&seeded.admin.token, &seeded.workspace_id, "Board")
        .await;
    let task_id = app
        .create_task(
            &seeded.admin.token,
            &seeded.workspace_id,
            &project_id,
            "Limits",
        )
        .await;

    let big = vec![0u8; (app.settings.storage.max_upload_bytes + 1) as usize];
    let part = reqwest::multipart::Part::bytes(big).file_name("big.bin");
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = app
        .auth_post(
            &format!(
                "/api/v1/workspaces/{}/projects/{}/tasks/{}/attachments",
                seeded.workspace_id, project_id, task_id
            ),
            &seeded.admin.token,
        )
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

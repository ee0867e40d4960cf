use crate::fixtures::test_app::TestApp;
use bson::doc;
use serde_json::Value;

#[tokio::test]
async fn register_login_me_round_trip() {
    let app = TestApp::spawn().await;

    let user = app
        .register_user("Ada Lovelace", "ada@example.test", "Secret123!")
        .await;

    let resp = app
        .auth_get("/api/v1/auth/me", &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["email"].as_str(), Some("ada@example.test"));
    assert_eq!(json["name"].as_str(), Some("Ada Lovelace"));
    // Password material must never reach clients
    assert!(json.get("password_hash").is_none());
    assert!(json.get("otp").is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::spawn().await;

    app.register_user("First", "dup@example.test", "Secret123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/v1/auth/register"))
        .json(&serde_json::json!({
            "name": "Second",
            "email": "dup@example.test",
            "password": "Secret123!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;

    app.register_user("Ada", "ada2@example.test", "Secret123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({
            "email": "ada2@example.test",
            "password": "wrong-password",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    // Unknown email yields the same status
    let resp = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({
            "email": "nobody@example.test",
            "password": "whatever",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/v1/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app
        .client
        .get(app.url("/api/v1/workspaces"))
        .header("Authorization", "Bearer not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn invalid_registration_body_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/v1/auth/register"))
        .json(&serde_json::json!({
            "name": "No Email",
            "email": "not-an-email",
            "password": "Secret123!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn password_change_requires_valid_otp() {
    let app = TestApp::spawn().await;

    let user = app
        .register_user("Otto", "otto@example.test", "Secret123!")
        .await;

    // No OTP requested yet
    let form = reqwest::multipart::Form::new()
        .text("password", "NewSecret123!")
        .text("otp", "123456");
    let resp = app
        .auth_patch("/api/v1/auth/update-profile", &user.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    // Request an OTP, then read it from the database (delivery is out of band)
    let resp = app
        .auth_post("/api/v1/auth/request-otp", &user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    // The code itself is never echoed back
    assert!(body["message"].as_str().unwrap().contains("OTP"));

    let uid = bson::oid::ObjectId::parse_str(&user.id).unwrap();
    let doc = app
        .db
        .collection::<bson::Document>("users")
        .find_one(doc! { "_id": uid })
        .await
        .unwrap()
        .unwrap();
    let otp = doc.get_str("otp").unwrap().to_string();
    assert_eq!(otp.len(), 6);

    // Wrong code is rejected
    let wrong = if otp == "000000" { "000001" } else { "000000" };
    let form = reqwest::multipart::Form::new()
        .text("password", "NewSecret123!")
        .text("otp", wrong.to_string());
    let resp = app
        .auth_patch("/api/v1/auth/update-profile", &user.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    // Correct code changes the password and clears OTP state
    let form = reqwest::multipart::Form::new()
        .text("password", "NewSecret123!")
        .text("otp", otp);
    let resp = app
        .auth_patch("/api/v1/auth/update-profile", &user.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({
            "email": "otto@example.test",
            "password": "NewSecret123!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let doc = app
        .db
        .collection::<bson::Document>("users")
        .find_one(doc! { "_id": uid })
        .await
        .unwrap()
        .unwrap();
    assert!(doc.get_str("otp").is_err(), "OTP should be cleared");
}

#[tokio::test]
async fn expired_otp_is_rejected() {
    let app = TestApp::spawn().await;

    let user = app
        .register_user("Late", "late@example.test", "Secret123!")
        .await;

    app.auth_post("/api/v1/auth/request-otp", &user.token)
        .send()
        .await
        .unwrap();

    let uid = bson::oid::ObjectId::parse_str(&user.id).unwrap();
    let users = app.db.collection::<bson::Document>("users");
    let doc = users.find_one(doc! { "_id": uid }).await.unwrap().unwrap();
    let otp = doc.get_str("otp").unwrap().to_string();

    // Force the expiry into the past
    let past = bson::DateTime::from_millis(bson::DateTime::now().timestamp_millis() - 60_000);
    users
        .update_one(doc! { "_id": uid }, doc! { "$set": { "otp_expires": past } })
        .await
        .unwrap();

    let form = reqwest::multipart::Form::new()
        .text("password", "NewSecret123!")
        .text("otp", otp);
    let resp = app
        .auth_patch("/api/v1/auth/update-profile", &user.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn profile_name_update_needs_no_otp() {
    let app = TestApp::spawn().await;

    let user = app
        .register_user("Old Name", "rename@example.test", "Secret123!")
        .await;

    let form = reqwest::multipart::Form::new().text("name", "New Name");
    let resp = app
        .auth_patch("/api/v1/auth/update-profile", &user.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["name"].as_str(), Some("New Name"));
}

#[tokio::test]
async fn public_profile_hides_sensitive_fields() {
    let app = TestApp::spawn().await;

    let user = app
        .register_user("Pub", "pub@example.test", "Secret123!")
        .await;
    let viewer = app
        .register_user("Viewer", "viewer@example.test", "Secret123!")
        .await;

    let resp = app
        .auth_get(&format!("/api/v1/auth/users/{}", user.id), &viewer.token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["name"].as_str(), Some("Pub"));
    assert!(json.get("password_hash").is_none());
    assert!(json.get("otp").is_none());
}

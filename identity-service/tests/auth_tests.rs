mod common;

use auth::AccessClaims;
use chrono::Duration;
use common::extract_query_param;
use common::refresh_cookie_value;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_register_sends_confirmation_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/registration")
        .json(&json!({
            "login": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let message = app.wait_for_email_to("nicola@example.com", 1).await;
    assert_eq!(message.to, "nicola@example.com");
    assert!(message
        .text_body
        .contains("/api/auth/registration-confirmation?code="));
    assert!(!extract_query_param(&message.text_body, "code").is_empty());
}

#[tokio::test]
async fn test_register_duplicate_login_conflict() {
    let app = TestApp::spawn().await;

    // Create first user
    app.post("/api/auth/registration")
        .json(&json!({
            "login": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Same login, different email
    let response = app
        .post("/api/auth/registration")
        .json(&json!({
            "login": "nicola",
            "email": "other@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["field"], "login");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_duplicate_email_conflict() {
    let app = TestApp::spawn().await;

    // Create first user
    app.post("/api/auth/registration")
        .json(&json!({
            "login": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Different login, same email
    let response = app
        .post("/api/auth/registration")
        .json(&json!({
            "login": "nicola2",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["field"], "email");
}

#[tokio::test]
async fn test_register_invalid_login() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/registration")
        .json(&json!({
            "login": "n",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("minimum 3 characters"));
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/registration")
        .json(&json!({
            "login": "nicola",
            "email": "not-an-email",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("email"));
}

#[tokio::test]
async fn test_confirm_registration_marks_email_confirmed() {
    let app = TestApp::spawn().await;

    app.post("/api/auth/registration")
        .json(&json!({
            "login": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let message = app.wait_for_email_to("nicola@example.com", 1).await;
    let code = extract_query_param(&message.text_body, "code");

    let response = app
        .post("/api/auth/registration-confirmation")
        .json(&json!({ "code": code }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Applying the same code a second time must fail
    let response = app
        .post("/api/auth/registration-confirmation")
        .json(&json!({ "code": code }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["field"], "code");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already confirmed"));
}

#[tokio::test]
async fn test_confirm_registration_unknown_code() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/registration-confirmation")
        .json(&json!({ "code": uuid::Uuid::new_v4().to_string() }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["field"], "code");
}

#[tokio::test]
async fn test_resend_confirmation_replaces_code() {
    let app = TestApp::spawn().await;

    app.post("/api/auth/registration")
        .json(&json!({
            "login": "nicola",
            "email": "nicola@example.com",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    let first = app.wait_for_email_to("nicola@example.com", 1).await;
    let old_code = extract_query_param(&first.text_body, "code");

    let response = app
        .post("/api/auth/registration-email-resending")
        .json(&json!({ "email": "nicola@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let second = app.wait_for_email_to("nicola@example.com", 2).await;
    let new_code = extract_query_param(&second.text_body, "code");
    assert_ne!(old_code, new_code);

    // The old code died by overwrite
    let response = app
        .post("/api/auth/registration-confirmation")
        .json(&json!({ "code": old_code }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The new one confirms
    let response = app
        .post("/api/auth/registration-confirmation")
        .json(&json!({ "code": new_code }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_resend_confirmation_unknown_email() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/registration-email-resending")
        .json(&json!({ "email": "ghost@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["field"], "email");
}

#[tokio::test]
async fn test_resend_confirmation_already_confirmed() {
    let app = TestApp::spawn().await;
    app.register_and_confirm("nicola", "nicola@example.com", "pass_word!")
        .await;

    let response = app
        .post("/api/auth/registration-email-resending")
        .json(&json!({ "email": "nicola@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["field"], "email");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already confirmed"));
}

#[tokio::test]
async fn test_login_sets_refresh_cookie() {
    let app = TestApp::spawn().await;
    app.register_and_confirm("nicola", "nicola@example.com", "pass_word!")
        .await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "login_or_email": "nicola",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let cookie_header = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("No Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie_header.starts_with("refreshToken="));
    assert!(cookie_header.contains("HttpOnly"));
    assert!(cookie_header.contains("Path=/"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["access_token"].is_string());
    assert!(!body["data"]["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_accepts_email_identifier() {
    let app = TestApp::spawn().await;
    app.register_and_confirm("nicola", "nicola@example.com", "pass_word!")
        .await;

    let (access_token, refresh_token) = app.login("nicola@example.com", "pass_word!").await;

    assert!(!access_token.is_empty());
    assert!(!refresh_token.is_empty());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::spawn().await;
    app.register_and_confirm("nicola", "nicola@example.com", "Correct_Password!")
        .await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "login_or_email": "nicola",
            "password": "Wrong_Password!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"].is_string());
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "login_or_email": "nonexistent",
            "password": "pass_word!"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rotation_blocks_replay() {
    let app = TestApp::spawn().await;
    app.register_and_confirm("nicola", "nicola@example.com", "pass_word!")
        .await;

    // 1. Login and capture the first refresh token
    let (_, old_refresh) = app.login("nicola", "pass_word!").await;

    // The session guard compares exp claims at second granularity, so the
    // rotated token must land on a later second than the original
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    // 2. Rotate: the old token buys a new pair
    let response = app
        .post("/api/auth/refresh-token")
        .header(
            reqwest::header::COOKIE,
            format!("refreshToken={}", old_refresh),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let new_refresh = refresh_cookie_value(&response);
    assert_ne!(old_refresh, new_refresh);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["access_token"].is_string());

    // 3. Replaying the rotated-away token must fail
    let response = app
        .post("/api/auth/refresh-token")
        .header(
            reqwest::header::COOKIE,
            format!("refreshToken={}", old_refresh),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 4. The current token still rotates normally
    let response = app
        .post("/api/auth/refresh-token")
        .header(
            reqwest::header::COOKIE,
            format!("refreshToken={}", new_refresh),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_cookie() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/refresh-token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_with_garbage_cookie() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/refresh-token")
        .header(reqwest::header::COOKIE, "refreshToken=not-a-token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_profile() {
    let app = TestApp::spawn().await;
    app.register_and_confirm("nicola", "nicola@example.com", "pass_word!")
        .await;

    let (access_token, _) = app.login("nicola", "pass_word!").await;

    let response = app
        .get_authenticated("/api/auth/me", &access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["login"], "nicola");
    assert_eq!(body["data"]["email"], "nicola@example.com");
    assert!(body["data"]["user_id"].is_string());
}

#[tokio::test]
async fn test_me_without_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/auth/me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_expired_token() {
    let app = TestApp::spawn().await;

    // Signed with the right key, but exp lies in the past
    let expired = app
        .token_codec
        .issue(&AccessClaims::new(
            uuid::Uuid::new_v4().to_string(),
            Duration::seconds(-60),
        ))
        .expect("Failed to issue token");

    let response = app
        .get_authenticated("/api/auth/me", &expired)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_recovery_resets_password() {
    let app = TestApp::spawn().await;
    app.register_and_confirm("nicola", "nicola@example.com", "old_pass!")
        .await;

    // 1. Request recovery
    let response = app
        .post("/api/auth/password-recovery")
        .json(&json!({ "email": "nicola@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // 2. Pull the recovery token from the second email (first was the
    //    registration confirmation)
    let message = app.wait_for_email_to("nicola@example.com", 2).await;
    assert!(message.text_body.contains("/auth/new-password?recoveryCode="));
    let recovery_code = extract_query_param(&message.text_body, "recoveryCode");

    // 3. Set the new password
    let response = app
        .post("/api/auth/new-password")
        .json(&json!({
            "new_password": "new_pass!",
            "recovery_code": recovery_code
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // 4. Old password no longer works
    let response = app
        .post("/api/auth/login")
        .json(&json!({
            "login_or_email": "nicola",
            "password": "old_pass!"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // 5. New password does
    let (access_token, _) = app.login("nicola", "new_pass!").await;
    assert!(!access_token.is_empty());
}

#[tokio::test]
async fn test_password_recovery_unknown_email_sends_unusable_token() {
    let app = TestApp::spawn().await;

    // The endpoint answers 204 either way, so an attacker cannot probe
    // which addresses are registered
    let response = app
        .post("/api/auth/password-recovery")
        .json(&json!({ "email": "ghost@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // An email still goes out, but its token resets nothing
    let message = app.wait_for_email_to("ghost@example.com", 1).await;
    let recovery_code = extract_query_param(&message.text_body, "recoveryCode");

    let response = app
        .post("/api/auth/new-password")
        .json(&json!({
            "new_password": "new_pass!",
            "recovery_code": recovery_code
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["field"], "recovery_code");
}

#[tokio::test]
async fn test_new_password_rejects_reused_code() {
    let app = TestApp::spawn().await;
    app.register_and_confirm("nicola", "nicola@example.com", "old_pass!")
        .await;

    app.post("/api/auth/password-recovery")
        .json(&json!({ "email": "nicola@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    let message = app.wait_for_email_to("nicola@example.com", 2).await;
    let recovery_code = extract_query_param(&message.text_body, "recoveryCode");

    // First use succeeds
    let response = app
        .post("/api/auth/new-password")
        .json(&json!({
            "new_password": "new_pass!",
            "recovery_code": recovery_code
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Second use of the same code is rejected
    let response = app
        .post("/api/auth/new-password")
        .json(&json!({
            "new_password": "another_pass!",
            "recovery_code": recovery_code
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The first reset stays in effect
    let (access_token, _) = app.login("nicola", "new_pass!").await;
    assert!(!access_token.is_empty());
}

#[tokio::test]
async fn test_new_password_rejects_garbage_code() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/auth/new-password")
        .json(&json!({
            "new_password": "new_pass!",
            "recovery_code": "not-a-token"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["field"], "recovery_code");
}

#[tokio::test]
async fn test_new_password_rejects_superseded_code() {
    let app = TestApp::spawn().await;
    app.register_and_confirm("nicola", "nicola@example.com", "old_pass!")
        .await;

    // Two recovery requests; only the second token is stored
    app.post("/api/auth/password-recovery")
        .json(&json!({ "email": "nicola@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    let first = app.wait_for_email_to("nicola@example.com", 2).await;
    let first_code = extract_query_param(&first.text_body, "recoveryCode");

    app.post("/api/auth/password-recovery")
        .json(&json!({ "email": "nicola@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    let second = app.wait_for_email_to("nicola@example.com", 3).await;
    let second_code = extract_query_param(&second.text_body, "recoveryCode");

    assert_ne!(first_code, second_code);

    // The superseded token is rejected
    let response = app
        .post("/api/auth/new-password")
        .json(&json!({
            "new_password": "new_pass!",
            "recovery_code": first_code
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The latest token works
    let response = app
        .post("/api/auth/new-password")
        .json(&json!({
            "new_password": "new_pass!",
            "recovery_code": second_code
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

//! Integration tests for registration, login, token refresh and profile endpoints.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{get, json_request, registration_body, send, TEST_PASSWORD};

#[tokio::test]
async fn test_register_client_returns_tokens() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;

    assert_eq!(account.body["user"]["role"], "client");
    assert_eq!(account.body["user"]["is_active"], true);
    assert_eq!(account.body["tokens"]["token_type"], "Bearer");
    assert!(!account.access_token.is_empty());
    assert!(!account.refresh_token.is_empty());
}

#[tokio::test]
async fn test_register_manager_creates_restaurant() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let manager = common::register(&app, "manager").await;
    let restaurant = common::manager_restaurant(&app, &manager).await;

    assert_eq!(restaurant["manager_id"], manager.id.to_string());
    assert!(restaurant["name"]
        .as_str()
        .unwrap()
        .starts_with("Restaurant "));
    assert_eq!(restaurant["products"], json!([]));
}

#[tokio::test]
async fn test_register_manager_requires_restaurant_name() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let mut body = registration_body("manager");
    body.as_object_mut().unwrap().remove("restaurant_name");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/v1/auth/register", None, body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "restaurant_name");
}

#[tokio::test]
async fn test_register_admin_rejected() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            registration_body("admin"),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "role");
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let mut body = registration_body("client");
    body["password_confirm"] = json!("different1");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/v1/auth/register", None, body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let existing = common::register(&app, "client").await;
    let mut body = registration_body("client");
    body["email"] = json!(existing.email.to_uppercase());

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/v1/auth/register", None, body),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A user with that email already exists");
}

#[tokio::test]
async fn test_login_with_email_or_username() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;

    for identifier in [account.email.clone(), account.username.clone()] {
        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                json!({ "email": identifier, "password": TEST_PASSWORD }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["user"]["id"], account.id.to_string());
        assert!(body["tokens"]["access"].is_string());
    }
}

#[tokio::test]
async fn test_login_wrong_password() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            json!({ "email": account.email, "password": "wrong-password" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_disabled_account() {
    let Some((app, pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;
    sqlx::query("UPDATE users SET is_active = false WHERE id = $1")
        .bind(account.id)
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            json!({ "email": account.email, "password": TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Existing tokens stop working too.
    let (status, _) = send(
        &app,
        get("/api/v1/auth/profile", Some(&account.access_token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            json!({ "refresh": account.refresh_token }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let access = body["access"].as_str().unwrap();
    let (status, _) = send(&app, get("/api/v1/auth/profile", Some(access))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            json!({ "refresh": account.access_token }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/auth/logout",
            Some(&account.access_token),
            json!({ "refresh": account.refresh_token }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Logged out successfully");

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            json!({ "refresh": account.refresh_token }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ignores_bad_token() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/v1/auth/logout",
            Some(&account.access_token),
            json!({ "refresh": "not-a-token" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Logged out successfully");
}

#[tokio::test]
async fn test_profile_requires_token() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let (status, _) = send(&app, get("/api/v1/auth/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/v1/auth/profile", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;

    let (status, body) = send(
        &app,
        json_request(
            Method::PATCH,
            "/api/v1/auth/profile",
            Some(&account.access_token),
            json!({ "first_name": "Kofi", "address": "Quartier Zongo" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["first_name"], "Kofi");
    assert_eq!(body["address"], "Quartier Zongo");
    assert_eq!(body["username"], account.username);
}

#[tokio::test]
async fn test_client_cannot_set_availability() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;
    let before = account.body["user"]["is_available"].clone();

    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/v1/auth/profile",
            Some(&account.access_token),
            json!({ "is_available": !before.as_bool().unwrap() }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_available"], before);
}

#[tokio::test]
async fn test_update_profile_email_conflict() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let first = common::register(&app, "client").await;
    let second = common::register(&app, "client").await;

    let (status, _) = send(
        &app,
        json_request(
            Method::PATCH,
            "/api/v1/auth/profile",
            Some(&second.access_token),
            json!({ "email": first.email }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_upload_avatar() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;

    let (status, body) = send(
        &app,
        common::image_upload(
            "/api/v1/auth/profile/avatar",
            &account.access_token,
            "image/png",
            b"\x89PNG\r\n\x1a\nfake",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    let url = body["avatar_url"].as_str().unwrap();
    assert!(url.starts_with("http://testserver/media/avatars/"));
}

#[tokio::test]
async fn test_upload_avatar_rejects_non_image() {
    let Some((app, _pool)) = common::setup().await else {
        return;
    };

    let account = common::register(&app, "client").await;

    let (status, body) = send(
        &app,
        common::image_upload(
            "/api/v1/auth/profile/avatar",
            &account.access_token,
            "text/plain",
            b"hello",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "image");
}

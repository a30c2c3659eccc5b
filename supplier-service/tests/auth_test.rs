mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{spawn_app, JWT_AUDIENCE, JWT_ISSUER, JWT_SECRET, STRONG_PASSWORD};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use supplier_service::services::AccessTokenClaims;
use uuid::Uuid;

#[tokio::test]
async fn test_register_then_login() {
    let app = spawn_app();

    let res = app
        .post(
            "/api/auth/register",
            json!({ "email": "buyer@example.com", "password": STRONG_PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["status"], "Success");

    let res = app
        .post(
            "/api/auth/login",
            json!({ "email": "buyer@example.com", "password": STRONG_PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["email"], "buyer@example.com");
    assert_eq!(res.body["roles"], json!(["User"]));
    assert!(Uuid::parse_str(res.body["userId"].as_str().unwrap()).is_ok());
    assert!(!res.body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_admin_grants_both_roles() {
    let app = spawn_app();
    app.admin_token("admin@example.com").await;

    let res = app
        .post(
            "/api/auth/login",
            json!({ "email": "admin@example.com", "password": STRONG_PASSWORD }),
        )
        .await;

    let roles: Vec<&str> = res.body["roles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_str().unwrap())
        .collect();
    assert!(roles.contains(&"Admin"));
    assert!(roles.contains(&"User"));
}

#[tokio::test]
async fn test_duplicate_email_fails_registration() {
    let app = spawn_app();
    app.user_token("buyer@example.com").await;

    let res = app
        .post(
            "/api/auth/register",
            json!({ "email": "BUYER@example.com", "password": STRONG_PASSWORD }),
        )
        .await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["status"], "Error");
    assert!(!res.body["errors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_weak_password_lists_every_violation() {
    let app = spawn_app();

    let res = app
        .post(
            "/api/auth/register",
            json!({ "email": "buyer@example.com", "password": "abc" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["status"], "Error");
    // Too short, no digit, no uppercase, no symbol
    assert_eq!(res.body["errors"].as_array().unwrap().len(), 4);

    let res = app
        .post(
            "/api/auth/login",
            json!({ "email": "buyer@example.com", "password": "abc" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_rejects_malformed_email() {
    let app = spawn_app();

    let res = app
        .post(
            "/api/auth/register",
            json!({ "email": "not-an-email", "password": STRONG_PASSWORD }),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["errors"]["email"].is_array());
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let app = spawn_app();
    app.user_token("buyer@example.com").await;

    let res = app
        .post(
            "/api/auth/login",
            json!({ "email": "buyer@example.com", "password": "Wrong#Pass1" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .post(
            "/api/auth/login",
            json!({ "email": "nobody@example.com", "password": STRONG_PASSWORD }),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_token() {
    let app = spawn_app();
    let token = app.user_token("buyer@example.com").await;

    let res = app
        .post("/api/auth/verify-token", json!({ "token": token }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["isValid"], true);

    let res = app
        .post("/api/auth/verify-token", json!({ "token": "garbage" }))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["isValid"], false);
    assert!(res.body["message"].is_string());

    let res = app
        .post("/api/auth/verify-token", json!({ "token": "   " }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.post("/api/auth/verify-token", json!({})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

fn token_with(secret: &str, issuer: &str, expires_in: Duration) -> String {
    let now = Utc::now();
    let claims = AccessTokenClaims {
        sub: Uuid::new_v4().to_string(),
        email: "buyer@example.com".to_string(),
        jti: Uuid::new_v4().to_string(),
        roles: vec!["Admin".to_string()],
        iss: issuer.to_string(),
        aud: JWT_AUDIENCE.to_string(),
        iat: now.timestamp(),
        exp: (now + expires_in).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_verify_token_rejects_expired_and_foreign_tokens() {
    let app = spawn_app();

    let expired = token_with(JWT_SECRET, JWT_ISSUER, Duration::minutes(-5));
    let res = app
        .post("/api/auth/verify-token", json!({ "token": expired }))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let wrong_issuer = token_with(JWT_SECRET, "someone-else", Duration::minutes(5));
    let res = app
        .post("/api/auth/verify-token", json!({ "token": wrong_issuer }))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let wrong_key = token_with(
        "another-secret-that-is-also-long-enough",
        JWT_ISSUER,
        Duration::minutes(5),
    );
    let res = app
        .post("/api/auth/verify-token", json!({ "token": wrong_key }))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let valid = token_with(JWT_SECRET, JWT_ISSUER, Duration::minutes(5));
    let res = app
        .post("/api/auth/verify-token", json!({ "token": valid }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_verify_token_malformed_body_is_problem_details() {
    let app = spawn_app();

    let res = app
        .post("/api/auth/verify-token", json!({ "token": 42 }))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["status"], 400);
    assert_eq!(res.body["title"], "Bad Request");
}

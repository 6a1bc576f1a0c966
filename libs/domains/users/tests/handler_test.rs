//! Handler tests for the users and authentication routers

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{JwtAuth, JwtConfig};
use domain_users::*;
use http_body_util::BodyExt;
use listing::InMemoryAccessor;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

const SECRET: &str = "handler-test-secret-with-32-plus-characters";

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn service() -> UserService {
    UserService::new(Arc::new(InMemoryAccessor::<User>::new()))
}

fn app(service: &UserService) -> Router {
    handlers::router(service.clone())
}

fn login_app(service: &UserService) -> Router {
    let jwt = JwtAuth::new(&JwtConfig::new(SECRET).unwrap());
    let throttle = LoginThrottle::in_memory(ThrottleConfig::default());
    handlers::auth_router(AuthService::new(service.clone(), throttle, jwt))
}

async fn seed_ada(service: &UserService) -> UserResponse {
    service
        .create(CreateUser {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
            password_confirm: "analytical".to_string(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_user_returns_201_without_hash() {
    let service = service();

    let response = app(&service)
        .oneshot(json_request(
            "POST",
            "/",
            json!({
                "name": "Ada Lovelace",
                "email": "Ada@Example.com",
                "password": "analytical",
                "password_confirm": "analytical"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_create_user_password_mismatch_is_400() {
    let service = service();

    let response = app(&service)
        .oneshot(json_request(
            "POST",
            "/",
            json!({
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "password": "analytical",
                "password_confirm": "different"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert!(body["details"]["password_confirm"].is_array());
}

#[tokio::test]
async fn test_create_duplicate_email_is_409() {
    let service = service();
    seed_ada(&service).await;

    let response = app(&service)
        .oneshot(json_request(
            "POST",
            "/",
            json!({
                "name": "Another Ada",
                "email": "ADA@example.com",
                "password": "analytical",
                "password_confirm": "analytical"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_users_projection() {
    let service = service();
    seed_ada(&service).await;

    let response = app(&service)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page: Value = json_body(response.into_body()).await;
    assert_eq!(page["count"], 1);
    let user = &page["data"][0];
    assert!(user.get("password_hash").is_none());
    assert_eq!(user["name"], "Ada Lovelace");
    assert!(user["created_at"].is_string());
    assert!(user["updated_at"].is_string());
}

#[tokio::test]
async fn test_change_password_wrong_old_is_401() {
    let service = service();
    let ada = seed_ada(&service).await;

    let response = app(&service)
        .oneshot(json_request(
            "PATCH",
            &format!("/{}/password", ada.id),
            json!({
                "password_old": "guess",
                "password_new": "engine-2",
                "password_confirm": "engine-2"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_returns_204() {
    let service = service();
    let ada = seed_ada(&service).await;

    let response = app(&service)
        .oneshot(json_request(
            "PATCH",
            &format!("/{}/password", ada.id),
            json!({
                "password_old": "analytical",
                "password_new": "engine-2",
                "password_confirm": "engine-2"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_login_returns_token() {
    let service = service();
    let ada = seed_ada(&service).await;

    let response = login_app(&service)
        .oneshot(json_request(
            "POST",
            "/login",
            json!({ "email": "ada@example.com", "password": "analytical" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: LoginResponse = json_body(response.into_body()).await;
    assert_eq!(body.user_id, ada.id);
    assert_eq!(body.name, "Ada Lovelace");
    assert!(!body.token.is_empty());
}

#[tokio::test]
async fn test_login_locks_out_after_five_failures() {
    let service = service();
    seed_ada(&service).await;
    let app = login_app(&service);

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/login",
                json!({ "email": "ada@example.com", "password": "wrong" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = json_body(response.into_body()).await;
        assert_eq!(body["message"], "Wrong email or password");
    }

    let response = app
        .oneshot(json_request(
            "POST",
            "/login",
            json!({ "email": "ada@example.com", "password": "analytical" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(
        body["message"],
        "Too many failed login attempts. Please try again after 30 minutes."
    );
}

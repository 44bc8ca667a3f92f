//! Common test utilities for integration tests
//!
//! Each [`TestApp`] owns a router wired to a fresh in-memory credential
//! store, so tests run without a database and never share users.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fake::{faker::internet::en::SafeEmail, Fake};
use habit_tracker_backend::{
    config::AppConfig, repositories::InMemoryCredentialStore, routes, state::AppState,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";
pub const TEST_PASSWORD: &str = "Password123";

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

/// A user created through the register endpoint
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(InMemoryCredentialStore::new());
        let state = AppState::new(store, config).expect("test config must be valid");
        let app = routes::create_router(state.clone());

        Self { app, state }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        self.send("GET", path, None, None).await
    }

    /// Make a GET request with an Authorization header
    pub async fn get_auth(&self, path: &str, authorization: &str) -> (StatusCode, String) {
        self.send("GET", path, Some(authorization), None).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &str) -> (StatusCode, String) {
        self.send("POST", path, None, Some(body)).await
    }

    /// Make a POST request with JSON body and an Authorization header
    pub async fn post_auth(
        &self,
        path: &str,
        authorization: &str,
        body: &str,
    ) -> (StatusCode, String) {
        self.send("POST", path, Some(authorization), Some(body)).await
    }

    /// Make a PUT request with JSON body and an Authorization header
    pub async fn put_auth(
        &self,
        path: &str,
        authorization: &str,
        body: &str,
    ) -> (StatusCode, String) {
        self.send("PUT", path, Some(authorization), Some(body)).await
    }

    /// Make a POST request whose body is sent without a Content-Type header
    pub async fn post_untyped(&self, path: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.dispatch(request).await
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        authorization: Option<&str>,
        body: Option<&str>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }

    /// Register a user with a random email and username
    pub async fn register_user(&self) -> RegisteredUser {
        let email: String = SafeEmail().fake();
        let email = email.to_lowercase();
        let username = unique_username();

        let body = json!({
            "email": email,
            "username": username,
            "password": TEST_PASSWORD,
        });
        let (status, response) = self.post("/api/auth/register", &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", response);

        let response: Value = serde_json::from_str(&response).unwrap();
        RegisteredUser {
            id: response["user"]["id"].as_str().unwrap().to_string(),
            email,
            username,
            password: TEST_PASSWORD.to_string(),
            token: response["token"].as_str().unwrap().to_string(),
        }
    }
}

impl RegisteredUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Fast bcrypt cost and a fixed secret
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = SecretString::new(TEST_SECRET.to_string());
    config.auth.bcrypt_cost = 10;
    config
}

pub fn unique_username() -> String {
    format!("user_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

pub fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

//! Common test utilities for integration tests
//!
//! Builds the full router over the in-memory store and drives it with
//! `tower::ServiceExt::oneshot`, so no database or socket is needed.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use taskmgr_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskmgr_shared::store::memory::MemoryStore;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const PASSWORD: &str = "correct-horse";

/// Router plus the config it was built with
pub struct TestContext {
    pub app: Router,
    pub config: Config,
}

/// A registered, logged-in user
pub struct Session {
    pub user_id: Uuid,
    pub token: String,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::for_testing(JWT_SECRET))
    }

    pub fn with_config(config: Config) -> Self {
        let state = AppState::new(Arc::new(MemoryStore::new()), None, config.clone());

        Self {
            app: build_router(state),
            config,
        }
    }

    /// Sends a request and returns the status and the decoded JSON body
    /// (`Value::Null` for an empty body)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Registers `username` with [`PASSWORD`] and logs in
    pub async fn register_and_login(&self, username: &str) -> Session {
        let (status, body) = self
            .post("/v1/users", None, user_form(username, "Test", "User"))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        let (status, body) = self
            .post(
                "/v1/session/login",
                None,
                json!({ "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        Session {
            user_id: id_of(&body["user"]),
            token: body["access_token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a named status or label and returns its ID
    pub async fn create_named(&self, resource: &str, name: &str, token: &str) -> Uuid {
        let (status, body) = self
            .post(&format!("/v1/{resource}"), Some(token), json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create {resource} failed: {body}");
        id_of(&body["data"])
    }

    /// Creates a task and returns its ID
    pub async fn create_task(
        &self,
        name: &str,
        status_id: Uuid,
        executor_id: Uuid,
        label_ids: &[Uuid],
        token: &str,
    ) -> Uuid {
        let (status, body) = self
            .post(
                "/v1/tasks",
                Some(token),
                task_form(name, status_id, executor_id, label_ids),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create task failed: {body}");
        id_of(&body["data"])
    }
}

pub fn user_form(username: &str, first_name: &str, last_name: &str) -> Value {
    json!({
        "username": username,
        "first_name": first_name,
        "last_name": last_name,
        "password1": PASSWORD,
        "password2": PASSWORD,
    })
}

pub fn task_form(name: &str, status_id: Uuid, executor_id: Uuid, label_ids: &[Uuid]) -> Value {
    json!({
        "name": name,
        "description": "",
        "status": status_id.to_string(),
        "executor": executor_id.to_string(),
        "labels": label_ids.iter().map(Uuid::to_string).collect::<Vec<_>>(),
    })
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}

/// IDs of the records in a list response, in order
pub fn ids_in(listing: &Value) -> Vec<Uuid> {
    listing["items"].as_array().unwrap().iter().map(id_of).collect()
}

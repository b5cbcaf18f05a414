//! Test utilities and fixtures for Wind Banner integration tests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use serde_json::Value;
use tower::ServiceExt;

pub use wind_banner::db::{AppState, DbPool, file_manager, init_db, queries};
pub use wind_banner::error::AppError;
pub use wind_banner::handlers;
pub use wind_banner::interaction;
pub use wind_banner::models::*;
pub use wind_banner::registry::{CodeRegistry, generate_code, is_well_formed};
pub use wind_banner::store::LicenseStore;

pub const PREFIX: &str = "Wind-Banner";
pub const ONE_DAY: i64 = 86_400;
pub const ONE_HOUR: i64 = 3_600;
/// Fixed reference instant for deterministic timestamps (2024-01-01 00:00 UTC)
pub const T0: i64 = 1_704_067_200;

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create a pool over one in-memory database.
///
/// Limited to a single connection: every in-memory connection is its own
/// database, so a larger pool would hand out empty schemas.
pub fn setup_test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }
    pool
}

/// Create a pool over a fresh database file in the temp dir.
pub fn setup_file_pool(max_size: u32) -> (DbPool, std::path::PathBuf) {
    let path = std::env::temp_dir().join(format!("wind_banner_test_{}.db", uuid::Uuid::new_v4()));
    let pool = Pool::builder()
        .max_size(max_size)
        .build(file_manager(&path))
        .unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }
    (pool, path)
}

pub fn remove_db_file(path: &std::path::Path) {
    std::fs::remove_file(path).ok();
    std::fs::remove_file(format!("{}-wal", path.display())).ok();
    std::fs::remove_file(format!("{}-shm", path.display())).ok();
}

pub fn create_test_app_state() -> AppState {
    AppState::new(setup_test_pool(), PREFIX, None)
}

pub fn create_test_app_state_with_token(token: &str) -> AppState {
    AppState::new(setup_test_pool(), PREFIX, Some(token.to_string()))
}

/// Router with all endpoints, as `main` builds it
pub fn test_app(state: AppState) -> Router {
    Router::new()
        .merge(handlers::router(state.clone()))
        .with_state(state)
}

/// Mint a code as an administrator and return its string.
pub fn create_test_code(registry: &CodeRegistry, plan: &str) -> String {
    registry
        .create_code(plan, true, T0)
        .expect("Failed to create test code")
        .code
}

/// Send a JSON request and return (status, parsed body).
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (axum::http::StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response should be valid JSON")
    };
    (status, json)
}

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use toolbox_models::RoleId;
use tower::ServiceExt;

pub use toolbox::testing::TestApp;

/// Sends a request through the router and returns the status with the
/// decoded JSON body (`Value::Null` for empty bodies).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!(
                "Non-JSON response ({}): {}",
                status,
                String::from_utf8_lossy(&bytes)
            )
        })
    };
    (status, value)
}

pub async fn create_role(app: &TestApp, name: &str) -> RoleId {
    let token = app.admin_token();
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/roles",
        Some(&token),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create role failed: {}", body);
    RoleId::new(body["id"].as_i64().unwrap())
}

pub async fn save_permission(
    app: &TestApp,
    role_id: RoleId,
    screen: &str,
    can_read: bool,
    can_write: bool,
) -> (StatusCode, Value) {
    let token = app.admin_token();
    send(
        &app.router,
        "PUT",
        "/api/permissions",
        Some(&token),
        Some(json!({
            "role_id": role_id,
            "screen_name": screen,
            "can_read": can_read,
            "can_write": can_write,
        })),
    )
    .await
}

/// Percent-encodes spaces so screen names can be used as path segments.
pub fn path_segment(screen: &str) -> String {
    screen.replace(' ', "%20")
}

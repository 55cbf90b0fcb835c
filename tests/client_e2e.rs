mod common;

use std::sync::Arc;
use std::time::Duration;

use common::TestApp;
use toolbox_client::{ClientError, HttpClient, PermissionApi, PermissionEditor, PermissionEvent};
use toolbox_core::screens;
use toolbox_models::{PermissionFlags, RoleId, SaveRoleDto};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn serve(app: &TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn role(app: &TestApp, name: &str) -> RoleId {
    let (role, _) = app.state.roles.save(SaveRoleDto::new(name, None)).await.unwrap();
    role.id
}

#[tokio::test]
async fn test_editor_saves_through_http() {
    let app = TestApp::new();
    let role_id = role(&app, "Auditor").await;
    let base_url = serve(&app).await;

    let api = Arc::new(HttpClient::new(&base_url, TIMEOUT).unwrap().with_token(app.admin_token()));
    let (editor, mut events) = PermissionEditor::load(api.clone(), role_id, TIMEOUT).await.unwrap();

    let flags = editor.toggle_read(screens::REPORTS, true).await.unwrap();
    assert_eq!(flags, PermissionFlags::READ_ONLY);
    assert_eq!(
        events.recv().await.unwrap(),
        PermissionEvent::Saved {
            screen_name: "Reports".to_string(),
            flags: PermissionFlags::READ_ONLY,
        }
    );

    let flags = editor.toggle_write(screens::REPORTS, true).await.unwrap();
    assert_eq!(flags, PermissionFlags::READ_WRITE);
    assert!(!editor.is_pending(screens::REPORTS).await);

    let stored = app
        .state
        .permissions
        .get_permission(role_id, screens::REPORTS)
        .await
        .unwrap();
    assert_eq!(stored, PermissionFlags::READ_WRITE);

    // Stale after the write; the next read refetches from the server.
    assert!(editor.snapshot().await.is_stale());
    assert_eq!(
        editor.flags(screens::REPORTS).await.unwrap(),
        PermissionFlags::READ_WRITE
    );
    assert!(!editor.snapshot().await.is_stale());
}

#[tokio::test]
async fn test_write_without_read_never_reaches_server() {
    let app = TestApp::new();
    let role_id = role(&app, "Auditor").await;
    let base_url = serve(&app).await;

    let api = Arc::new(HttpClient::new(&base_url, TIMEOUT).unwrap().with_token(app.admin_token()));
    let (editor, mut events) = PermissionEditor::load(api, role_id, TIMEOUT).await.unwrap();

    let err = editor.toggle_write(screens::ANALYTICS, true).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(_)));
    assert!(matches!(
        events.recv().await.unwrap(),
        PermissionEvent::Rejected { .. }
    ));
    assert_eq!(app.state.permissions.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_server_failure_rolls_back() {
    let app = TestApp::new();
    let role_id = role(&app, "Auditor").await;
    app.repo.fail_upserts_for(screens::USERS).await;
    let base_url = serve(&app).await;

    let api = Arc::new(HttpClient::new(&base_url, TIMEOUT).unwrap().with_token(app.admin_token()));
    let (editor, mut events) = PermissionEditor::load(api, role_id, TIMEOUT).await.unwrap();

    let err = editor.toggle_read(screens::USERS, true).await.unwrap_err();
    assert_eq!(err.status(), Some(500));

    match events.recv().await.unwrap() {
        PermissionEvent::SaveFailed {
            screen_name,
            restored,
            ..
        } => {
            assert_eq!(screen_name, "Users");
            assert_eq!(restored, PermissionFlags::DENIED);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(editor.snapshot().await.flags(screens::USERS), PermissionFlags::DENIED);
    assert!(!editor.is_pending(screens::USERS).await);
}

#[tokio::test]
async fn test_non_admin_save_is_forbidden_and_rolled_back() {
    let app = TestApp::new();
    let role_id = role(&app, "Auditor").await;
    let base_url = serve(&app).await;

    let api = Arc::new(
        HttpClient::new(&base_url, TIMEOUT)
            .unwrap()
            .with_token(app.user_token(&[role_id])),
    );
    let (editor, _events) = PermissionEditor::load(api, role_id, TIMEOUT).await.unwrap();

    let err = editor.toggle_read(screens::REPORTS, true).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(editor.snapshot().await.flags(screens::REPORTS), PermissionFlags::DENIED);
}

#[tokio::test]
async fn test_client_lists_roles() {
    let app = TestApp::new();
    role(&app, "Support").await;
    role(&app, "Auditor").await;
    let base_url = serve(&app).await;

    let api = HttpClient::new(&base_url, TIMEOUT).unwrap().with_token(app.admin_token());
    let roles = api.get_all_roles().await.unwrap();
    let names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Auditor", "Support"]);
}

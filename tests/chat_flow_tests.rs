use std::path::PathBuf;
use std::time::Duration;

use docchat::api::{ChatBackend, HttpBackend, Sender};
use docchat::core::session::SessionStore;
use docchat::core::state::{App, ForgotStep, Route};
use docchat::core::{Action, update};
use docchat::dispatch::run_effect;
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&server.uri(), &server.uri(), Duration::from_secs(5))
}

fn temp_dir(prefix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn temp_store() -> SessionStore {
    SessionStore::new(temp_dir("docchat-it"))
}

/// A logged-in app whose backend already carries token "t".
fn logged_in(backend: &HttpBackend, rooms: &[(i64, &str)]) -> App {
    let credentials = docchat::api::Credentials {
        token: "t".to_string(),
        user: docchat::api::User {
            id: 1,
            name: "A".to_string(),
            email: None,
        },
    };
    backend.set_token(Some(credentials.token.clone()));
    let mut app = App::with_session(Some(credentials));
    app.rooms = rooms
        .iter()
        .map(|(id, title)| docchat::api::Room {
            room_id: *id,
            title: title.to_string(),
        })
        .collect();
    app
}

/// Applies `action`, then runs every effect it triggers until the chain settles.
async fn drive(app: &mut App, action: Action, backend: &HttpBackend, store: &SessionStore) {
    let mut next = Some(action);
    while let Some(action) = next.take() {
        let effect = update(app, action);
        next = run_effect(effect, backend, store).await;
    }
}

async fn mount_messages(server: &MockServer, room_id: i64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/rooms/{}/messages", room_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_login_stores_session_and_opens_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_string_contains("user@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t",
            "user": {"id": 1, "name": "A"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/1/rooms"))
        .and(header("Authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"room_id": 5, "title": "Contract"}
        ])))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = App::new();
    drive(
        &mut app,
        Action::SubmitLogin {
            email: "user@example.com".to_string(),
            password: "x".to_string(),
        },
        &backend,
        &store,
    )
    .await;

    assert_eq!(app.route, Route::Home);
    assert_eq!(app.session.as_ref().map(|s| s.token.as_str()), Some("t"));
    assert_eq!(app.notice.as_deref(), Some("Logged in successfully."));
    assert_eq!(app.rooms.len(), 1);
    assert!(!app.busy);

    let stored = assert_ok!(store.load()).expect("session was saved");
    assert_eq!(stored.token, "t");
    assert_eq!(stored.user.id, 1);
}

#[tokio::test]
async fn test_login_failure_shows_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"status": 401, "message": "Invalid email or password."})),
        )
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = App::new();
    drive(
        &mut app,
        Action::SubmitLogin {
            email: "user@example.com".to_string(),
            password: "wrong".to_string(),
        },
        &backend,
        &store,
    )
    .await;

    assert_eq!(app.error.as_deref(), Some("Invalid email or password."));
    assert!(!app.is_authenticated());
    assert!(!app.busy);
    assert!(assert_ok!(store.load()).is_none());
}

#[tokio::test]
async fn test_login_failure_without_message_uses_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let mut app = App::new();
    drive(
        &mut app,
        Action::SubmitLogin {
            email: "a@b.com".to_string(),
            password: "x".to_string(),
        },
        &backend,
        &temp_store(),
    )
    .await;

    assert_eq!(app.error.as_deref(), Some("Login failed."));
}

#[tokio::test]
async fn test_login_reads_flat_body_and_header_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Authorization", "Bearer from-header")
                .set_body_json(json!({"id": 2, "name": "B", "email": "b@example.com"})),
        )
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let credentials = assert_ok!(
        backend
            .login(&docchat::api::types::LoginRequest {
                email: "b@example.com".to_string(),
                password: "x".to_string(),
            })
            .await
    );
    assert_eq!(credentials.token, "from-header");
    assert_eq!(credentials.user.id, 2);
    assert_eq!(credentials.user.email.as_deref(), Some("b@example.com"));
}

#[tokio::test]
async fn test_empty_fields_never_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = App::new();
    drive(
        &mut app,
        Action::SubmitSignup {
            name: "Kim".to_string(),
            email: String::new(),
            password: "pw".to_string(),
        },
        &backend,
        &store,
    )
    .await;

    assert_eq!(app.error.as_deref(), Some("All fields are required."));
}

#[tokio::test]
async fn test_signup_returns_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let mut app = App::new();
    app.route = Route::Signup;
    drive(
        &mut app,
        Action::SubmitSignup {
            name: "Kim".to_string(),
            email: "kim@example.com".to_string(),
            password: "pw".to_string(),
        },
        &backend,
        &temp_store(),
    )
    .await;

    assert_eq!(app.route, Route::Login);
    assert_eq!(app.notice.as_deref(), Some("Sign up complete. Please log in."));
}

#[tokio::test]
async fn test_password_reset_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/password/reset-request"))
        .and(body_string_contains("kim@example.com"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/password/verify-code"))
        .and(body_string_contains("123456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resetToken": "rt"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/password/change"))
        .and(header("X-Reset-Token", "rt"))
        .and(body_string_contains("newPassword"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = App::new();

    drive(&mut app, Action::Navigate(Route::ForgotPassword), &backend, &store).await;
    drive(
        &mut app,
        Action::SubmitResetRequest {
            name: "Kim".to_string(),
            email: "kim@example.com".to_string(),
        },
        &backend,
        &store,
    )
    .await;
    assert_eq!(
        app.forgot_step,
        ForgotStep::VerifyCode {
            email: "kim@example.com".to_string()
        }
    );

    drive(
        &mut app,
        Action::SubmitVerifyCode {
            code: "123456".to_string(),
        },
        &backend,
        &store,
    )
    .await;
    assert_eq!(app.route, Route::ResetPassword);
    assert_eq!(app.reset_token.as_deref(), Some("rt"));

    drive(
        &mut app,
        Action::SubmitNewPassword {
            password: "new-pw".to_string(),
            confirm: "new-pw".to_string(),
        },
        &backend,
        &store,
    )
    .await;
    assert_eq!(app.route, Route::Login);
    assert!(app.reset_token.is_none());
    assert_eq!(
        app.notice.as_deref(),
        Some("Password has been reset. Please log in.")
    );
}

#[tokio::test]
async fn test_logout_clears_session_even_when_server_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[(5, "Contract")]);
    assert_ok!(store.save(app.session.as_ref().unwrap()));

    drive(&mut app, Action::Logout, &backend, &store).await;

    assert!(!app.is_authenticated());
    assert_eq!(app.effective_route(), Route::Login);
    assert!(app.rooms.is_empty());
    assert!(assert_ok!(store.load()).is_none());
}

// ============================================================================
// Rooms
// ============================================================================

#[tokio::test]
async fn test_rooms_not_found_means_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/1/rooms"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not Found"})))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[]);
    drive(&mut app, Action::Navigate(Route::Home), &backend, &store).await;

    assert!(app.rooms.is_empty());
    assert!(app.error.is_none());
}

#[tokio::test]
async fn test_rooms_server_error_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/1/rooms"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[]);
    drive(&mut app, Action::Navigate(Route::Home), &backend, &store).await;

    assert_eq!(app.error.as_deref(), Some("Failed to load rooms."));
}

#[tokio::test]
async fn test_create_room_uploads_pdf() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upsert-pdf/"))
        .and(header("Authorization", "Bearer t"))
        .and(body_string_contains("Lease"))
        .and(body_string_contains("lease.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Successfully processed and upserted lease.pdf",
            "base_id": "7",
            "chunk_count": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pdf = temp_dir("docchat-pdf").join("lease.pdf");
    std::fs::write(&pdf, b"%PDF-1.4\n%fake but well-formed enough\n").unwrap();

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[(5, "Contract")]);
    drive(&mut app, Action::OpenNewRoom, &backend, &store).await;
    drive(
        &mut app,
        Action::SubmitNewRoom {
            title: "Lease".to_string(),
            path: pdf.display().to_string(),
        },
        &backend,
        &store,
    )
    .await;

    assert!(app.new_room.is_none());
    assert_eq!(app.rooms.len(), 2);
    assert_eq!(app.rooms[1].room_id, 7);
    assert_eq!(app.rooms[1].title, "Lease");
}

#[tokio::test]
async fn test_non_pdf_is_rejected_without_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upsert-pdf/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[]);
    drive(&mut app, Action::OpenNewRoom, &backend, &store).await;
    drive(
        &mut app,
        Action::SubmitNewRoom {
            title: "Notes".to_string(),
            path: "/tmp/notes.txt".to_string(),
        },
        &backend,
        &store,
    )
    .await;

    let modal = app.new_room.as_ref().expect("modal stays open");
    assert_eq!(modal.error.as_deref(), Some("Please select a PDF file."));
    assert!(!modal.creating);
    assert!(app.rooms.is_empty());
}

#[tokio::test]
async fn test_upload_failure_keeps_modal_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/upsert-pdf/"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"detail": [{"loc": ["body", "file"], "msg": "field required"}]})),
        )
        .mount(&server)
        .await;

    let pdf = temp_dir("docchat-pdf").join("doc.pdf");
    std::fs::write(&pdf, b"%PDF-1.7\n").unwrap();

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[]);
    drive(&mut app, Action::OpenNewRoom, &backend, &store).await;
    drive(
        &mut app,
        Action::SubmitNewRoom {
            title: "Doc".to_string(),
            path: pdf.display().to_string(),
        },
        &backend,
        &store,
    )
    .await;

    let modal = app.new_room.as_ref().expect("modal stays open");
    assert_eq!(modal.error.as_deref(), Some("field required"));
    assert!(!modal.creating);
}

#[tokio::test]
async fn test_delete_room_after_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/rooms/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_messages(&server, 5, json!([])).await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[(5, "Contract"), (6, "Manual")]);
    drive(&mut app, Action::SelectRoom(5), &backend, &store).await;

    drive(&mut app, Action::RequestDeleteRoom(5), &backend, &store).await;
    assert_eq!(app.confirm_delete.as_ref().map(|r| r.room_id), Some(5));
    drive(&mut app, Action::ConfirmDelete, &backend, &store).await;

    assert_eq!(app.rooms.len(), 1);
    assert_eq!(app.rooms[0].room_id, 6);
    assert!(app.selected_room.is_none());
    assert!(app.messages.is_empty());
}

#[tokio::test]
async fn test_cancelled_delete_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[(5, "Contract")]);
    drive(&mut app, Action::RequestDeleteRoom(5), &backend, &store).await;
    drive(&mut app, Action::CancelDelete, &backend, &store).await;

    assert_eq!(app.rooms.len(), 1);
    assert!(app.confirm_delete.is_none());
}

#[tokio::test]
async fn test_delete_failure_keeps_room() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/rooms/5"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[(5, "Contract")]);
    drive(&mut app, Action::RequestDeleteRoom(5), &backend, &store).await;
    drive(&mut app, Action::ConfirmDelete, &backend, &store).await;

    assert_eq!(app.rooms.len(), 1);
    assert_eq!(app.error.as_deref(), Some("Failed to delete the room."));
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn test_switching_rooms_replaces_history() {
    let server = MockServer::start().await;
    mount_messages(
        &server,
        5,
        json!([
            {"_id": "a1", "room_id": 5, "sequence_number": 1, "sender": "user",
             "content": "Q5", "timestamp": "2024-01-01T10:00:00"},
            {"_id": "a2", "room_id": 5, "sequence_number": 2, "sender": "system",
             "content": "A5", "timestamp": "2024-01-01T10:00:05"}
        ]),
    )
    .await;
    mount_messages(
        &server,
        6,
        json!([
            {"_id": "b1", "room_id": 6, "sequence_number": 1, "sender": "user",
             "content": "Q6", "timestamp": "2024-01-02T09:00:00"}
        ]),
    )
    .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[(5, "Contract"), (6, "Manual")]);

    drive(&mut app, Action::SelectRoom(5), &backend, &store).await;
    assert_eq!(app.messages.len(), 2);
    assert_eq!(app.messages[1].sender, Sender::System);

    drive(&mut app, Action::SelectRoom(6), &backend, &store).await;
    assert_eq!(app.messages.len(), 1);
    assert!(app.messages.iter().all(|m| m.room_id == 6));
    assert_eq!(app.messages[0].content, "Q6");
}

#[tokio::test]
async fn test_history_failure_shows_friendly_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/rooms/5/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[(5, "Contract")]);
    drive(&mut app, Action::SelectRoom(5), &backend, &store).await;

    assert!(app.messages.is_empty());
    assert_eq!(app.status_message, "Failed to load messages.");
}

#[tokio::test]
async fn test_question_gets_answer() {
    let server = MockServer::start().await;
    mount_messages(&server, 5, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query-pdf/"))
        .and(header("Authorization", "Bearer t"))
        .and(body_string_contains("What is this?"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"answer": "It is a contract."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[(5, "Contract")]);
    drive(&mut app, Action::SelectRoom(5), &backend, &store).await;
    drive(
        &mut app,
        Action::SendMessage("What is this?".to_string()),
        &backend,
        &store,
    )
    .await;

    let turns: Vec<(Sender, &str)> = app
        .messages
        .iter()
        .map(|m| (m.sender, m.content.as_str()))
        .collect();
    assert_eq!(
        turns,
        vec![
            (Sender::User, "What is this?"),
            (Sender::System, "It is a contract."),
        ]
    );
    assert!(!app.is_awaiting_answer());
}

#[tokio::test]
async fn test_failed_question_shows_fallback_answer() {
    let server = MockServer::start().await;
    mount_messages(&server, 5, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query-pdf/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let store = temp_store();
    let mut app = logged_in(&backend, &[(5, "Contract")]);
    drive(&mut app, Action::SelectRoom(5), &backend, &store).await;
    drive(
        &mut app,
        Action::SendMessage("Anything?".to_string()),
        &backend,
        &store,
    )
    .await;

    assert_eq!(app.messages.len(), 2);
    assert_eq!(app.messages[1].sender, Sender::System);
    assert_eq!(
        app.messages[1].content,
        "Sorry, something went wrong while getting a response."
    );
    assert!(app.pending_queries.is_empty());
}

//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use async_trait::async_trait;

use crate::api::types::{LoginRequest, ResetCodeRequest, SignupRequest, VerifyCodeRequest};
use crate::api::{
    ApiError, ChatBackend, Credentials, Message, PdfUpload, Room, RoomId, User, UserId,
};
use crate::core::session::SessionStore;
use crate::core::state::App;

/// A backend for tests that don't need real API calls. Every call succeeds
/// with an empty or echoed value.
pub struct NoopBackend;

#[async_trait]
impl ChatBackend for NoopBackend {
    fn name(&self) -> &str {
        "noop"
    }

    fn set_token(&self, _token: Option<String>) {}

    async fn login(&self, _request: &LoginRequest) -> Result<Credentials, ApiError> {
        Ok(test_credentials())
    }

    async fn signup(&self, _request: &SignupRequest) -> Result<(), ApiError> {
        Ok(())
    }

    async fn request_reset_code(&self, _request: &ResetCodeRequest) -> Result<(), ApiError> {
        Ok(())
    }

    async fn verify_reset_code(&self, _request: &VerifyCodeRequest) -> Result<String, ApiError> {
        Ok("reset-token".to_string())
    }

    async fn reset_password(
        &self,
        _reset_token: &str,
        _new_password: &str,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn list_rooms(&self, _user_id: UserId) -> Result<Vec<Room>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_room(&self, upload: PdfUpload) -> Result<Room, ApiError> {
        Ok(Room {
            room_id: 1,
            title: upload.title,
        })
    }

    async fn delete_room(&self, _room_id: RoomId) -> Result<(), ApiError> {
        Ok(())
    }

    async fn list_messages(&self, _room_id: RoomId) -> Result<Vec<Message>, ApiError> {
        Ok(Vec::new())
    }

    async fn query(&self, _room_id: RoomId, question: &str) -> Result<String, ApiError> {
        Ok(question.to_string())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

pub fn test_credentials() -> Credentials {
    Credentials {
        token: "t".to_string(),
        user: User {
            id: 1,
            name: "A".to_string(),
            email: None,
        },
    }
}

/// Creates an App already logged in as user 1 ("A").
pub fn logged_in_app() -> App {
    App::with_session(Some(test_credentials()))
}

pub fn room(room_id: RoomId, title: &str) -> Room {
    Room {
        room_id,
        title: title.to_string(),
    }
}

/// A session store in a fresh directory under the system temp dir.
pub fn temp_store() -> SessionStore {
    SessionStore::new(std::env::temp_dir().join(format!("docchat-test-{}", uuid::Uuid::new_v4())))
}

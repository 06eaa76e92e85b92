use std::fmt;

use async_trait::async_trait;

use super::types::{
    Credentials, LoginRequest, Message, PdfUpload, ResetCodeRequest, Room, RoomId,
    SignupRequest, UserId, VerifyCodeRequest,
};

/// Errors that can occur while talking to the remote services.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Transport failure (timeout, DNS, connection refused).
    Network(String),
    /// Non-2xx response. `message` is the server's `message`/`detail`, if any.
    Api { status: u16, message: Option<String> },
    /// Response body did not have the expected shape.
    Parse(String),
}

impl ApiError {
    /// The string shown to the user: the server's own message when it sent
    /// one, otherwise `default`.
    pub fn user_message(&self, default: &str) -> String {
        match self {
            ApiError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Network(msg) => msg.clone(),
            _ => default.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api {
                status,
                message: Some(message),
            } => write!(f, "API error (HTTP {status}): {message}"),
            ApiError::Api {
                status,
                message: None,
            } => write!(f, "API error (HTTP {status})"),
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Everything the client needs from the auth and document services.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Returns the name of the backend.
    fn name(&self) -> &str;

    /// Attach (or drop) the bearer token sent with document API requests.
    fn set_token(&self, token: Option<String>);

    async fn login(&self, request: &LoginRequest) -> Result<Credentials, ApiError>;

    async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError>;

    async fn request_reset_code(&self, request: &ResetCodeRequest) -> Result<(), ApiError>;

    /// Returns the reset token proving the code was verified.
    async fn verify_reset_code(&self, request: &VerifyCodeRequest) -> Result<String, ApiError>;

    async fn reset_password(&self, reset_token: &str, new_password: &str)
    -> Result<(), ApiError>;

    /// Rooms in server order.
    async fn list_rooms(&self, user_id: UserId) -> Result<Vec<Room>, ApiError>;

    async fn create_room(&self, upload: PdfUpload) -> Result<Room, ApiError>;

    async fn delete_room(&self, room_id: RoomId) -> Result<(), ApiError>;

    async fn list_messages(&self, room_id: RoomId) -> Result<Vec<Message>, ApiError>;

    /// Ask a question about the room's document; returns the answer text.
    async fn query(&self, room_id: RoomId, question: &str) -> Result<String, ApiError>;

    async fn logout(&self) -> Result<(), ApiError>;
}

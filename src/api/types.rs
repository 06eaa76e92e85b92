use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub type UserId = i64;
pub type RoomId = i64;

// ============================================================================
// Domain Types
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A chat context bound to one uploaded PDF.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub room_id: RoomId,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    System,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    /// Server messages carry a Mongo `_id`; local ones get a generated id.
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    pub sender: Sender,
    pub content: String,
    pub room_id: RoomId,
    #[serde(default)]
    pub sequence_number: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Builds a message that only exists client-side.
    pub fn local(prefix: &str, sender: Sender, content: String, room_id: RoomId) -> Self {
        Self {
            id: Some(format!("{}-{}", prefix, uuid::Uuid::new_v4())),
            sender,
            content,
            room_id,
            sequence_number: None,
            timestamp: Some(Utc::now()),
        }
    }
}

/// The history endpoint emits naive UTC timestamps; accept both forms.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }))
}

// ============================================================================
// Auth Wire Types
// ============================================================================

#[derive(Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct ResetCodeRequest {
    pub name: String,
    pub email: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub new_password: String,
}

/// Login body. Some servers nest the user, others return it flat and put
/// the token in the `Authorization` header.
#[derive(Deserialize, Debug, Default)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub user: Option<User>,
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl LoginResponse {
    pub fn into_user(self) -> Option<User> {
        self.user.or(match (self.id, self.name) {
            (Some(id), Some(name)) => Some(User {
                id,
                name,
                email: self.email,
            }),
            _ => None,
        })
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeResponse {
    pub reset_token: String,
}

/// A successful login: bearer token plus the user it belongs to.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub token: String,
    pub user: User,
}

// Keeps the token out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

// ============================================================================
// Document Wire Types
// ============================================================================

#[derive(Deserialize, Debug)]
pub struct UpsertResponse {
    #[serde(default)]
    pub message: String,
    pub base_id: String,
    #[serde(default)]
    pub chunk_count: u64,
}

#[derive(Deserialize, Debug)]
pub struct QueryResponse {
    pub answer: String,
}

/// A PDF ready for upload; the bytes have already been checked.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub title: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub user_id: UserId,
}

/// Error body fields used by both servers: `message` (auth) and `detail` (documents).
#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Human-readable text, if the body carried any.
    pub fn text(&self) -> Option<String> {
        if let Some(message) = self.message.as_ref().filter(|m| !m.trim().is_empty()) {
            return Some(message.clone());
        }
        match self.detail.as_ref()? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            // FastAPI validation errors: [{"loc": [...], "msg": "...", ...}]
            serde_json::Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                (!msgs.is_empty()).then(|| msgs.join("; "))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_parses_server_shape() {
        let json = r#"{
            "_id": "652f0c",
            "room_id": 5,
            "sequence_number": 1,
            "sender": "system",
            "content": "Hello",
            "timestamp": "2023-10-27T10:00:00"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id.as_deref(), Some("652f0c"));
        assert_eq!(msg.sender, Sender::System);
        assert_eq!(msg.room_id, 5);
        assert!(msg.timestamp.is_some());
    }

    #[test]
    fn test_message_accepts_rfc3339_and_missing_fields() {
        let json = r#"{"room_id": 1, "sender": "user", "content": "Hi", "timestamp": "2023-10-27T10:00:00Z"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(msg.id.is_none());
        assert!(msg.sequence_number.is_none());
        assert_eq!(msg.timestamp.unwrap().to_rfc3339(), "2023-10-27T10:00:00+00:00");
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let credentials = Credentials {
            token: "secret-token".to_string(),
            user: User {
                id: 1,
                name: "A".to_string(),
                email: None,
            },
        };
        let printed = format!("{:?}", credentials);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_local_message_id_prefix() {
        let msg = Message::local("user", Sender::User, "Q".to_string(), 3);
        assert!(msg.id.unwrap().starts_with("user-"));
        assert_eq!(msg.room_id, 3);
    }

    #[test]
    fn test_login_response_nested_user() {
        let json = r#"{"token": "t", "user": {"id": 1, "name": "A"}}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token.as_deref(), Some("t"));
        let user = resp.into_user().unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.name, "A");
    }

    #[test]
    fn test_login_response_flat_user() {
        let json = r#"{"id": 7, "name": "Kim", "email": "kim@example.com"}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert!(resp.token.is_none());
        let user = resp.into_user().unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.email.as_deref(), Some("kim@example.com"));
    }

    #[test]
    fn test_password_change_is_camel_case() {
        let body = serde_json::to_value(PasswordChangeRequest {
            new_password: "pw".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"newPassword": "pw"}));
    }

    #[test]
    fn test_error_body_prefers_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"status": 401, "message": "Bad credentials", "detail": "x"}"#)
                .unwrap();
        assert_eq!(body.text().as_deref(), Some("Bad credentials"));
    }

    #[test]
    fn test_error_body_detail_list() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"detail": [{"loc": ["body", "title"], "msg": "field required"}, {"msg": "bad file"}]}"#,
        )
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("field required; bad file"));
    }

    #[test]
    fn test_error_body_empty() {
        assert!(ErrorBody::default().text().is_none());
    }
}

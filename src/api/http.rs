//! reqwest implementation of [`ChatBackend`].
//!
//! Two services sit behind this client:
//! - the auth server (`/auth/...`), JSON in and out, errors carry `message`
//! - the document server (`/api/v1/...`), multipart uploads, errors carry `detail`

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::backend::{ApiError, ChatBackend};
use super::types::{
    Credentials, ErrorBody, LoginRequest, LoginResponse, Message, PasswordChangeRequest,
    PdfUpload, QueryResponse, ResetCodeRequest, Room, RoomId, SignupRequest, UpsertResponse,
    UserId, VerifyCodeRequest, VerifyCodeResponse,
};

pub const RESET_TOKEN_HEADER: &str = "X-Reset-Token";

pub struct HttpBackend {
    auth_base_url: String,
    api_base_url: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl HttpBackend {
    pub fn new(auth_base_url: &str, api_base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
                reqwest::Client::new()
            });

        Self {
            auth_base_url: auth_base_url.trim_end_matches('/').to_string(),
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            client,
            token: RwLock::new(None),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}{}", self.auth_base_url, path)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// Adds the bearer token, if one is set, to a document API request.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self.token.read().ok().and_then(|guard| guard.clone());
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        debug!("{} -> {}", response.url().path(), response.status());
        ensure_success(response).await
    }
}

/// Turns a non-2xx response into `ApiError::Api`, pulling out the server's message.
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.text());
    warn!("HTTP {} error body: {}", status.as_u16(), body);
    Err(ApiError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    debug!("Response body: {} bytes", body.len());
    serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// `Authorization: Bearer <token>` header value, if present.
fn bearer_from_headers(response: &Response) -> Option<String> {
    response
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    async fn login(&self, request: &LoginRequest) -> Result<Credentials, ApiError> {
        info!("Logging in");
        let response = self
            .send(self.client.post(self.auth_url("/auth/login")).json(request))
            .await?;

        let header_token = bearer_from_headers(&response);
        let body: LoginResponse = parse_json(response).await?;
        let token = body
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .or(header_token)
            .ok_or_else(|| ApiError::Parse("login response carried no token".to_string()))?;
        let user = body
            .into_user()
            .ok_or_else(|| ApiError::Parse("login response carried no user".to_string()))?;

        info!("Logged in as user {}", user.id);
        Ok(Credentials { token, user })
    }

    async fn signup(&self, request: &SignupRequest) -> Result<(), ApiError> {
        info!("Signing up");
        self.send(self.client.post(self.auth_url("/auth/signup")).json(request))
            .await?;
        Ok(())
    }

    async fn request_reset_code(&self, request: &ResetCodeRequest) -> Result<(), ApiError> {
        info!("Requesting password reset code");
        self.send(
            self.client
                .post(self.auth_url("/auth/password/reset-request"))
                .json(request),
        )
        .await?;
        Ok(())
    }

    async fn verify_reset_code(&self, request: &VerifyCodeRequest) -> Result<String, ApiError> {
        info!("Verifying password reset code");
        let response = self
            .send(
                self.client
                    .post(self.auth_url("/auth/password/verify-code"))
                    .json(request),
            )
            .await?;
        let body: VerifyCodeResponse = parse_json(response).await?;
        Ok(body.reset_token)
    }

    async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        info!("Changing password with reset token");
        let body = PasswordChangeRequest {
            new_password: new_password.to_string(),
        };
        self.send(
            self.client
                .post(self.auth_url("/auth/password/change"))
                .header(RESET_TOKEN_HEADER, reset_token)
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn list_rooms(&self, user_id: UserId) -> Result<Vec<Room>, ApiError> {
        info!("Listing rooms for user {}", user_id);
        let request = self.authorized(
            self.client
                .get(self.api_url(&format!("/api/v1/users/{}/rooms", user_id))),
        );
        match self.send(request).await {
            Ok(response) => parse_json(response).await,
            // The document server answers 404 for a user with no rooms yet.
            Err(ApiError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                debug!("No rooms for user {}", user_id);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn create_room(&self, upload: PdfUpload) -> Result<Room, ApiError> {
        info!(
            "Uploading PDF '{}' ({} bytes) for user {}",
            upload.file_name,
            upload.bytes.len(),
            upload.user_id
        );
        let file_part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str("application/pdf")
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        let form = Form::new()
            .text("title", upload.title.clone())
            .part("file", file_part)
            .text("user_id", upload.user_id.to_string());

        let response = self
            .send(self.authorized(
                self.client
                    .post(self.api_url("/api/v1/upsert-pdf/"))
                    .multipart(form),
            ))
            .await?;
        let body: UpsertResponse = parse_json(response).await?;
        debug!("Upsert: {} ({} chunks)", body.message, body.chunk_count);

        let room_id = body
            .base_id
            .trim()
            .parse::<RoomId>()
            .map_err(|e| ApiError::Parse(format!("base_id '{}': {}", body.base_id, e)))?;
        Ok(Room {
            room_id,
            title: upload.title,
        })
    }

    async fn delete_room(&self, room_id: RoomId) -> Result<(), ApiError> {
        info!("Deleting room {}", room_id);
        self.send(self.authorized(
            self.client
                .delete(self.api_url(&format!("/api/v1/rooms/{}", room_id))),
        ))
        .await?;
        Ok(())
    }

    async fn list_messages(&self, room_id: RoomId) -> Result<Vec<Message>, ApiError> {
        info!("Loading messages for room {}", room_id);
        let response = self
            .send(self.authorized(
                self.client
                    .get(self.api_url(&format!("/api/v1/rooms/{}/messages", room_id))),
            ))
            .await?;
        parse_json(response).await
    }

    async fn query(&self, room_id: RoomId, question: &str) -> Result<String, ApiError> {
        info!("Querying room {} ({} chars)", room_id, question.len());
        let form = Form::new()
            .text("room_id", room_id.to_string())
            .text("question", question.to_string());
        let response = self
            .send(self.authorized(
                self.client
                    .post(self.api_url("/api/v1/query-pdf/"))
                    .multipart(form),
            ))
            .await?;
        let body: QueryResponse = parse_json(response).await?;
        Ok(body.answer)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        info!("Logging out");
        self.send(self.authorized(self.client.post(self.api_url("/logout"))))
            .await?;
        Ok(())
    }
}

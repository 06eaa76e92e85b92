//! # Effect Dispatch
//!
//! Runs the `Effect`s produced by `core::update` against a [`ChatBackend`]
//! and the session store, and turns every outcome into the `Action` that
//! reports it. Failures never escape: each becomes an action carrying the
//! string the user will see.

use std::path::Path;

use log::{info, warn};

use crate::api::types::{LoginRequest, ResetCodeRequest, SignupRequest, VerifyCodeRequest};
use crate::api::{ApiError, ChatBackend, Credentials, PdfUpload};
use crate::core::action::{
    CREATE_ROOM_FAILED, DELETE_ROOM_ERROR, DELETE_ROOM_FAILED, LOAD_MESSAGES_FAILED,
    LOAD_ROOMS_FAILED, LOGIN_FAILED, RESET_FAILED, RESET_REQUEST_FAILED, SIGNUP_FAILED,
    VERIFY_CODE_FAILED,
};
use crate::core::session::SessionStore;
use crate::core::validate;
use crate::core::{Action, Effect};

/// Restores a stored login and hands its token to the backend.
pub fn resume_session(backend: &dyn ChatBackend, store: &SessionStore) -> Option<Credentials> {
    let credentials = store.restore()?;
    info!("Resuming session for user {}", credentials.user.id);
    backend.set_token(Some(credentials.token.clone()));
    Some(credentials)
}

/// Execute one effect. Returns `None` for effects with nothing to report.
pub async fn run_effect(
    effect: Effect,
    backend: &dyn ChatBackend,
    store: &SessionStore,
) -> Option<Action> {
    let action = match effect {
        Effect::None | Effect::Quit => return None,

        Effect::Login { email, password } => {
            match backend.login(&LoginRequest { email, password }).await {
                Ok(credentials) => {
                    if let Err(e) = store.save(&credentials) {
                        warn!("Failed to persist session: {}", e);
                    }
                    backend.set_token(Some(credentials.token.clone()));
                    Action::LoginSucceeded(credentials)
                }
                Err(e) => {
                    warn!("Login failed: {}", e);
                    Action::LoginFailed(e.user_message(LOGIN_FAILED))
                }
            }
        }
        Effect::Signup {
            name,
            email,
            password,
        } => {
            let request = SignupRequest {
                name,
                email,
                password,
            };
            match backend.signup(&request).await {
                Ok(()) => Action::SignupSucceeded,
                Err(e) => {
                    warn!("Signup failed: {}", e);
                    Action::SignupFailed(e.user_message(SIGNUP_FAILED))
                }
            }
        }
        Effect::RequestResetCode { name, email } => {
            let request = ResetCodeRequest {
                name,
                email: email.clone(),
            };
            match backend.request_reset_code(&request).await {
                Ok(()) => Action::ResetCodeSent { email },
                Err(e) => {
                    warn!("Reset code request failed: {}", e);
                    Action::ResetRequestFailed(e.user_message(RESET_REQUEST_FAILED))
                }
            }
        }
        Effect::VerifyResetCode { email, code } => {
            match backend
                .verify_reset_code(&VerifyCodeRequest { email, code })
                .await
            {
                Ok(reset_token) => Action::ResetCodeVerified { reset_token },
                Err(e) => {
                    warn!("Code verification failed: {}", e);
                    Action::VerifyCodeFailed(e.user_message(VERIFY_CODE_FAILED))
                }
            }
        }
        Effect::ResetPassword {
            reset_token,
            new_password,
        } => match backend.reset_password(&reset_token, &new_password).await {
            Ok(()) => Action::PasswordResetDone,
            Err(e) => {
                warn!("Password change failed: {}", e);
                Action::PasswordResetFailed(e.user_message(RESET_FAILED))
            }
        },
        Effect::Logout => {
            if let Err(e) = backend.logout().await {
                warn!("Logout request failed, clearing local session anyway: {}", e);
            }
            if let Err(e) = store.clear() {
                warn!("Failed to remove session file: {}", e);
            }
            backend.set_token(None);
            Action::LoggedOut
        }

        Effect::LoadRooms { user_id } => match backend.list_rooms(user_id).await {
            Ok(rooms) => Action::RoomsLoaded { user_id, rooms },
            Err(e) => {
                warn!("Loading rooms failed: {}", e);
                Action::RoomsLoadFailed {
                    user_id,
                    error: e.user_message(LOAD_ROOMS_FAILED),
                }
            }
        },
        Effect::CreateRoom {
            title,
            path,
            user_id,
        } => match read_pdf(Path::new(&path)).await {
            Ok((file_name, bytes)) => {
                let upload = PdfUpload {
                    title,
                    file_name,
                    bytes,
                    user_id,
                };
                match backend.create_room(upload).await {
                    Ok(room) => Action::RoomCreated { user_id, room },
                    Err(e) => {
                        warn!("Room creation failed: {}", e);
                        Action::RoomCreateFailed {
                            user_id,
                            error: e.user_message(CREATE_ROOM_FAILED),
                        }
                    }
                }
            }
            Err(error) => Action::RoomCreateFailed { user_id, error },
        },
        Effect::DeleteRoom { room_id } => match backend.delete_room(room_id).await {
            Ok(()) => Action::RoomDeleted(room_id),
            Err(e) => {
                warn!("Deleting room {} failed: {}", room_id, e);
                let message = match e {
                    ApiError::Api { .. } => DELETE_ROOM_FAILED,
                    _ => DELETE_ROOM_ERROR,
                };
                Action::RoomDeleteFailed(message.to_string())
            }
        },

        Effect::LoadMessages {
            room_id,
            generation,
        } => match backend.list_messages(room_id).await {
            Ok(messages) => Action::MessagesLoaded {
                room_id,
                generation,
                messages,
            },
            Err(e) => {
                warn!("Loading messages for room {} failed: {}", room_id, e);
                Action::MessagesLoadFailed {
                    room_id,
                    generation,
                    error: e.user_message(LOAD_MESSAGES_FAILED),
                }
            }
        },
        Effect::Query {
            room_id,
            question,
            generation,
        } => {
            let result = backend.query(room_id, &question).await;
            if let Err(e) = &result {
                warn!("Query in room {} failed: {}", room_id, e);
            }
            Action::AnswerReceived {
                room_id,
                generation,
                result,
            }
        }
    };
    Some(action)
}

/// Reads the file and checks it really is a PDF. Nothing is sent on failure.
async fn read_pdf(path: &Path) -> Result<(String, Vec<u8>), String> {
    if !validate::has_pdf_extension(path) {
        return Err(validate::ValidationError::NotPdf.to_string());
    }
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;
    validate::check_pdf_bytes(&bytes).map_err(|e| e.to_string())?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    Ok((file_name, bytes))
}

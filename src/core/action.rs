//! # Actions
//!
//! Everything that can happen in DocChat becomes an `Action`.
//! User submits the login form? That's `Action::SubmitLogin`.
//! The server answers? That's `Action::LoginSucceeded(credentials)`.
//!
//! `update()` applies an action to the state and returns the `Effect` the
//! caller must run. No I/O happens here; `dispatch::run_effect` performs the
//! request and feeds the outcome back as another action.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//!                                               │
//!                         dispatch::run_effect ◄┘ → Action → update() ...
//! ```

use log::{debug, info};

use crate::api::{ApiError, Credentials, Message, Room, RoomId, Sender, UserId};
use crate::core::state::{App, ForgotStep, NewRoomState, Route};
use crate::core::validate::{self, ValidationError};

pub const LOGIN_FAILED: &str = "Login failed.";
pub const SIGNUP_FAILED: &str = "Sign up failed.";
pub const RESET_REQUEST_FAILED: &str = "Password reset request failed.";
pub const VERIFY_CODE_FAILED: &str = "Verification code check failed.";
pub const RESET_FAILED: &str = "Password reset failed.";
pub const CREATE_ROOM_FAILED: &str = "Failed to create room.";
pub const DELETE_ROOM_FAILED: &str = "Failed to delete the room.";
pub const DELETE_ROOM_ERROR: &str = "An error occurred while deleting the room.";
pub const LOAD_ROOMS_FAILED: &str = "Failed to load rooms.";
pub const LOAD_MESSAGES_FAILED: &str = "Failed to load messages.";
pub const ANSWER_FALLBACK: &str = "Sorry, something went wrong while getting a response.";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate(Route),
    DismissFeedback,
    Quit,

    // Authentication
    SubmitLogin { email: String, password: String },
    LoginSucceeded(Credentials),
    LoginFailed(String),
    SubmitSignup { name: String, email: String, password: String },
    SignupSucceeded,
    SignupFailed(String),
    SubmitResetRequest { name: String, email: String },
    ResetCodeSent { email: String },
    ResetRequestFailed(String),
    SubmitVerifyCode { code: String },
    ResetCodeVerified { reset_token: String },
    VerifyCodeFailed(String),
    SubmitNewPassword { password: String, confirm: String },
    PasswordResetDone,
    PasswordResetFailed(String),
    Logout,
    LoggedOut,

    // Rooms. Results carry the user they were requested for.
    RoomsLoaded {
        user_id: UserId,
        rooms: Vec<Room>,
    },
    RoomsLoadFailed {
        user_id: UserId,
        error: String,
    },
    OpenNewRoom,
    CloseNewRoom,
    SubmitNewRoom { title: String, path: String },
    RoomCreated {
        user_id: UserId,
        room: Room,
    },
    RoomCreateFailed {
        user_id: UserId,
        error: String,
    },
    RequestDeleteRoom(RoomId),
    CancelDelete,
    ConfirmDelete,
    RoomDeleted(RoomId),
    RoomDeleteFailed(String),

    // Chat
    SelectRoom(RoomId),
    MessagesLoaded {
        room_id: RoomId,
        generation: u64,
        messages: Vec<Message>,
    },
    MessagesLoadFailed {
        room_id: RoomId,
        generation: u64,
        error: String,
    },
    SendMessage(String),
    AnswerReceived {
        room_id: RoomId,
        generation: u64,
        result: Result<String, ApiError>,
    },
}

/// Work the caller must do after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    Login { email: String, password: String },
    Signup { name: String, email: String, password: String },
    RequestResetCode { name: String, email: String },
    VerifyResetCode { email: String, code: String },
    ResetPassword { reset_token: String, new_password: String },
    Logout,
    LoadRooms { user_id: UserId },
    CreateRoom { title: String, path: String, user_id: UserId },
    DeleteRoom { room_id: RoomId },
    LoadMessages { room_id: RoomId, generation: u64 },
    Query { room_id: RoomId, question: String, generation: u64 },
}

/// Apply `action` to `app`, returning the effect to run.
pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Quit => Effect::Quit,
        Action::DismissFeedback => {
            app.clear_feedback();
            Effect::None
        }
        Action::Navigate(route) => navigate(app, route),

        // ------------------------------------------------------------------
        // Authentication
        // ------------------------------------------------------------------
        Action::SubmitLogin { email, password } => {
            if app.busy {
                return Effect::None;
            }
            app.clear_feedback();
            if let Err(e) = validate::require_all(&[&email, &password]) {
                return reject(app, e);
            }
            app.busy = true;
            app.status_message = "Logging in...".to_string();
            Effect::Login {
                email: email.trim().to_string(),
                password,
            }
        }
        Action::LoginSucceeded(credentials) => {
            app.busy = false;
            let user_id = credentials.user.id;
            info!("Session started for user {}", user_id);
            app.session = Some(credentials);
            app.route = Route::Home;
            app.clear_feedback();
            app.notice = Some("Logged in successfully.".to_string());
            app.status_message = "Logged in".to_string();
            Effect::LoadRooms { user_id }
        }
        Action::LoginFailed(message) => fail_auth(app, message),

        Action::SubmitSignup {
            name,
            email,
            password,
        } => {
            if app.busy {
                return Effect::None;
            }
            app.clear_feedback();
            if let Err(e) = validate::require_all(&[&name, &email, &password]) {
                return reject(app, e);
            }
            app.busy = true;
            app.status_message = "Signing up...".to_string();
            Effect::Signup {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password,
            }
        }
        Action::SignupSucceeded => {
            app.busy = false;
            app.route = Route::Login;
            app.clear_feedback();
            app.notice = Some("Sign up complete. Please log in.".to_string());
            app.status_message = String::new();
            Effect::None
        }
        Action::SignupFailed(message) => fail_auth(app, message),

        Action::SubmitResetRequest { name, email } => {
            if app.busy {
                return Effect::None;
            }
            app.clear_feedback();
            if let Err(e) = validate::require_all(&[&name, &email]) {
                return reject(app, e);
            }
            app.busy = true;
            Effect::RequestResetCode {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
            }
        }
        Action::ResetCodeSent { email } => {
            app.busy = false;
            app.forgot_step = ForgotStep::VerifyCode { email };
            app.clear_feedback();
            app.notice = Some("Verification code sent. Enter the code.".to_string());
            Effect::None
        }
        Action::ResetRequestFailed(message) => fail_auth(app, message),

        Action::SubmitVerifyCode { code } => {
            if app.busy {
                return Effect::None;
            }
            app.clear_feedback();
            let ForgotStep::VerifyCode { email } = app.forgot_step.clone() else {
                debug!("Verify code submitted before a code was requested");
                return Effect::None;
            };
            if let Err(e) = validate::require_all(&[&code]) {
                return reject(app, e);
            }
            app.busy = true;
            Effect::VerifyResetCode {
                email,
                code: code.trim().to_string(),
            }
        }
        Action::ResetCodeVerified { reset_token } => {
            app.busy = false;
            app.reset_token = Some(reset_token);
            app.forgot_step = ForgotStep::RequestCode;
            app.route = Route::ResetPassword;
            app.clear_feedback();
            app.notice =
                Some("Code verified. Please set a new password.".to_string());
            Effect::None
        }
        Action::VerifyCodeFailed(message) => fail_auth(app, message),

        Action::SubmitNewPassword { password, confirm } => {
            if app.busy {
                return Effect::None;
            }
            app.clear_feedback();
            if let Err(e) =
                validate::check_new_password(&password, &confirm, app.reset_token.as_deref())
            {
                return reject(app, e);
            }
            let Some(reset_token) = app.reset_token.clone() else {
                return reject(app, ValidationError::MissingResetToken);
            };
            app.busy = true;
            Effect::ResetPassword {
                reset_token,
                new_password: password,
            }
        }
        Action::PasswordResetDone => {
            app.busy = false;
            app.reset_token = None;
            app.route = Route::Login;
            app.clear_feedback();
            app.notice = Some("Password has been reset. Please log in.".to_string());
            Effect::None
        }
        Action::PasswordResetFailed(message) => fail_auth(app, message),

        Action::Logout => {
            if !app.is_authenticated() {
                return Effect::None;
            }
            app.status_message = "Logging out...".to_string();
            Effect::Logout
        }
        Action::LoggedOut => {
            // Generations keep counting so answers issued before the logout
            // can never look current in the next session.
            let generation = app.selection_generation;
            *app = App::new();
            app.selection_generation = generation;
            app.notice = Some("Logged out.".to_string());
            Effect::None
        }

        // ------------------------------------------------------------------
        // Rooms
        // ------------------------------------------------------------------
        Action::RoomsLoaded { user_id, rooms } => {
            if !is_session_user(app, user_id) {
                debug!("Discarding rooms loaded for user {}", user_id);
                return Effect::None;
            }
            debug!("Loaded {} rooms", rooms.len());
            app.rooms = rooms;
            Effect::None
        }
        Action::RoomsLoadFailed { user_id, error } => {
            if is_session_user(app, user_id) {
                app.error = Some(error);
            }
            Effect::None
        }
        Action::OpenNewRoom => {
            if app.is_authenticated() && app.new_room.is_none() {
                app.new_room = Some(NewRoomState::default());
            }
            Effect::None
        }
        Action::CloseNewRoom => {
            if !app.new_room.as_ref().is_some_and(|m| m.creating) {
                app.new_room = None;
            }
            Effect::None
        }
        Action::SubmitNewRoom { title, path } => submit_new_room(app, title, path),
        Action::RoomCreated { user_id, room } => {
            if !is_session_user(app, user_id) {
                debug!("Discarding room {} created for user {}", room.room_id, user_id);
                return Effect::None;
            }
            info!("Room {} created", room.room_id);
            app.status_message = format!("Created \"{}\"", room.title);
            app.rooms.push(room);
            app.new_room = None;
            Effect::None
        }
        Action::RoomCreateFailed { user_id, error } => {
            if !is_session_user(app, user_id) {
                return Effect::None;
            }
            if let Some(modal) = app.new_room.as_mut() {
                modal.creating = false;
                modal.error = Some(error);
            } else {
                app.error = Some(error);
            }
            Effect::None
        }
        Action::RequestDeleteRoom(room_id) => {
            app.confirm_delete = app.rooms.iter().find(|r| r.room_id == room_id).cloned();
            Effect::None
        }
        Action::CancelDelete => {
            app.confirm_delete = None;
            Effect::None
        }
        Action::ConfirmDelete => match app.confirm_delete.take() {
            Some(room) => Effect::DeleteRoom {
                room_id: room.room_id,
            },
            None => Effect::None,
        },
        Action::RoomDeleted(room_id) => {
            app.rooms.retain(|r| r.room_id != room_id);
            if app.selected_room_id() == Some(room_id) {
                app.selected_room = None;
                app.messages.clear();
                app.selection_generation += 1;
            }
            app.pending_queries.remove(&room_id);
            app.status_message = "Room deleted".to_string();
            Effect::None
        }
        Action::RoomDeleteFailed(message) => {
            app.error = Some(message);
            Effect::None
        }

        // ------------------------------------------------------------------
        // Chat
        // ------------------------------------------------------------------
        Action::SelectRoom(room_id) => {
            if app.selected_room_id() == Some(room_id) {
                return Effect::None;
            }
            let Some(room) = app.rooms.iter().find(|r| r.room_id == room_id).cloned() else {
                return Effect::None;
            };
            app.selected_room = Some(room);
            reload_messages(app, room_id)
        }
        Action::MessagesLoaded {
            room_id,
            generation,
            messages,
        } => {
            if is_current(app, room_id, generation) {
                app.messages = messages;
            } else {
                debug!(
                    "Discarding stale history for room {} (generation {})",
                    room_id, generation
                );
            }
            Effect::None
        }
        Action::MessagesLoadFailed {
            room_id,
            generation,
            error,
        } => {
            if is_current(app, room_id, generation) {
                app.messages.clear();
                app.status_message = error;
            }
            Effect::None
        }
        Action::SendMessage(text) => {
            let question = text.trim();
            let Some(room_id) = app.selected_room_id() else {
                return Effect::None;
            };
            if question.is_empty() || app.pending_queries.contains_key(&room_id) {
                return Effect::None;
            }
            app.messages.push(Message::local(
                "user",
                Sender::User,
                question.to_string(),
                room_id,
            ));
            app.pending_queries
                .insert(room_id, app.selection_generation);
            Effect::Query {
                room_id,
                question: question.to_string(),
                generation: app.selection_generation,
            }
        }
        Action::AnswerReceived {
            room_id,
            generation,
            result,
        } => {
            if app.pending_queries.get(&room_id) != Some(&generation) {
                debug!(
                    "Dropping answer for room {} from an earlier session (generation {})",
                    room_id, generation
                );
                return Effect::None;
            }
            app.pending_queries.remove(&room_id);
            if is_current(app, room_id, generation) {
                let message = match result {
                    Ok(answer) => Message::local("system", Sender::System, answer, room_id),
                    Err(_) => Message::local(
                        "error",
                        Sender::System,
                        ANSWER_FALLBACK.to_string(),
                        room_id,
                    ),
                };
                app.messages.push(message);
                Effect::None
            } else if app.selected_room_id() == Some(room_id) {
                // Switched away and back: the history loaded in between may
                // predate this answer, and the server stored both turns.
                reload_messages(app, room_id)
            } else {
                debug!("Dropping answer for unselected room {}", room_id);
                Effect::None
            }
        }
    }
}

fn navigate(app: &mut App, route: Route) -> Effect {
    app.clear_feedback();
    app.route = route;
    match route {
        Route::ForgotPassword => {
            app.forgot_step = ForgotStep::RequestCode;
            Effect::None
        }
        Route::ResetPassword if app.reset_token.is_none() => {
            app.error = Some(ValidationError::MissingResetToken.to_string());
            Effect::None
        }
        Route::Home => match app.user() {
            Some(user) => Effect::LoadRooms { user_id: user.id },
            None => {
                app.route = Route::Login;
                Effect::None
            }
        },
        _ => Effect::None,
    }
}

fn reject(app: &mut App, error: ValidationError) -> Effect {
    app.error = Some(error.to_string());
    Effect::None
}

fn fail_auth(app: &mut App, message: String) -> Effect {
    app.busy = false;
    app.notice = None;
    app.error = Some(message);
    app.status_message = String::new();
    Effect::None
}

fn submit_new_room(app: &mut App, title: String, path: String) -> Effect {
    let Some(user_id) = app.user().map(|u| u.id) else {
        return Effect::None;
    };
    let Some(modal) = app.new_room.as_mut() else {
        return Effect::None;
    };
    if modal.creating {
        return Effect::None;
    }
    if let Err(e) = validate::check_new_room(&title, &path) {
        modal.error = Some(e.to_string());
        return Effect::None;
    }
    modal.creating = true;
    modal.error = None;
    Effect::CreateRoom {
        title: title.trim().to_string(),
        path: path.trim().to_string(),
        user_id,
    }
}

/// Clears the list and starts a fresh history load for `room_id`.
fn reload_messages(app: &mut App, room_id: RoomId) -> Effect {
    app.messages.clear();
    app.selection_generation += 1;
    Effect::LoadMessages {
        room_id,
        generation: app.selection_generation,
    }
}

fn is_current(app: &App, room_id: RoomId, generation: u64) -> bool {
    app.selected_room_id() == Some(room_id) && app.selection_generation == generation
}

/// True when `user_id` owns the current session.
fn is_session_user(app: &App, user_id: UserId) -> bool {
    app.user().is_some_and(|u| u.id == user_id)
}

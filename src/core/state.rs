//! # Application State
//!
//! Core business state for DocChat. Domain data only, no TUI types.
//! Text being typed lives in the TUI; the core only sees submitted values.
//!
//! ```text
//! App
//! ├── route: Route                           // the one active screen
//! ├── session: Option<Credentials>           // token + user once logged in
//! ├── forgot_step: ForgotStep                // request code → verify code
//! ├── reset_token: Option<String>            // proof of code verification
//! ├── rooms: Vec<Room>                       // server order
//! ├── selected_room: Option<Room>            // at most one
//! ├── messages: Vec<Message>                 // always the selected room's
//! ├── selection_generation: u64              // bumped on every selection, never reset
//! ├── pending_queries: HashMap<RoomId, u64>  // in-flight query → generation sent under
//! ├── new_room: Option<NewRoomState>         // creation modal, when open
//! ├── confirm_delete: Option<Room>           // delete guard, when asked
//! ├── busy: bool                             // auth request in flight
//! ├── notice / error: Option<String>         // success and failure text
//! └── status_message: String                 // header status line
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::HashMap;

use crate::api::{Credentials, Message, Room, RoomId, User};

/// Screens, named after the paths they answer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    ForgotPassword,
    ResetPassword,
    /// `/`: the chat page when logged in, otherwise the login screen.
    Home,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::ForgotPassword => "/forgot-password",
            Route::ResetPassword => "/reset-password",
            Route::Home => "/",
        }
    }
}

/// Where the forgot-password wizard is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForgotStep {
    RequestCode,
    /// Code sent to `email`; waiting for the user to type it in.
    VerifyCode { email: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRoomState {
    pub creating: bool,
    pub error: Option<String>,
}

pub struct App {
    pub route: Route,
    pub session: Option<Credentials>,
    pub forgot_step: ForgotStep,
    pub reset_token: Option<String>,
    pub rooms: Vec<Room>,
    pub selected_room: Option<Room>,
    pub messages: Vec<Message>,
    pub selection_generation: u64,
    pub pending_queries: HashMap<RoomId, u64>,
    pub new_room: Option<NewRoomState>,
    pub confirm_delete: Option<Room>,
    pub busy: bool,
    pub notice: Option<String>,
    pub error: Option<String>,
    pub status_message: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            route: Route::Login,
            session: None,
            forgot_step: ForgotStep::RequestCode,
            reset_token: None,
            rooms: Vec::new(),
            selected_room: None,
            messages: Vec::new(),
            selection_generation: 0,
            pending_queries: HashMap::new(),
            new_room: None,
            confirm_delete: None,
            busy: false,
            notice: None,
            error: None,
            status_message: String::from("Welcome to DocChat!"),
        }
    }

    /// Starts on the chat page when a stored session exists.
    pub fn with_session(session: Option<Credentials>) -> Self {
        let mut app = Self::new();
        if session.is_some() {
            app.route = Route::Home;
        }
        app.session = session;
        app
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// The route actually shown: `/` without a session lands on login.
    pub fn effective_route(&self) -> Route {
        match self.route {
            Route::Home if !self.is_authenticated() => Route::Login,
            route => route,
        }
    }

    pub fn selected_room_id(&self) -> Option<RoomId> {
        self.selected_room.as_ref().map(|r| r.room_id)
    }

    /// True while the selected room has a query outstanding. Drives the
    /// typing indicator and disables the input.
    pub fn is_awaiting_answer(&self) -> bool {
        self.selected_room_id()
            .is_some_and(|id| self.pending_queries.contains_key(&id))
    }

    pub fn clear_feedback(&mut self) {
        self.notice = None;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{logged_in_app, room};

    #[test]
    fn test_app_new_defaults() {
        let app = App::new();
        assert_eq!(app.route, Route::Login);
        assert_eq!(app.status_message, "Welcome to DocChat!");
        assert!(!app.is_authenticated());
        assert!(app.selected_room.is_none());
        assert!(!app.busy);
    }

    #[test]
    fn test_home_without_session_resolves_to_login() {
        let mut app = App::new();
        app.route = Route::Home;
        assert_eq!(app.effective_route(), Route::Login);
    }

    #[test]
    fn test_with_session_starts_home() {
        let app = logged_in_app();
        assert_eq!(app.route, Route::Home);
        assert_eq!(app.effective_route(), Route::Home);
        assert_eq!(app.user().unwrap().name, "A");
    }

    #[test]
    fn test_awaiting_answer_is_per_room() {
        let mut app = logged_in_app();
        app.selected_room = Some(room(5, "Contract"));
        app.pending_queries.insert(6, 1);
        assert!(!app.is_awaiting_answer());
        app.pending_queries.insert(5, 1);
        assert!(app.is_awaiting_answer());
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::ResetPassword.path(), "/reset-password");
    }
}

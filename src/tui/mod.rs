//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! ```text
//! terminal event ──► route_event ──► Action ──► update ──► Effect
//!                                                  ▲          │
//!                                                  │    tokio::spawn
//!                                                  │          ▼
//!                         mpsc::Receiver ◄── Action ◄── dispatch::run_effect
//! ```
//!
//! Network calls never block the loop. While a request is in flight the
//! loop redraws every ~80ms so the typing indicator animates; otherwise it
//! sleeps up to 500ms and only redraws on events.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::api::{ChatBackend, HttpBackend, RoomId};
use crate::core::config::ResolvedConfig;
use crate::core::session::SessionStore;
use crate::core::state::{App, ForgotStep, Route};
use crate::core::{Action, Effect, update};
use crate::dispatch;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    AuthForm, ChatEvent, ChatWindowState, FormEvent, ModalEvent, NewRoomModal, SidebarEvent,
    SidebarState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which pane of the chat page receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Chat,
}

/// One form per auth screen. Rebuilt whenever the screen changes so typed
/// passwords never survive navigation.
pub struct AuthForms {
    pub login: AuthForm,
    pub signup: AuthForm,
    pub forgot_request: AuthForm,
    pub forgot_verify: AuthForm,
    pub reset_password: AuthForm,
}

impl Default for AuthForms {
    fn default() -> Self {
        Self {
            login: AuthForm::login(),
            signup: AuthForm::signup(),
            forgot_request: AuthForm::forgot_request(),
            forgot_verify: AuthForm::forgot_verify(),
            reset_password: AuthForm::reset_password(),
        }
    }
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub forms: AuthForms,
    pub sidebar: SidebarState,
    pub chat: ChatWindowState,
    pub modal: NewRoomModal,
    pub focus: Focus,
    // Snapshot of the App fields that reset presentation state when they change
    last_route: Route,
    last_verify_step: bool,
    last_selection: Option<RoomId>,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            forms: AuthForms::default(),
            sidebar: SidebarState::new(),
            chat: ChatWindowState::new(),
            modal: NewRoomModal::new(),
            focus: Focus::Sidebar,
            last_route: Route::Login,
            last_verify_step: false,
            last_selection: None,
        }
    }

    /// The form shown for an auth route.
    pub fn form_mut(&mut self, route: Route, step: &ForgotStep) -> &mut AuthForm {
        match (route, step) {
            (Route::Signup, _) => &mut self.forms.signup,
            (Route::ForgotPassword, ForgotStep::RequestCode) => &mut self.forms.forgot_request,
            (Route::ForgotPassword, ForgotStep::VerifyCode { .. }) => &mut self.forms.forgot_verify,
            (Route::ResetPassword, _) => &mut self.forms.reset_password,
            (Route::Login | Route::Home, _) => &mut self.forms.login,
        }
    }

    /// Bring presentation state in line with `app` after it changed.
    pub fn sync(&mut self, app: &App) {
        let route = app.effective_route();
        let verify_step = matches!(app.forgot_step, ForgotStep::VerifyCode { .. });
        if route != self.last_route || verify_step != self.last_verify_step {
            debug!("Screen changed: {} -> {}", self.last_route.path(), route.path());
            self.forms = AuthForms::default();
            if route != Route::Home {
                self.sidebar = SidebarState::new();
                self.chat = ChatWindowState::new();
                self.focus = Focus::Sidebar;
            }
            self.last_route = route;
            self.last_verify_step = verify_step;
        }

        let selection = app.selected_room_id();
        if selection != self.last_selection {
            self.chat.reset_scroll();
            self.focus = if selection.is_some() {
                Focus::Chat
            } else {
                Focus::Sidebar
            };
            self.last_selection = selection;
        }

        if app.new_room.is_none() {
            self.modal = NewRoomModal::new();
        }
        self.sidebar.clamp(app.rooms.len());
        self.chat.input.disabled = app.is_awaiting_answer();
    }
}

/// Translate one terminal event into at most one core action.
pub fn route_event(app: &App, tui: &mut TuiState, event: TuiEvent) -> Option<Action> {
    if matches!(event, TuiEvent::ForceQuit) {
        return Some(Action::Quit);
    }

    let route = app.effective_route();
    if route != Route::Home {
        return route_auth_event(app, tui, route, event);
    }

    if app.confirm_delete.is_some() {
        return match event {
            TuiEvent::InputChar('y' | 'Y') => Some(Action::ConfirmDelete),
            TuiEvent::InputChar('n' | 'N') | TuiEvent::Escape => Some(Action::CancelDelete),
            _ => None,
        };
    }

    if app.new_room.is_some() {
        return match tui.modal.handle_event(&event)? {
            ModalEvent::Submit { title, path } => Some(Action::SubmitNewRoom { title, path }),
            ModalEvent::Cancel => Some(Action::CloseNewRoom),
        };
    }

    match event {
        TuiEvent::Logout => return Some(Action::Logout),
        TuiEvent::NewRoom => return Some(Action::OpenNewRoom),
        TuiEvent::Escape if app.error.is_some() || app.notice.is_some() => {
            return Some(Action::DismissFeedback);
        }
        TuiEvent::NextField | TuiEvent::PrevField => {
            tui.focus = match tui.focus {
                Focus::Sidebar if app.selected_room.is_some() => Focus::Chat,
                _ => Focus::Sidebar,
            };
            return None;
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.chat.handle_event(&event);
            return None;
        }
        _ => {}
    }

    match tui.focus {
        Focus::Sidebar => match tui.sidebar.handle_event(&event, &app.rooms)? {
            SidebarEvent::Select(room_id) => Some(Action::SelectRoom(room_id)),
            SidebarEvent::Delete(room_id) => Some(Action::RequestDeleteRoom(room_id)),
        },
        Focus::Chat => {
            if matches!(event, TuiEvent::DeleteRoom) {
                return app.selected_room_id().map(Action::RequestDeleteRoom);
            }
            tui.chat.input.disabled = app.is_awaiting_answer();
            match tui.chat.handle_event(&event)? {
                ChatEvent::Send(text) => Some(Action::SendMessage(text)),
            }
        }
    }
}

fn route_auth_event(
    app: &App,
    tui: &mut TuiState,
    route: Route,
    event: TuiEvent,
) -> Option<Action> {
    match (route, &event) {
        (Route::Login, TuiEvent::OpenSignup) => return Some(Action::Navigate(Route::Signup)),
        (Route::Login, TuiEvent::OpenForgot) => {
            return Some(Action::Navigate(Route::ForgotPassword));
        }
        (Route::Login, _) => {}
        (_, TuiEvent::BackToLogin) => return Some(Action::Navigate(Route::Login)),
        _ => {}
    }
    if matches!(event, TuiEvent::Escape) {
        return (app.error.is_some() || app.notice.is_some()).then_some(Action::DismissFeedback);
    }

    let form = tui.form_mut(route, &app.forgot_step);
    form.busy = app.busy;
    let FormEvent::Submit(values) = form.handle_event(&event)?;
    let mut values = values.into_iter();
    let mut next = move || values.next().unwrap_or_default();

    let action = match (route, &app.forgot_step) {
        (Route::Signup, _) => Action::SubmitSignup {
            name: next(),
            email: next(),
            password: next(),
        },
        (Route::ForgotPassword, ForgotStep::RequestCode) => {
            let email = next();
            Action::SubmitResetRequest {
                email,
                name: next(),
            }
        }
        (Route::ForgotPassword, ForgotStep::VerifyCode { .. }) => {
            Action::SubmitVerifyCode { code: next() }
        }
        (Route::ResetPassword, _) => Action::SubmitNewPassword {
            password: next(),
            confirm: next(),
        },
        (Route::Login | Route::Home, _) => Action::SubmitLogin {
            email: next(),
            password: next(),
        },
    };
    Some(action)
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock, // blinking resets on every draw()
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste, Hide);
    }
}

/// Run an effect in the background and feed its outcome back to the loop.
fn spawn_effect(
    effect: Effect,
    backend: &Arc<dyn ChatBackend>,
    store: &SessionStore,
    tx: &mpsc::Sender<Action>,
) {
    if matches!(effect, Effect::None | Effect::Quit) {
        return;
    }
    let backend = Arc::clone(backend);
    let store = store.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        if let Some(action) = dispatch::run_effect(effect, backend.as_ref(), &store).await
            && tx.send(action).is_err()
        {
            warn!("Failed to deliver effect result: receiver dropped");
        }
    });
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(
        &config.auth_base_url,
        &config.api_base_url,
        config.request_timeout,
    ));
    info!(
        "Using {} backend (auth: {}, api: {})",
        backend.name(),
        config.auth_base_url,
        config.api_base_url
    );
    let store = SessionStore::default_location()?;

    let mut app = App::with_session(dispatch::resume_session(backend.as_ref(), &store));
    let mut tui = TuiState::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    if app.is_authenticated() {
        let effect = update(&mut app, Action::Navigate(Route::Home));
        spawn_effect(effect, &backend, &store, &tx);
    }

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let start_time = Instant::now();
    let mut needs_redraw = true;

    'main: loop {
        tui.sync(&app);

        let animating = app.busy
            || app.is_awaiting_answer()
            || app.new_room.as_ref().is_some_and(|m| m.creating);
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_millis() / 300) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Drain every pending event before the next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if matches!(event, TuiEvent::Resize) {
                continue;
            }
            let Some(action) = route_event(&app, &mut tui, event) else {
                continue;
            };
            match update(&mut app, action) {
                Effect::Quit => break 'main,
                effect => spawn_effect(effect, &backend, &store, &tx),
            }
            tui.sync(&app);
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            if !matches!(action, Action::ResetCodeVerified { .. }) {
                debug!("Event loop received: {:?}", action);
            }
            match update(&mut app, action) {
                Effect::Quit => break 'main,
                effect => spawn_effect(effect, &backend, &store, &tx),
            }
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}

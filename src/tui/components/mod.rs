//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as struct fields:
//! - `Header`: greeting and status line above the chat page
//! - `ConfirmDialog`: the delete-room guard
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that own input state and emit high-level events:
//! - `TextField`: single-line input, optionally masked
//! - `AuthForm`: a stack of fields for each auth screen
//! - `NewRoomModal`: title + PDF path overlay
//! - `SidebarState` / `Sidebar`: room list (persistent state + per-frame wrapper)
//! - `ChatWindowState` / `ChatWindow`: history and question input
//!
//! ## Props-Based Data Flow
//!
//! Components never read `App` directly. The parent copies what they need
//! into fields before rendering:
//!
//! ```rust,ignore
//! Header { user_name: &user.name, status_message: &app.status_message }
//!     .render(frame, area);
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs             (this file)
//! ├── text_field.rs      (shared input widget)
//! ├── auth_form.rs       (login, signup, reset screens)
//! ├── header.rs
//! ├── sidebar.rs
//! ├── chat_window.rs
//! ├── new_room_modal.rs
//! └── confirm_dialog.rs
//! ```

pub mod auth_form;
pub mod chat_window;
pub mod confirm_dialog;
pub mod header;
pub mod new_room_modal;
pub mod sidebar;
pub mod text_field;

pub use auth_form::{AuthForm, FormEvent};
pub use chat_window::{ChatEvent, ChatWindow, ChatWindowState};
pub use confirm_dialog::ConfirmDialog;
pub use header::Header;
pub use new_room_modal::{ModalEvent, NewRoomModal};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use text_field::TextField;

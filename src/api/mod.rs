//! # Remote API
//!
//! The auth and document services, seen from the client. `ChatBackend` is
//! the seam: the TUI and the dispatcher only ever hold an
//! `Arc<dyn ChatBackend>`, so tests can swap in a mock server or a no-op.

pub mod backend;
pub mod http;
pub mod types;

pub use backend::{ApiError, ChatBackend};
pub use http::HttpBackend;
pub use types::{Credentials, Message, PdfUpload, Room, RoomId, Sender, User, UserId};

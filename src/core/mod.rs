//! # Core Application Logic
//!
//! This module contains DocChat's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No network. No UI.     │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!                                ▼
//!                    ┌─────────────────────────┐
//!                    │  dispatch::run_effect   │──► ChatBackend (HTTP)
//!                    └───────────┬─────────────┘
//!                                │ Action
//!                                ▼
//!                         TUI event loop
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`validate`]: Client-side form and file checks
//! - [`config`]: Config file + env + CLI resolution
//! - [`session`]: The persisted login

pub mod action;
pub mod config;
pub mod session;
pub mod state;
pub mod validate;

pub use action::{Action, Effect, update};
pub use state::{App, Route};

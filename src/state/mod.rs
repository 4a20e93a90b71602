//! Application state management module.
//!
//! This module contains the core state management for the application, including:
//! - Main `State` struct that holds all application data
//! - Navigation types (View, Focus, InputMode, etc.)
//! - The mounted list screen and its table selection
//! - Create/edit form state and validation
//! - State error handling

mod error;
mod form;
mod navigation;
mod screen;

pub use error::StateError;
pub use form::{FormField, FormMode, FormState};
pub use navigation::{Focus, InputMode, NotificationLevel, View};
pub use screen::{ListScreen, Parent};

// State struct and methods are in state_impl.rs
#[path = "state_impl.rs"]
mod state_impl;

pub use state_impl::{Notification, PendingDelete, State};

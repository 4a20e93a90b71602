//! Terminal admin dashboard for an e-learning platform.
//!
//! The crate is split into:
//! - `api`: REST client, resource catalogue and response models
//! - `query`: tag-aware query cache, mutations and the list-fetch controller
//! - `session`: persisted access token and logout-on-401
//! - `state`, `events`, `ui`: the terminal application
//! - `config`, `error`: ambient configuration and error types

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod query;
pub mod session;
pub mod state;
pub mod ui;

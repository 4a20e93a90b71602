//! Query layer.
//!
//! This module contains the pieces between list screens and the API:
//! - `QueryCache`: tag-aware cache of list pages
//! - `ListController`: debounced, paginated list view state
//! - `Mutation`: writes and the tags they invalidate
//! - `ListParams`/`Filters`: typed query arguments

mod cache;
mod controller;
mod mutation;
mod params;
mod tag;

pub use cache::{Invalidation, QueryCache, QueryKey, DEFAULT_KEEP_FOR};
pub use controller::{ListController, ListOptions, ListSource, ListViewState, SEARCH_DEBOUNCE};
pub use mutation::{Mutation, MutationOp};
pub use params::{Filters, ListParams, DEFAULT_PAGE_SIZE};
pub use tag::Tag;

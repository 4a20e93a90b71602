mod all;
mod dialog;
mod footer;
mod form;
mod header;
mod list;
mod log;
mod login;
mod sidebar;

use self::log::log;
use super::*;
use dialog::{delete_confirmation, notifications};
use footer::footer;
use form::form;
use header::header;
use list::list;
use login::login;
use sidebar::sidebar;

pub use all::all as render;

//! Callbacks module for handling all inline keyboard callback queries
//!
//! - `callback_types`: The typed [`CallbackAction`] set and its wire encoding
//! - `callback_handler`: Routes a decoded action to its handler

pub mod callback_handler;
pub mod callback_types;

pub use callback_handler::handle_callback;
pub use callback_types::{CallbackAction, MenuOption, SettingsAction, TodoAction};

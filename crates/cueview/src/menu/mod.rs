//! Menu models: actions, menus and the menu bar.

mod action;
mod menu;

pub use action::Action;
pub use menu::{Menu, MenuBar, MenuItem};

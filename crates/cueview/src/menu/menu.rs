//! Menus and the menu bar.
//!
//! A [`Menu`] is an ordered list of shared [`Action`]s and separators. A
//! [`MenuBar`] is the ordered list of a window's top-level menus. Both are
//! plain models; drawing them is the toolkit's business.

use std::sync::Arc;

use parking_lot::RwLock;

use super::action::Action;

/// One entry of a menu.
#[derive(Debug, Clone)]
pub enum MenuItem {
    /// An activatable action.
    Action(Arc<Action>),
    /// A visual separator.
    Separator,
}

/// A titled list of actions.
#[derive(Debug)]
pub struct Menu {
    title: String,
    items: RwLock<Vec<MenuItem>>,
}

impl Menu {
    /// Create an empty menu. The title may carry a `&` mnemonic.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: RwLock::new(Vec::new()),
        }
    }

    /// The raw title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Append an action and return it.
    pub fn add_action(&self, action: Arc<Action>) -> Arc<Action> {
        self.items.write().push(MenuItem::Action(action.clone()));
        action
    }

    /// Append a separator.
    pub fn add_separator(&self) {
        self.items.write().push(MenuItem::Separator);
    }

    /// A snapshot of the menu entries.
    pub fn items(&self) -> Vec<MenuItem> {
        self.items.read().clone()
    }

    /// A snapshot of the actions, separators skipped.
    pub fn actions(&self) -> Vec<Arc<Action>> {
        self.items
            .read()
            .iter()
            .filter_map(|item| match item {
                MenuItem::Action(action) => Some(action.clone()),
                MenuItem::Separator => None,
            })
            .collect()
    }

    /// Find an action by its displayed label.
    pub fn find_action(&self, label: &str) -> Option<Arc<Action>> {
        self.actions()
            .into_iter()
            .find(|action| action.display_text() == label)
    }

    /// Find an action bound to `shortcut`.
    pub fn find_shortcut(&self, shortcut: &str) -> Option<Arc<Action>> {
        self.actions()
            .into_iter()
            .find(|action| action.shortcut().as_deref() == Some(shortcut))
    }
}

/// The top-level menus of a window.
#[derive(Debug, Default)]
pub struct MenuBar {
    menus: Vec<Arc<Menu>>,
}

impl MenuBar {
    /// Create an empty menu bar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new menu and return it.
    pub fn add_menu(&mut self, title: impl Into<String>) -> Arc<Menu> {
        let menu = Arc::new(Menu::new(title));
        self.menus.push(menu.clone());
        menu
    }

    /// The menus in display order.
    pub fn menus(&self) -> &[Arc<Menu>] {
        &self.menus
    }

    /// Find a menu by its title with mnemonic markers removed.
    pub fn menu(&self, title: &str) -> Option<&Arc<Menu>> {
        self.menus
            .iter()
            .find(|menu| menu.title().replace('&', "") == title)
    }

    /// Find the action bound to `shortcut` in any menu.
    pub fn find_shortcut(&self, shortcut: &str) -> Option<Arc<Action>> {
        self.menus
            .iter()
            .find_map(|menu| menu.find_shortcut(shortcut))
    }
}

//! Menu actions.
//!
//! An [`Action`] is a non-visual user command: a label (with an optional `&`
//! mnemonic), an optional keyboard shortcut, and optional checkable state.
//! The same action may be shown by several menus at once; every menu reads
//! the current label from the action, so relabelling it updates all of them.
//!
//! ```ignore
//! let exit = Action::new("E&xit Application")
//!     .with_shortcut("Ctrl+Q")
//!     .with_status_tip("Exit application");
//!
//! exit.triggered.connect(|_| println!("exiting"));
//! exit.trigger();
//! ```

use cueview_core::Signal;
use parking_lot::RwLock;

struct ActionState {
    text: String,
    shortcut: Option<String>,
    status_tip: String,
    enabled: bool,
    checkable: bool,
    checked: bool,
}

/// A user command that can be placed in menus and bound to a shortcut.
pub struct Action {
    state: RwLock<ActionState>,

    /// Emitted when the action is activated.
    ///
    /// For checkable actions this is emitted after the checked state flips,
    /// with the new checked state. Always `false` for plain actions.
    pub triggered: Signal<bool>,

    /// Emitted when a checkable action's checked state changes, whether by
    /// activation or programmatically.
    pub toggled: Signal<bool>,

    /// Emitted when the label, enabled or checked state changes.
    pub changed: Signal<()>,
}

impl Action {
    /// Create a new action with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(ActionState {
                text: text.into(),
                shortcut: None,
                status_tip: String::new(),
                enabled: true,
                checkable: false,
                checked: false,
            }),
            triggered: Signal::new(),
            toggled: Signal::new(),
            changed: Signal::new(),
        }
    }

    /// Builder: bind a keyboard shortcut such as `"Ctrl+F"` or `"F1"`.
    pub fn with_shortcut(self, shortcut: impl Into<String>) -> Self {
        self.state.write().shortcut = Some(shortcut.into());
        self
    }

    /// Builder: set the status bar tip.
    pub fn with_status_tip(self, tip: impl Into<String>) -> Self {
        self.state.write().status_tip = tip.into();
        self
    }

    /// Builder: make the action checkable.
    pub fn with_checkable(self, checkable: bool) -> Self {
        self.state.write().checkable = checkable;
        self
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// The raw label, including any `&` mnemonic marker.
    pub fn text(&self) -> String {
        self.state.read().text.clone()
    }

    /// Replace the label. Emits `changed` only if the label differs.
    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        {
            let mut state = self.state.write();
            if state.text == text {
                return;
            }
            state.text = text;
        }
        self.changed.emit(());
    }

    /// The label as displayed: mnemonic markers removed, `&&` shown as `&`.
    pub fn display_text(&self) -> String {
        strip_mnemonic(&self.state.read().text)
    }

    /// The bound keyboard shortcut, if any.
    pub fn shortcut(&self) -> Option<String> {
        self.state.read().shortcut.clone()
    }

    /// The status bar tip.
    pub fn status_tip(&self) -> String {
        self.state.read().status_tip.clone()
    }

    // ========================================================================
    // Enabled / Checkable
    // ========================================================================

    /// Check if the action can be activated.
    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    /// Enable or disable the action.
    pub fn set_enabled(&self, enabled: bool) {
        {
            let mut state = self.state.write();
            if state.enabled == enabled {
                return;
            }
            state.enabled = enabled;
        }
        self.changed.emit(());
    }

    /// Check if the action is checkable.
    pub fn is_checkable(&self) -> bool {
        self.state.read().checkable
    }

    /// Check if the action is currently checked.
    pub fn is_checked(&self) -> bool {
        self.state.read().checked
    }

    /// Set the checked state without activating the action.
    ///
    /// Only has effect on checkable actions. Emits `toggled`, never
    /// `triggered`, so rendering state never re-enters activation handlers.
    pub fn set_checked(&self, checked: bool) {
        {
            let mut state = self.state.write();
            if !state.checkable || state.checked == checked {
                return;
            }
            state.checked = checked;
        }
        self.toggled.emit(checked);
        self.changed.emit(());
    }

    // ========================================================================
    // Activation
    // ========================================================================

    /// Activate the action as if the user clicked it.
    ///
    /// Disabled actions ignore activation. Checkable actions flip their
    /// checked state before `triggered` is emitted.
    pub fn trigger(&self) {
        let (checkable, checked) = {
            let mut state = self.state.write();
            if !state.enabled {
                return;
            }
            if state.checkable {
                state.checked = !state.checked;
            }
            (state.checkable, state.checked)
        };

        if checkable {
            self.toggled.emit(checked);
            self.changed.emit(());
        }
        self.triggered.emit(checked);
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Action")
            .field("text", &state.text)
            .field("shortcut", &state.shortcut)
            .field("checked", &state.checked)
            .finish()
    }
}

fn strip_mnemonic(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '&' {
            if chars.peek() == Some(&'&') {
                out.push('&');
                chars.next();
            }
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_display_text() {
        assert_eq!(Action::new("E&xit Application").display_text(), "Exit Application");
        assert_eq!(Action::new("Fish && Chips").display_text(), "Fish & Chips");
        assert_eq!(Action::new("About").display_text(), "About");
    }

    #[test]
    fn test_trigger_plain_action() {
        let action = Action::new("Close Window");
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        action.triggered.connect(move |&checked| {
            assert!(!checked);
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        action.trigger();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_action_ignores_trigger() {
        let action = Action::new("Test");
        action.set_enabled(false);
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        action.triggered.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        action.trigger();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_checkable_trigger_flips_state() {
        let action = Action::new("local").with_checkable(true);
        action.trigger();
        assert!(action.is_checked());
        action.trigger();
        assert!(!action.is_checked());
    }

    #[test]
    fn test_set_checked_does_not_trigger() {
        let action = Action::new("cloud").with_checkable(true);
        let triggered = Arc::new(AtomicUsize::new(0));
        let toggled = Arc::new(AtomicUsize::new(0));

        let triggered_clone = triggered.clone();
        action.triggered.connect(move |_| {
            triggered_clone.fetch_add(1, Ordering::SeqCst);
        });
        let toggled_clone = toggled.clone();
        action.toggled.connect(move |_| {
            toggled_clone.fetch_add(1, Ordering::SeqCst);
        });

        action.set_checked(true);
        action.set_checked(true);

        assert_eq!(triggered.load(Ordering::SeqCst), 0);
        assert_eq!(toggled.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_checked_ignored_when_not_checkable() {
        let action = Action::new("About");
        action.set_checked(true);
        assert!(!action.is_checked());
    }

    #[test]
    fn test_set_text_emits_changed_once() {
        let action = Action::new("(1) Add new window");
        let changed = Arc::new(AtomicUsize::new(0));
        let changed_clone = changed.clone();
        action.changed.connect(move |_| {
            changed_clone.fetch_add(1, Ordering::SeqCst);
        });

        action.set_text("Raise Window: App");
        action.set_text("Raise Window: App");
        assert_eq!(changed.load(Ordering::SeqCst), 1);
        assert_eq!(action.text(), "Raise Window: App");
    }
}

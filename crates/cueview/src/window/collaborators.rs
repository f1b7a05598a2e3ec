//! Seams to the services a window depends on but does not own.
//!
//! Each trait has one small default implementation so a session can be
//! assembled without a toolkit; hosts replace them with real dialogs,
//! plugin managers and network clients.

use crate::Result;
use crate::logging::targets;
use crate::menu::Menu;

use super::facility::FacilityConfig;

/// The cluster connection that facility selection drives.
pub trait FacilityBackend: Send + Sync {
    /// The available facilities and the default selection.
    fn facility_config(&self) -> Result<FacilityConfig>;

    /// Point the backend at `name`. Only called with configured names.
    fn set_active_facility(&self, name: &str);
}

/// Per-window panel plugins.
///
/// Plugins contribute entries to the window's plugin menu and persist their
/// own panel layout under the window's slot.
pub trait PanelPlugins: Send + Sync {
    /// Populate the window's plugin menu.
    fn setup_menu(&self, slot: &str, menu: &Menu);

    /// Reopen the panels that were open when `slot` last saved.
    fn restore_state(&self, slot: &str);

    /// Persist open panels for `slot`.
    fn save_state(&self, slot: &str);
}

/// A plugin host with no plugins.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPlugins;

impl PanelPlugins for NoPlugins {
    fn setup_menu(&self, _slot: &str, _menu: &Menu) {}

    fn restore_state(&self, _slot: &str) {}

    fn save_state(&self, _slot: &str) {}
}

/// Modal user interaction.
pub trait UserPrompt: Send + Sync {
    /// Ask for a line of text. `None` means the user cancelled.
    fn request_text(&self, title: &str, label: &str, current: &str) -> Option<String>;

    /// Ask a yes/no question.
    fn confirm(&self, title: &str, message: &str) -> bool;

    /// Show an informational message.
    fn inform(&self, title: &str, message: &str);

    /// Show the application's about box.
    fn about(&self, title: &str, message: &str);
}

/// A prompt for sessions without a display.
///
/// Text requests and confirmations are declined; messages go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessPrompt;

impl UserPrompt for HeadlessPrompt {
    fn request_text(&self, title: &str, _label: &str, _current: &str) -> Option<String> {
        tracing::debug!(target: targets::WINDOW, title, "declining text request");
        None
    }

    fn confirm(&self, title: &str, _message: &str) -> bool {
        tracing::debug!(target: targets::WINDOW, title, "declining confirmation");
        false
    }

    fn inform(&self, title: &str, message: &str) {
        tracing::info!(target: targets::WINDOW, title, "{message}");
    }

    fn about(&self, title: &str, message: &str) {
        tracing::info!(target: targets::WINDOW, title, "{message}");
    }
}

/// Opens help URLs.
pub trait UrlOpener: Send + Sync {
    /// Open `url` in the user's browser.
    fn open_url(&self, url: &str);
}

/// Opens URLs with the system's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemUrlOpener;

impl UrlOpener for SystemUrlOpener {
    fn open_url(&self, url: &str) {
        if let Err(err) = open::that(url) {
            tracing::warn!(target: targets::WINDOW, url, error = %err, "failed to open url");
        }
    }
}

//! Multi-window lifecycle management for cueview desktop applications.
//!
//! An application runs up to four top-level windows, each bound to a named
//! slot. This crate tracks which slots are open, keeps every window's Window
//! menu in step, shares one facility selection across windows, and persists
//! per-slot window state between sessions.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cueview::prelude::*;
//!
//! let facilities = FacilityConfig::new(["local", "cloud"], "local")?;
//! let config = AppConfig::new("CueCommander", "1.0.0").with_facilities(facilities);
//!
//! let session = WindowSession::builder(config)
//!     .settings(Arc::new(Settings::new()))
//!     .build()?;
//!
//! let main = session.open_window(None)?;
//! main.key_pressed("Ctrl+Q");
//! ```

pub mod config;
mod error;
pub mod logging;
pub mod menu;
pub mod settings;
pub mod window;

pub use error::{Result, WindowError};

/// Re-exports for hosting applications.
pub mod prelude {
    pub use crate::config::{AppConfig, HelpUrls, StartupNotice};
    pub use crate::menu::{Action, Menu, MenuBar, MenuItem};
    pub use crate::settings::{Settings, SettingsFormat, SettingsStore, SharedSettings};
    pub use crate::window::{
        FacilityBackend, FacilityConfig, MainWindow, PanelPlugins, UrlOpener, UserPrompt,
        WindowGeometry, WindowId, WindowSession, WindowState,
    };
    pub use crate::{Result, WindowError};
    pub use cueview_core::{EventBus, StatusMessage};
}

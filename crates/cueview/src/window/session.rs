//! The application-level window session.
//!
//! A [`WindowSession`] builds the shared collaborators once (event bus,
//! registry, Window menu, facility state) and owns every live
//! [`MainWindow`]. Menu entries ask the session to open or raise windows;
//! the session drops a window once it leaves the registry.
//!
//! ```ignore
//! let session = WindowSession::builder(AppConfig::new("CueCommander", "1.0"))
//!     .settings(Arc::new(Settings::new()))
//!     .facility_backend(backend)
//!     .build()?;
//!
//! session.restore_windows()?;
//! ```

use std::sync::{Arc, Weak};

use cueview_core::EventBus;
use parking_lot::RwLock;

use crate::config::AppConfig;
use crate::logging::targets;
use crate::settings::{Settings, SettingsFormat, SharedSettings};
use crate::{Result, WindowError};

use super::collaborators::{
    FacilityBackend, HeadlessPrompt, NoPlugins, PanelPlugins, SystemUrlOpener, UrlOpener,
    UserPrompt,
};
use super::facility::{FacilityState, StaticFacilities};
use super::main_window::{MainWindow, WindowContext};
use super::registry::{WINDOW_SLOT_COUNT, WindowId, WindowRegistry, slot_key};
use super::window_menu::WindowMenuController;

/// Assembles a [`WindowSession`].
pub struct SessionBuilder {
    config: AppConfig,
    settings: Option<SharedSettings>,
    backend: Option<Arc<dyn FacilityBackend>>,
    plugins: Arc<dyn PanelPlugins>,
    prompt: Arc<dyn UserPrompt>,
    urls: Arc<dyn UrlOpener>,
}

impl SessionBuilder {
    /// Use `settings` instead of the per-user settings file.
    pub fn settings(mut self, settings: SharedSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Use `backend` for facility selection.
    pub fn facility_backend(mut self, backend: Arc<dyn FacilityBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use `plugins` for the Views/Plugins menu and panel state.
    pub fn plugins(mut self, plugins: Arc<dyn PanelPlugins>) -> Self {
        self.plugins = plugins;
        self
    }

    /// Use `prompt` for dialogs.
    pub fn prompt(mut self, prompt: Arc<dyn UserPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Use `urls` to open help pages.
    pub fn url_opener(mut self, urls: Arc<dyn UrlOpener>) -> Self {
        self.urls = urls;
        self
    }

    /// Build the session.
    ///
    /// Without an explicit backend the configured static facility list is
    /// used. Without explicit settings the per-user settings file is opened,
    /// falling back to memory if it cannot be read.
    pub fn build(self) -> Result<Arc<WindowSession>> {
        let backend: Arc<dyn FacilityBackend> = match (self.backend, &self.config.facilities) {
            (Some(backend), _) => backend,
            (None, Some(facilities)) => Arc::new(StaticFacilities::new(facilities.clone())),
            (None, None) => {
                return Err(WindowError::InvalidFacilityConfig(
                    "no facility backend or facility list configured".to_string(),
                ));
            }
        };
        let settings = match self.settings {
            Some(settings) => settings,
            None => user_settings(&self.config.app_name),
        };

        let config = Arc::new(self.config);
        let bus = Arc::new(EventBus::new());
        let registry = Arc::new(WindowRegistry::new(&config.app_name, settings.clone()));
        let window_menu = WindowMenuController::new(registry.clone());
        let facilities = Arc::new(FacilityState::new(backend, bus.clone()));

        let ctx = WindowContext {
            config,
            settings,
            bus,
            registry,
            window_menu,
            facilities,
            plugins: self.plugins,
            prompt: self.prompt,
            urls: self.urls,
        };

        let session = Arc::new_cyclic(|weak: &Weak<WindowSession>| {
            let session = weak.clone();
            ctx.window_menu.open_requested().connect(move |slot| {
                let Some(session) = session.upgrade() else {
                    return;
                };
                if let Err(err) = session.open_window(Some(slot.as_str())) {
                    tracing::warn!(target: targets::SESSION, slot = %slot, error = %err, "could not open window");
                }
            });

            let session = weak.clone();
            ctx.window_menu.raise_requested().connect(move |id| {
                let Some(session) = session.upgrade() else {
                    return;
                };
                if let Err(err) = session.raise(*id) {
                    tracing::debug!(target: targets::SESSION, window = %id, error = %err, "could not raise window");
                }
            });

            let session = weak.clone();
            ctx.registry.changed().connect(move |_| {
                if let Some(session) = session.upgrade() {
                    session.release_closed();
                }
            });

            WindowSession {
                ctx,
                windows: RwLock::new(Vec::new()),
            }
        });

        tracing::info!(target: targets::SESSION, app = %session.ctx.config.app_name, "session started");
        Ok(session)
    }
}

fn user_settings(app_name: &str) -> SharedSettings {
    let Some(path) = Settings::default_path(app_name) else {
        tracing::warn!(target: targets::SETTINGS, "no settings directory, using memory");
        return Arc::new(Settings::new());
    };
    match Settings::open(&path, SettingsFormat::from_path(&path)) {
        Ok(settings) => Arc::new(settings),
        Err(err) => {
            tracing::error!(target: targets::SETTINGS, error = %err, "failed to load settings, using memory");
            Arc::new(Settings::new())
        }
    }
}

/// The live windows of one application.
pub struct WindowSession {
    ctx: WindowContext,
    windows: RwLock<Vec<Arc<MainWindow>>>,
}

impl WindowSession {
    /// Start assembling a session for `config`.
    pub fn builder(config: AppConfig) -> SessionBuilder {
        SessionBuilder {
            config,
            settings: None,
            backend: None,
            plugins: Arc::new(NoPlugins),
            prompt: Arc::new(HeadlessPrompt),
            urls: Arc::new(SystemUrlOpener),
        }
    }

    /// The shared services handed to every window.
    pub fn context(&self) -> &WindowContext {
        &self.ctx
    }

    /// The process-wide event bus.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.ctx.bus
    }

    /// The window registry.
    pub fn registry(&self) -> &Arc<WindowRegistry> {
        &self.ctx.registry
    }

    /// The shared Window menu entries.
    pub fn window_menu(&self) -> &Arc<WindowMenuController> {
        &self.ctx.window_menu
    }

    /// The facility selection.
    pub fn facilities(&self) -> &Arc<FacilityState> {
        &self.ctx.facilities
    }

    /// The settings store.
    pub fn settings(&self) -> &SharedSettings {
        &self.ctx.settings
    }

    /// Open a window, or raise it if it is already open.
    ///
    /// `key` names a slot or the title of an open window. Without a key the
    /// first free slot is used.
    pub fn open_window(&self, key: Option<&str>) -> Result<Arc<MainWindow>> {
        let slot = match key {
            Some(key) => {
                let existing = self
                    .ctx
                    .registry
                    .find_by_name_or_title(key)
                    .and_then(|open| self.window(open.id));
                if let Some(window) = existing {
                    window.raise();
                    return Ok(window);
                }
                key.to_string()
            }
            None => self.ctx.registry.next_free_slot().ok_or_else(|| {
                tracing::warn!(target: targets::SESSION, "every window slot is in use");
                WindowError::SlotCapacityExceeded {
                    capacity: WINDOW_SLOT_COUNT,
                }
            })?,
        };

        let window = MainWindow::open(self.ctx.clone(), &slot)?;
        self.windows.write().push(window.clone());
        window.show();
        window.raise();
        Ok(window)
    }

    /// Open the windows that were open when the application last exited.
    ///
    /// The first slot always opens; other slots open if they were recorded
    /// as open.
    pub fn restore_windows(&self) -> Result<Vec<Arc<MainWindow>>> {
        let mut restored = Vec::new();
        for (index, slot) in self.ctx.registry.slots().iter().enumerate() {
            let reopen = index == 0 || self.ctx.settings.get_or(&slot_key(slot, "Open"), false);
            if reopen {
                restored.push(self.open_window(Some(slot.as_str()))?);
            }
        }
        tracing::info!(target: targets::SESSION, count = restored.len(), "windows restored");
        Ok(restored)
    }

    /// Raise an open window.
    pub fn raise(&self, id: WindowId) -> Result<()> {
        let window = self.window(id).ok_or(WindowError::StaleMenuTarget(id))?;
        window.raise();
        Ok(())
    }

    /// The open window with identifier `id`.
    pub fn window(&self, id: WindowId) -> Option<Arc<MainWindow>> {
        self.windows.read().iter().find(|w| w.id() == id).cloned()
    }

    /// The open window in `slot`.
    pub fn window_for_slot(&self, slot: &str) -> Option<Arc<MainWindow>> {
        self.windows.read().iter().find(|w| w.slot() == slot).cloned()
    }

    /// Snapshot of the open windows, in opening order.
    pub fn windows(&self) -> Vec<Arc<MainWindow>> {
        self.windows.read().clone()
    }

    /// Whether any window is open.
    pub fn is_running(&self) -> bool {
        !self.windows.read().is_empty()
    }

    /// Close every window and exit.
    pub fn exit(&self) {
        self.ctx.exit_application();
    }

    /// Show the startup notice in the first open window, stamped with the
    /// current time.
    pub fn display_startup_notice(&self) -> bool {
        let Some(window) = self.windows.read().first().cloned() else {
            return false;
        };
        window.display_startup_notice(chrono::Utc::now().timestamp())
    }

    fn release_closed(&self) {
        let registry = &self.ctx.registry;
        self.windows.write().retain(|w| registry.contains(w.id()));
    }
}

impl std::fmt::Debug for WindowSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowSession")
            .field("windows", &self.windows.read().len())
            .finish_non_exhaustive()
    }
}

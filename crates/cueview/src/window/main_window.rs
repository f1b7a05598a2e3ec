//! The per-window controller.
//!
//! A [`MainWindow`] owns one top-level window's menus, geometry, title and
//! status line, and drives its lifecycle:
//!
//! ```text
//! Constructing ──► Open ──► Closing ──► Closed
//! ```
//!
//! Construction registers the window in its slot, builds the menu bar,
//! restores the slot's saved state and subscribes to the event bus. Closing
//! saves that state again, records whether the window should reopen with the
//! next session, and releases the slot. Every operation on a window that is
//! no longer open does nothing.

use std::sync::Arc;

use cueview_core::{ConnectionId, EventBus, StatusMessage};
use parking_lot::{Mutex, RwLock};

use crate::config::AppConfig;
use crate::logging::targets;
use crate::menu::{Action, Menu, MenuBar};
use crate::settings::SharedSettings;
use crate::{Result, WindowError};

use super::collaborators::{PanelPlugins, UrlOpener, UserPrompt};
use super::facility::{FacilityMenu, FacilityState};
use super::geometry::{WindowGeometry, WindowState};
use super::registry::{WindowId, WindowRegistry, slot_key};
use super::window_menu::WindowMenuController;

/// Shortcut that asks every view to refresh.
pub const REFRESH_SHORTCUT: &str = "Space";

/// The shared services every window is constructed with.
#[derive(Clone)]
pub struct WindowContext {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Persistent settings.
    pub settings: SharedSettings,
    /// Process-wide notifications.
    pub bus: Arc<EventBus>,
    /// Open windows and slot titles.
    pub registry: Arc<WindowRegistry>,
    /// Shared slot entries for the Window menu.
    pub window_menu: Arc<WindowMenuController>,
    /// Process-wide facility selection.
    pub facilities: Arc<FacilityState>,
    /// Panel plugin host.
    pub plugins: Arc<dyn PanelPlugins>,
    /// Modal dialogs.
    pub prompt: Arc<dyn UserPrompt>,
    /// Help URL handler.
    pub urls: Arc<dyn UrlOpener>,
}

impl WindowContext {
    /// Begin application exit: every window closes and records itself as
    /// open for the next session. The store is written once, after the last
    /// window.
    pub fn exit_application(&self) {
        self.registry.begin_app_shutdown();
        self.settings.batch(|| self.bus.broadcast_quit());
    }
}

impl std::fmt::Debug for WindowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowContext")
            .field("app_name", &self.config.app_name)
            .field("settings", &self.settings.identity())
            .finish_non_exhaustive()
    }
}

/// Lifecycle of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Menus and state are being set up.
    Constructing,
    /// The window is live.
    Open,
    /// The window is saving its state and releasing its slot.
    Closing,
    /// Terminal.
    Closed,
}

struct WindowData {
    lifecycle: Lifecycle,
    title: String,
    geometry: WindowGeometry,
    dock_state: String,
    status: Option<StatusMessage>,
    visible: bool,
    raise_count: u32,
}

/// Actions owned by a single window.
struct WindowActions {
    close: Arc<Action>,
    exit: Arc<Action>,
    change_title: Arc<Action>,
    save_settings: Arc<Action>,
    revert_layout: Arc<Action>,
    full_screen: Arc<Action>,
    user_guide: Arc<Action>,
    suggestion: Arc<Action>,
    bug: Arc<Action>,
    about: Arc<Action>,
}

impl WindowActions {
    fn new() -> Self {
        Self {
            close: Arc::new(
                Action::new("&Close Window").with_status_tip("Close this window"),
            ),
            exit: Arc::new(
                Action::new("E&xit Application")
                    .with_shortcut("Ctrl+Q")
                    .with_status_tip("Exit application"),
            ),
            change_title: Arc::new(Action::new("Change Window Title")),
            save_settings: Arc::new(Action::new("Save Window Settings")),
            revert_layout: Arc::new(Action::new("Revert To Default Window Layout")),
            full_screen: Arc::new(
                Action::new("Toggle Full-Screen")
                    .with_shortcut("Ctrl+F")
                    .with_status_tip("Toggle window full-screen"),
            ),
            user_guide: Arc::new(Action::new("Online User Guide")),
            suggestion: Arc::new(Action::new("Make a Suggestion")),
            bug: Arc::new(Action::new("Report a Bug")),
            about: Arc::new(Action::new("About").with_shortcut("F1")),
        }
    }
}

/// A top-level application window bound to one slot.
pub struct MainWindow {
    id: WindowId,
    slot: String,
    ctx: WindowContext,
    data: RwLock<WindowData>,
    menu_bar: MenuBar,
    actions: WindowActions,
    facility_menu: Option<Arc<FacilityMenu>>,
    connections: Mutex<Vec<BusConnection>>,
}

enum BusConnection {
    Quit(ConnectionId),
    Status(ConnectionId),
}

impl MainWindow {
    /// Construct and open a window in `slot`.
    ///
    /// Fails if the slot is unknown or already has a window.
    pub fn open(ctx: WindowContext, slot: &str) -> Result<Arc<Self>> {
        let id = WindowId::next();
        let title = ctx.registry.slot_title(slot);

        ctx.registry.register(id, slot, &title)?;

        let actions = WindowActions::new();
        let (menu_bar, facility_menu) = Self::build_menus(&ctx, slot, &actions);

        let window = Arc::new(Self {
            id,
            slot: slot.to_string(),
            data: RwLock::new(WindowData {
                lifecycle: Lifecycle::Constructing,
                title,
                geometry: ctx.config.default_geometry,
                dock_state: String::new(),
                status: None,
                visible: false,
                raise_count: 0,
            }),
            ctx,
            menu_bar,
            actions,
            facility_menu,
            connections: Mutex::new(Vec::new()),
        });

        window.connect_actions();
        window.restore_settings();
        window.subscribe();

        window.data.write().lifecycle = Lifecycle::Open;
        tracing::info!(target: targets::WINDOW, window = %id, slot, "window opened");

        window.ctx.bus.show_status(
            StatusMessage::new("Ready").with_duration(window.ctx.config.status_duration_ms),
        );
        Ok(window)
    }

    fn build_menus(
        ctx: &WindowContext,
        slot: &str,
        actions: &WindowActions,
    ) -> (MenuBar, Option<Arc<FacilityMenu>>) {
        let mut menu_bar = MenuBar::new();

        let file = menu_bar.add_menu("&File");
        file.add_action(actions.close.clone());
        file.add_action(actions.exit.clone());

        let cuebot = menu_bar.add_menu("&Cuebot");
        let facility_menu =
            match FacilityMenu::build(ctx.facilities.clone(), ctx.bus.clone(), &cuebot) {
                Ok(menu) => Some(menu),
                Err(err) => {
                    tracing::warn!(target: targets::FACILITY, slot, error = %err, "facility menu unavailable");
                    None
                }
            };

        let plugins = menu_bar.add_menu("&Views/Plugins");
        ctx.plugins.setup_menu(slot, &plugins);

        let window = menu_bar.add_menu("&Window");
        window.add_action(actions.change_title.clone());
        window.add_action(actions.save_settings.clone());
        window.add_action(actions.revert_layout.clone());
        window.add_separator();
        for action in ctx.window_menu.actions() {
            window.add_action(action);
        }
        window.add_separator();
        window.add_action(actions.full_screen.clone());

        let help = menu_bar.add_menu("&Help");
        help.add_action(actions.user_guide.clone());
        help.add_action(actions.suggestion.clone());
        help.add_action(actions.bug.clone());
        help.add_separator();
        help.add_action(actions.about.clone());

        (menu_bar, facility_menu)
    }

    fn connect_actions(self: &Arc<Self>) {
        let a = &self.actions;
        self.on_triggered(&a.close, |w| {
            w.close();
        });
        self.on_triggered(&a.exit, |w| w.close_application());
        self.on_triggered(&a.change_title, |w| w.change_title());
        self.on_triggered(&a.save_settings, |w| w.save_settings());
        self.on_triggered(&a.revert_layout, |w| {
            w.revert_layout();
        });
        self.on_triggered(&a.full_screen, |w| {
            w.toggle_full_screen();
        });
        self.on_triggered(&a.user_guide, |w| w.open_user_guide());
        self.on_triggered(&a.suggestion, |w| w.open_suggestion_page());
        self.on_triggered(&a.bug, |w| w.open_bug_page());
        self.on_triggered(&a.about, |w| w.display_about());
    }

    fn on_triggered<F>(self: &Arc<Self>, action: &Action, handler: F)
    where
        F: Fn(&MainWindow) + Send + Sync + 'static,
    {
        let weak = Arc::downgrade(self);
        action.triggered.connect(move |_| {
            if let Some(window) = weak.upgrade() {
                handler(&window);
            }
        });
    }

    fn subscribe(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let quit = self.ctx.bus.quit().connect(move |_| {
            if let Some(window) = weak.upgrade() {
                window.close();
            }
        });

        let weak = Arc::downgrade(self);
        let status = self.ctx.bus.status_message().connect(move |message| {
            if let Some(window) = weak.upgrade() {
                window.show_status_message(message.clone());
            }
        });

        let mut connections = self.connections.lock();
        connections.push(BusConnection::Quit(quit));
        connections.push(BusConnection::Status(status));
    }

    fn unsubscribe(&self) {
        for connection in self.connections.lock().drain(..) {
            match connection {
                BusConnection::Quit(id) => self.ctx.bus.quit().disconnect(id),
                BusConnection::Status(id) => self.ctx.bus.status_message().disconnect(id),
            };
        }
        if let Some(facility_menu) = &self.facility_menu {
            facility_menu.detach();
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The window's identifier.
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// The slot this window occupies.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// The current title.
    pub fn title(&self) -> String {
        self.data.read().title.clone()
    }

    /// The lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.data.read().lifecycle
    }

    /// Whether the window is open.
    pub fn is_open(&self) -> bool {
        self.lifecycle() == Lifecycle::Open
    }

    /// The window geometry.
    pub fn geometry(&self) -> WindowGeometry {
        self.data.read().geometry
    }

    /// Record a move or resize reported by the windowing system.
    pub fn set_geometry(&self, geometry: WindowGeometry) {
        if let Some(mut data) = self.open_data() {
            data.geometry = geometry.clamped_to_minimum(self.ctx.config.minimum_size);
        }
    }

    /// The display state.
    pub fn window_state(&self) -> WindowState {
        self.data.read().geometry.state
    }

    /// The opaque dock layout.
    pub fn dock_state(&self) -> String {
        self.data.read().dock_state.clone()
    }

    /// Record the dock layout reported by the windowing system.
    pub fn set_dock_state(&self, state: impl Into<String>) {
        if let Some(mut data) = self.open_data() {
            data.dock_state = state.into();
        }
    }

    /// The last status message shown.
    pub fn status_message(&self) -> Option<StatusMessage> {
        self.data.read().status.clone()
    }

    /// Whether the window has been shown.
    pub fn is_visible(&self) -> bool {
        self.data.read().visible
    }

    /// How many times the window was raised.
    pub fn raise_count(&self) -> u32 {
        self.data.read().raise_count
    }

    /// The window's menu bar.
    pub fn menu_bar(&self) -> &MenuBar {
        &self.menu_bar
    }

    /// The menu titled `title` (without mnemonic markers).
    pub fn menu(&self, title: &str) -> Option<&Arc<Menu>> {
        self.menu_bar.menu(title)
    }

    /// The facility entries, if the backend provided a facility list.
    pub fn facility_menu(&self) -> Option<&Arc<FacilityMenu>> {
        self.facility_menu.as_ref()
    }

    fn open_data(&self) -> Option<parking_lot::RwLockWriteGuard<'_, WindowData>> {
        let data = self.data.write();
        (data.lifecycle == Lifecycle::Open).then_some(data)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Show the window.
    pub fn show(&self) {
        if let Some(mut data) = self.open_data() {
            data.visible = true;
        }
    }

    /// Bring the window to the front.
    pub fn raise(&self) {
        if let Some(mut data) = self.open_data() {
            data.visible = true;
            data.raise_count += 1;
            tracing::debug!(target: targets::WINDOW, window = %self.id, "window raised");
        }
    }

    /// Close this window only.
    ///
    /// Returns `false` if the window was not open.
    pub fn close(&self) -> bool {
        {
            let mut data = self.data.write();
            if data.lifecycle != Lifecycle::Open {
                return false;
            }
            data.lifecycle = Lifecycle::Closing;
        }
        tracing::info!(target: targets::WINDOW, window = %self.id, slot = %self.slot, "closing window");

        self.unsubscribe();
        self.ctx.settings.batch(|| {
            self.write_settings();
            self.ctx.settings.set(
                &slot_key(&self.slot, "Open"),
                self.ctx.registry.is_closing_app(),
            );
        });
        self.ctx.registry.unregister(self.id);

        self.data.write().lifecycle = Lifecycle::Closed;
        tracing::info!(target: targets::WINDOW, window = %self.id, "window closed");
        true
    }

    /// Close every window and exit.
    pub fn close_application(&self) {
        if self.is_open() {
            self.ctx.exit_application();
        }
    }

    // =========================================================================
    // Settings
    // =========================================================================

    fn restore_settings(&self) {
        let settings = &self.ctx.settings;
        let slot = &self.slot;
        tracing::debug!(target: targets::SETTINGS, slot = %slot, store = %settings.identity(), "restoring window settings");

        self.ctx.plugins.restore_state(slot);

        let default = self.ctx.config.default_geometry;
        let size: Vec<u32> = settings.get_or(&slot_key(slot, "Size"), Vec::new());
        let position: Vec<i32> = settings.get_or(&slot_key(slot, "Position"), Vec::new());
        let dock_state: String = settings.get_or(&slot_key(slot, "State"), String::new());

        let mut geometry = default;
        if let [width, height] = size[..] {
            geometry.width = width;
            geometry.height = height;
        }
        if let [x, y] = position[..] {
            geometry.x = x;
            geometry.y = y;
        }

        let mut data = self.data.write();
        data.geometry = geometry.clamped_to_minimum(self.ctx.config.minimum_size);
        data.dock_state = dock_state;
    }

    /// Persist this window's state.
    pub fn save_settings(&self) {
        if self.is_open() {
            self.ctx.settings.batch(|| self.write_settings());
        }
    }

    /// Callers wrap this in a settings batch.
    fn write_settings(&self) {
        let settings = &self.ctx.settings;
        let slot = &self.slot;
        tracing::info!(target: targets::SETTINGS, slot = %slot, store = %settings.identity(), "saving window settings");

        self.ctx.plugins.save_state(slot);

        let (title, dock_state, geometry) = {
            let data = self.data.read();
            (data.title.clone(), data.dock_state.clone(), data.geometry)
        };
        settings.set("Version", self.ctx.config.app_version.as_str());
        settings.set(&slot_key(slot, "Title"), title);
        settings.set(&slot_key(slot, "State"), dock_state);
        settings.set(&slot_key(slot, "Size"), vec![geometry.width, geometry.height]);
        settings.set(&slot_key(slot, "Position"), vec![geometry.x, geometry.y]);
    }

    /// Ask to restore the default layout.
    ///
    /// On confirmation the request is persisted and the application exits.
    /// Returns whether the user confirmed.
    pub fn revert_layout(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        let confirmed = self.ctx.prompt.confirm(
            "Restart required ",
            "You must restart for this action to take effect, close window?: ",
        );
        if confirmed {
            tracing::info!(target: targets::WINDOW, window = %self.id, "reverting to default layout");
            self.ctx.settings.batch(|| {
                self.ctx.settings.set("RevertLayout", true);
                self.ctx.exit_application();
            });
        }
        confirmed
    }

    // =========================================================================
    // Title and display state
    // =========================================================================

    /// Ask the user for a new title.
    pub fn change_title(&self) {
        if !self.is_open() {
            return;
        }
        let current = self.title();
        let Some(title) = self.ctx.prompt.request_text(
            "Rename window",
            "Please provide a title for the window",
            &current,
        ) else {
            return;
        };
        if let Err(err) = self.set_title(&title) {
            tracing::warn!(target: targets::WINDOW, window = %self.id, error = %err, "rename rejected");
        }
    }

    /// Rename the window.
    ///
    /// Titles that match another window's name or title are rejected and
    /// leave the current title in place.
    pub fn set_title(&self, title: &str) -> Result<()> {
        if !self.is_open() {
            return Err(WindowError::WindowClosed(self.id));
        }
        self.ctx.registry.assign_title(&self.slot, title)?;
        self.data.write().title = title.trim().to_string();
        Ok(())
    }

    /// Toggle full-screen and return the new state.
    pub fn toggle_full_screen(&self) -> WindowState {
        let mut data = self.data.write();
        if data.lifecycle == Lifecycle::Open {
            data.geometry.state = data.geometry.state.toggled_full_screen();
        }
        data.geometry.state
    }

    /// Set the display state directly.
    pub fn set_window_state(&self, state: WindowState) {
        if let Some(mut data) = self.open_data() {
            data.geometry.state = state;
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Dispatch a key press. Returns whether the key was handled.
    pub fn key_pressed(&self, key: &str) -> bool {
        if !self.is_open() {
            return false;
        }
        if key == REFRESH_SHORTCUT {
            self.ctx.bus.notify_request_update();
            return true;
        }
        match self.menu_bar.find_shortcut(key) {
            Some(action) => {
                action.trigger();
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Status and dialogs
    // =========================================================================

    /// Show a message in the status line.
    pub fn show_status_message(&self, message: StatusMessage) {
        if let Some(mut data) = self.open_data() {
            data.status = Some(message);
        }
    }

    /// Show the about box.
    pub fn display_about(&self) {
        if !self.is_open() {
            return;
        }
        let config = &self.ctx.config;
        let text = format!(
            "{}\n\nA cueview tool\n\nVersion: {}",
            config.app_name, config.app_version
        );
        self.ctx.prompt.about("About", &text);
    }

    /// Show the configured startup notice if the user has not seen it.
    ///
    /// `now` is recorded as the time the notice was last shown. Returns
    /// whether the notice was displayed.
    pub fn display_startup_notice(&self, now: i64) -> bool {
        let Some(notice) = &self.ctx.config.startup_notice else {
            return false;
        };
        let last_notice: i64 = self.ctx.settings.get_or("LastNotice", 0);
        if last_notice >= notice.date {
            return false;
        }
        self.ctx.prompt.inform("Notice", &notice.message);
        self.ctx.settings.set("LastNotice", now);
        true
    }

    /// Open the online user guide.
    pub fn open_user_guide(&self) {
        self.open_help_url("user guide", &self.ctx.config.urls.user_guide);
    }

    /// Open the suggestion form.
    pub fn open_suggestion_page(&self) {
        self.open_help_url("suggestion", &self.ctx.config.urls.suggestion);
    }

    /// Open the bug tracker.
    pub fn open_bug_page(&self) {
        self.open_help_url("bug report", &self.ctx.config.urls.bug);
    }

    fn open_help_url(&self, page: &str, url: &str) {
        if !self.is_open() {
            return;
        }
        if url.is_empty() {
            tracing::warn!(target: targets::WINDOW, page, "no url configured");
            return;
        }
        self.ctx.urls.open_url(url);
    }
}

impl std::fmt::Debug for MainWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data.read();
        f.debug_struct("MainWindow")
            .field("id", &self.id)
            .field("slot", &self.slot)
            .field("title", &data.title)
            .field("lifecycle", &data.lifecycle)
            .finish_non_exhaustive()
    }
}

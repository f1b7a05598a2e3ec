//! Facility selection.
//!
//! The selected facility is process-wide: one [`FacilityState`] holds it and
//! every window's [`FacilityMenu`] renders it. Menus never change the
//! selection directly. A click asks the state to select, and the state
//! publishes `facility_changed` on the event bus when the selection actually
//! moved. Every menu re-renders its check marks from the state on that
//! notification, so all windows agree and each change is announced once.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use cueview_core::{ConnectionId, EventBus};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::logging::targets;
use crate::menu::{Action, Menu};
use crate::{Result, WindowError};

use super::collaborators::FacilityBackend;

/// The facilities a backend can connect to, and the default among them.
///
/// Always holds at least one unique name, and the default is one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFacilityConfig", into = "RawFacilityConfig")]
pub struct FacilityConfig {
    names: Vec<String>,
    default: String,
}

#[derive(Serialize, Deserialize)]
struct RawFacilityConfig {
    names: Vec<String>,
    default: String,
}

impl FacilityConfig {
    /// Validate and build a facility configuration.
    pub fn new<I, S>(names: I, default: impl Into<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let default = default.into();

        if names.is_empty() {
            return Err(WindowError::InvalidFacilityConfig(
                "no facilities configured".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for name in &names {
            if name.is_empty() {
                return Err(WindowError::InvalidFacilityConfig(
                    "facility names must not be empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(WindowError::InvalidFacilityConfig(format!(
                    "duplicate facility {name:?}"
                )));
            }
        }
        if !seen.contains(default.as_str()) {
            return Err(WindowError::InvalidFacilityConfig(format!(
                "default facility {default:?} is not configured"
            )));
        }

        Ok(Self { names, default })
    }

    /// Facility names, in menu order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The facility selected at startup.
    pub fn default_facility(&self) -> &str {
        &self.default
    }

    /// Whether `name` is configured.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

impl TryFrom<RawFacilityConfig> for FacilityConfig {
    type Error = WindowError;

    fn try_from(raw: RawFacilityConfig) -> Result<Self> {
        Self::new(raw.names, raw.default)
    }
}

impl From<FacilityConfig> for RawFacilityConfig {
    fn from(config: FacilityConfig) -> Self {
        Self {
            names: config.names,
            default: config.default,
        }
    }
}

/// A backend with a fixed facility list that records the active facility.
#[derive(Debug)]
pub struct StaticFacilities {
    config: FacilityConfig,
    active: RwLock<String>,
}

impl StaticFacilities {
    /// Create a backend serving `config`, starting on its default.
    pub fn new(config: FacilityConfig) -> Self {
        let active = RwLock::new(config.default_facility().to_string());
        Self { config, active }
    }

    /// The facility the backend currently points at.
    pub fn active(&self) -> String {
        self.active.read().clone()
    }
}

impl FacilityBackend for StaticFacilities {
    fn facility_config(&self) -> Result<FacilityConfig> {
        Ok(self.config.clone())
    }

    fn set_active_facility(&self, name: &str) {
        *self.active.write() = name.to_string();
    }
}

struct Selection {
    config: FacilityConfig,
    selected: String,
}

/// The process-wide facility selection.
pub struct FacilityState {
    backend: Arc<dyn FacilityBackend>,
    bus: Arc<EventBus>,
    selection: RwLock<Option<Selection>>,
}

impl FacilityState {
    /// Create an unloaded selection over `backend`.
    pub fn new(backend: Arc<dyn FacilityBackend>, bus: Arc<EventBus>) -> Self {
        Self {
            backend,
            bus,
            selection: RwLock::new(None),
        }
    }

    /// Read the facility list from the backend.
    ///
    /// The first load selects the default. Later loads keep the current
    /// selection while it is still configured; if it was dropped from the
    /// list, the default takes over as if it had been selected.
    pub fn load(&self) -> Result<FacilityConfig> {
        let config = self.backend.facility_config()?;
        let replaced = {
            let mut selection = self.selection.write();
            let (selected, replaced) = match selection.take() {
                Some(previous) if config.contains(&previous.selected) => (previous.selected, None),
                Some(previous) => {
                    let default = config.default_facility().to_string();
                    (default.clone(), Some((previous.selected, default)))
                }
                None => (config.default_facility().to_string(), None),
            };
            *selection = Some(Selection {
                config: config.clone(),
                selected,
            });
            replaced
        };

        if let Some((previous, current)) = replaced {
            tracing::warn!(target: targets::FACILITY, previous = %previous, facility = %current, "selected facility no longer offered");
            self.publish(&current);
        }
        Ok(config)
    }

    /// The selected facility, once loaded.
    pub fn selected(&self) -> Option<String> {
        self.selection.read().as_ref().map(|s| s.selected.clone())
    }

    /// The loaded configuration.
    pub fn config(&self) -> Option<FacilityConfig> {
        self.selection.read().as_ref().map(|s| s.config.clone())
    }

    /// Make `name` the active facility.
    ///
    /// Returns `Ok(true)` when the selection changed, in which case the
    /// backend was repointed and `facility_changed` was published once.
    /// Selecting the current facility changes nothing.
    pub fn select(&self, name: &str) -> Result<bool> {
        {
            let mut selection = self.selection.write();
            let Some(selection) = selection.as_mut() else {
                return Err(WindowError::InvalidFacilityConfig(
                    "facilities not loaded".to_string(),
                ));
            };
            if !selection.config.contains(name) {
                return Err(WindowError::UnknownFacility(name.to_string()));
            }
            if selection.selected == name {
                return Ok(false);
            }
            selection.selected = name.to_string();
        }

        tracing::info!(target: targets::FACILITY, facility = name, "facility selected");
        self.publish(name);
        Ok(true)
    }

    fn publish(&self, name: &str) {
        self.backend.set_active_facility(name);
        self.bus.notify_facility_changed();
    }

    /// Return to the default facility.
    pub fn reset_to_default(&self) -> Result<bool> {
        let default = self
            .config()
            .map(|config| config.default_facility().to_string())
            .ok_or_else(|| {
                WindowError::InvalidFacilityConfig("facilities not loaded".to_string())
            })?;
        self.select(&default)
    }
}

impl std::fmt::Debug for FacilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilityState")
            .field("selected", &self.selected())
            .finish_non_exhaustive()
    }
}

/// One window's checkable facility entries.
pub struct FacilityMenu {
    state: Arc<FacilityState>,
    bus: Arc<EventBus>,
    entries: Vec<(String, Arc<Action>)>,
    bus_connection: RwLock<Option<ConnectionId>>,
    detached: AtomicBool,
}

impl FacilityMenu {
    /// Add one checkable entry per configured facility to `menu`.
    ///
    /// The entries start out showing the current selection and follow it
    /// until [`detach`](Self::detach) is called.
    pub fn build(state: Arc<FacilityState>, bus: Arc<EventBus>, menu: &Menu) -> Result<Arc<Self>> {
        let config = state.load()?;
        let entries = config
            .names()
            .iter()
            .map(|name| {
                let action = Arc::new(Action::new(name.clone()).with_checkable(true));
                (name.clone(), menu.add_action(action))
            })
            .collect();

        let facility_menu = Arc::new(Self {
            state,
            bus,
            entries,
            bus_connection: RwLock::new(None),
            detached: AtomicBool::new(false),
        });

        for (name, action) in &facility_menu.entries {
            let weak = Arc::downgrade(&facility_menu);
            let name = name.clone();
            action.triggered.connect(move |checked| {
                if let Some(menu) = weak.upgrade() {
                    menu.on_toggled(&name, *checked);
                }
            });
        }

        let weak: Weak<Self> = Arc::downgrade(&facility_menu);
        let connection = facility_menu.bus.facility_changed().connect(move |_| {
            if let Some(menu) = weak.upgrade() {
                menu.sync();
            }
        });
        *facility_menu.bus_connection.write() = Some(connection);

        facility_menu.sync();
        Ok(facility_menu)
    }

    /// Handle a user click on the entry for `name`.
    ///
    /// Checking an entry selects it. Unchecking the active entry falls back
    /// to the default, so exactly one entry stays checked. A detached menu
    /// ignores clicks.
    pub fn on_toggled(&self, name: &str, checked: bool) {
        if self.is_detached() {
            tracing::debug!(target: targets::FACILITY, facility = name, "ignoring click on detached facility menu");
            return;
        }
        let result = if checked {
            self.state.select(name)
        } else if self.state.selected().as_deref() == Some(name) {
            self.state.reset_to_default()
        } else {
            Ok(false)
        };

        if let Err(err) = result {
            tracing::warn!(target: targets::FACILITY, facility = name, error = %err, "facility selection failed");
        }
        // A click that changed nothing still flipped this entry locally.
        self.sync();
    }

    /// Render the check marks from the process-wide selection.
    pub fn sync(&self) {
        let selected = self.state.selected();
        for (name, action) in &self.entries {
            action.set_checked(selected.as_deref() == Some(name.as_str()));
        }
    }

    /// Names of the checked entries.
    pub fn checked(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, action)| action.is_checked())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// The entry for `name`.
    pub fn action(&self, name: &str) -> Option<Arc<Action>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, action)| action.clone())
    }

    /// Stop following selection changes and ignore further clicks.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
        if let Some(connection) = self.bus_connection.write().take() {
            self.bus.facility_changed().disconnect(connection);
        }
    }

    /// Whether [`detach`](Self::detach) was called.
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for FacilityMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilityMenu")
            .field("checked", &self.checked())
            .finish_non_exhaustive()
    }
}

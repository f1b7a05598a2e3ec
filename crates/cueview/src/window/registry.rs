//! The registry of open windows and window slots.
//!
//! An application has a fixed number of window slots. The first slot is
//! named after the application and the rest append `_2`, `_3`, ... to it.
//! Each slot holds at most one live window and remembers a user-assigned
//! title, persisted under `<slot>/Title`.
//!
//! The registry is shared by `Arc` between the session, every window and
//! the window menu. It emits [`changed`](WindowRegistry::changed) whenever
//! the open set or a title changes, which is what keeps every window's
//! Window menu current.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use cueview_core::Signal;
use parking_lot::RwLock;

use crate::logging::targets;
use crate::settings::SharedSettings;
use crate::{Result, WindowError};

/// Number of window slots per application.
pub const WINDOW_SLOT_COUNT: usize = 4;

/// A unique identifier for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identifier value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The settings key for a per-slot field.
pub fn slot_key(slot: &str, field: &str) -> String {
    format!("{slot}/{field}")
}

/// The slot names for an application, in menu order.
pub fn slot_names(app_name: &str) -> Vec<String> {
    (1..=WINDOW_SLOT_COUNT)
        .map(|n| match n {
            1 => app_name.to_string(),
            n => format!("{app_name}_{n}"),
        })
        .collect()
}

/// A live window as seen by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenWindow {
    /// The window's identifier.
    pub id: WindowId,
    /// The slot the window occupies.
    pub slot: String,
    /// The window's current title.
    pub title: String,
}

struct RegistryState {
    open: Vec<OpenWindow>,
    titles: HashMap<String, String>,
}

/// Tracks open windows and slot titles.
pub struct WindowRegistry {
    slots: Vec<String>,
    settings: SharedSettings,
    state: RwLock<RegistryState>,
    closing_app: AtomicBool,
    changed: Signal<()>,
}

impl WindowRegistry {
    /// Create a registry for `app_name`, loading slot titles from `settings`.
    pub fn new(app_name: &str, settings: SharedSettings) -> Self {
        let slots = slot_names(app_name);
        let titles = slots
            .iter()
            .map(|slot| {
                let title = settings.get_or(&slot_key(slot, "Title"), slot.clone());
                (slot.clone(), title)
            })
            .collect();

        Self {
            slots,
            settings,
            state: RwLock::new(RegistryState {
                open: Vec::new(),
                titles,
            }),
            closing_app: AtomicBool::new(false),
            changed: Signal::new(),
        }
    }

    /// Signal emitted after the open set or any title changes.
    pub fn changed(&self) -> &Signal<()> {
        &self.changed
    }

    /// The slot names, in menu order.
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Whether `slot` is one of this application's slots.
    pub fn has_slot(&self, slot: &str) -> bool {
        self.slots.iter().any(|s| s == slot)
    }

    /// The 1-based position of `slot`.
    pub fn ordinal(&self, slot: &str) -> Option<usize> {
        self.slots.iter().position(|s| s == slot).map(|i| i + 1)
    }

    /// Add a window to the open set.
    ///
    /// Registering also clears the application-closing flag: a window that
    /// opens after shutdown began means the application is running again.
    pub fn register(&self, id: WindowId, slot: &str, title: &str) -> Result<()> {
        {
            let mut state = self.state.write();
            if state.open.iter().any(|w| w.id == id) {
                tracing::warn!(target: targets::REGISTRY, window = %id, "window registered twice");
                return Err(WindowError::DuplicateRegistration(id));
            }
            if !self.has_slot(slot) {
                return Err(WindowError::UnknownSlot(slot.to_string()));
            }
            if state.open.iter().any(|w| w.slot == slot) {
                return Err(WindowError::SlotOccupied {
                    slot: slot.to_string(),
                });
            }
            state.open.push(OpenWindow {
                id,
                slot: slot.to_string(),
                title: title.to_string(),
            });
        }

        self.closing_app.store(false, Ordering::SeqCst);
        tracing::info!(target: targets::REGISTRY, window = %id, slot, "window registered");
        self.changed.emit(());
        Ok(())
    }

    /// Remove a window from the open set.
    ///
    /// Returns the removed record, or `None` if the window was not open.
    pub fn unregister(&self, id: WindowId) -> Option<OpenWindow> {
        let removed = {
            let mut state = self.state.write();
            let index = state.open.iter().position(|w| w.id == id)?;
            state.open.remove(index)
        };

        tracing::info!(target: targets::REGISTRY, window = %id, slot = %removed.slot, "window unregistered");
        self.changed.emit(());
        Some(removed)
    }

    /// Whether the window is in the open set.
    pub fn contains(&self, id: WindowId) -> bool {
        self.state.read().open.iter().any(|w| w.id == id)
    }

    /// Number of open windows.
    pub fn len(&self) -> usize {
        self.state.read().open.len()
    }

    /// Whether no windows are open.
    pub fn is_empty(&self) -> bool {
        self.state.read().open.is_empty()
    }

    /// Snapshot of the open windows, in registration order.
    pub fn open_windows(&self) -> Vec<OpenWindow> {
        self.state.read().open.clone()
    }

    /// The open window with identifier `id`.
    pub fn get(&self, id: WindowId) -> Option<OpenWindow> {
        self.state.read().open.iter().find(|w| w.id == id).cloned()
    }

    /// The live window occupying `slot`.
    pub fn occupant(&self, slot: &str) -> Option<OpenWindow> {
        self.state.read().open.iter().find(|w| w.slot == slot).cloned()
    }

    /// Find an open window by slot name or current title.
    ///
    /// Slot names take precedence over titles.
    pub fn find_by_name_or_title(&self, key: &str) -> Option<OpenWindow> {
        let state = self.state.read();
        state
            .open
            .iter()
            .find(|w| w.slot == key)
            .or_else(|| state.open.iter().find(|w| w.title == key))
            .cloned()
    }

    /// The persisted title of `slot`, or the slot name if it has none.
    pub fn slot_title(&self, slot: &str) -> String {
        self.state
            .read()
            .titles
            .get(slot)
            .cloned()
            .unwrap_or_else(|| slot.to_string())
    }

    /// Whether the user has given `slot` a title of its own.
    pub fn has_custom_title(&self, slot: &str) -> bool {
        self.slot_title(slot) != slot
    }

    /// Rename `slot`, updating its persisted title and its live window.
    ///
    /// The title must not match another slot's name, another slot's title
    /// or another open window's title.
    pub fn assign_title(&self, slot: &str, title: &str) -> Result<()> {
        if !self.has_slot(slot) {
            return Err(WindowError::UnknownSlot(slot.to_string()));
        }
        let title = title.trim();
        if title.is_empty() {
            return Err(WindowError::EmptyTitle);
        }

        {
            let mut state = self.state.write();
            let slot_collision = self.slots.iter().filter(|s| *s != slot).any(|other| {
                other == title || state.titles.get(other).is_some_and(|t| t == title)
            });
            let window_collision = state
                .open
                .iter()
                .filter(|w| w.slot != slot)
                .any(|w| w.title == title);
            if slot_collision || window_collision {
                tracing::warn!(target: targets::REGISTRY, slot, title, "title already in use");
                return Err(WindowError::TitleCollision {
                    title: title.to_string(),
                });
            }

            state.titles.insert(slot.to_string(), title.to_string());
            if let Some(window) = state.open.iter_mut().find(|w| w.slot == slot) {
                window.title = title.to_string();
            }
        }

        self.settings.set(&slot_key(slot, "Title"), title);
        tracing::info!(target: targets::REGISTRY, slot, title, "window retitled");
        self.changed.emit(());
        Ok(())
    }

    /// The first slot with no live window.
    pub fn next_free_slot(&self) -> Option<String> {
        let state = self.state.read();
        self.slots
            .iter()
            .find(|slot| !state.open.iter().any(|w| &w.slot == *slot))
            .cloned()
    }

    /// Mark that the application is shutting down.
    ///
    /// Windows closing while this is set record themselves as open so the
    /// next session restores them.
    pub fn begin_app_shutdown(&self) {
        self.closing_app.store(true, Ordering::SeqCst);
    }

    /// Whether application shutdown is in progress.
    pub fn is_closing_app(&self) -> bool {
        self.closing_app.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for WindowRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowRegistry")
            .field("slots", &self.slots)
            .field("open", &self.state.read().open)
            .field("closing_app", &self.is_closing_app())
            .finish_non_exhaustive()
    }
}

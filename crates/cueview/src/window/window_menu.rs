//! The shared Window menu.
//!
//! Each slot has one [`Action`] that every open window places in its Window
//! menu. The action's label and target are rebuilt from the registry on
//! every change, and activation dispatches on the typed [`SlotEntry`] rather
//! than on the label text:
//!
//! * `(n) Add new window` for a slot that has never been renamed,
//! * `Open Window: <title>` for a renamed slot with no live window,
//! * `Raise Window: <title>` for a slot with a live window.

use std::sync::{Arc, Weak};

use cueview_core::Signal;
use parking_lot::RwLock;

use crate::logging::targets;
use crate::menu::Action;
use crate::{Result, WindowError};

use super::registry::{WindowId, WindowRegistry};

/// What activating a slot's menu entry does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotEntryKind {
    /// Raise the live window.
    Occupied(WindowId),
    /// Open a window in a slot the user has named.
    Named,
    /// Open a window in an unused slot.
    Empty,
}

/// The rendered state of one slot's menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEntry {
    /// The slot name.
    pub slot: String,
    /// 1-based slot position.
    pub ordinal: usize,
    /// The title shown for the slot.
    pub title: String,
    /// The activation target.
    pub kind: SlotEntryKind,
}

impl SlotEntry {
    /// The menu label for this entry.
    pub fn label(&self) -> String {
        match self.kind {
            SlotEntryKind::Occupied(_) => format!("Raise Window: {}", self.title),
            SlotEntryKind::Named => format!("Open Window: {}", self.title),
            SlotEntryKind::Empty => format!("({}) Add new window", self.ordinal),
        }
    }
}

struct SlotAction {
    slot: String,
    action: Arc<Action>,
    entry: RwLock<SlotEntry>,
}

/// Keeps the per-slot Window menu entries in step with the registry.
pub struct WindowMenuController {
    registry: Arc<WindowRegistry>,
    slots: Vec<SlotAction>,
    open_requested: Signal<String>,
    raise_requested: Signal<WindowId>,
}

impl WindowMenuController {
    /// Create the slot actions and follow `registry` changes.
    pub fn new(registry: Arc<WindowRegistry>) -> Arc<Self> {
        let slots = registry
            .slots()
            .iter()
            .enumerate()
            .map(|(index, slot)| SlotAction {
                slot: slot.clone(),
                action: Arc::new(Action::new(String::new())),
                entry: RwLock::new(SlotEntry {
                    slot: slot.clone(),
                    ordinal: index + 1,
                    title: slot.clone(),
                    kind: SlotEntryKind::Empty,
                }),
            })
            .collect();

        let controller = Arc::new(Self {
            registry,
            slots,
            open_requested: Signal::new(),
            raise_requested: Signal::new(),
        });

        for slot in &controller.slots {
            let weak = Arc::downgrade(&controller);
            let name = slot.slot.clone();
            slot.action.triggered.connect(move |_| {
                let Some(controller) = weak.upgrade() else {
                    return;
                };
                if let Err(err) = controller.activate(&name) {
                    tracing::debug!(target: targets::WINDOW_MENU, slot = %name, error = %err, "ignored menu activation");
                }
            });
        }

        let weak: Weak<Self> = Arc::downgrade(&controller);
        controller.registry.changed().connect(move |_| {
            if let Some(controller) = weak.upgrade() {
                controller.rebuild();
            }
        });

        controller.rebuild();
        controller
    }

    /// Emitted with a slot name when an entry asks for a window to open.
    pub fn open_requested(&self) -> &Signal<String> {
        &self.open_requested
    }

    /// Emitted with a window id when an entry asks for a window to raise.
    pub fn raise_requested(&self) -> &Signal<WindowId> {
        &self.raise_requested
    }

    /// The slot actions, in menu order.
    pub fn actions(&self) -> Vec<Arc<Action>> {
        self.slots.iter().map(|s| s.action.clone()).collect()
    }

    /// Snapshot of every slot entry, in menu order.
    pub fn entries(&self) -> Vec<SlotEntry> {
        self.slots.iter().map(|s| s.entry.read().clone()).collect()
    }

    /// The entry for `slot`.
    pub fn entry(&self, slot: &str) -> Option<SlotEntry> {
        self.slot_action(slot).map(|s| s.entry.read().clone())
    }

    /// The action for `slot`.
    pub fn action(&self, slot: &str) -> Option<Arc<Action>> {
        self.slot_action(slot).map(|s| s.action.clone())
    }

    /// Recompute every entry from the registry and relabel the actions.
    pub fn rebuild(&self) {
        for slot in &self.slots {
            let ordinal = slot.entry.read().ordinal;
            let entry = match self.registry.occupant(&slot.slot) {
                Some(window) => SlotEntry {
                    slot: slot.slot.clone(),
                    ordinal,
                    title: window.title,
                    kind: SlotEntryKind::Occupied(window.id),
                },
                None => {
                    let title = self.registry.slot_title(&slot.slot);
                    let kind = if title == slot.slot {
                        SlotEntryKind::Empty
                    } else {
                        SlotEntryKind::Named
                    };
                    SlotEntry {
                        slot: slot.slot.clone(),
                        ordinal,
                        title,
                        kind,
                    }
                }
            };
            slot.action.set_text(entry.label());
            *slot.entry.write() = entry;
        }
        tracing::trace!(target: targets::WINDOW_MENU, "window menu rebuilt");
    }

    /// Act on the entry for `slot`.
    ///
    /// An entry whose window closed since the last rebuild does nothing and
    /// reports [`WindowError::StaleMenuTarget`].
    pub fn activate(&self, slot: &str) -> Result<()> {
        let entry = self
            .entry(slot)
            .ok_or_else(|| WindowError::UnknownSlot(slot.to_string()))?;

        match entry.kind {
            SlotEntryKind::Occupied(id) => {
                if !self.registry.contains(id) {
                    return Err(WindowError::StaleMenuTarget(id));
                }
                self.raise_requested.emit(id);
            }
            SlotEntryKind::Named | SlotEntryKind::Empty => {
                self.open_requested.emit(entry.slot);
            }
        }
        Ok(())
    }

    fn slot_action(&self, slot: &str) -> Option<&SlotAction> {
        self.slots.iter().find(|s| s.slot == slot)
    }
}

impl std::fmt::Debug for WindowMenuController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowMenuController")
            .field("entries", &self.entries())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use parking_lot::Mutex;

    fn controller() -> (Arc<WindowRegistry>, Arc<WindowMenuController>) {
        let registry = Arc::new(WindowRegistry::new("App", Arc::new(Settings::new())));
        let controller = WindowMenuController::new(registry.clone());
        (registry, controller)
    }

    fn labels(controller: &WindowMenuController) -> Vec<String> {
        controller.actions().iter().map(|a| a.text()).collect()
    }

    #[test]
    fn test_initial_labels() {
        let (_registry, controller) = controller();
        assert_eq!(
            labels(&controller),
            vec![
                "(1) Add new window",
                "(2) Add new window",
                "(3) Add new window",
                "(4) Add new window",
            ]
        );
    }

    #[test]
    fn test_labels_follow_registry() {
        let (registry, controller) = controller();
        let id = WindowId::next();
        registry.register(id, "App", "App").unwrap();
        registry.assign_title("App_2", "Shows").unwrap();

        assert_eq!(
            labels(&controller),
            vec![
                "Raise Window: App",
                "Open Window: Shows",
                "(3) Add new window",
                "(4) Add new window",
            ]
        );
        assert_eq!(controller.entry("App").unwrap().kind, SlotEntryKind::Occupied(id));
    }

    #[test]
    fn test_activation_dispatch() {
        let (registry, controller) = controller();
        let opened = Arc::new(Mutex::new(Vec::new()));
        let raised = Arc::new(Mutex::new(Vec::new()));
        let sink = opened.clone();
        controller.open_requested().connect(move |slot| sink.lock().push(slot.clone()));
        let sink = raised.clone();
        controller.raise_requested().connect(move |id| sink.lock().push(*id));

        let id = WindowId::next();
        registry.register(id, "App", "App").unwrap();

        controller.action("App").unwrap().trigger();
        controller.action("App_3").unwrap().trigger();

        assert_eq!(*raised.lock(), vec![id]);
        assert_eq!(*opened.lock(), vec!["App_3".to_string()]);
    }

    #[test]
    fn test_title_containing_label_text() {
        let (registry, controller) = controller();
        let opened = Arc::new(Mutex::new(Vec::new()));
        let sink = opened.clone();
        controller.open_requested().connect(move |slot| sink.lock().push(slot.clone()));

        registry.assign_title("App_2", "Raise Window: x").unwrap();
        controller.activate("App_2").unwrap();

        assert_eq!(*opened.lock(), vec!["App_2".to_string()]);
    }

    #[test]
    fn test_stale_target_is_noop() {
        let (registry, controller) = controller();
        let id = WindowId::next();
        registry.register(id, "App", "App").unwrap();

        // Close the window without the menu seeing it.
        controller.registry.changed().set_blocked(true);
        registry.unregister(id);
        controller.registry.changed().set_blocked(false);

        let raised = Arc::new(Mutex::new(Vec::new()));
        let sink = raised.clone();
        controller.raise_requested().connect(move |id| sink.lock().push(*id));

        assert_eq!(controller.activate("App"), Err(WindowError::StaleMenuTarget(id)));
        assert!(raised.lock().is_empty());
    }
}

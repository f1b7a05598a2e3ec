//! Window lifecycle management.
//!
//! - [`WindowRegistry`] tracks window slots, open windows and slot titles.
//! - [`WindowMenuController`] keeps the shared Window menu entries current.
//! - [`FacilityState`] and [`FacilityMenu`] hold and render the facility
//!   selection.
//! - [`MainWindow`] is the per-window controller.
//! - [`WindowSession`] wires them together and owns the live windows.

mod collaborators;
mod facility;
mod geometry;
mod main_window;
mod registry;
mod session;
mod window_menu;

pub use collaborators::{
    FacilityBackend, HeadlessPrompt, NoPlugins, PanelPlugins, SystemUrlOpener, UrlOpener,
    UserPrompt,
};
pub use facility::{FacilityConfig, FacilityMenu, FacilityState, StaticFacilities};
pub use geometry::{WindowGeometry, WindowState};
pub use main_window::{Lifecycle, MainWindow, REFRESH_SHORTCUT, WindowContext};
pub use registry::{
    OpenWindow, WINDOW_SLOT_COUNT, WindowId, WindowRegistry, slot_key, slot_names,
};
pub use session::{SessionBuilder, WindowSession};
pub use window_menu::{SlotEntry, SlotEntryKind, WindowMenuController};

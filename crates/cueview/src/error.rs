//! Error types for window lifecycle operations.

use thiserror::Error;

use crate::window::WindowId;

/// Errors raised by the window registry, menus and controllers.
///
/// None of these is fatal to the process: callers either log and ignore them
/// or leave the previous state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The same window instance was registered twice.
    #[error("window {0} is already registered")]
    DuplicateRegistration(WindowId),

    /// A second live window was bound to an occupied slot.
    #[error("window slot {slot} is already occupied")]
    SlotOccupied { slot: String },

    /// The slot name is not one of the application's window slots.
    #[error("unknown window slot {0:?}")]
    UnknownSlot(String),

    /// A rename would make two windows indistinguishable in the menu.
    #[error("title {title:?} is already used by another window")]
    TitleCollision { title: String },

    /// Window titles must contain visible characters.
    #[error("window title must not be empty")]
    EmptyTitle,

    /// Every window slot is occupied.
    #[error("all {capacity} window slots are occupied")]
    SlotCapacityExceeded { capacity: usize },

    /// A menu entry was activated after its target window closed.
    #[error("window {0} has already closed")]
    StaleMenuTarget(WindowId),

    /// The operation targets a window that is not open.
    #[error("window {0} is not open")]
    WindowClosed(WindowId),

    /// The facility is not part of the backend configuration.
    #[error("unknown facility {0:?}")]
    UnknownFacility(String),

    /// The backend facility configuration is unusable.
    #[error("invalid facility configuration: {0}")]
    InvalidFacilityConfig(String),
}

/// Result type for window operations.
pub type Result<T> = std::result::Result<T, WindowError>;

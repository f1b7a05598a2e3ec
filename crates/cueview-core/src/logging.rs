//! Tracing targets for cueview.
//!
//! Every subsystem logs through the `tracing` crate with one of the targets
//! below, so that a subscriber filter such as
//! `cueview::registry=debug,cueview_core::signal=off` selects a subsystem.
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("cueview::window=info")
//!     .init();
//! ```

/// Target names for log filtering.
pub mod targets {
    /// Signal/slot emission.
    pub const SIGNAL: &str = "cueview_core::signal";
    /// Process event bus broadcasts.
    pub const EVENT_BUS: &str = "cueview_core::event_bus";
    /// Window slot registry.
    pub const REGISTRY: &str = "cueview::registry";
    /// Window menu synchronization.
    pub const WINDOW_MENU: &str = "cueview::window_menu";
    /// Window lifecycle.
    pub const WINDOW: &str = "cueview::window";
    /// Facility selection.
    pub const FACILITY: &str = "cueview::facility";
    /// Settings persistence.
    pub const SETTINGS: &str = "cueview::settings";
    /// Session startup and window ownership.
    pub const SESSION: &str = "cueview::session";
}

//! Core systems for cueview.
//!
//! This crate provides the pieces every window of a cueview process shares:
//!
//! - **Signals**: [`Signal`], a re-entrancy-safe publish/subscribe primitive
//! - **Event bus**: [`EventBus`], the process-wide `quit`, status message,
//!   facility-changed and update-request channels
//! - **Logging**: tracing target names in [`logging::targets`]
//!
//! # Example
//!
//! ```
//! use cueview_core::{EventBus, StatusMessage};
//!
//! let bus = EventBus::new();
//! bus.status_message().connect(|message| {
//!     println!("status: {}", message.text);
//! });
//! bus.show_status(StatusMessage::new("Ready"));
//! ```

mod event_bus;
pub mod logging;
pub mod signal;

pub use event_bus::{EventBus, StatusMessage};
pub use signal::{ConnectionId, Signal};

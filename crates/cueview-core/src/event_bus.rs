//! Process-wide event bus.
//!
//! The [`EventBus`] carries the notifications every window of the process
//! listens to: application quit, status bar messages, facility changes, and
//! update requests. It is created once and shared by `Arc` between all window
//! controllers.

use crate::logging::targets;
use crate::signal::Signal;

/// A message to show in the status bar of every window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// The message text.
    pub text: String,
    /// How long the message stays visible, in milliseconds.
    pub duration_ms: u32,
}

impl StatusMessage {
    /// Default display duration for status messages.
    pub const DEFAULT_DURATION_MS: u32 = 5000;

    /// Create a status message with the default duration.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            duration_ms: Self::DEFAULT_DURATION_MS,
        }
    }

    /// Set the display duration.
    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Publish/subscribe channels shared by all windows of the process.
#[derive(Default)]
pub struct EventBus {
    quit: Signal<()>,
    status_message: Signal<StatusMessage>,
    facility_changed: Signal<()>,
    request_update: Signal<()>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitted to ask every window to close itself.
    pub fn quit(&self) -> &Signal<()> {
        &self.quit
    }

    /// Emitted with a message for every window's status bar.
    pub fn status_message(&self) -> &Signal<StatusMessage> {
        &self.status_message
    }

    /// Emitted after the active facility has been switched.
    pub fn facility_changed(&self) -> &Signal<()> {
        &self.facility_changed
    }

    /// Emitted when the user asks all views to refresh.
    pub fn request_update(&self) -> &Signal<()> {
        &self.request_update
    }

    /// Broadcast `quit` to every subscriber.
    pub fn broadcast_quit(&self) {
        tracing::info!(
            target: targets::EVENT_BUS,
            subscribers = self.quit.connection_count(),
            "broadcasting quit"
        );
        self.quit.emit(());
    }

    /// Publish a status message.
    pub fn show_status(&self, message: StatusMessage) {
        tracing::debug!(target: targets::EVENT_BUS, text = %message.text, "status message");
        self.status_message.emit(message);
    }

    /// Publish `facility_changed`.
    pub fn notify_facility_changed(&self) {
        self.facility_changed.emit(());
    }

    /// Publish `request_update`.
    pub fn notify_request_update(&self) {
        self.request_update.emit(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_status_message_defaults() {
        let message = StatusMessage::new("Ready");
        assert_eq!(message.text, "Ready");
        assert_eq!(message.duration_ms, 5000);
        assert_eq!(message.with_duration(100).duration_ms, 100);
    }

    #[test]
    fn test_show_status_reaches_subscribers() {
        let bus = EventBus::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        bus.status_message().connect(move |message| {
            received_clone.lock().push(message.text.clone());
        });

        bus.show_status(StatusMessage::new("Saving"));
        assert_eq!(*received.lock(), vec!["Saving".to_string()]);
    }
}

//! Window geometry and display state.

use serde::{Deserialize, Serialize};

/// The display state of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindowState {
    /// Normal window state.
    #[default]
    Normal,
    /// Window is minimized.
    Minimized,
    /// Window fills the available desktop area.
    Maximized,
    /// Window covers the entire screen without decorations.
    FullScreen,
}

impl WindowState {
    /// Check if the window is full-screen.
    pub fn is_full_screen(&self) -> bool {
        matches!(self, WindowState::FullScreen)
    }

    /// The state the full-screen toggle moves to from this one.
    ///
    /// Full-screen windows return to maximized; any other state goes
    /// full-screen.
    pub fn toggled_full_screen(self) -> Self {
        match self {
            WindowState::FullScreen => WindowState::Maximized,
            _ => WindowState::FullScreen,
        }
    }
}

/// Saved window geometry, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    /// X position (top-left corner).
    pub x: i32,
    /// Y position (top-left corner).
    pub y: i32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
    /// Display state.
    #[serde(default)]
    pub state: WindowState,
}

impl WindowGeometry {
    /// Create a geometry in the normal state.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            state: WindowState::Normal,
        }
    }

    /// Grow the size so it is at least `(min_width, min_height)`.
    pub fn clamped_to_minimum(mut self, (min_width, min_height): (u32, u32)) -> Self {
        self.width = self.width.max(min_width);
        self.height = self.height.max(min_height);
        self
    }
}

impl Default for WindowGeometry {
    /// 1280×1024 at the origin.
    fn default() -> Self {
        Self::new(0, 0, 1280, 1024)
    }
}

//! Status indicator collaborator

use embedded_graphics::pixelcolor::Rgb888;

/// A single RGB indicator showing what the loop is doing
///
/// Setting the color must not fail and must not block; implementations
/// that talk to slow hardware should latch the value and apply it from
/// their own task.
pub trait StatusIndicator {
    /// Show the given color
    fn set(&mut self, color: Rgb888);
}

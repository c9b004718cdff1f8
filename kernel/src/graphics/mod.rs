/*
 * Graphics Interface
 *
 * The window-related system calls talk to the compositor through
 * `LayerManager` and draw through `Window`. Windows synchronize their own
 * pixel buffers, so drawing happens outside the kernel critical section;
 * only layer-table lookups and redraw requests need interrupts masked.
 */

pub mod line;

use alloc::string::String;
use alloc::sync::Arc;

use crate::scheduler::TaskId;

/// Compositor layer identifier, the handle returned by `OpenWindow`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Vector2D {
    pub x: i32,
    pub y: i32,
}

impl Vector2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl PixelColor {
    /// Unpack a `0xRRGGBB` value; the top byte is ignored.
    pub const fn from_rgb(c: u32) -> Self {
        Self {
            r: (c >> 16) as u8,
            g: (c >> 8) as u8,
            b: c as u8,
        }
    }
}

/// Everything needed to build an application's toplevel window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub width: i32,
    pub height: i32,
    pub title: String,
}

/// Drawing surface of an application window
///
/// Coordinates are relative to the window's client area.
pub trait Window: Send + Sync {
    /// Width and height of the client area
    fn size(&self) -> Vector2D;
    fn write_pixel(&self, pos: Vector2D, color: PixelColor);
    fn write_string(&self, pos: Vector2D, text: &str, color: PixelColor);
    fn fill_rectangle(&self, pos: Vector2D, size: Vector2D, color: PixelColor);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerError {
    NoSuchLayer,
}

pub trait LayerManager: Send {
    /// Create a draggable toplevel window layer at `position`.
    fn new_toplevel(&mut self, spec: WindowSpec, position: Vector2D) -> LayerId;

    /// Bring the layer to the front and give it input focus.
    fn activate(&mut self, id: LayerId);

    /// Record `task` as the owner of the layer for event routing.
    fn bind_task(&mut self, id: LayerId, task: TaskId);

    fn find_window(&self, id: LayerId) -> Option<Arc<dyn Window>>;

    /// Schedule a redraw of the layer.
    fn draw(&mut self, id: LayerId);

    /// Remove the layer, its window and its owner record.
    fn close_layer(&mut self, id: LayerId) -> Result<(), LayerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_unpacks_rgb() {
        let c = PixelColor::from_rgb(0xff12_3456);
        assert_eq!(c, PixelColor { r: 0x12, g: 0x34, b: 0x56 });
    }
}

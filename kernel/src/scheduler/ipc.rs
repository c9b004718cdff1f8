/*
 * Task Messages
 *
 * Everything that arrives in a task's mailbox: input from the keyboard and
 * mouse, timer expirations, compositor notifications. Only a handful of kinds
 * are meaningful to applications; `syscall::event` translates those into the
 * user-visible event records and drops the rest.
 */

use bitflags::bitflags;

use crate::graphics::LayerId;

bitflags! {
    /// Keyboard modifier byte as reported by the HID boot protocol
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const L_CONTROL = 0b0000_0001;
        const L_SHIFT = 0b0000_0010;
        const L_ALT = 0b0000_0100;
        const L_GUI = 0b0000_1000;
        const R_CONTROL = 0b0001_0000;
        const R_SHIFT = 0b0010_0000;
        const R_ALT = 0b0100_0000;
        const R_GUI = 0b1000_0000;

        const CONTROL = Self::L_CONTROL.bits() | Self::R_CONTROL.bits();
    }
}

/// Usage ID of the `Q` key.
pub const KEYCODE_Q: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    InterruptXhci,
    TimerTimeout { timeout: u64, value: i32 },
    KeyPush { modifier: Modifiers, keycode: u8, ascii: u8, press: bool },
    MouseMove { x: i32, y: i32, dx: i32, dy: i32, buttons: u8 },
    MouseButton { x: i32, y: i32, press: bool, button: i32 },
    Layer { layer_id: LayerId },
    LayerFinish,
    WindowActive { activate: bool },
    Pipe { len: usize },
    WindowClose { layer_id: LayerId },
}

impl Message {
    /// Short kind name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Message::InterruptXhci => "InterruptXhci",
            Message::TimerTimeout { .. } => "TimerTimeout",
            Message::KeyPush { .. } => "KeyPush",
            Message::MouseMove { .. } => "MouseMove",
            Message::MouseButton { .. } => "MouseButton",
            Message::Layer { .. } => "Layer",
            Message::LayerFinish => "LayerFinish",
            Message::WindowActive { .. } => "WindowActive",
            Message::Pipe { .. } => "Pipe",
            Message::WindowClose { .. } => "WindowClose",
        }
    }
}

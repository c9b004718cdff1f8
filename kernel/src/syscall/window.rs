/*
 * Window System Calls
 *
 * Window handles are compositor layer IDs. Drawing calls pack the layer ID
 * into the low 32 bits of their first argument and `WinFlags` into the high
 * 32 bits; unless `NO_REDRAW` is set, a successful draw is followed by a
 * redraw request for the layer.
 */

use alloc::string::String;

use super::abi::{SyscallArgs, WinFlags};
use super::user_ptr::UserAccess;
use crate::context::KernelContext;
use crate::graphics::line::{ClipRect, draw_line};
use crate::graphics::{LayerError, LayerId, PixelColor, Vector2D, Window, WindowSpec};
use crate::io::Errno;

impl From<LayerError> for Errno {
    fn from(err: LayerError) -> Self {
        match err {
            LayerError::NoSuchLayer => Errno::EBADF,
        }
    }
}

fn split_handle(layer_flags: u64) -> (LayerId, WinFlags) {
    let id = LayerId(layer_flags as u32);
    let flags = WinFlags::from_bits_retain((layer_flags >> 32) as u32);
    (id, flags)
}

fn vec2(x: u64, y: u64) -> Vector2D {
    Vector2D::new(x as i32, y as i32)
}

fn color(c: u64) -> PixelColor {
    PixelColor::from_rgb(c as u32)
}

/// Resolve the window behind a handle, run `draw` on it, then redraw.
///
/// Drawing happens outside the critical section. An error from `draw`
/// skips the redraw.
fn with_window(
    ctx: &KernelContext,
    layer_flags: u64,
    draw: impl FnOnce(&dyn Window) -> Result<(), Errno>,
) -> Result<u64, Errno> {
    let (id, flags) = split_handle(layer_flags);
    let window = {
        let cs = ctx.critical();
        let window = cs.layers().find_window(id);
        window
    };
    let window = window.ok_or(Errno::EBADF)?;

    draw(window.as_ref())?;

    if !flags.contains(WinFlags::NO_REDRAW) {
        let cs = ctx.critical();
        cs.layers().draw(id);
    }
    Ok(0)
}

fn read_text(ctx: &KernelContext, user: &UserAccess, addr: u64) -> Result<String, Errno> {
    let bytes = user.read_cstr(addr, ctx.config().max_text_len)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Native `OpenWindow(w, h, x, y, title)`
pub(super) fn open_window(
    ctx: &KernelContext,
    user: &UserAccess,
    args: SyscallArgs,
) -> Result<u64, Errno> {
    let [w, h, x, y, title, ..] = args.0;
    let spec = WindowSpec {
        width: w as i32,
        height: h as i32,
        title: read_text(ctx, user, title)?,
    };

    let cs = ctx.critical();
    let task_id = cs.tasks().current_task().id();
    let mut layers = cs.layers();
    let id = layers.new_toplevel(spec, vec2(x, y));
    layers.activate(id);
    layers.bind_task(id, task_id);
    log::debug!("task {} opened window layer {}", task_id.0, id.0);
    Ok(id.0 as u64)
}

/// Native `WinWriteString(layer_flags, x, y, color, s)`
pub(super) fn win_write_string(
    ctx: &KernelContext,
    user: &UserAccess,
    args: SyscallArgs,
) -> Result<u64, Errno> {
    let [layer_flags, x, y, c, s, ..] = args.0;
    with_window(ctx, layer_flags, |win| {
        let text = read_text(ctx, user, s)?;
        win.write_string(vec2(x, y), &text, color(c));
        Ok(())
    })
}

/// Native `WinFillRectangle(layer_flags, x, y, w, h, color)`
pub(super) fn win_fill_rectangle(ctx: &KernelContext, args: SyscallArgs) -> Result<u64, Errno> {
    let [layer_flags, x, y, w, h, c] = args.0;
    with_window(ctx, layer_flags, |win| {
        win.fill_rectangle(vec2(x, y), vec2(w, h), color(c));
        Ok(())
    })
}

/// Native `WinRedraw(layer_flags)`
pub(super) fn win_redraw(ctx: &KernelContext, args: SyscallArgs) -> Result<u64, Errno> {
    let [layer_flags, ..] = args.0;
    with_window(ctx, layer_flags, |_| Ok(()))
}

/// Native `WinDrawLine(layer_flags, x0, y0, x1, y1, color)`
pub(super) fn win_draw_line(ctx: &KernelContext, args: SyscallArgs) -> Result<u64, Errno> {
    let [layer_flags, x0, y0, x1, y1, c] = args.0;
    with_window(ctx, layer_flags, |win| {
        let c = color(c);
        let clip = ClipRect::of_size(win.size());
        draw_line(vec2(x0, y0), vec2(x1, y1), clip, |p| win.write_pixel(p, c));
        Ok(())
    })
}

/// Native `CloseWindow(layer_flags)`
pub(super) fn close_window(ctx: &KernelContext, args: SyscallArgs) -> Result<u64, Errno> {
    let [layer_flags, ..] = args.0;
    let (id, _) = split_handle(layer_flags);
    let cs = ctx.critical();
    cs.layers().close_layer(id)?;
    Ok(0)
}

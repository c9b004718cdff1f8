/*
 * Event System Calls
 *
 * `ReadEvent` drains the calling task's mailbox into an array of
 * `AppEvent`s, sleeping only while nothing has been delivered yet.
 * `CreateTimer` arms a one-shot application timer whose expiry comes back
 * through the same mailbox.
 */

use super::abi::{AppEvent, SyscallArgs, TimerMode};
use super::user_ptr::{UserAccess, UserPtr};
use crate::context::KernelContext;
use crate::io::Errno;
use crate::scheduler::{KEYCODE_Q, Message, Modifiers};
use crate::utils::timer::{Timer, ms_to_ticks, ticks_to_ms};
use core::mem::size_of;

/// Translate a mailbox message into the event an application sees.
///
/// Messages applications do not care about yield `None`.
pub fn translate(msg: &Message) -> Option<AppEvent> {
    let event = match *msg {
        Message::KeyPush { modifier, keycode, .. }
            if keycode == KEYCODE_Q && modifier.intersects(Modifiers::CONTROL) =>
        {
            AppEvent::Quit
        }
        Message::KeyPush { modifier, keycode, ascii, press } => AppEvent::KeyPush {
            modifier: modifier.bits(),
            keycode,
            ascii,
            press,
        },
        Message::MouseMove { x, y, dx, dy, buttons } => {
            AppEvent::MouseMove { x, y, dx, dy, buttons }
        }
        Message::MouseButton { x, y, press, button } => AppEvent::MouseButton {
            x,
            y,
            press: press as i32,
            button,
        },
        // non-negative values belong to kernel timers
        Message::TimerTimeout { timeout, value } if value < 0 => AppEvent::TimerTimeout {
            timeout,
            value: value.saturating_neg(),
        },
        Message::WindowClose { .. } => AppEvent::Quit,
        ref other => {
            log::info!("uncaught event type: {}", other.kind());
            return None;
        }
    };
    Some(event)
}

/// Native `ReadEvent(events, len)`
pub(super) fn read_event(
    ctx: &KernelContext,
    user: &UserAccess,
    args: SyscallArgs,
) -> Result<u64, Errno> {
    let [events, len, ..] = args.0;
    user.check_addr(events)?;
    let events = UserPtr::<AppEvent>::new(events);

    let mut written = 0u64;
    while written < len {
        // a message is only taken once there is somewhere to put it
        let slot = match event_slot(user, events, written) {
            Ok(slot) => slot,
            Err(_) if written > 0 => break,
            Err(e) => return Err(e),
        };
        let msg = {
            let cs = ctx.critical();
            let mut tasks = cs.tasks();
            let msg = tasks.current_task().receive_message();
            if msg.is_none() && written == 0 {
                tasks.sleep_current();
            }
            msg
        };

        let Some(msg) = msg else {
            if written > 0 {
                break;
            }
            ctx.yield_now();
            continue;
        };

        if let Some(event) = translate(&msg) {
            user.write(slot, &event)?;
            written += 1;
        }
    }
    Ok(written)
}

fn event_slot(
    user: &UserAccess,
    events: UserPtr<AppEvent>,
    index: u64,
) -> Result<UserPtr<AppEvent>, Errno> {
    let slot = events.offset(index)?;
    user.check(slot.addr(), size_of::<AppEvent>() as u64)?;
    Ok(slot)
}

/// Native `CreateTimer(mode, timer_value, timeout_ms)`
///
/// Returns the timeout converted back to milliseconds, so the caller sees
/// the tick-rounded deadline.
pub(super) fn create_timer(ctx: &KernelContext, args: SyscallArgs) -> Result<u64, Errno> {
    let [mode, timer_value, timeout_ms, ..] = args.0;
    let mode = TimerMode::from_bits_retain(mode);
    let timer_value = timer_value as i32;
    if timer_value <= 0 {
        return Err(Errno::EINVAL);
    }

    let freq = ctx.config().timer_freq;
    let cs = ctx.critical();
    let task_id = cs.tasks().current_task().id();
    let mut timers = cs.timers();

    let mut timeout = ms_to_ticks(timeout_ms, freq);
    if mode.contains(TimerMode::RELATIVE) {
        timeout = timeout.saturating_add(timers.current_tick());
    }
    timers.add_timer(Timer::new(timeout, -timer_value, task_id));

    Ok(ticks_to_ms(timeout, freq))
}

/*
 * Console and Process System Calls
 *
 * `LogString`, `PutString`, `Exit` and `GetCurrentTick`.
 */

use alloc::string::String;

use super::abi::{LogLevel, NativeResult, SyscallArgs};
use super::file::{fd_arg, write_fd};
use super::user_ptr::UserAccess;
use crate::context::KernelContext;
use crate::io::Errno;

/// Native `LogString(level, s)`
///
/// Forwards a NUL-terminated string to the kernel log. Returns its length.
pub(super) fn log_string(
    ctx: &KernelContext,
    user: &UserAccess,
    args: SyscallArgs,
) -> Result<u64, Errno> {
    let [level, s, ..] = args.0;
    let level: log::Level = LogLevel::from_raw(level).ok_or(Errno::EPERM)?.into();
    let bytes = user.read_cstr(s, ctx.config().max_log_len)?;

    let text = String::from_utf8_lossy(&bytes);
    log::log!(target: "app", level, "{}", text.trim_end_matches('\n'));
    Ok(bytes.len() as u64)
}

/// Native `PutString(fd, buf, len)`
pub(super) fn put_string(
    ctx: &KernelContext,
    user: &UserAccess,
    args: SyscallArgs,
) -> Result<u64, Errno> {
    let [fd, buf, len, ..] = args.0;
    write_fd(ctx, user, fd_arg(fd), buf, len).map(|n| n as u64)
}

/// Native `Exit(code)`
///
/// Hands back the kernel stack pointer saved when the task entered user
/// mode; the entry glue unwinds to it instead of returning.
pub(super) fn exit(ctx: &KernelContext, args: SyscallArgs) -> NativeResult {
    let [code, ..] = args.0;
    let rsp = ctx.with_current_task(|task| task.os_stack_pointer());
    NativeResult::new(rsp, code as i32)
}

/// Native `GetCurrentTick()`: the tick count, with the timer frequency in
/// the error slot.
pub(super) fn get_current_tick(ctx: &KernelContext) -> NativeResult {
    let cs = ctx.critical();
    let tick = cs.timers().current_tick();
    drop(cs);
    NativeResult::new(tick, ctx.config().timer_freq as i32)
}

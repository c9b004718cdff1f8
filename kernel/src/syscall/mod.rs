/*
 * System Call Infrastructure
 *
 * Entry point for every request user mode makes through `syscall`.
 *
 * Register convention:
 * - RAX: call number (bit 31 set = native ABI, clear = Linux ABI)
 * - RDI, RSI, RDX, R10, R8, R9: arguments 1-6
 * - On return RAX carries the value and RDX the error code (0 = success)
 *
 * Dispatch:
 * - `numbers` decodes RAX into a `Syscall`
 * - native calls are served by `process`, `window`, `event` and `file`
 * - Linux calls by `compat`; slots without a handler report themselves on
 *   the console and halt the CPU
 * - numbers outside both tables terminate the task with code -1
 *
 * The dispatcher itself never touches hardware. It returns a
 * `Disposition` and the entry glue (`entry`) turns that into a `sysret`,
 * an unwind to the task's saved kernel stack, or a halt.
 */

pub mod abi;
pub mod compat;
pub mod entry;
pub mod event;
pub mod file;
pub mod numbers;
pub mod process;
pub mod user_ptr;
pub mod window;

use core::fmt::Write;

use spin::Once;

use crate::context::KernelContext;
use abi::{CompatResult, NativeResult, SyscallArgs};
use numbers::{CompatCall, NativeCall, Syscall, compat_name};
use user_ptr::UserAccess;

/// What the entry glue must do once a handler has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Return to user mode with RAX = `value`, RDX = `error`.
    Return { value: u64, error: i32 },
    /// Terminate the task: unwind to `os_stack_pointer` with exit `code`.
    Exit { os_stack_pointer: u64, code: i32 },
    /// Stop the CPU; an unimplemented call was made.
    Halt,
}

impl From<NativeResult> for Disposition {
    fn from(res: NativeResult) -> Self {
        Disposition::Return { value: res.value, error: res.error }
    }
}

impl From<CompatResult> for Disposition {
    fn from(res: CompatResult) -> Self {
        Disposition::Return { value: res.value as u64, error: res.error }
    }
}

static KERNEL: Once<&'static KernelContext> = Once::new();

/// Register the context the entry glue dispatches against.
///
/// Only the first registration takes effect.
pub fn register(ctx: &'static KernelContext) -> &'static KernelContext {
    KERNEL.call_once(|| ctx)
}

/// The registered context, if any.
pub fn kernel() -> Option<&'static KernelContext> {
    KERNEL.get().copied()
}

/// Decode `number` and run its handler.
///
/// # Safety
/// Must run on behalf of the current task with its address space active:
/// user pointers among `args` are dereferenced after range validation.
pub unsafe fn dispatch(ctx: &KernelContext, number: u64, args: SyscallArgs) -> Disposition {
    // SAFETY: forwarded from the caller.
    let user = unsafe { UserAccess::new(ctx.config().user_base) };
    dispatch_with(ctx, &user, number, args)
}

pub(crate) fn dispatch_with(
    ctx: &KernelContext,
    user: &UserAccess,
    number: u64,
    args: SyscallArgs,
) -> Disposition {
    let trace = ctx.config().trace_syscalls;
    if trace {
        log::debug!("syscall {:#010x}", number);
    }

    let disposition = match Syscall::decode(number) {
        Syscall::Native(call) => native(ctx, user, call, args),
        Syscall::Compat(call) => compat(ctx, user, call, args),
        Syscall::Invalid(number) => invalid_number(ctx, number),
    };

    if trace {
        match disposition {
            Disposition::Return { value, error } => {
                log::debug!("syscall {:#010x} -> {:#x} (error {})", number, value, error)
            }
            other => log::debug!("syscall {:#010x} -> {:?}", number, other),
        }
    }
    disposition
}

fn native(
    ctx: &KernelContext,
    user: &UserAccess,
    call: NativeCall,
    args: SyscallArgs,
) -> Disposition {
    use NativeCall::*;
    let res: NativeResult = match call {
        LogString => process::log_string(ctx, user, args).into(),
        PutString => process::put_string(ctx, user, args).into(),
        Exit => {
            let res = process::exit(ctx, args);
            return Disposition::Exit { os_stack_pointer: res.value, code: res.error };
        }
        OpenWindow => window::open_window(ctx, user, args).into(),
        WinWriteString => window::win_write_string(ctx, user, args).into(),
        WinFillRectangle => window::win_fill_rectangle(ctx, args).into(),
        GetCurrentTick => process::get_current_tick(ctx),
        WinRedraw => window::win_redraw(ctx, args).into(),
        WinDrawLine => window::win_draw_line(ctx, args).into(),
        CloseWindow => window::close_window(ctx, args).into(),
        ReadEvent => event::read_event(ctx, user, args).into(),
        CreateTimer => event::create_timer(ctx, args).into(),
        OpenFile => file::open_file(ctx, user, args).into(),
        ReadFile => file::read_file(ctx, user, args).into(),
        DemandPages => file::demand_pages(ctx, args).into(),
        MapFile => file::map_file(ctx, user, args).into(),
        IsTerminal => file::is_terminal(ctx, args).into(),
    };
    res.into()
}

fn compat(
    ctx: &KernelContext,
    user: &UserAccess,
    call: CompatCall,
    args: SyscallArgs,
) -> Disposition {
    use CompatCall::*;
    let res = match call {
        Read => compat::read(ctx, user, args),
        Write => compat::write(ctx, user, args),
        Open => compat::open(ctx, user, args),
        Close => compat::close(ctx, args),
        Lseek => compat::lseek(ctx, args),
        Brk => compat::brk(ctx, args),
        Writev => compat::writev(ctx, user, args),
        Uname => compat::uname(ctx, user, args),
        Fcntl => compat::fcntl(ctx, args),
        Readlink => compat::readlink(user, args),
        Openat => compat::openat(ctx, user, args),
        Fstat | RtSigaction | Ioctl | Getuid | Getgid | Geteuid | Getegid | ArchPrctl => {
            CompatResult::ok(0)
        }
        ExitGroup => {
            let res = compat::exit_group(ctx, args);
            return Disposition::Exit { os_stack_pointer: res.value as u64, code: res.error };
        }
        Unimplemented(number) => return unimplemented(ctx, number, args),
    };
    res.into()
}

/// Best-effort diagnostic output on the task's standard output.
fn console_write(ctx: &KernelContext, text: &str) {
    if let Ok(file) = file::lookup_fd(ctx, 1) {
        let _ = file.write(text.as_bytes());
    }
}

/// A Linux call the kernel has a slot for but no handler.
fn unimplemented(ctx: &KernelContext, number: u64, args: SyscallArgs) -> Disposition {
    let name = compat_name(number);
    log::error!("unimplemented syscall {:#05x} ({})", number, name);

    let mut msg: heapless::String<256> = heapless::String::new();
    let _ = writeln!(msg, "unimplemented syscall {:#05x} ({}) called", number, name);
    console_write(ctx, &msg);
    for (i, regs) in args.0.chunks(2).enumerate() {
        msg.clear();
        let _ = writeln!(
            msg,
            "  arg{}: {:#018x}  arg{}: {:#018x}",
            2 * i + 1,
            regs[0],
            2 * i + 2,
            regs[1]
        );
        console_write(ctx, &msg);
    }
    Disposition::Halt
}

/// A number outside both tables: report it and terminate the task.
fn invalid_number(ctx: &KernelContext, number: u64) -> Disposition {
    log::warn!("invalid syscall number {:#010x}", number);

    let mut msg: heapless::String<128> = heapless::String::new();
    let _ = writeln!(msg, "invalid syscall number {:#010x}", number);
    console_write(ctx, &msg);

    let os_stack_pointer = ctx.with_current_task(|task| task.os_stack_pointer());
    Disposition::Exit { os_stack_pointer, code: -1 }
}

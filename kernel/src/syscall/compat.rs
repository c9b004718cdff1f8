/*
 * Linux-Compatible System Calls
 *
 * Just enough of the Linux x86_64 ABI for a statically linked libc to start
 * up, do console and file I/O, and exit. Identity and signal queries answer
 * with fixed values. Every failure returns -1 with the errno in the error
 * register, except the `writev` and `readlink` quirks documented below.
 */

use super::abi::{CompatResult, F_DUPFD, F_GETFL, Iovec, OpenFlags, SyscallArgs, Utsname};
use super::file::{fd_arg, lookup_fd, open_path, read_fd, too_long, write_fd};
use super::user_ptr::{UserAccess, UserPtr};
use crate::context::KernelContext;
use crate::io::{Errno, Whence};

pub(super) fn read(ctx: &KernelContext, user: &UserAccess, args: SyscallArgs) -> CompatResult {
    let [fd, buf, count, ..] = args.0;
    read_fd(ctx, user, fd_arg(fd), buf, count).map(|n| n as i64).into()
}

pub(super) fn write(ctx: &KernelContext, user: &UserAccess, args: SyscallArgs) -> CompatResult {
    let [fd, buf, count, ..] = args.0;
    write_fd(ctx, user, fd_arg(fd), buf, count).map(|n| n as i64).into()
}

fn open_user_path(
    ctx: &KernelContext,
    user: &UserAccess,
    path: u64,
    flags: u64,
) -> Result<i64, Errno> {
    let path = user.read_cstr(path, ctx.config().max_path_len).map_err(too_long)?;
    let flags = OpenFlags::from_bits_retain(flags as u32);
    open_path(ctx, &path, flags, b"stdin").map(|fd| fd as i64)
}

pub(super) fn open(ctx: &KernelContext, user: &UserAccess, args: SyscallArgs) -> CompatResult {
    let [path, flags, ..] = args.0;
    open_user_path(ctx, user, path, flags).into()
}

/// `openat(dirfd, path, flags)`. Paths are always resolved from the root.
pub(super) fn openat(ctx: &KernelContext, user: &UserAccess, args: SyscallArgs) -> CompatResult {
    let [_dirfd, path, flags, ..] = args.0;
    open_user_path(ctx, user, path, flags).into()
}

pub(super) fn close(ctx: &KernelContext, args: SyscallArgs) -> CompatResult {
    let [fd, ..] = args.0;
    ctx.with_current_task(|task| task.files_mut().close(fd_arg(fd)))
        .map(|()| 0i64)
        .into()
}

pub(super) fn lseek(ctx: &KernelContext, args: SyscallArgs) -> CompatResult {
    let [fd, offset, whence, ..] = args.0;
    let seek = || -> Result<i64, Errno> {
        let file = lookup_fd(ctx, fd_arg(fd))?;
        let whence = Whence::from_raw(whence as i32).ok_or(Errno::EINVAL)?;
        let offset = file.seek(offset as i64, whence).map_err(|_| Errno::ESPIPE)?;
        Ok(offset as i64)
    };
    seek().into()
}

/// `brk(addr)`: 0 queries the break, anything else sets it unchecked.
pub(super) fn brk(ctx: &KernelContext, args: SyscallArgs) -> CompatResult {
    let [addr, ..] = args.0;
    let end = ctx.with_current_task(|task| {
        if addr != 0 {
            task.set_dpaging_end(addr);
        }
        task.dpaging_end()
    });
    CompatResult::ok(end as i64)
}

/// `writev(fd, iov, iovcnt)`
///
/// An oversized element fails the whole call with E2BIG. A bad descriptor
/// reports the bytes already written alongside EBADF.
pub(super) fn writev(ctx: &KernelContext, user: &UserAccess, args: SyscallArgs) -> CompatResult {
    let [fd, iov, iovcnt, ..] = args.0;
    let fd = fd_arg(fd);
    let iov = UserPtr::<Iovec>::new(iov);
    let max = ctx.config().max_write_len;

    let mut written = 0i64;
    for i in 0..(iovcnt as i32).max(0) as u64 {
        let vec = match iov.offset(i).and_then(|p| user.read(p)) {
            Ok(vec) => vec,
            Err(errno) => return CompatResult::err(errno),
        };
        if vec.len > max {
            return CompatResult::err(Errno::E2BIG);
        }
        let file = match lookup_fd(ctx, fd) {
            Ok(file) => file,
            Err(errno) => return CompatResult::new(written, errno.code()),
        };
        let res = user.read_bytes(vec.base, vec.len).and_then(|data| file.write(&data));
        match res {
            Ok(n) => written += n as i64,
            Err(errno) => return CompatResult::err(errno),
        }
    }
    CompatResult::ok(written)
}

pub(super) fn uname(ctx: &KernelContext, user: &UserAccess, args: SyscallArgs) -> CompatResult {
    let [buf, ..] = args.0;
    let uts = Utsname::new(&ctx.config().uname);
    user.write(UserPtr::new(buf), &uts).map(|()| 0i64).into()
}

/// `fcntl(fd, cmd, arg)`
///
/// `F_DUPFD` duplicates into the lowest free descriptor at or above `arg`.
/// `F_GETFL` always reports O_RDWR; the other commands succeed as no-ops.
pub(super) fn fcntl(ctx: &KernelContext, args: SyscallArgs) -> CompatResult {
    let [fd, cmd, arg, ..] = args.0;
    let res = match cmd as i32 {
        F_DUPFD => dup_fd(ctx, fd_arg(fd), arg),
        F_GETFL => Ok(OpenFlags::RDWR.bits() as i64),
        _ => Ok(0),
    };
    res.into()
}

fn dup_fd(ctx: &KernelContext, fd: i64, min: u64) -> Result<i64, Errno> {
    if min >= ctx.config().fd_limit {
        return Err(Errno::EINVAL);
    }
    ctx.with_current_task(|task| {
        let file = task.files().get(fd)?;
        let files = task.files_mut();
        let new_fd = files.allocate_ge(min as usize);
        files.install(new_fd, file);
        Ok(new_fd as i64)
    })
}

/// `readlink(path, buf, size)`
///
/// Writes "/" for every path and reports one byte alongside EACCES; libc
/// only probes this for `/proc/self/exe`.
pub(super) fn readlink(user: &UserAccess, args: SyscallArgs) -> CompatResult {
    let [_path, buf, ..] = args.0;
    match user.write_bytes(buf, b"/\0") {
        Ok(()) => CompatResult::new(1, Errno::EACCES.code()),
        Err(errno) => CompatResult::err(errno),
    }
}

/// `exit_group(code)`, identical to the native `Exit`.
pub(super) fn exit_group(ctx: &KernelContext, args: SyscallArgs) -> CompatResult {
    let [code, ..] = args.0;
    let rsp = ctx.with_current_task(|task| task.os_stack_pointer());
    CompatResult::new(rsp as i64, code as i32)
}

/*
 * File System Calls
 *
 * Descriptor-based I/O shared by both ABIs: the open path (native
 * `OpenFile`, compat `open`/`openat`), reads and writes, and the native
 * `MapFile`, `DemandPages` and `IsTerminal` calls.
 *
 * Descriptors are looked up (and the file's `Arc` cloned) inside a critical
 * section; the actual transfer runs with interrupts enabled because terminal
 * reads may block.
 */

use alloc::vec;

use super::abi::{OpenFlags, SyscallArgs};
use super::user_ptr::{UserAccess, UserPtr};
use crate::context::KernelContext;
use crate::io::{Errno, FileRef};
use crate::scheduler::FileMapping;

/// Bounce-buffer size for reads into user memory
const READ_CHUNK: usize = 4096;

/// Interpret a descriptor argument. libc sign-extends `int` descriptors.
pub(super) fn fd_arg(raw: u64) -> i64 {
    raw as i64
}

pub(super) fn lookup_fd(ctx: &KernelContext, fd: i64) -> Result<FileRef, Errno> {
    ctx.with_current_task(|task| task.files().get(fd))
}

/// Write `len` bytes at `buf` to descriptor `fd`.
///
/// Checks run in a fixed order: length cap, then descriptor, then pointer.
pub(super) fn write_fd(
    ctx: &KernelContext,
    user: &UserAccess,
    fd: i64,
    buf: u64,
    len: u64,
) -> Result<usize, Errno> {
    if len > ctx.config().max_write_len {
        return Err(Errno::E2BIG);
    }
    let file = lookup_fd(ctx, fd)?;
    let data = user.read_bytes(buf, len)?;
    file.write(&data)
}

/// Read up to `count` bytes from descriptor `fd` into `buf`.
///
/// Large requests are served in chunks; a short chunk ends the call so a
/// terminal read still returns after one line.
pub(super) fn read_fd(
    ctx: &KernelContext,
    user: &UserAccess,
    fd: i64,
    buf: u64,
    count: u64,
) -> Result<usize, Errno> {
    let file = lookup_fd(ctx, fd)?;
    user.check(buf, count)?;

    let mut chunk = vec![0u8; (count as usize).min(READ_CHUNK)];
    let mut total = 0usize;
    while (total as u64) < count {
        let want = ((count - total as u64) as usize).min(chunk.len());
        let got = file.read(&mut chunk[..want])?;
        user.write_bytes(buf + total as u64, &chunk[..got])?;
        total += got;
        if got < want {
            break;
        }
    }
    Ok(total)
}

/// Resolve `path` and install the opened file in the lowest free slot.
///
/// `stdin_alias` names the pseudo-path that maps to descriptor 0 without
/// touching the file system.
pub(super) fn open_path(
    ctx: &KernelContext,
    path: &[u8],
    flags: OpenFlags,
    stdin_alias: &[u8],
) -> Result<usize, Errno> {
    if path == stdin_alias {
        return Ok(0);
    }
    let path = core::str::from_utf8(path).map_err(|_| Errno::ENOENT)?;

    let fs = ctx.fs();
    let lookup = fs.find_file(path);
    let entry = match lookup.entry {
        None if flags.contains(OpenFlags::CREAT) => fs.create_file(path)?,
        None => return Err(Errno::ENOENT),
        Some(entry) if !entry.is_directory() && lookup.post_slash => {
            return Err(Errno::ENOENT);
        }
        Some(entry) => entry,
    };

    let file = fs.open(&entry);
    Ok(ctx.with_current_task(|task| task.files_mut().open(file)))
}

/// Native `OpenFile(path, flags)`
pub(super) fn open_file(
    ctx: &KernelContext,
    user: &UserAccess,
    args: SyscallArgs,
) -> Result<u64, Errno> {
    let [path, flags, ..] = args.0;
    let path = user.read_cstr(path, ctx.config().max_path_len).map_err(too_long)?;
    let flags = OpenFlags::from_bits_retain(flags as u32);
    open_path(ctx, &path, flags, b"@stdin").map(|fd| fd as u64)
}

/// Paths over the limit are reported like Linux does.
pub(super) fn too_long(err: Errno) -> Errno {
    match err {
        Errno::E2BIG => Errno::ENAMETOOLONG,
        other => other,
    }
}

/// Native `ReadFile(fd, buf, count)`
pub(super) fn read_file(
    ctx: &KernelContext,
    user: &UserAccess,
    args: SyscallArgs,
) -> Result<u64, Errno> {
    let [fd, buf, count, ..] = args.0;
    read_fd(ctx, user, fd_arg(fd), buf, count).map(|n| n as u64)
}

/// Native `DemandPages(num_pages, flags)`
///
/// Reserves pages at the end of the demand-paged region and returns the old
/// end. Physical frames are attached lazily on first touch.
pub(super) fn demand_pages(ctx: &KernelContext, args: SyscallArgs) -> Result<u64, Errno> {
    let [num_pages, ..] = args.0;
    let bytes = num_pages
        .checked_mul(ctx.config().page_size)
        .ok_or(Errno::ENOMEM)?;
    ctx.with_current_task(|task| {
        let begin = task.dpaging_end();
        let end = begin.checked_add(bytes).ok_or(Errno::ENOMEM)?;
        task.set_dpaging_end(end);
        Ok(begin)
    })
}

/// Native `MapFile(fd, file_size_out, flags)`
///
/// Carves a page-aligned window below the current mapping floor, records it
/// and reports the exact file size through `file_size_out`.
pub(super) fn map_file(
    ctx: &KernelContext,
    user: &UserAccess,
    args: SyscallArgs,
) -> Result<u64, Errno> {
    let [fd, size_out, ..] = args.0;
    let fd = fd_arg(fd);
    let file = lookup_fd(ctx, fd)?;
    let size = file.size();
    user.write(UserPtr::<u64>::new(size_out), &size)?;

    let page_mask = !(ctx.config().page_size - 1);
    ctx.with_current_task(|task| {
        let vaddr_end = task.filemap_end();
        let vaddr_begin = vaddr_end.checked_sub(size).ok_or(Errno::ENOMEM)? & page_mask;
        task.set_filemap_end(vaddr_begin);
        task.add_file_mapping(FileMapping { fd: fd as i32, vaddr_begin, vaddr_end });
        Ok(vaddr_begin)
    })
}

/// Native `IsTerminal(fd)`
pub(super) fn is_terminal(ctx: &KernelContext, args: SyscallArgs) -> Result<u64, Errno> {
    let [fd, ..] = args.0;
    let file = lookup_fd(ctx, fd_arg(fd))?;
    Ok(file.is_terminal() as u64)
}

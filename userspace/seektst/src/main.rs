#![no_std]
#![no_main]

// Linux-compatible system calls, issued directly
mod syscalls {
    use core::arch::asm;

    pub const STDOUT: i64 = 1;

    pub const O_RDWR: i64 = 0x0002;

    pub const SEEK_SET: i64 = 0;
    pub const SEEK_END: i64 = 2;

    const SYS_READ: i64 = 0;
    const SYS_WRITE: i64 = 1;
    const SYS_OPEN: i64 = 2;
    const SYS_CLOSE: i64 = 3;
    const SYS_LSEEK: i64 = 8;
    const SYS_EXIT_GROUP: i64 = 231;

    /// Returns (value, errno); value is -1 on failure.
    unsafe fn syscall3(nr: i64, a1: i64, a2: i64, a3: i64) -> (i64, i64) {
        let value: i64;
        let error: i64;
        unsafe {
            asm!(
                "syscall",
                inlateout("rax") nr => value,
                in("rdi") a1,
                in("rsi") a2,
                inlateout("rdx") a3 => error,
                out("rcx") _,
                out("r11") _,
                options(nostack),
            );
        }
        (value, error)
    }

    pub fn read(fd: i64, buf: &mut [u8]) -> (i64, i64) {
        unsafe { syscall3(SYS_READ, fd, buf.as_mut_ptr() as i64, buf.len() as i64) }
    }

    pub fn write(fd: i64, buf: &[u8]) -> (i64, i64) {
        unsafe { syscall3(SYS_WRITE, fd, buf.as_ptr() as i64, buf.len() as i64) }
    }

    /// `path` must be NUL terminated.
    pub fn open(path: &[u8], flags: i64) -> (i64, i64) {
        unsafe { syscall3(SYS_OPEN, path.as_ptr() as i64, flags, 0) }
    }

    pub fn close(fd: i64) -> (i64, i64) {
        unsafe { syscall3(SYS_CLOSE, fd, 0, 0) }
    }

    pub fn lseek(fd: i64, offset: i64, whence: i64) -> (i64, i64) {
        unsafe { syscall3(SYS_LSEEK, fd, offset, whence) }
    }

    pub fn exit(code: i64) -> ! {
        unsafe {
            syscall3(SYS_EXIT_GROUP, code, 0, 0);
        }
        loop {}
    }
}

fn print(s: &[u8]) {
    syscalls::write(syscalls::STDOUT, s);
}

fn print_dec(mut n: i64) {
    let mut buf = [0u8; 20];
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    print(&buf[i..]);
}

// Report the failed step and its errno, then exit with status 1
fn fail(what: &str, errno: i64) -> ! {
    print(what.as_bytes());
    print(b": error ");
    print_dec(errno);
    print(b"\n");
    syscalls::exit(1);
}

fn write_all(fd: i64, data: &[u8]) {
    let (n, errno) = syscalls::write(fd, data);
    if n != data.len() as i64 {
        fail("write", errno);
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn main() -> i32 {
    let (fd, errno) = syscalls::open(b"byte.txt\0", syscalls::O_RDWR);
    if fd == -1 {
        fail("open", errno);
    }

    write_all(fd, b"See you");
    syscalls::lseek(fd, 5, syscalls::SEEK_END);
    write_all(fd, b" later!");
    write_all(fd, b"\nBye!\n");

    syscalls::lseek(fd, 7, syscalls::SEEK_SET);
    let mut buf = [0u8; 7];
    let (n, errno) = syscalls::read(fd, &mut buf);
    if n != 7 {
        fail("read", errno);
    }
    print(b"readed: '");
    print(&buf);
    print(b"'");

    write_all(fd, b"\nhoge\n");
    let (res, errno) = syscalls::close(fd);
    if res == -1 {
        fail("close", errno);
    }
    0
}

// Entry point - calls main and exits with its return value
#[unsafe(naked)]
#[unsafe(no_mangle)]
#[unsafe(link_section = ".text.entry")]
pub unsafe extern "C" fn _start() -> ! {
    core::arch::naked_asm!(
        "call main",
        "mov rdi, rax",
        "mov rax, 231",          // exit_group
        "syscall",
        "ud2",
    );
}

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    print(b"\nPANIC in seektst!\n");
    syscalls::exit(1);
}

/*
 * System Call ABI Types
 *
 * Register-level results, argument packs and the C-layout records that cross
 * the user/kernel boundary. Layouts here are shared with the application
 * runtime and must not change.
 */

use bitflags::bitflags;

use crate::config::UnameInfo;
use crate::io::Errno;

/// Result of a native call, returned in RAX (value) and RDX (error)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeResult {
    pub value: u64,
    pub error: i32,
}

impl NativeResult {
    pub const fn new(value: u64, error: i32) -> Self {
        Self { value, error }
    }

    pub const fn ok(value: u64) -> Self {
        Self::new(value, 0)
    }

    pub const fn err(errno: Errno) -> Self {
        Self::new(0, errno.code())
    }
}

impl From<Result<u64, Errno>> for NativeResult {
    fn from(res: Result<u64, Errno>) -> Self {
        match res {
            Ok(value) => Self::ok(value),
            Err(errno) => Self::err(errno),
        }
    }
}

/// Result of a compatibility call. Failures carry -1 in `value`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompatResult {
    pub value: i64,
    pub error: i32,
}

impl CompatResult {
    pub const fn new(value: i64, error: i32) -> Self {
        Self { value, error }
    }

    pub const fn ok(value: i64) -> Self {
        Self::new(value, 0)
    }

    pub const fn err(errno: Errno) -> Self {
        Self::new(-1, errno.code())
    }
}

impl From<Result<i64, Errno>> for CompatResult {
    fn from(res: Result<i64, Errno>) -> Self {
        match res {
            Ok(value) => Self::ok(value),
            Err(errno) => Self::err(errno),
        }
    }
}

/// The six argument registers in call order (RDI, RSI, RDX, R10, R8, R9)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyscallArgs(pub [u64; 6]);

impl SyscallArgs {
    pub const fn new(a1: u64, a2: u64, a3: u64, a4: u64, a5: u64, a6: u64) -> Self {
        Self([a1, a2, a3, a4, a5, a6])
    }
}

/// Application-visible input event, laid out as a tagged C union
#[repr(C, u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Quit,
    MouseMove { x: i32, y: i32, dx: i32, dy: i32, buttons: u8 },
    MouseButton { x: i32, y: i32, press: i32, button: i32 },
    TimerTimeout { timeout: u64, value: i32 },
    KeyPush { modifier: u8, keycode: u8, ascii: u8, press: bool },
}

/// One element of a `writev` vector
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iovec {
    pub base: u64,
    pub len: u64,
}

const UTS_LEN: usize = 65;

/// Linux `struct utsname`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utsname {
    pub sysname: [u8; UTS_LEN],
    pub nodename: [u8; UTS_LEN],
    pub release: [u8; UTS_LEN],
    pub version: [u8; UTS_LEN],
    pub machine: [u8; UTS_LEN],
    pub domainname: [u8; UTS_LEN],
}

impl Utsname {
    pub fn new(info: &UnameInfo) -> Self {
        Self {
            sysname: uts_field(info.sysname),
            nodename: uts_field(info.nodename),
            release: uts_field(info.release),
            version: uts_field(info.version),
            machine: uts_field(info.machine),
            domainname: uts_field("unknown"),
        }
    }
}

/// Copy `s` into a NUL-padded field, truncating so a terminator always fits.
fn uts_field(s: &str) -> [u8; UTS_LEN] {
    let mut field = [0u8; UTS_LEN];
    let len = s.len().min(UTS_LEN - 1);
    field[..len].copy_from_slice(&s.as_bytes()[..len]);
    field
}

bitflags! {
    /// Linux `open(2)` flags honoured by the open family
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const WRONLY = 0o1;
        const RDWR = 0o2;
        const CREAT = 0o100;
        const EXCL = 0o200;
        const TRUNC = 0o1000;
        const APPEND = 0o2000;
    }
}

bitflags! {
    /// High half of the window-handle argument
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WinFlags: u32 {
        /// Skip the redraw after drawing; batch updates end with `WinRedraw`.
        const NO_REDRAW = 1;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TimerMode: u64 {
        /// Timeout is relative to the current tick instead of absolute.
        const RELATIVE = 1;
    }
}

// fcntl commands
pub const F_DUPFD: i32 = 0;
pub const F_GETFD: i32 = 1;
pub const F_SETFD: i32 = 2;
pub const F_GETFL: i32 = 3;
pub const F_SETFL: i32 = 4;

/// Severity accepted by `LogString`, numbered like syslog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum LogLevel {
    Error = 3,
    Warn = 4,
    Info = 6,
    Debug = 7,
}

impl LogLevel {
    pub fn from_raw(level: u64) -> Option<Self> {
        match level {
            3 => Some(LogLevel::Error),
            4 => Some(LogLevel::Warn),
            6 => Some(LogLevel::Info),
            7 => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        }
    }
}

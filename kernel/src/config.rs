/*
 * Kernel Configuration
 *
 * Tunables read by the system-call handlers. A single `Config` value lives in
 * the `KernelContext`; the defaults match the shipped kernel, tests override
 * individual fields (most notably `user_base`, so host pointers count as user
 * memory).
 */

/// Identification strings reported by the compatibility `uname` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnameInfo {
    pub sysname: &'static str,
    pub nodename: &'static str,
    pub release: &'static str,
    pub version: &'static str,
    pub machine: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Timer interrupts per second.
    pub timer_freq: u64,
    /// Lowest address that belongs to user space.
    pub user_base: u64,
    /// Largest single buffer accepted by write-style calls.
    pub max_write_len: u64,
    /// Longest string accepted by `LogString` (terminator excluded).
    pub max_log_len: usize,
    /// Longest window title or window text.
    pub max_text_len: usize,
    /// Longest path accepted by the open family.
    pub max_path_len: usize,
    /// Granularity of demand paging and file mappings.
    pub page_size: u64,
    /// Upper bound for the floor argument of `fcntl(F_DUPFD)`.
    pub fd_limit: u64,
    /// Log every system-call number and its primary return value.
    pub trace_syscalls: bool,
    pub uname: UnameInfo,
}

impl Config {
    pub const DEFAULT: Config = Config {
        timer_freq: 100,
        user_base: 0x8000_0000_0000_0000,
        max_write_len: 1024,
        max_log_len: 1024,
        max_text_len: 1024,
        max_path_len: 4096,
        page_size: 4096,
        fd_limit: 1024,
        trace_syscalls: false,
        uname: UnameInfo {
            sysname: "Kestrel",
            nodename: "unknown",
            release: "5.13.0",
            version: "unknown",
            machine: "unknown",
        },
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

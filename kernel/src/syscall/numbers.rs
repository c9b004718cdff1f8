/*
 * System Call Numbers
 *
 * Two numbering spaces share the `syscall` instruction:
 *
 * - Native calls set bit 31 of RAX; the low 31 bits index the native table
 *   (0x00..=0x10). These are the window, event and file services written
 *   for applications targeting this kernel.
 * - Everything else is a Linux x86_64 system-call number. The compatibility
 *   table has one slot per Linux number up to `rseq` (0x14e); only the calls
 *   a statically linked libc needs during startup and basic I/O have real
 *   handlers.
 *
 * Arguments arrive in RDI, RSI, RDX, R10, R8, R9 in both spaces.
 */

/// Marks a native call in RAX
pub const NATIVE_BIT: u64 = 0x8000_0000;

/// Native system calls, numbered by their index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum NativeCall {
    LogString = 0x00,
    PutString = 0x01,
    Exit = 0x02,
    OpenWindow = 0x03,
    WinWriteString = 0x04,
    WinFillRectangle = 0x05,
    GetCurrentTick = 0x06,
    WinRedraw = 0x07,
    WinDrawLine = 0x08,
    CloseWindow = 0x09,
    ReadEvent = 0x0a,
    CreateTimer = 0x0b,
    OpenFile = 0x0c,
    ReadFile = 0x0d,
    DemandPages = 0x0e,
    MapFile = 0x0f,
    IsTerminal = 0x10,
}

impl NativeCall {
    pub const COUNT: u64 = 0x11;

    pub fn from_index(index: u64) -> Option<Self> {
        use NativeCall::*;
        let call = match index {
            0x00 => LogString,
            0x01 => PutString,
            0x02 => Exit,
            0x03 => OpenWindow,
            0x04 => WinWriteString,
            0x05 => WinFillRectangle,
            0x06 => GetCurrentTick,
            0x07 => WinRedraw,
            0x08 => WinDrawLine,
            0x09 => CloseWindow,
            0x0a => ReadEvent,
            0x0b => CreateTimer,
            0x0c => OpenFile,
            0x0d => ReadFile,
            0x0e => DemandPages,
            0x0f => MapFile,
            0x10 => IsTerminal,
            _ => return None,
        };
        Some(call)
    }

    /// The full RAX value an application loads for this call.
    pub const fn number(self) -> u64 {
        NATIVE_BIT | self as u64
    }
}

// Linux numbers with real handlers
pub const SYS_READ: u64 = 0x000;
pub const SYS_WRITE: u64 = 0x001;
pub const SYS_OPEN: u64 = 0x002;
pub const SYS_CLOSE: u64 = 0x003;
pub const SYS_FSTAT: u64 = 0x005;
pub const SYS_LSEEK: u64 = 0x008;
pub const SYS_BRK: u64 = 0x00c;
pub const SYS_RT_SIGACTION: u64 = 0x00d;
pub const SYS_IOCTL: u64 = 0x010;
pub const SYS_WRITEV: u64 = 0x014;
pub const SYS_UNAME: u64 = 0x03f;
pub const SYS_FCNTL: u64 = 0x048;
pub const SYS_READLINK: u64 = 0x059;
pub const SYS_GETUID: u64 = 0x066;
pub const SYS_GETGID: u64 = 0x068;
pub const SYS_GETEUID: u64 = 0x06b;
pub const SYS_GETEGID: u64 = 0x06c;
pub const SYS_ARCH_PRCTL: u64 = 0x09e;
pub const SYS_EXIT_GROUP: u64 = 0x0e7;
pub const SYS_OPENAT: u64 = 0x101;

/// Number of compatibility slots (Linux numbers 0..=0x14e)
pub const COMPAT_SLOTS: u64 = 0x14f;

/// Linux names for every compatibility slot, used in diagnostics
pub static COMPAT_NAMES: [&str; COMPAT_SLOTS as usize] = [
    "read", "write", "open", "close",
    "stat", "fstat", "lstat", "poll",
    "lseek", "mmap", "mprotect", "munmap",
    "brk", "rt_sigaction", "rt_sigprocmask", "rt_sigreturn",
    "ioctl", "pread", "pwrite", "readv",
    "writev", "access", "pipe", "select",
    "sched_yield", "mremap", "msync", "mincore",
    "madvise", "shmget", "shmat", "shmctl",
    "dup", "dup2", "pause", "nanosleep",
    "getitimer", "alarm", "setitimer", "getpid",
    "sendfile", "socket", "connect", "accept",
    "sendto", "recvfrom", "sendmsg", "recvmsg",
    "shutdown", "bind", "listen", "getsockname",
    "getpeername", "socketpair", "setsockopt", "getsockopt",
    "clone", "fork", "vfork", "execve",
    "exit", "wait4", "kill", "uname",
    "semget", "semop", "semctl", "shmdt",
    "msgget", "msgsnd", "msgrcv", "msgctl",
    "fcntl", "flock", "fsync", "fdatasync",
    "truncate", "ftruncate", "getdents", "getcwd",
    "chdir", "fchdir", "rename", "mkdir",
    "rmdir", "creat", "link", "unlink",
    "symlink", "readlink", "chmod", "fchmod",
    "chown", "fchown", "lchown", "umask",
    "gettimeofday", "getrlimit", "getrusage", "sysinfo",
    "times", "ptrace", "getuid", "syslog",
    "getgid", "setuid", "setgid", "geteuid",
    "getegid", "setpgid", "getppid", "getpgrp",
    "setsid", "setreuid", "setregid", "getgroups",
    "setgroups", "setresuid", "getresuid", "setresgid",
    "getresgid", "getpgid", "setfsuid", "setfsgid",
    "getsid", "capget", "capset", "rt_sigpending",
    "rt_sigtimedwait", "rt_sigqueueinfo", "rt_sigsuspend", "sigaltstack",
    "utime", "mknod", "uselib", "personality",
    "ustat", "statfs", "fstatfs", "sysfs",
    "getpriority", "setpriority", "sched_setparam", "sched_getparam",
    "sched_setscheduler", "sched_getscheduler", "sched_get_priority_max", "sched_get_priority_min",
    "sched_rr_get_interval", "mlock", "munlock", "mlockall",
    "munlockall", "vhangup", "modify_ldt", "pivot_root",
    "_sysctl", "prctl", "arch_prctl", "adjtimex",
    "setrlimit", "chroot", "sync", "acct",
    "settimeofday", "mount", "umount2", "swapon",
    "swapoff", "reboot", "sethostname", "setdomainname",
    "iopl", "ioperm", "create_module", "init_module",
    "delete_module", "get_kernel_syms", "query_module", "quotactl",
    "nfsservctl", "getpmsg", "putpmsg", "afs_syscall",
    "tuxcall", "security", "gettid", "readahead",
    "setxattr", "lsetxattr", "fsetxattr", "getxattr",
    "lgetxattr", "fgetxattr", "listxattr", "llistxattr",
    "flistxattr", "removexattr", "lremovexattr", "fremovexattr",
    "tkill", "time", "futex", "sched_setaffinity",
    "sched_getaffinity", "set_thread_area", "io_setup", "io_destroy",
    "io_getevents", "io_submit", "io_cancel", "get_thread_area",
    "lookup_dcookie", "epoll_create", "epoll_ctl_old", "epoll_wait_old",
    "remap_file_pages", "getdents64", "set_tid_address", "restart_syscall",
    "semtimedop", "fadvise64", "timer_create", "timer_settime",
    "timer_gettime", "timer_getoverrun", "timer_delete", "clock_settime",
    "clock_gettime", "clock_getres", "clock_nanosleep", "exit_group",
    "epoll_wait", "epoll_ctl", "tgkill", "utimes",
    "vserver", "mbind", "set_mempolicy", "get_mempolicy",
    "mq_open", "mq_unlink", "mq_timedsend", "mq_timedreceive",
    "mq_notify", "mq_getsetattr", "kexec_load", "waitid",
    "add_key", "request_key", "keyctl", "ioprio_set",
    "ioprio_get", "inotify_init", "inotify_add_watch", "inotify_rm_watch",
    "migrate_pages", "openat", "mkdirat", "mknodat",
    "fchownat", "futimesat", "newfstatat", "unlinkat",
    "renameat", "linkat", "symlinkat", "readlinkat",
    "fchmodat", "faccessat", "pselect6", "ppoll",
    "unshare", "set_robust_list", "get_robust_list", "splice",
    "tee", "sync_file_range", "vmsplice", "move_pages",
    "utimensat", "epoll_pwait", "signalfd", "timerfd",
    "eventfd", "fallocate", "timerfd_settime", "timerfd_gettime",
    "accept4", "signalfd4", "eventfd2", "epoll_create1",
    "dup3", "pipe2", "inotify_init1", "preadv",
    "pwritev", "rt_tgsigqueueinfo", "perf_event_open", "recvmmsg",
    "fanotify_init", "fanotify_mark", "prlimit64", "name_to_handle_at",
    "open_by_handle_at", "clock_adjtime", "syncfs", "sendmmsg",
    "setns", "getcpu", "process_vm_readv", "process_vm_writev",
    "kcmp", "finit_module", "sched_setattr", "sched_getattr",
    "renameat2", "seccomp", "getrandom", "memfd_create",
    "kexec_file_load", "bpf", "execveat", "userfaultfd",
    "membarrier", "mlock2", "copy_file_range", "preadv2",
    "pwritev2", "pkey_mprotect", "pkey_alloc", "pkey_free",
    "statx", "io_pgetevents", "rseq",
];

/// Linux-compatible system calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatCall {
    Read,
    Write,
    Open,
    Close,
    Fstat,
    Lseek,
    Brk,
    RtSigaction,
    Ioctl,
    Writev,
    Uname,
    Fcntl,
    Readlink,
    Getuid,
    Getgid,
    Geteuid,
    Getegid,
    ArchPrctl,
    ExitGroup,
    Openat,
    /// A slot that exists in the table but has no handler.
    Unimplemented(u64),
}

impl CompatCall {
    pub fn from_number(number: u64) -> Option<Self> {
        use CompatCall::*;
        let call = match number {
            SYS_READ => Read,
            SYS_WRITE => Write,
            SYS_OPEN => Open,
            SYS_CLOSE => Close,
            SYS_FSTAT => Fstat,
            SYS_LSEEK => Lseek,
            SYS_BRK => Brk,
            SYS_RT_SIGACTION => RtSigaction,
            SYS_IOCTL => Ioctl,
            SYS_WRITEV => Writev,
            SYS_UNAME => Uname,
            SYS_FCNTL => Fcntl,
            SYS_READLINK => Readlink,
            SYS_GETUID => Getuid,
            SYS_GETGID => Getgid,
            SYS_GETEUID => Geteuid,
            SYS_GETEGID => Getegid,
            SYS_ARCH_PRCTL => ArchPrctl,
            SYS_EXIT_GROUP => ExitGroup,
            SYS_OPENAT => Openat,
            n if n < COMPAT_SLOTS => Unimplemented(n),
            _ => return None,
        };
        Some(call)
    }
}

/// Linux name of a compatibility slot.
pub fn compat_name(number: u64) -> &'static str {
    usize::try_from(number)
        .ok()
        .and_then(|n| COMPAT_NAMES.get(n))
        .copied()
        .unwrap_or("unknown")
}

/// A decoded RAX value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    Native(NativeCall),
    Compat(CompatCall),
    /// Out of range in its numbering space. Carries the raw RAX value.
    Invalid(u64),
}

impl Syscall {
    pub fn decode(rax: u64) -> Self {
        let decoded = if rax & NATIVE_BIT != 0 {
            NativeCall::from_index(rax & !NATIVE_BIT).map(Syscall::Native)
        } else {
            CompatCall::from_number(rax).map(Syscall::Compat)
        };
        decoded.unwrap_or(Syscall::Invalid(rax))
    }
}

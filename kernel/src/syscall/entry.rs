/*
 * System Call Entry Glue
 *
 * Programs the SYSCALL/SYSRET MSRs and provides the naked entry stub that
 * moves onto the kernel stack, calls the dispatcher and returns with
 * `sysretq`.
 *
 * MSR configuration:
 * - IA32_EFER: SCE, LME and LMA set (0x0501); other bits are preserved
 * - IA32_STAR[47:32]: kernel CS (0x08), SS is CS + 8
 * - IA32_STAR[63:48]: 0x13; SYSRET loads SS = 0x1b and CS = 0x23
 * - IA32_LSTAR: `syscall_entry`
 * - IA32_FMASK: 0, interrupts stay enabled inside system calls
 *
 * On return RAX holds the value and RDX the error code. RCX and R11 carry
 * the user RIP and RFLAGS as SYSCALL left them; the argument registers are
 * restored, the callee-saved ones are preserved by the Rust handler.
 */

#[cfg(target_os = "none")]
use super::Disposition;
#[cfg(target_os = "none")]
use super::abi::SyscallArgs;
#[cfg(target_os = "none")]
use crate::arch::x86_64::interrupts;

/// Kernel code selector; kernel data follows at +8.
pub const KERNEL_CS: u16 = 0x08;
/// SYSRET base selector with RPL 3: user data at +8, user code at +16.
pub const SYSRET_BASE: u16 = 16 | 3;

const EFER_SCE: u64 = 1 << 0;
const EFER_LME: u64 = 1 << 8;
const EFER_LMA: u64 = 1 << 10;

/// Values the entry setup writes into the system-call MSRs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsrImage {
    /// Bits OR-ed into IA32_EFER.
    pub efer: u64,
    pub star: u64,
    pub lstar: u64,
    pub fmask: u64,
}

impl MsrImage {
    pub const fn new(entry: u64) -> Self {
        Self {
            efer: EFER_SCE | EFER_LME | EFER_LMA,
            star: ((KERNEL_CS as u64) << 32) | ((SYSRET_BASE as u64) << 48),
            lstar: entry,
            fmask: 0,
        }
    }
}

/// Per-CPU scratch area used by the entry stub
///
/// Layout (offsets for assembly):
/// - [0]: user_rsp (saved user stack pointer)
/// - [8]: kernel_rsp (current task's kernel stack)
#[cfg(target_os = "none")]
#[repr(C)]
struct SyscallScratch {
    user_rsp: u64,
    kernel_rsp: u64,
}

#[cfg(target_os = "none")]
#[unsafe(no_mangle)]
static mut SYSCALL_SCRATCH: SyscallScratch = SyscallScratch {
    user_rsp: 0,
    kernel_rsp: 0,
};

#[cfg(target_os = "none")]
static INIT: spin::Once<()> = spin::Once::new();

/// Point the entry stub at the kernel stack of the task about to run.
///
/// # Safety
/// Interrupts must be disabled and `kernel_rsp` must be the 16-byte aligned
/// top of a mapped kernel stack.
#[cfg(target_os = "none")]
pub unsafe fn set_kernel_stack(kernel_rsp: u64) {
    // SAFETY: single CPU, interrupts masked by the caller.
    unsafe {
        (*(&raw mut SYSCALL_SCRATCH)).kernel_rsp = kernel_rsp;
    }
}

/// Enable SYSCALL/SYSRET. Later calls do nothing.
#[cfg(target_os = "none")]
pub fn init() {
    INIT.call_once(|| {
        use x86::msr::{IA32_EFER, IA32_FMASK, IA32_LSTAR, IA32_STAR, rdmsr, wrmsr};

        let image = MsrImage::new(syscall_entry as usize as u64);
        // SAFETY: architectural MSRs, written once during boot after the GDT
        // with the selectors above is loaded.
        unsafe {
            wrmsr(IA32_EFER, rdmsr(IA32_EFER) | image.efer);
            wrmsr(IA32_LSTAR, image.lstar);
            wrmsr(IA32_STAR, image.star);
            wrmsr(IA32_FMASK, image.fmask);
        }
        log::info!("syscall entry installed at {:#x}", image.lstar);
    });
}

#[cfg(target_os = "none")]
unsafe extern "C" {
    /// Unwind to the kernel stack saved when the task entered user mode and
    /// finish the task with `code`. Provided by the task-switching code.
    fn exit_app(os_stack_pointer: u64, code: i32) -> !;
}

/// RAX:RDX pair as returned by a SysV `extern "C"` function
#[cfg(target_os = "none")]
#[repr(C)]
struct SyscallReturn {
    rax: u64,
    rdx: u64,
}

#[cfg(target_os = "none")]
#[unsafe(no_mangle)]
extern "C" fn syscall_handler_rust(
    number: u64,
    a1: u64,
    a2: u64,
    a3: u64,
    a4: u64,
    a5: u64,
    a6: u64,
) -> SyscallReturn {
    let Some(ctx) = super::kernel() else {
        log::error!("syscall {:#x} before the kernel context was registered", number);
        interrupts::halt_forever();
    };

    let args = SyscallArgs::new(a1, a2, a3, a4, a5, a6);
    // SAFETY: running on the calling task's kernel stack with its page
    // table loaded.
    match unsafe { super::dispatch(ctx, number, args) } {
        Disposition::Return { value, error } => SyscallReturn {
            rax: value,
            rdx: error as i64 as u64,
        },
        Disposition::Exit { os_stack_pointer, code } => unsafe { exit_app(os_stack_pointer, code) },
        Disposition::Halt => interrupts::halt_forever(),
    }
}

/// Syscall entry point (naked function)
///
/// Register state on entry (set by SYSCALL):
/// - RCX = user RIP, R11 = user RFLAGS
/// - RSP = still the user stack
///
/// Kernel stack frame while the handler runs (top first):
/// - R10, R9, R8, RSI, RDI, R11 (user RFLAGS), RCX (user RIP), user RSP
#[cfg(target_os = "none")]
#[unsafe(naked)]
pub unsafe extern "C" fn syscall_entry() -> ! {
    core::arch::naked_asm!(
        "mov [rip + {scratch}], rsp",
        "mov rsp, [rip + {scratch} + 8]",

        "push qword ptr [rip + {scratch}]",
        "push rcx",
        "push r11",
        "push rdi",
        "push rsi",
        "push r8",
        "push r9",
        "push r10",

        // seventh argument goes on the stack, keep RSP 16-byte aligned at the call
        "sub rsp, 8",
        "push r9",
        "mov r9, r8",
        "mov r8, r10",
        "mov rcx, rdx",
        "mov rdx, rsi",
        "mov rsi, rdi",
        "mov rdi, rax",
        "call {handler}",
        "add rsp, 16",

        "pop r10",
        "pop r9",
        "pop r8",
        "pop rsi",
        "pop rdi",
        "pop r11",
        "pop rcx",
        "pop rsp",
        "sysretq",

        scratch = sym SYSCALL_SCRATCH,
        handler = sym syscall_handler_rust,
    );
}

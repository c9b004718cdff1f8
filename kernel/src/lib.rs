/*
 * Kestrel System-Call Core
 *
 * The boundary between user applications and kernel services. Every request
 * from ring 3 enters through one register-level convention, is decoded into
 * either the native application ABI or the Linux-compatible ABI, validated,
 * and served against the subsystems bundled in a `KernelContext`.
 *
 * Layout:
 * - arch: interrupt masking and the hardware halt path
 * - config: tunables shared by every handler
 * - context: the kernel context and its critical-section guard
 * - io: the open-file abstraction and per-task descriptor tables
 * - fs, graphics, scheduler, utils::timer: collaborator interfaces
 * - syscall: decoding, user-memory access, handlers and the entry glue
 *
 * Hardware-specific pieces (MSR programming, the naked entry stub, `hlt`)
 * only exist on bare-metal targets so the rest can be exercised on the host.
 */

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod arch;
pub mod config;
pub mod context;
pub mod fs;
pub mod graphics;
pub mod io;
pub mod scheduler;
pub mod syscall;
pub mod utils;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use context::{CriticalSection, KernelContext};
pub use syscall::Disposition;

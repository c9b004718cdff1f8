/*
 * Interrupt Management Module
 *
 * Enabling, disabling and querying the interrupt flag, plus the
 * `DisableInterrupts` guard every critical section is built on.
 *
 * On bare metal these map to `sti`/`cli`/`pushf`. Hosted builds have no
 * access to RFLAGS, so the flag is modelled in software: per thread under
 * the unit-test harness (tests run in parallel), process-wide otherwise.
 */

#[cfg(target_os = "none")]
mod flag {
    use x86_64::instructions::interrupts;

    pub fn enable() {
        interrupts::enable();
    }

    pub fn disable() {
        interrupts::disable();
    }

    pub fn are_enabled() -> bool {
        interrupts::are_enabled()
    }
}

#[cfg(all(not(target_os = "none"), test))]
mod flag {
    use std::cell::Cell;

    std::thread_local! {
        static ENABLED: Cell<bool> = const { Cell::new(true) };
    }

    pub fn enable() {
        ENABLED.with(|f| f.set(true));
    }

    pub fn disable() {
        ENABLED.with(|f| f.set(false));
    }

    pub fn are_enabled() -> bool {
        ENABLED.with(|f| f.get())
    }
}

#[cfg(all(not(target_os = "none"), not(test)))]
mod flag {
    use core::sync::atomic::{AtomicBool, Ordering};

    static ENABLED: AtomicBool = AtomicBool::new(true);

    pub fn enable() {
        ENABLED.store(true, Ordering::SeqCst);
    }

    pub fn disable() {
        ENABLED.store(false, Ordering::SeqCst);
    }

    pub fn are_enabled() -> bool {
        ENABLED.load(Ordering::SeqCst)
    }
}

/// Enable interrupts globally
pub fn enable() {
    flag::enable();
}

/// Disable interrupts globally
pub fn disable() {
    flag::disable();
}

/// Returns true if interrupts are currently enabled.
pub fn are_enabled() -> bool {
    flag::are_enabled()
}

/// Execute a closure with interrupts disabled
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = DisableInterrupts::new();
    f()
}

/// Park the CPU for good. Used after an unimplemented compatibility call.
pub fn halt_forever() -> ! {
    loop {
        #[cfg(target_os = "none")]
        x86_64::instructions::hlt();
        #[cfg(not(target_os = "none"))]
        core::hint::spin_loop();
    }
}

/// RAII guard that disables interrupts for its lifetime
///
/// The previous state is restored on drop, so guards nest: only the
/// outermost one turns interrupts back on.
///
/// # Example
/// ```
/// use kestrel_syscall::arch::x86_64::interrupts::DisableInterrupts;
///
/// let _guard = DisableInterrupts::new();
/// // interrupts stay masked until `_guard` goes out of scope
/// ```
pub struct DisableInterrupts {
    were_enabled: bool,
}

impl DisableInterrupts {
    /// Create a new interrupt guard, disabling interrupts
    pub fn new() -> Self {
        let were_enabled = are_enabled();
        if were_enabled {
            disable();
        }
        Self { were_enabled }
    }
}

impl Default for DisableInterrupts {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DisableInterrupts {
    fn drop(&mut self) {
        if self.were_enabled {
            enable();
        }
    }
}

/*
 * Kernel Context
 *
 * Bundles the subsystems a system call may touch (task manager, compositor,
 * timer manager, file system) together with the configuration. One context
 * is built at boot, registered with the entry glue and handed to every
 * handler by reference.
 *
 * Mutable subsystems are reached only through a `CriticalSection`: the
 * section masks interrupts for its lifetime and hands out the locks. Locks
 * are therefore never contended by an interrupt handler on the same CPU.
 * File I/O and window drawing do not need the section; handlers clone the
 * `Arc` they need inside it and do the slow work after it ends.
 */

use alloc::boxed::Box;

use spin::{Mutex, MutexGuard};

use crate::arch::x86_64::interrupts::DisableInterrupts;
use crate::config::Config;
use crate::fs::FileSystem;
use crate::graphics::LayerManager;
use crate::scheduler::{Task, TaskManager};
use crate::utils::timer::TimerManager;

pub struct KernelContext {
    config: Config,
    tasks: Mutex<Box<dyn TaskManager>>,
    layers: Mutex<Box<dyn LayerManager>>,
    timers: Mutex<Box<dyn TimerManager>>,
    fs: Box<dyn FileSystem>,
    yield_now: fn(),
}

impl KernelContext {
    pub fn new(
        config: Config,
        tasks: Box<dyn TaskManager>,
        layers: Box<dyn LayerManager>,
        timers: Box<dyn TimerManager>,
        fs: Box<dyn FileSystem>,
    ) -> Self {
        Self {
            config,
            tasks: Mutex::new(tasks),
            layers: Mutex::new(layers),
            timers: Mutex::new(timers),
            fs,
            yield_now: core::hint::spin_loop,
        }
    }

    /// Install the scheduler's yield routine.
    ///
    /// It is called with interrupts enabled and no context lock held, after
    /// the current task has been marked sleeping.
    pub fn with_yield(mut self, yield_now: fn()) -> Self {
        self.yield_now = yield_now;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Mask interrupts until the returned section is dropped.
    pub fn critical(&self) -> CriticalSection<'_> {
        CriticalSection {
            ctx: self,
            _irq: DisableInterrupts::new(),
        }
    }

    /// Run `f` on the current task inside a critical section.
    pub fn with_current_task<R>(&self, f: impl FnOnce(&mut Task) -> R) -> R {
        let cs = self.critical();
        let mut tasks = cs.tasks();
        f(tasks.current_task())
    }

    /// Give up the CPU while the current task sleeps.
    pub fn yield_now(&self) {
        (self.yield_now)();
    }
}

/// Interrupts-masked access to the context's mutable subsystems
///
/// Guards obtained from a section cannot outlive it.
pub struct CriticalSection<'k> {
    ctx: &'k KernelContext,
    _irq: DisableInterrupts,
}

impl CriticalSection<'_> {
    pub fn tasks(&self) -> MutexGuard<'_, Box<dyn TaskManager>> {
        self.ctx.tasks.lock()
    }

    pub fn layers(&self) -> MutexGuard<'_, Box<dyn LayerManager>> {
        self.ctx.layers.lock()
    }

    pub fn timers(&self) -> MutexGuard<'_, Box<dyn TimerManager>> {
        self.ctx.timers.lock()
    }
}

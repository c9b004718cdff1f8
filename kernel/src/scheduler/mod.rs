/*
 * Task Manager Interface
 *
 * The scheduler proper lives outside this crate. System calls only need to
 * reach the calling task and to put it to sleep while it waits for a
 * message, so that is all the `TaskManager` trait exposes.
 *
 * Sleeping follows the usual block-then-yield split: `sleep_current` runs
 * inside a critical section and only marks the task as not runnable. The
 * caller then leaves the critical section and yields through
 * `KernelContext::yield_now`; a message arriving in the mailbox makes the
 * task runnable again.
 */

pub mod ipc;
pub mod task;

pub use ipc::{KEYCODE_Q, Message, Modifiers};
pub use task::{FileMapping, Task, TaskId};

pub trait TaskManager: Send {
    /// The task on whose behalf the current system call runs.
    fn current_task(&mut self) -> &mut Task;

    /// Mark the current task as waiting for its mailbox.
    fn sleep_current(&mut self);
}

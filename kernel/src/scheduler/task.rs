/*
 * Task State
 *
 * The per-task record the system-call layer reads and mutates: the
 * descriptor table, the two user-space address cursors, the list of file
 * mappings, the saved kernel stack pointer used to unwind on exit, and the
 * mailbox.
 *
 * Demand paging grows upward from `dpaging_end`; file mappings are carved
 * downward from `filemap_end`. The page-fault handler resolves both ranges
 * lazily, so recording a range here is all the bookkeeping needed.
 */

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use super::ipc::Message;
use crate::io::FileDescriptorTable;

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

/// A file mapped into the task's address space by `MapFile`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMapping {
    pub fd: i32,
    pub vaddr_begin: u64,
    pub vaddr_end: u64,
}

pub struct Task {
    id: TaskId,
    files: FileDescriptorTable,
    dpaging_end: u64,
    filemap_end: u64,
    file_maps: Vec<FileMapping>,
    os_stack_pointer: u64,
    messages: VecDeque<Message>,
}

impl Task {
    pub fn new(id: TaskId) -> Self {
        Task {
            id,
            files: FileDescriptorTable::new(),
            dpaging_end: 0,
            filemap_end: 0,
            file_maps: Vec::new(),
            os_stack_pointer: 0,
            messages: VecDeque::new(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn files(&self) -> &FileDescriptorTable {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut FileDescriptorTable {
        &mut self.files
    }

    /// End of the demand-paged region (the program break).
    pub fn dpaging_end(&self) -> u64 {
        self.dpaging_end
    }

    pub fn set_dpaging_end(&mut self, end: u64) {
        self.dpaging_end = end;
    }

    /// Lowest address handed out to a file mapping so far.
    pub fn filemap_end(&self) -> u64 {
        self.filemap_end
    }

    pub fn set_filemap_end(&mut self, end: u64) {
        self.filemap_end = end;
    }

    pub fn file_maps(&self) -> &[FileMapping] {
        &self.file_maps
    }

    pub fn add_file_mapping(&mut self, mapping: FileMapping) {
        self.file_maps.push(mapping);
    }

    /// Kernel stack pointer saved when the task entered user mode.
    pub fn os_stack_pointer(&self) -> u64 {
        self.os_stack_pointer
    }

    pub fn set_os_stack_pointer(&mut self, rsp: u64) {
        self.os_stack_pointer = rsp;
    }

    pub fn send_message(&mut self, msg: Message) {
        self.messages.push_back(msg);
    }

    /// Pop the oldest pending message, if any.
    pub fn receive_message(&mut self) -> Option<Message> {
        self.messages.pop_front()
    }

    pub fn pending_messages(&self) -> usize {
        self.messages.len()
    }
}

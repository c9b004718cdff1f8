/*
 * File Descriptor Table
 *
 * Per-task table mapping small integers to open files. Slots are kept in a
 * dense vector; an empty slot is a closed descriptor.
 *
 * Standard FDs:
 * - 0: stdin  (read)
 * - 1: stdout (write)
 * - 2: stderr (write)
 *
 * Allocation always reuses the lowest empty slot before growing. Closing a
 * descriptor removes its slot outright, so every descriptor above it shifts
 * down by one.
 */

use super::file::{Errno, File};
use alloc::sync::Arc;
use alloc::vec::Vec;

/// Shared handle to an open file
pub type FileRef = Arc<dyn File>;

pub struct FileDescriptorTable {
    files: Vec<Option<FileRef>>,
}

impl FileDescriptorTable {
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Number of slots, open or not.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Look up an open descriptor.
    ///
    /// Negative, out-of-range and empty descriptors all yield EBADF.
    pub fn get(&self, fd: i64) -> Result<FileRef, Errno> {
        usize::try_from(fd)
            .ok()
            .and_then(|fd| self.files.get(fd))
            .and_then(Option::as_ref)
            .cloned()
            .ok_or(Errno::EBADF)
    }

    pub fn is_open(&self, fd: i64) -> bool {
        self.get(fd).is_ok()
    }

    /// Reserve the lowest empty slot, appending one if none is free.
    pub fn allocate(&mut self) -> usize {
        self.allocate_ge(0)
    }

    /// Reserve the lowest empty slot at or above `min`.
    ///
    /// When the table is too short the new descriptor is `max(len, min)`;
    /// any gap below it is filled with empty slots.
    pub fn allocate_ge(&mut self, min: usize) -> usize {
        if let Some(fd) = (min..self.files.len()).find(|&fd| self.files[fd].is_none()) {
            return fd;
        }
        let fd = self.files.len().max(min);
        self.files.resize(fd + 1, None);
        fd
    }

    /// Place `file` into a slot previously handed out by `allocate*`.
    pub fn install(&mut self, fd: usize, file: FileRef) {
        if fd >= self.files.len() {
            self.files.resize(fd + 1, None);
        }
        self.files[fd] = Some(file);
    }

    /// Allocate the lowest free descriptor and install `file` there.
    pub fn open(&mut self, file: FileRef) -> usize {
        let fd = self.allocate();
        self.install(fd, file);
        fd
    }

    /// Close a descriptor by removing its slot from the table.
    pub fn close(&mut self, fd: i64) -> Result<(), Errno> {
        self.get(fd)?;
        self.files.remove(fd as usize);
        Ok(())
    }
}

impl Default for FileDescriptorTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::file::Whence;

    struct Null;

    impl File for Null {
        fn read(&self, _buf: &mut [u8]) -> Result<usize, Errno> {
            Ok(0)
        }

        fn write(&self, buf: &[u8]) -> Result<usize, Errno> {
            Ok(buf.len())
        }

        fn size(&self) -> u64 {
            0
        }
    }

    fn null() -> FileRef {
        Arc::new(Null)
    }

    fn table_with(open: usize) -> FileDescriptorTable {
        let mut table = FileDescriptorTable::new();
        for _ in 0..open {
            table.open(null());
        }
        table
    }

    #[test]
    fn allocate_appends_when_full() {
        let mut table = table_with(3);
        assert_eq!(table.allocate(), 3);
        assert_eq!(table.len(), 4);
        // reserved but still empty
        assert_eq!(table.get(3).err(), Some(Errno::EBADF));
    }

    #[test]
    fn allocate_reuses_lowest_hole() {
        let mut table = table_with(5);
        table.files[1] = None;
        table.files[3] = None;
        assert_eq!(table.allocate(), 1);
        assert_eq!(table.allocate_ge(2), 3);
    }

    #[test]
    fn allocate_ge_pads_up_to_floor() {
        let mut table = table_with(3);
        assert_eq!(table.allocate_ge(10), 10);
        assert_eq!(table.len(), 11);
        assert!(!table.is_open(5));
        // the gap is reusable afterwards
        assert_eq!(table.allocate(), 3);
    }

    #[test]
    fn get_rejects_bad_descriptors() {
        let table = table_with(2);
        assert!(table.get(0).is_ok());
        assert_eq!(table.get(-1).err(), Some(Errno::EBADF));
        assert_eq!(table.get(2).err(), Some(Errno::EBADF));
        assert_eq!(table.get(i64::MAX).err(), Some(Errno::EBADF));
    }

    #[test]
    fn close_shrinks_the_table() {
        let mut table = table_with(5);
        table.close(2).unwrap();
        assert_eq!(table.len(), 4);
        assert!(table.is_open(3));
        assert!(!table.is_open(4));
        assert_eq!(table.close(4), Err(Errno::EBADF));
    }

    #[test]
    fn default_seek_is_espipe() {
        assert_eq!(Null.seek(0, Whence::Set), Err(Errno::ESPIPE));
    }
}

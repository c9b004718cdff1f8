/*
 * File System Interface
 *
 * The open family of system calls resolves paths through a `FileSystem`
 * (the FAT driver on real hardware). Lookups report whether the matched
 * entry was followed by a trailing slash so callers can reject
 * `file.txt/` style paths.
 */

use bitflags::bitflags;

use crate::io::{Errno, FileRef};

bitflags! {
    /// FAT directory-entry attributes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attribute: u8 {
        const READ_ONLY = 0x01;
        const HIDDEN = 0x02;
        const SYSTEM = 0x04;
        const VOLUME_ID = 0x08;
        const DIRECTORY = 0x10;
        const ARCHIVE = 0x20;
        const LONG_NAME = 0x0f;
    }
}

/// A directory entry found by `find_file`
///
/// `cluster` identifies the entry to the file system that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub cluster: u64,
    pub attr: Attribute,
    pub size: u64,
}

impl DirectoryEntry {
    pub fn is_directory(&self) -> bool {
        self.attr.contains(Attribute::DIRECTORY)
    }
}

/// Result of a path lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub entry: Option<DirectoryEntry>,
    /// The matched component was followed by a `/`.
    pub post_slash: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    IsDirectory,
    NoSuchEntry,
    NoEnoughMemory,
    Io,
}

impl From<FsError> for Errno {
    fn from(err: FsError) -> Self {
        match err {
            FsError::IsDirectory => Errno::EISDIR,
            FsError::NoSuchEntry => Errno::ENOENT,
            FsError::NoEnoughMemory => Errno::ENOSPC,
            FsError::Io => Errno::EIO,
        }
    }
}

pub trait FileSystem: Send + Sync {
    fn find_file(&self, path: &str) -> Lookup;

    /// Create an empty regular file at `path`.
    fn create_file(&self, path: &str) -> Result<DirectoryEntry, FsError>;

    /// Open an entry previously returned by `find_file` or `create_file`.
    fn open(&self, entry: &DirectoryEntry) -> FileRef;
}

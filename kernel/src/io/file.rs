/*
 * Open-File Abstraction
 *
 * Everything a descriptor can refer to (FAT files, terminals, pipes)
 * implements `File`. Each implementation synchronizes itself, so every
 * operation takes `&self` and handlers may call them with interrupts enabled.
 */

/// An open file as seen through a descriptor
pub trait File: Send + Sync {
    /// Read up to `buf.len()` bytes at the current offset.
    ///
    /// Terminals may block until a line is available and return fewer bytes.
    fn read(&self, buf: &mut [u8]) -> Result<usize, Errno>;

    /// Write `buf` at the current offset, returning the byte count written.
    fn write(&self, buf: &[u8]) -> Result<usize, Errno>;

    /// Move the offset and return its new absolute value.
    ///
    /// Unseekable files (terminals, pipes) keep the default.
    fn seek(&self, _offset: i64, _whence: Whence) -> Result<u64, Errno> {
        Err(Errno::ESPIPE)
    }

    /// Current size in bytes.
    fn size(&self) -> u64;

    fn is_terminal(&self) -> bool {
        false
    }
}

/// POSIX errno values
///
/// The numbering follows Linux so the same codes can be handed to both ABIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Errno {
    EPERM = 1,         // Operation not permitted
    ENOENT = 2,        // No such file or directory
    EIO = 5,           // I/O error
    E2BIG = 7,         // Argument list too long
    EBADF = 9,         // Bad file descriptor
    ENOMEM = 12,       // Out of memory
    EACCES = 13,       // Permission denied
    EFAULT = 14,       // Bad address
    EISDIR = 21,       // Is a directory
    EINVAL = 22,       // Invalid argument
    ENOSPC = 28,       // No space left on device
    ESPIPE = 29,       // Illegal seek
    ENAMETOOLONG = 36, // File name too long
}

impl Errno {
    /// The raw value placed in the error register.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

// Seek whence constants (POSIX)
pub const SEEK_SET: i32 = 0; // Seek from beginning
pub const SEEK_CUR: i32 = 1; // Seek from current position
pub const SEEK_END: i32 = 2; // Seek from end

/// Reference point for `File::seek`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

impl Whence {
    pub fn from_raw(whence: i32) -> Option<Self> {
        match whence {
            SEEK_SET => Some(Whence::Set),
            SEEK_CUR => Some(Whence::Cur),
            SEEK_END => Some(Whence::End),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whence_accepts_only_posix_values() {
        assert_eq!(Whence::from_raw(0), Some(Whence::Set));
        assert_eq!(Whence::from_raw(1), Some(Whence::Cur));
        assert_eq!(Whence::from_raw(2), Some(Whence::End));
        assert_eq!(Whence::from_raw(3), None);
        assert_eq!(Whence::from_raw(-1), None);
    }

    #[test]
    fn errno_codes_match_linux() {
        assert_eq!(Errno::E2BIG.code(), 7);
        assert_eq!(Errno::EBADF.code(), 9);
        assert_eq!(Errno::EFAULT.code(), 14);
        assert_eq!(Errno::ESPIPE.code(), 29);
        assert_eq!(Errno::ENAMETOOLONG.code(), 36);
    }
}

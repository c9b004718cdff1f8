/*
 * Input/Output System
 *
 * The `File` trait behind every descriptor and the per-task descriptor table.
 */

pub mod fd;
pub mod file;

pub use fd::{FileDescriptorTable, FileRef};
pub use file::{Errno, File, SEEK_CUR, SEEK_END, SEEK_SET, Whence};

/*
 * User Memory Access
 *
 * Every pointer a system call receives is an untrusted user address. Handlers
 * never dereference one directly: they go through `UserAccess`, which checks
 * that the whole range lies at or above the user base and does not wrap,
 * then copies between user memory and kernel buffers. A failed check is
 * reported as EFAULT before any byte is touched.
 *
 * The check is a range check only; a range that passes but is not mapped
 * faults into the page-fault handler like any other user access.
 */

use alloc::vec::Vec;
use core::marker::PhantomData;
use core::mem::size_of;

use crate::io::Errno;

/// A typed pointer into user memory
///
/// Only an address; reading or writing needs a `UserAccess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserPtr<T: Copy> {
    addr: u64,
    _phantom: PhantomData<T>,
}

impl<T: Copy> UserPtr<T> {
    pub const fn new(addr: u64) -> Self {
        Self { addr, _phantom: PhantomData }
    }

    pub const fn addr(&self) -> u64 {
        self.addr
    }

    /// Pointer to the `index`-th element of an array starting here.
    pub fn offset(&self, index: u64) -> Result<Self, Errno> {
        index
            .checked_mul(size_of::<T>() as u64)
            .and_then(|delta| self.addr.checked_add(delta))
            .map(Self::new)
            .ok_or(Errno::EFAULT)
    }
}

/// Validating accessor for the calling task's user memory
pub struct UserAccess {
    base: u64,
}

impl UserAccess {
    /// Create an accessor for addresses at or above `base`.
    ///
    /// # Safety
    /// The calling task's address space must be active, and every range at
    /// or above `base` must either be mapped or resolvable by the page-fault
    /// handler.
    pub unsafe fn new(base: u64) -> Self {
        Self { base }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Reject null and kernel-half addresses.
    pub fn check_addr(&self, addr: u64) -> Result<(), Errno> {
        if addr == 0 || addr < self.base {
            return Err(Errno::EFAULT);
        }
        Ok(())
    }

    /// Validate `len` bytes starting at `addr`. Empty ranges always pass.
    pub fn check(&self, addr: u64, len: u64) -> Result<(), Errno> {
        if len == 0 {
            return Ok(());
        }
        self.check_addr(addr)?;
        addr.checked_add(len).ok_or(Errno::EFAULT)?;
        Ok(())
    }

    /// Copy `len` bytes from user memory into a kernel buffer.
    pub fn read_bytes(&self, addr: u64, len: u64) -> Result<Vec<u8>, Errno> {
        self.check(addr, len)?;
        if len == 0 {
            return Ok(Vec::new());
        }
        let len = usize::try_from(len).map_err(|_| Errno::EFAULT)?;
        // SAFETY: the range was validated above and the address space is
        // active per the contract of `new`.
        let src = unsafe { core::slice::from_raw_parts(addr as *const u8, len) };
        Ok(src.to_vec())
    }

    /// Copy `data` into user memory at `addr`.
    pub fn write_bytes(&self, addr: u64, data: &[u8]) -> Result<(), Errno> {
        self.check(addr, data.len() as u64)?;
        if data.is_empty() {
            return Ok(());
        }
        // SAFETY: as in `read_bytes`.
        unsafe {
            core::ptr::copy_nonoverlapping(data.as_ptr(), addr as *mut u8, data.len());
        }
        Ok(())
    }

    /// Copy a NUL-terminated string of at most `max` bytes (terminator
    /// excluded) out of user memory. Longer strings are E2BIG.
    pub fn read_cstr(&self, addr: u64, max: usize) -> Result<Vec<u8>, Errno> {
        self.check_addr(addr)?;
        let mut out = Vec::new();
        for i in 0..=max as u64 {
            let at = addr.checked_add(i).ok_or(Errno::EFAULT)?;
            // SAFETY: `at` is above the user base and did not wrap.
            let byte = unsafe { core::ptr::read_volatile(at as *const u8) };
            if byte == 0 {
                return Ok(out);
            }
            out.push(byte);
        }
        Err(Errno::E2BIG)
    }

    pub fn read<T: Copy>(&self, ptr: UserPtr<T>) -> Result<T, Errno> {
        self.check(ptr.addr(), size_of::<T>() as u64)?;
        // SAFETY: validated; user pointers carry no alignment guarantee.
        Ok(unsafe { core::ptr::read_unaligned(ptr.addr() as *const T) })
    }

    pub fn write<T: Copy>(&self, ptr: UserPtr<T>, value: &T) -> Result<(), Errno> {
        self.check(ptr.addr(), size_of::<T>() as u64)?;
        // SAFETY: as in `read`.
        unsafe { core::ptr::write_unaligned(ptr.addr() as *mut T, *value) };
        Ok(())
    }
}

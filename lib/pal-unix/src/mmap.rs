//! Memory-mapped regions.
//!
//! A [`MappedRegion`] is owned by the caller and released with [`munmap`];
//! the `Drop` impl is a last-resort backstop that cannot report errors.
//! Protection and visibility flags are validated and translated before the
//! native call, with the empty protection set mapping to "no access".

use std::os::fd::{AsRawFd, BorrowedFd};

use pal_core::{MemoryAdvice, MemoryFlags, MemoryProtection, PalError, PalResult, SyncFlags};

use crate::errno::last_error;
use crate::flags::{map_flags_to_native, protection_to_native, sync_flags_to_native};

/// An owned mapping of `len` bytes of address space.
#[derive(Debug)]
pub struct MappedRegion {
    addr: *mut libc::c_void,
    len: usize,
}

// The region is a plain span of address space; what threads do with the
// memory behind it is up to the caller, like any descriptor.
unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

impl MappedRegion {
    pub fn as_ptr(&self) -> *mut u8 {
        self.addr as *mut u8
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Map `length` bytes of a file, or of anonymous memory when `fd` is
/// `None`. `SHARED` and `PRIVATE` are mutually exclusive; the host
/// rejects the combination.
pub fn mmap(
    length: usize,
    protection: MemoryProtection,
    flags: MemoryFlags,
    fd: Option<BorrowedFd<'_>>,
    offset: i64,
) -> PalResult<MappedRegion> {
    if length == 0 {
        return Err(PalError::InvalidArgument);
    }
    let addr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            length,
            protection_to_native(protection),
            map_flags_to_native(flags),
            fd.map(|fd| fd.as_raw_fd()).unwrap_or(-1),
            offset as libc::off_t,
        )
    };
    if addr == libc::MAP_FAILED {
        return Err(last_error());
    }
    Ok(MappedRegion { addr, len: length })
}

/// Release a mapping. The address space is gone whatever the outcome.
pub fn munmap(region: MappedRegion) -> PalResult<()> {
    let rc = unsafe { libc::munmap(region.addr, region.len) };
    std::mem::forget(region);
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Hint the kernel about a region's relationship to child processes.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn madvise(region: &MappedRegion, advice: MemoryAdvice) -> PalResult<()> {
    let native = match advice {
        MemoryAdvice::DontFork => libc::MADV_DONTFORK,
    };
    let rc = unsafe { libc::madvise(region.addr, region.len, native) };
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn madvise(_region: &MappedRegion, _advice: MemoryAdvice) -> PalResult<()> {
    Err(PalError::NotSupported)
}

/// Flush a shared mapping back to its file.
pub fn msync(region: &MappedRegion, flags: SyncFlags) -> PalResult<()> {
    let rc = unsafe { libc::msync(region.addr, region.len, sync_flags_to_native(flags)) };
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.addr, self.len);
        }
    }
}

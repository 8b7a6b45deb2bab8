//! Path-based filesystem operations.
//!
//! Every blocking call here runs under the interruption retry discipline.
//! Paths cross the FFI boundary as NUL-terminated byte strings; an interior
//! NUL is rejected as invalid input before any native call.

use std::ffi::CString;
use std::os::fd::{FromRawFd, OwnedFd};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use pal_core::{AccessChecks, PalError, PalResult, SysConfName};

use crate::errno::last_error;
use crate::flags::access_checks_to_native;
use crate::retry::retry_eintr;

pub(crate) fn cstr(path: &Path) -> PalResult<CString> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| PalError::InvalidArgument)
}

/// Remove a name from the filesystem.
pub fn unlink(path: &Path) -> PalResult<()> {
    let path = cstr(path)?;
    let rc = retry_eintr(|| unsafe { libc::unlink(path.as_ptr()) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Create a directory with the given permission bits (filtered by umask).
pub fn mkdir(path: &Path, mode: u32) -> PalResult<()> {
    let path = cstr(path)?;
    let rc = retry_eintr(|| unsafe { libc::mkdir(path.as_ptr(), mode as libc::mode_t) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Remove an empty directory.
pub fn rmdir(path: &Path) -> PalResult<()> {
    let path = cstr(path)?;
    let rc = retry_eintr(|| unsafe { libc::rmdir(path.as_ptr()) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Rename a file or directory, replacing any existing destination.
pub fn rename(old_path: &Path, new_path: &Path) -> PalResult<()> {
    let old_path = cstr(old_path)?;
    let new_path = cstr(new_path)?;
    let rc = retry_eintr(|| unsafe { libc::rename(old_path.as_ptr(), new_path.as_ptr()) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Change the permission bits of the file a path resolves to.
pub fn chmod(path: &Path, mode: u32) -> PalResult<()> {
    let path = cstr(path)?;
    let rc = retry_eintr(|| unsafe { libc::chmod(path.as_ptr(), mode as libc::mode_t) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Check accessibility of a path for the real user and group ids.
pub fn access(path: &Path, checks: AccessChecks) -> PalResult<()> {
    let path = cstr(path)?;
    let rc = unsafe { libc::access(path.as_ptr(), access_checks_to_native(checks)) };
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Change the calling process's working directory.
pub fn chdir(path: &Path) -> PalResult<()> {
    let path = cstr(path)?;
    let rc = retry_eintr(|| unsafe { libc::chdir(path.as_ptr()) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Create a hard link to an existing file.
pub fn link(source: &Path, link_path: &Path) -> PalResult<()> {
    let source = cstr(source)?;
    let link_path = cstr(link_path)?;
    let rc = retry_eintr(|| unsafe { libc::link(source.as_ptr(), link_path.as_ptr()) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Create a symbolic link pointing at `target`.
pub fn symlink(target: &Path, link_path: &Path) -> PalResult<()> {
    let target = cstr(target)?;
    let link_path = cstr(link_path)?;
    let rc = retry_eintr(|| unsafe { libc::symlink(target.as_ptr(), link_path.as_ptr()) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Read the target of a symbolic link.
pub fn readlink(path: &Path) -> PalResult<Vec<u8>> {
    let path = cstr(path)?;
    let mut buf = vec![0u8; 1024];
    loop {
        let rc = unsafe {
            libc::readlink(path.as_ptr(), buf.as_mut_ptr() as *mut libc::c_char, buf.len())
        };
        if rc < 0 {
            return Err(last_error());
        }
        let len = rc as usize;
        // An exactly-full buffer may mean truncation; retry larger.
        if len < buf.len() {
            buf.truncate(len);
            return Ok(buf);
        }
        buf.resize(buf.len() * 2, 0);
    }
}

/// Resolve a path to an absolute canonical path with no symlinks, `.`, or
/// `..` components.
pub fn realpath(path: &Path) -> PalResult<PathBuf> {
    use std::os::unix::ffi::OsStringExt;

    let path = cstr(path)?;
    let resolved = unsafe { libc::realpath(path.as_ptr(), std::ptr::null_mut()) };
    if resolved.is_null() {
        return Err(last_error());
    }
    let bytes = unsafe { std::ffi::CStr::from_ptr(resolved) }
        .to_bytes()
        .to_vec();
    unsafe { libc::free(resolved as *mut libc::c_void) };
    Ok(PathBuf::from(std::ffi::OsString::from_vec(bytes)))
}

/// Create and open a unique temporary file.
///
/// `template` must end in six `X` placeholder bytes followed by
/// `suffix_len` bytes of fixed suffix; the placeholders are replaced in
/// place with the generated name. The opened descriptor is returned.
pub fn mkstemps(template: &mut Vec<u8>, suffix_len: usize) -> PalResult<OwnedFd> {
    // The placeholders must fit in the template ahead of the suffix.
    if suffix_len + 6 > template.len() || template.contains(&0) {
        return Err(PalError::InvalidArgument);
    }
    let mut buf = template.clone();
    buf.push(0);

    #[cfg(not(target_os = "android"))]
    let fd = retry_eintr(|| unsafe {
        libc::mkstemps(buf.as_mut_ptr() as *mut libc::c_char, suffix_len as libc::c_int)
    });

    // Bionic only ships mkstemp, which does not understand a suffix. Splice
    // the suffix out by terminating the template early, then restore the
    // byte after the call; the bytes past the terminator stay intact.
    #[cfg(target_os = "android")]
    let fd = {
        let first_suffix_index = template.len() - suffix_len;
        let first_suffix_byte = buf[first_suffix_index];
        if suffix_len > 0 {
            buf[first_suffix_index] = 0;
        }
        let fd = retry_eintr(|| unsafe { libc::mkstemp(buf.as_mut_ptr() as *mut libc::c_char) });
        if suffix_len > 0 {
            buf[first_suffix_index] = first_suffix_byte;
        }
        fd
    };

    if fd < 0 {
        return Err(last_error());
    }
    let template_len = template.len();
    template.copy_from_slice(&buf[..template_len]);
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Open (and possibly create) a POSIX shared-memory object.
#[cfg(not(target_os = "android"))]
pub fn shm_open(name: &str, flags: pal_core::OpenFlags, mode: u32) -> PalResult<OwnedFd> {
    let native = crate::flags::open_flags_to_native(flags)?;
    let name = CString::new(name).map_err(|_| PalError::InvalidArgument)?;
    let fd =
        retry_eintr(|| unsafe { libc::shm_open(name.as_ptr(), native, mode as libc::c_uint) });
    if fd < 0 {
        return Err(last_error());
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

// Shared-memory objects on this host cannot reliably back mappings.
#[cfg(target_os = "android")]
pub fn shm_open(_name: &str, _flags: pal_core::OpenFlags, _mode: u32) -> PalResult<OwnedFd> {
    Err(PalError::NotSupported)
}

/// Remove a POSIX shared-memory object name.
#[cfg(not(target_os = "android"))]
pub fn shm_unlink(name: &str) -> PalResult<()> {
    let name = CString::new(name).map_err(|_| PalError::InvalidArgument)?;
    let rc = retry_eintr(|| unsafe { libc::shm_unlink(name.as_ptr()) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

#[cfg(target_os = "android")]
pub fn shm_unlink(_name: &str) -> PalResult<()> {
    Err(PalError::NotSupported)
}

/// Query a system configuration value.
pub fn sysconf(name: SysConfName) -> PalResult<i64> {
    let native = match name {
        SysConfName::ClockTicksPerSecond => libc::_SC_CLK_TCK,
        SysConfName::PageSize => libc::_SC_PAGESIZE,
    };
    let value = unsafe { libc::sysconf(native) };
    if value < 0 {
        return Err(last_error());
    }
    Ok(value)
}

/// Flush all filesystem buffers to stable storage, system-wide.
pub fn sync_all() {
    unsafe { libc::sync() };
}

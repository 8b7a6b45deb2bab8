//! Filesystem identity resolution.
//!
//! Callers branch on one numeric space everywhere. Hosts with a numeric
//! type field in their filesystem-statistics record return it directly;
//! hosts that only report a name resolve it through the fixed table in
//! `pal-core`, which maps known names onto the same numeric space.

use std::os::fd::{AsRawFd, BorrowedFd};

use pal_core::PalResult;

use crate::errno::last_error;
use crate::retry::retry_eintr;

/// Canonical numeric filesystem-type id for the filesystem holding `fd`.
///
/// An unrecognized filesystem on a name-reporting host yields
/// [`pal_core::UNKNOWN_FILESYSTEM_TYPE`], never zero.
pub fn filesystem_type(fd: BorrowedFd<'_>) -> PalResult<i64> {
    cfg_if::cfg_if! {
        if #[cfg(any(
            target_os = "linux",
            target_os = "android",
            target_os = "emscripten",
            target_os = "macos",
            target_os = "ios",
            target_os = "freebsd",
            target_os = "dragonfly"
        ))] {
            let mut stats = unsafe { std::mem::zeroed::<libc::statfs>() };
            let rc = retry_eintr(|| unsafe { libc::fstatfs(fd.as_raw_fd(), &mut stats) });
            if rc < 0 {
                return Err(last_error());
            }
            Ok(stats.f_type as i64)
        } else if #[cfg(target_os = "openbsd")] {
            // The statistics record carries a name, not a number.
            let mut stats = unsafe { std::mem::zeroed::<libc::statfs>() };
            let rc = retry_eintr(|| unsafe { libc::fstatfs(fd.as_raw_fd(), &mut stats) });
            if rc < 0 {
                return Err(last_error());
            }
            Ok(resolve_name(stats.f_fstypename.as_ptr()))
        } else if #[cfg(target_os = "netbsd")] {
            let mut stats = unsafe { std::mem::zeroed::<libc::statvfs>() };
            let rc = retry_eintr(|| unsafe { libc::fstatvfs(fd.as_raw_fd(), &mut stats) });
            if rc < 0 {
                return Err(last_error());
            }
            Ok(resolve_name(stats.f_fstypename.as_ptr()))
        } else {
            // SysV line: statvfs with a base-type name.
            let mut stats = unsafe { std::mem::zeroed::<libc::statvfs>() };
            let rc = retry_eintr(|| unsafe { libc::fstatvfs(fd.as_raw_fd(), &mut stats) });
            if rc < 0 {
                return Err(last_error());
            }
            Ok(resolve_name(stats.f_basetype.as_ptr()))
        }
    }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "emscripten",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "dragonfly"
)))]
fn resolve_name(name: *const libc::c_char) -> i64 {
    let name = unsafe { std::ffi::CStr::from_ptr(name) };
    pal_core::filesystem_type_from_name(&name.to_string_lossy())
}

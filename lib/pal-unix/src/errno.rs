//! Raw errno access, kept in one place.

use pal_core::PalError;

cfg_if::cfg_if! {
    if #[cfg(any(target_os = "linux", target_os = "emscripten"))] {
        fn errno_location() -> *mut libc::c_int {
            unsafe { libc::__errno_location() }
        }
    } else if #[cfg(any(target_os = "android", target_os = "netbsd", target_os = "openbsd"))] {
        fn errno_location() -> *mut libc::c_int {
            unsafe { libc::__errno() }
        }
    } else if #[cfg(any(
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "dragonfly"
    ))] {
        fn errno_location() -> *mut libc::c_int {
            unsafe { libc::__error() }
        }
    } else if #[cfg(any(target_os = "solaris", target_os = "illumos"))] {
        fn errno_location() -> *mut libc::c_int {
            unsafe { libc::___errno() }
        }
    } else if #[cfg(target_os = "aix")] {
        fn errno_location() -> *mut libc::c_int {
            unsafe { libc::_Errno() }
        }
    }
}

pub(crate) fn errno() -> i32 {
    unsafe { *errno_location() }
}

pub(crate) fn set_errno(value: i32) {
    unsafe {
        *errno_location() = value;
    }
}

/// The error currently recorded in `errno`, as a platform-layer error.
pub(crate) fn last_error() -> PalError {
    PalError::Os(errno())
}

/// Whether an error means "this capability does not exist here".
///
/// Covers both the synthetic [`PalError::NotSupported`] and the native
/// codes hosts use for the same thing; advisory callers and tiered
/// fallbacks treat all of them as non-fatal.
pub fn error_is_unsupported(err: PalError) -> bool {
    match err {
        PalError::NotSupported => true,
        PalError::Os(code) => {
            code == libc::ENOTSUP || code == libc::EOPNOTSUPP || code == libc::ENOSYS
        }
        PalError::InvalidArgument => false,
    }
}

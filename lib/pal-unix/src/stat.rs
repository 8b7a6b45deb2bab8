//! Native status normalization.
//!
//! One normalizer feeds all three stat-family entry points. Numeric fields
//! widen to 64-bit regardless of the native width; sub-second timestamp
//! resolution, creation time, and the hidden flag exist only on some
//! hosts, and their absence is visible to the caller rather than papered
//! over with zeros.

use std::mem;
use std::os::unix::io::{AsRawFd, BorrowedFd};
use std::path::Path;

use pal_core::{FileStatus, PalResult, TimeSpec};

use crate::errno::last_error;
use crate::fs::cstr;
use crate::retry::retry_eintr;

/// Status of the file a path resolves to, following symlinks.
pub fn stat(path: &Path) -> PalResult<FileStatus> {
    let path = cstr(path)?;
    let mut st = unsafe { mem::zeroed::<libc::stat>() };
    let rc = retry_eintr(|| unsafe { libc::stat(path.as_ptr(), &mut st) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(from_native(&st))
}

/// Status of the path itself; a symlink is reported, not followed.
pub fn lstat(path: &Path) -> PalResult<FileStatus> {
    let path = cstr(path)?;
    let mut st = unsafe { mem::zeroed::<libc::stat>() };
    let rc = unsafe { libc::lstat(path.as_ptr(), &mut st) };
    if rc < 0 {
        return Err(last_error());
    }
    Ok(from_native(&st))
}

/// Status of an open descriptor.
pub fn fstat(fd: BorrowedFd<'_>) -> PalResult<FileStatus> {
    Ok(from_native(&fstat_native(fd)?))
}

/// The raw native record, for callers that need fields the canonical
/// record widens or drops (the copy engine propagates timestamps from it).
pub(crate) fn fstat_native(fd: BorrowedFd<'_>) -> PalResult<libc::stat> {
    let mut st = unsafe { mem::zeroed::<libc::stat>() };
    let rc = retry_eintr(|| unsafe { libc::fstat(fd.as_raw_fd(), &mut st) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(st)
}

fn from_native(st: &libc::stat) -> FileStatus {
    let (atime, mtime, ctime) = stat_times(st);
    FileStatus {
        dev: st.st_dev as i64,
        inode: st.st_ino as i64,
        mode: st.st_mode as u32,
        uid: st.st_uid,
        gid: st.st_gid,
        size: st.st_size as i64,
        atime,
        mtime,
        ctime,
        birthtime: birthtime(st),
        hidden: hidden(st),
    }
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "emscripten",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub(crate) fn stat_times(st: &libc::stat) -> (TimeSpec, TimeSpec, TimeSpec) {
    (
        TimeSpec {
            secs: st.st_atime as i64,
            nanos: st.st_atime_nsec as i64,
        },
        TimeSpec {
            secs: st.st_mtime as i64,
            nanos: st.st_mtime_nsec as i64,
        },
        TimeSpec {
            secs: st.st_ctime as i64,
            nanos: st.st_ctime_nsec as i64,
        },
    )
}

// Seconds-only hosts: the nanosecond fields are zero, not absent, so the
// record shape stays identical everywhere.
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "emscripten",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
pub(crate) fn stat_times(st: &libc::stat) -> (TimeSpec, TimeSpec, TimeSpec) {
    (
        TimeSpec {
            secs: st.st_atime as i64,
            nanos: 0,
        },
        TimeSpec {
            secs: st.st_mtime as i64,
            nanos: 0,
        },
        TimeSpec {
            secs: st.st_ctime as i64,
            nanos: 0,
        },
    )
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn birthtime(st: &libc::stat) -> Option<TimeSpec> {
    Some(TimeSpec {
        secs: st.st_birthtime as i64,
        nanos: st.st_birthtime_nsec as i64,
    })
}

// No creation time here; `None` lets callers tell "absent" from the epoch.
#[cfg(not(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn birthtime(_st: &libc::stat) -> Option<TimeSpec> {
    None
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
fn hidden(st: &libc::stat) -> Option<bool> {
    Some(st.st_flags & libc::UF_HIDDEN != 0)
}

#[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "freebsd")))]
fn hidden(_st: &libc::stat) -> Option<bool> {
    None
}

//! Tiered file-copy engine.
//!
//! Data moves through the first applicable tier: a whole-file kernel copy
//! where the host has one, then a copy-on-write clone of the extents, then
//! a kernel-mediated streaming copy, and finally a buffered read/write
//! loop that always works. "Not supported" from a tier falls through to
//! the next; any other error aborts the whole operation.
//!
//! Metadata follows best-effort: timestamps at the highest available
//! resolution, then the permission triad. Filesystems that coerce
//! ownership to one user deny metadata writes with `EPERM` even though the
//! data copy succeeded; that single case is tolerated.

use std::os::fd::BorrowedFd;

use pal_core::PalResult;
use tracing::trace;

use crate::errno::last_error;
#[cfg(not(any(target_os = "macos", target_os = "ios")))]
use crate::errno::errno;
#[cfg(not(any(target_os = "macos", target_os = "ios")))]
use crate::retry::retry_eintr;

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
const COPY_BUFFER_LEN: usize = 80 * 1024;

/// Copy file content and metadata from `source` to `destination` in one
/// kernel call; the length hint is not needed here.
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub fn copy_file(
    source: BorrowedFd<'_>,
    destination: BorrowedFd<'_>,
    _source_length: i64,
) -> PalResult<()> {
    use std::os::fd::AsRawFd;

    // The whole copy, data and metadata, happens in the kernel; it
    // subsumes every other tier.
    trace!("copying via fcopyfile");
    let rc = unsafe {
        libc::fcopyfile(
            source.as_raw_fd(),
            destination.as_raw_fd(),
            std::ptr::null_mut(),
            libc::COPYFILE_ALL,
        )
    };
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Copy file content and best-effort metadata from `source` to
/// `destination`.
///
/// `source_length` is a hint: pass the source's size when known, or 0 for
/// "unknown, possibly not seekable" (pseudo-filesystem entries report a
/// zero size yet produce data when read; they go straight to the buffered
/// loop).
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn copy_file(
    source: BorrowedFd<'_>,
    destination: BorrowedFd<'_>,
    source_length: i64,
) -> PalResult<()> {
    use std::os::fd::AsRawFd;

    let mut copied = false;

    // A copy-on-write clone shares storage between the files. Skipped for
    // a zero length hint: pseudo-filesystem entries cannot be cloned and
    // must be read.
    if source_length != 0 {
        let rc = retry_eintr(|| unsafe {
            libc::ioctl(destination.as_raw_fd(), libc::FICLONE, source.as_raw_fd())
        });
        copied = rc == 0;
        if copied {
            trace!("copied data via copy-on-write clone");
        }
    }

    if !copied && source_length != 0 {
        copied = sendfile_copy(source, destination, source_length)?;
    }

    if !copied {
        trace!("copying data via buffered loop");
        buffered_copy(source, destination)?;
    }

    copy_metadata(source, destination)
}

// No accelerated primitive on this host; the buffered loop is the only
// data tier.
#[cfg(not(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "linux",
    target_os = "android"
)))]
pub fn copy_file(
    source: BorrowedFd<'_>,
    destination: BorrowedFd<'_>,
    _source_length: i64,
) -> PalResult<()> {
    trace!("copying data via buffered loop");
    buffered_copy(source, destination)?;
    copy_metadata(source, destination)
}

/// Streaming copy through the kernel. One call is capped by a
/// platform-defined maximum, so it iterates until the declared length is
/// exhausted. Returns whether the data copy completed; a transfer of zero
/// before exhaustion means the source was truncated and the remainder is
/// left to the buffered tier.
#[cfg(any(target_os = "linux", target_os = "android"))]
fn sendfile_copy(
    source: BorrowedFd<'_>,
    destination: BorrowedFd<'_>,
    source_length: i64,
) -> PalResult<bool> {
    use std::os::fd::AsRawFd;

    trace!("copying data via sendfile");
    let mut remaining = source_length;
    while remaining > 0 {
        let chunk = remaining.min(isize::MAX as i64) as usize;
        let sent = retry_eintr(|| unsafe {
            libc::sendfile(
                destination.as_raw_fd(),
                source.as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
            )
        });
        if sent < 0 {
            let err = errno();
            if err != libc::EINVAL && err != libc::ENOSYS {
                return Err(last_error());
            }
            break;
        }
        if sent == 0 {
            break;
        }
        remaining -= sent as i64;
    }
    Ok(remaining == 0)
}

/// The guaranteed tier: read to end-of-file, writing every chunk fully
/// before the next read.
#[cfg(not(any(target_os = "macos", target_os = "ios")))]
fn buffered_copy(source: BorrowedFd<'_>, destination: BorrowedFd<'_>) -> PalResult<()> {
    use crate::io::{read, write};

    let mut buffer = vec![0u8; COPY_BUFFER_LEN];
    loop {
        let bytes_read = read(source, &mut buffer)?;
        if bytes_read == 0 {
            return Ok(());
        }
        let mut chunk = &buffer[..bytes_read];
        while !chunk.is_empty() {
            let written = write(destination, chunk)?;
            chunk = &chunk[written..];
        }
    }
}

#[cfg(not(any(target_os = "macos", target_os = "ios")))]
fn copy_metadata(source: BorrowedFd<'_>, destination: BorrowedFd<'_>) -> PalResult<()> {
    use std::os::fd::AsRawFd;

    use crate::stat::{fstat_native, stat_times};

    let source_stat = fstat_native(source)?;
    let (atime, mtime, _) = stat_times(&source_stat);

    let times = [
        libc::timespec {
            tv_sec: atime.secs as libc::time_t,
            tv_nsec: atime.nanos as _,
        },
        libc::timespec {
            tv_sec: mtime.secs as libc::time_t,
            tv_nsec: mtime.nanos as _,
        },
    ];
    let mut rc =
        retry_eintr(|| unsafe { libc::futimens(destination.as_raw_fd(), times.as_ptr()) });
    if rc < 0 && errno() == libc::ENOSYS {
        // Old kernels lack the nanosecond call; drop to microseconds.
        let times = [
            libc::timeval {
                tv_sec: atime.secs as libc::time_t,
                tv_usec: (atime.nanos / 1000) as libc::suseconds_t,
            },
            libc::timeval {
                tv_sec: mtime.secs as libc::time_t,
                tv_usec: (mtime.nanos / 1000) as libc::suseconds_t,
            },
        ];
        rc = retry_eintr(|| unsafe { libc::futimes(destination.as_raw_fd(), times.as_ptr()) });
    }
    // Filesystems that coerce ownership deny metadata writes with EPERM
    // even though the data copy succeeded; the copy stands.
    if rc < 0 && errno() != libc::EPERM {
        return Err(last_error());
    }

    // The permission triad only; type bits must not be copied. The open
    // may have been filtered by umask, so the destination is re-modded
    // from the source.
    let permissions = source_stat.st_mode & 0o777;
    let rc = retry_eintr(|| unsafe { libc::fchmod(destination.as_raw_fd(), permissions) });
    if rc < 0 && errno() != libc::EPERM {
        return Err(last_error());
    }

    Ok(())
}

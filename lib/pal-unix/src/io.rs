//! Descriptor-based operations.
//!
//! Descriptors are owned by the caller; [`close`] is the paired explicit
//! release for everything opened here. Blocking calls run under the
//! interruption retry discipline except `close`, whose state after an
//! interrupted return is unspecified by the host and must not be retried.

use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::path::Path;

use pal_core::{
    FdFlags, FileAdvice, FlockKind, LockKind, OpenFlags, PalError, PalResult, PollEvents,
    SeekWhence,
};

use crate::errno::last_error;
use crate::flags::{
    flock_operation_to_native, lock_kind_to_native, open_flags_to_native, poll_events_from_native,
    poll_events_to_native, whence_to_native,
};
use crate::fs::cstr;
use crate::retry::retry_eintr;

/// Open a file, translating the portable flag set to native constants.
/// `mode` is the permission triad for a created file, filtered by umask.
pub fn open(path: &Path, flags: OpenFlags, mode: u32) -> PalResult<OwnedFd> {
    let native = open_flags_to_native(flags)?;
    let path = cstr(path)?;
    let fd = retry_eintr(|| unsafe { libc::open(path.as_ptr(), native, mode as libc::c_uint) });
    if fd < 0 {
        return Err(last_error());
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Release a descriptor. The descriptor is gone whatever the outcome, so
/// the call is never retried.
pub fn close(fd: OwnedFd) -> PalResult<()> {
    let rc = unsafe { libc::close(fd.into_raw_fd()) };
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Duplicate a descriptor. The duplicate has close-on-exec set.
pub fn dup(fd: BorrowedFd<'_>) -> PalResult<OwnedFd> {
    #[cfg(not(target_os = "aix"))]
    let new_fd = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_DUPFD_CLOEXEC, 0) });

    // No atomic duplicate-with-cloexec here; set the flag afterwards.
    #[cfg(target_os = "aix")]
    let new_fd = {
        let new_fd = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_DUPFD, 0) });
        if new_fd >= 0 {
            unsafe { libc::fcntl(new_fd, libc::F_SETFD, libc::FD_CLOEXEC) };
        }
        new_fd
    };

    if new_fd < 0 {
        return Err(last_error());
    }
    Ok(unsafe { OwnedFd::from_raw_fd(new_fd) })
}

/// Read from the current file position. Zero means end-of-file.
pub fn read(fd: BorrowedFd<'_>, buffer: &mut [u8]) -> PalResult<usize> {
    let count = retry_eintr(|| unsafe {
        libc::read(fd.as_raw_fd(), buffer.as_mut_ptr() as *mut libc::c_void, buffer.len())
    });
    if count < 0 {
        return Err(last_error());
    }
    Ok(count as usize)
}

/// Write at the current file position; may transfer fewer bytes than
/// requested.
pub fn write(fd: BorrowedFd<'_>, buffer: &[u8]) -> PalResult<usize> {
    let count = retry_eintr(|| unsafe {
        libc::write(fd.as_raw_fd(), buffer.as_ptr() as *const libc::c_void, buffer.len())
    });
    if count < 0 {
        return Err(last_error());
    }
    Ok(count as usize)
}

/// Read at an explicit offset without moving the file position.
pub fn pread(fd: BorrowedFd<'_>, buffer: &mut [u8], offset: i64) -> PalResult<usize> {
    let count = retry_eintr(|| unsafe {
        libc::pread(
            fd.as_raw_fd(),
            buffer.as_mut_ptr() as *mut libc::c_void,
            buffer.len(),
            offset as libc::off_t,
        )
    });
    if count < 0 {
        return Err(last_error());
    }
    Ok(count as usize)
}

/// Write at an explicit offset without moving the file position.
pub fn pwrite(fd: BorrowedFd<'_>, buffer: &[u8], offset: i64) -> PalResult<usize> {
    let count = retry_eintr(|| unsafe {
        libc::pwrite(
            fd.as_raw_fd(),
            buffer.as_ptr() as *const libc::c_void,
            buffer.len(),
            offset as libc::off_t,
        )
    });
    if count < 0 {
        return Err(last_error());
    }
    Ok(count as usize)
}

/// Move the file position; returns the new position from the start of the
/// file.
pub fn lseek(fd: BorrowedFd<'_>, offset: i64, whence: SeekWhence) -> PalResult<i64> {
    let position = retry_eintr(|| unsafe {
        libc::lseek(fd.as_raw_fd(), offset as libc::off_t, whence_to_native(whence))
    });
    if position < 0 {
        return Err(last_error());
    }
    Ok(position as i64)
}

/// Truncate or extend a file to exactly `length` bytes.
pub fn ftruncate(fd: BorrowedFd<'_>, length: i64) -> PalResult<()> {
    let rc = retry_eintr(|| unsafe { libc::ftruncate(fd.as_raw_fd(), length as libc::off_t) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Flush a descriptor's data and metadata to stable storage.
pub fn fsync(fd: BorrowedFd<'_>) -> PalResult<()> {
    // fsync on these hosts stops at the drive cache; the fcntl goes all
    // the way to the platter.
    #[cfg(any(target_os = "macos", target_os = "ios"))]
    let rc = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_FULLFSYNC) });
    #[cfg(not(any(target_os = "macos", target_os = "ios")))]
    let rc = retry_eintr(|| unsafe { libc::fsync(fd.as_raw_fd()) });

    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Change the permission bits of an open descriptor.
pub fn fchmod(fd: BorrowedFd<'_>, mode: u32) -> PalResult<()> {
    let rc = retry_eintr(|| unsafe { libc::fchmod(fd.as_raw_fd(), mode as libc::mode_t) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Apply or release a whole-file advisory lock.
pub fn flock(fd: BorrowedFd<'_>, kind: FlockKind, nonblocking: bool) -> PalResult<()> {
    let operation = flock_operation_to_native(kind, nonblocking);
    let rc = retry_eintr(|| unsafe { libc::flock(fd.as_raw_fd(), operation) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Apply or release an advisory lock on a byte range of an open file.
/// Negative offsets and lengths are rejected before any native call; a
/// zero length locks through end-of-file.
pub fn lock_file_region(
    fd: BorrowedFd<'_>,
    offset: i64,
    length: i64,
    kind: LockKind,
) -> PalResult<()> {
    if offset < 0 || length < 0 {
        return Err(PalError::InvalidArgument);
    }
    let mut lock_args = libc::flock {
        l_type: lock_kind_to_native(kind) as libc::c_short,
        l_whence: libc::SEEK_SET as libc::c_short,
        l_start: offset as libc::off_t,
        l_len: length as libc::off_t,
        ..unsafe { std::mem::zeroed() }
    };
    let rc = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETLK, &mut lock_args) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Pre-allocate storage for a file region without changing the visible
/// file size.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn fallocate(fd: BorrowedFd<'_>, offset: i64, length: i64) -> PalResult<()> {
    let rc = retry_eintr(|| unsafe {
        libc::fallocate(
            fd.as_raw_fd(),
            libc::FALLOC_FL_KEEP_SIZE,
            offset as libc::off_t,
            length as libc::off_t,
        )
    });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Pre-allocate storage from the physical end of file; all requested
/// space or none.
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub fn fallocate(fd: BorrowedFd<'_>, offset: i64, length: i64) -> PalResult<()> {
    let mut fstore = libc::fstore_t {
        fst_flags: libc::F_ALLOCATEALL,
        fst_posmode: libc::F_PEOFPOSMODE,
        fst_offset: offset as libc::off_t,
        fst_length: length as libc::off_t,
        fst_bytesalloc: 0,
    };
    let rc =
        retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_PREALLOCATE, &mut fstore) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
)))]
pub fn fallocate(_fd: BorrowedFd<'_>, _offset: i64, _length: i64) -> PalResult<()> {
    Err(PalError::NotSupported)
}

/// Hint the kernel about the expected access pattern for a file region.
/// Advisory; callers may ignore [`PalError::NotSupported`].
#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
pub fn fadvise(fd: BorrowedFd<'_>, offset: i64, length: i64, advice: FileAdvice) -> PalResult<()> {
    let native = crate::flags::advice_to_native(advice);
    // Reports failure through the return value; errno is untouched.
    let rc = retry_eintr(|| unsafe {
        libc::posix_fadvise(fd.as_raw_fd(), offset as libc::off_t, length as libc::off_t, native)
    });
    if rc != 0 {
        return Err(PalError::Os(rc));
    }
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
pub fn fadvise(
    _fd: BorrowedFd<'_>,
    _offset: i64,
    _length: i64,
    _advice: FileAdvice,
) -> PalResult<()> {
    Err(PalError::NotSupported)
}

/// Create a pipe, optionally with close-on-exec on both ends. Returns
/// (read end, write end).
pub fn pipe(cloexec: bool) -> PalResult<(OwnedFd, OwnedFd)> {
    let mut fds = [0 as RawFd; 2];

    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "emscripten",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))]
    {
        let flags = if cloexec { libc::O_CLOEXEC } else { 0 };
        let rc = retry_eintr(|| unsafe { libc::pipe2(fds.as_mut_ptr(), flags) });
        if rc < 0 {
            return Err(last_error());
        }
    }

    // No creation-time close-on-exec here; emulate with a descriptor-flag
    // call on each end, closing both if either call fails.
    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "emscripten",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    )))]
    {
        let rc = retry_eintr(|| unsafe { libc::pipe(fds.as_mut_ptr()) });
        if rc < 0 {
            return Err(last_error());
        }
        if cloexec {
            for fd in fds {
                let rc =
                    retry_eintr(|| unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) });
                if rc < 0 {
                    let err = last_error();
                    unsafe {
                        libc::close(fds[0]);
                        libc::close(fds[1]);
                    }
                    return Err(err);
                }
            }
        }
    }

    Ok(unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) })
}

/// Per-descriptor flags.
pub fn get_fd_flags(fd: BorrowedFd<'_>) -> PalResult<FdFlags> {
    let rc = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFD) });
    if rc < 0 {
        return Err(last_error());
    }
    let mut flags = FdFlags::empty();
    if rc & libc::FD_CLOEXEC != 0 {
        flags |= FdFlags::CLOEXEC;
    }
    Ok(flags)
}

pub fn set_fd_flags(fd: BorrowedFd<'_>, flags: FdFlags) -> PalResult<()> {
    let native = if flags.contains(FdFlags::CLOEXEC) {
        libc::FD_CLOEXEC
    } else {
        0
    };
    let rc = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, native) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Whether the open file description is in non-blocking mode.
pub fn get_nonblocking(fd: BorrowedFd<'_>) -> PalResult<bool> {
    let flags = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) });
    if flags < 0 {
        return Err(last_error());
    }
    Ok(flags & libc::O_NONBLOCK == libc::O_NONBLOCK)
}

/// Switch the open file description into or out of non-blocking mode,
/// preserving the other status flags.
pub fn set_nonblocking(fd: BorrowedFd<'_>, nonblocking: bool) -> PalResult<()> {
    let flags = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) });
    if flags < 0 {
        return Err(last_error());
    }
    let flags = if nonblocking {
        flags | libc::O_NONBLOCK
    } else {
        flags & !libc::O_NONBLOCK
    };
    let rc = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags) });
    if rc < 0 {
        return Err(last_error());
    }
    Ok(())
}

/// Whether this host can query and change pipe capacities.
pub fn pipe_size_supported() -> bool {
    cfg!(any(target_os = "linux", target_os = "android"))
}

/// Capacity of a pipe, in bytes.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn get_pipe_size(fd: BorrowedFd<'_>) -> PalResult<usize> {
    let size = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETPIPE_SZ) });
    if size < 0 {
        return Err(last_error());
    }
    Ok(size as usize)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn get_pipe_size(_fd: BorrowedFd<'_>) -> PalResult<usize> {
    Err(PalError::NotSupported)
}

/// Resize a pipe; the kernel may round the capacity up. Returns the
/// actual new capacity.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn set_pipe_size(fd: BorrowedFd<'_>, size: usize) -> PalResult<usize> {
    let size = libc::c_int::try_from(size).map_err(|_| PalError::InvalidArgument)?;
    let actual = retry_eintr(|| unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETPIPE_SZ, size) });
    if actual < 0 {
        return Err(last_error());
    }
    Ok(actual as usize)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn set_pipe_size(_fd: BorrowedFd<'_>, _size: usize) -> PalResult<usize> {
    Err(PalError::NotSupported)
}

/// One descriptor in a [`poll`] set. `returned` is filled by the call.
#[derive(Clone, Copy, Debug)]
pub struct PollEntry {
    pub fd: RawFd,
    pub requested: PollEvents,
    pub returned: PollEvents,
}

impl PollEntry {
    pub fn new(fd: RawFd, requested: PollEvents) -> Self {
        PollEntry {
            fd,
            requested,
            returned: PollEvents::empty(),
        }
    }
}

/// Wait until a descriptor in the set is ready or the timeout elapses.
/// A negative timeout blocks indefinitely. Returns how many entries have
/// events set.
pub fn poll(entries: &mut [PollEntry], timeout_ms: i32) -> PalResult<usize> {
    let mut native: Vec<libc::pollfd> = entries
        .iter()
        .map(|entry| libc::pollfd {
            fd: entry.fd,
            events: poll_events_to_native(entry.requested),
            revents: 0,
        })
        .collect();

    let rc = retry_eintr(|| unsafe {
        libc::poll(native.as_mut_ptr(), native.len() as libc::nfds_t, timeout_ms)
    });
    if rc < 0 {
        return Err(last_error());
    }
    for (entry, native) in entries.iter_mut().zip(&native) {
        entry.returned = poll_events_from_native(native.revents);
    }
    Ok(rc as usize)
}

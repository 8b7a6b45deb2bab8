//! Positional scatter/gather I/O.
//!
//! Hosts with a reliable native vectored call use it directly. Everywhere
//! else the vector list is walked one positional call at a time, and the
//! loop reproduces native partial-transfer semantics exactly: an error
//! with no prior progress is an error, an error after progress returns the
//! partial total, and a short transfer stops the walk immediately (that is
//! how the native call reports end-of-file and signal interruption).
//!
//! The emulation loop is compiled on every host so its semantics stay
//! under test even where the native call is taken.

use std::io::{IoSlice, IoSliceMut};
use std::os::fd::BorrowedFd;

use pal_core::PalResult;

use crate::io::{pread, pwrite};

/// Scatter-read into `buffers` starting at `offset`. Returns total bytes
/// read; fewer than requested means end-of-file was reached.
pub fn read_vectored_at(
    fd: BorrowedFd<'_>,
    buffers: &mut [IoSliceMut<'_>],
    offset: i64,
) -> PalResult<usize> {
    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))]
    {
        use std::os::fd::AsRawFd;

        use crate::errno::last_error;
        use crate::retry::retry_eintr;

        // IoSliceMut is ABI-compatible with iovec.
        let count = retry_eintr(|| unsafe {
            libc::preadv(
                fd.as_raw_fd(),
                buffers.as_mut_ptr() as *mut libc::iovec,
                buffers.len() as libc::c_int,
                offset as libc::off_t,
            )
        });
        if count < 0 {
            return Err(last_error());
        }
        Ok(count as usize)
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    )))]
    {
        read_vectored_emulated(fd, buffers, offset)
    }
}

/// Gather-write from `buffers` starting at `offset`. Returns total bytes
/// written.
pub fn write_vectored_at(
    fd: BorrowedFd<'_>,
    buffers: &[IoSlice<'_>],
    offset: i64,
) -> PalResult<usize> {
    #[cfg(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))]
    {
        use std::os::fd::AsRawFd;

        use crate::errno::last_error;
        use crate::retry::retry_eintr;

        let count = retry_eintr(|| unsafe {
            libc::pwritev(
                fd.as_raw_fd(),
                buffers.as_ptr() as *const libc::iovec,
                buffers.len() as libc::c_int,
                offset as libc::off_t,
            )
        });
        if count < 0 {
            return Err(last_error());
        }
        Ok(count as usize)
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    )))]
    {
        write_vectored_emulated(fd, buffers, offset)
    }
}

#[allow(dead_code)]
pub(crate) fn read_vectored_emulated(
    fd: BorrowedFd<'_>,
    buffers: &mut [IoSliceMut<'_>],
    offset: i64,
) -> PalResult<usize> {
    let mut total = 0usize;
    for buffer in buffers {
        let requested = buffer.len();
        let current = match pread(fd, buffer, offset + total as i64) {
            Ok(count) => count,
            // An error only counts if nothing was transferred yet;
            // otherwise the progress so far is the result.
            Err(err) => return if total > 0 { Ok(total) } else { Err(err) },
        };
        total += current;
        // A short read means end-of-file; stop without touching the
        // remaining vector entries, as the native call would.
        if current != requested {
            return Ok(total);
        }
    }
    Ok(total)
}

#[allow(dead_code)]
pub(crate) fn write_vectored_emulated(
    fd: BorrowedFd<'_>,
    buffers: &[IoSlice<'_>],
    offset: i64,
) -> PalResult<usize> {
    let mut total = 0usize;
    for buffer in buffers {
        let requested = buffer.len();
        let current = match pwrite(fd, buffer, offset + total as i64) {
            Ok(count) => count,
            Err(err) => return if total > 0 { Ok(total) } else { Err(err) },
        };
        total += current;
        // A short write means the device or filesystem ran out of room;
        // stop as the native call would.
        if current != requested {
            return Ok(total);
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::io::{IoSlice, IoSliceMut};
    use std::io::Write;
    use std::os::fd::AsFd;

    use super::{read_vectored_emulated, write_vectored_emulated};

    #[test]
    fn emulated_read_stops_at_end_of_file() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"0123456789").unwrap();

        let mut first = [0u8; 4];
        let mut second = [0u8; 8];
        let mut third = [0u8; 4];
        let mut buffers = [
            IoSliceMut::new(&mut first),
            IoSliceMut::new(&mut second),
            IoSliceMut::new(&mut third),
        ];
        let total = read_vectored_emulated(file.as_fd(), &mut buffers, 0).unwrap();

        // Ten bytes exist: the first vector fills, the second comes up
        // short, and the third is never attempted.
        assert_eq!(total, 10);
        assert_eq!(&first, b"0123");
        assert_eq!(&second[..6], b"456789");
        assert_eq!(third, [0u8; 4]);
    }

    #[test]
    fn emulated_read_error_with_no_progress_is_an_error() {
        let file = tempfile::tempfile().unwrap();
        let mut buffer = [0u8; 4];
        let mut buffers = [IoSliceMut::new(&mut buffer)];
        // Reading a regular file at a negative offset fails immediately.
        assert!(read_vectored_emulated(file.as_fd(), &mut buffers, -1).is_err());
    }

    #[test]
    fn emulated_write_advances_the_offset_per_vector() {
        let mut file = tempfile::tempfile().unwrap();
        let buffers = [IoSlice::new(b"abcd"), IoSlice::new(b"efgh")];
        let total = write_vectored_emulated(file.as_fd(), &buffers, 2).unwrap();
        assert_eq!(total, 8);

        use std::io::{Read, Seek, SeekFrom};
        let mut content = Vec::new();
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_end(&mut content).unwrap();
        assert_eq!(&content[2..], b"abcdefgh");
    }
}

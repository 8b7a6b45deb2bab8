//! Directory enumeration cursor.
//!
//! Two incompatible native strategies hide behind one contract. Hosts in
//! the SysV line fill a cursor-owned scratch buffer through the reentrant
//! read call; everywhere else the streaming call hands back pointers into
//! libc-internal storage. Either way an entry's name is valid only until
//! the next `read` or `close` on the same cursor, which the borrow on
//! [`DirEntry`] makes compiler-checked.
//!
//! A cursor is `Send` but not `Sync`: the streaming strategy keeps per-
//! stream state inside libc, so reads on one cursor must be serialized by
//! the caller. `&mut self` on [`Dir::read`] enforces exactly that.

use std::mem;
use std::path::Path;
use std::ptr;

use pal_core::{EntryKind, PalError, PalResult};

use crate::errno::{errno, last_error, set_errno};
use crate::fs::cstr;

// Native records carry 64-bit fields (the inode at least).
#[cfg(any(target_os = "solaris", target_os = "illumos", target_os = "aix"))]
const DIRENT_ALIGNMENT: usize = 8;

// SysV-line hosts declare d_name as a one-element array; the real name
// storage extends past the struct.
#[cfg(any(target_os = "solaris", target_os = "illumos", target_os = "aix"))]
const NAME_HEADROOM: usize = 255;

/// One enumerated entry, borrowing cursor-owned storage.
#[derive(Debug)]
pub struct DirEntry<'a> {
    name: &'a [u8],
    kind: EntryKind,
}

impl<'a> DirEntry<'a> {
    /// Entry name, without any terminator. `.` and `..` are not filtered.
    pub fn name(&self) -> &'a [u8] {
        self.name
    }

    /// Inode type, [`EntryKind::Unknown`] on hosts without a typed entry
    /// field; resolve those with a status call on the joined path.
    pub fn kind(&self) -> EntryKind {
        self.kind
    }
}

/// Stateful enumeration handle over a directory's entries.
#[derive(Debug)]
pub struct Dir {
    dirp: *mut libc::DIR,
    #[cfg(any(target_os = "solaris", target_os = "illumos", target_os = "aix"))]
    scratch: Vec<u8>,
}

// A cursor may move between threads; concurrent reads on one cursor are
// rejected at compile time because `read` takes `&mut self`.
unsafe impl Send for Dir {}

impl Dir {
    /// Scratch capacity one cursor needs for the reentrant read call;
    /// zero on hosts using the streaming strategy.
    pub fn read_buffer_size() -> usize {
        #[cfg(any(target_os = "solaris", target_os = "illumos", target_os = "aix"))]
        {
            mem::size_of::<libc::dirent>() + NAME_HEADROOM + DIRENT_ALIGNMENT - 1
        }
        #[cfg(not(any(target_os = "solaris", target_os = "illumos", target_os = "aix")))]
        {
            0
        }
    }

    /// Open a cursor over `path`.
    pub fn open(path: &Path) -> PalResult<Dir> {
        let path = cstr(path)?;
        // EINTR is not documented for opendir but shows up in practice.
        let dirp = loop {
            let dirp = unsafe { libc::opendir(path.as_ptr()) };
            if !dirp.is_null() {
                break dirp;
            }
            if errno() != libc::EINTR {
                return Err(last_error());
            }
        };
        Ok(Dir {
            dirp,
            #[cfg(any(target_os = "solaris", target_os = "illumos", target_os = "aix"))]
            scratch: vec![0; Self::read_buffer_size()],
        })
    }

    /// Read the next entry. `Ok(None)` is end-of-stream; reading past it
    /// keeps returning end-of-stream.
    #[cfg(not(any(target_os = "solaris", target_os = "illumos", target_os = "aix")))]
    pub fn read(&mut self) -> PalResult<Option<DirEntry<'_>>> {
        // A null return is ambiguous here: end-of-stream and failure look
        // identical. Clearing errno first and re-checking it afterwards is
        // the only way to tell them apart; collapsing this protocol would
        // turn legitimate end-of-stream into an error.
        set_errno(0);
        let entry = unsafe { libc::readdir(self.dirp) };
        if entry.is_null() {
            return match errno() {
                0 => Ok(None),
                err => Err(PalError::Os(err)),
            };
        }
        Ok(Some(unsafe { convert_entry(entry) }))
    }

    /// Read the next entry through the reentrant call, filling the
    /// cursor-owned scratch buffer.
    #[cfg(any(target_os = "solaris", target_os = "illumos", target_os = "aix"))]
    pub fn read(&mut self) -> PalResult<Option<DirEntry<'_>>> {
        let base = self.scratch.as_mut_ptr() as usize;
        let aligned = (base + DIRENT_ALIGNMENT - 1) & !(DIRENT_ALIGNMENT - 1);
        if aligned + mem::size_of::<libc::dirent>() > base + self.scratch.len() {
            return Err(PalError::Os(libc::ERANGE));
        }
        let entry = aligned as *mut libc::dirent;
        let mut result: *mut libc::dirent = ptr::null_mut();

        #[cfg(target_os = "aix")]
        {
            // This host reports end-of-stream and failure identically: the
            // same non-zero return with a null result. Clear errno before
            // the call and re-check it after to disambiguate.
            set_errno(0);
            let rc = unsafe { libc::readdir_r(self.dirp, entry, &mut result) };
            if rc != 0 {
                return match errno() {
                    0 => Ok(None),
                    err => Err(PalError::Os(err)),
                };
            }
        }
        #[cfg(not(target_os = "aix"))]
        {
            // EINTR is not documented for readdir_r but shows up in
            // practice. The call reports failure through its return value,
            // not errno.
            let rc = loop {
                let rc = unsafe { libc::readdir_r(self.dirp, entry, &mut result) };
                if rc == 0 || errno() != libc::EINTR {
                    break rc;
                }
            };
            if rc != 0 {
                return Err(PalError::Os(rc));
            }
            if result.is_null() {
                return Ok(None);
            }
        }

        Ok(Some(unsafe { convert_entry(entry) }))
    }

    /// Release the cursor. An interrupted close still releases the native
    /// stream and reports success.
    pub fn close(mut self) -> PalResult<()> {
        let dirp = mem::replace(&mut self.dirp, ptr::null_mut());
        drop(self);
        let rc = unsafe { libc::closedir(dirp) };
        if rc < 0 && errno() != libc::EINTR {
            return Err(last_error());
        }
        Ok(())
    }
}

impl Drop for Dir {
    fn drop(&mut self) {
        if !self.dirp.is_null() {
            unsafe {
                libc::closedir(self.dirp);
            }
        }
    }
}

/// Lift a native record into the canonical entry. The caller guarantees
/// `entry` stays valid for the chosen lifetime.
unsafe fn convert_entry<'a>(entry: *const libc::dirent) -> DirEntry<'a> {
    DirEntry {
        name: entry_name(entry),
        kind: entry_kind(entry),
    }
}

// These hosts record the name length explicitly.
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
unsafe fn entry_name<'a>(entry: *const libc::dirent) -> &'a [u8] {
    std::slice::from_raw_parts((*entry).d_name.as_ptr() as *const u8, (*entry).d_namlen as usize)
}

// No recorded length; scan for the terminator.
#[cfg(not(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
unsafe fn entry_name<'a>(entry: *const libc::dirent) -> &'a [u8] {
    std::ffi::CStr::from_ptr((*entry).d_name.as_ptr()).to_bytes()
}

#[cfg(not(any(target_os = "solaris", target_os = "illumos", target_os = "aix")))]
unsafe fn entry_kind(entry: *const libc::dirent) -> EntryKind {
    EntryKind::from_native((*entry).d_type)
}

// No d_type on these hosts; every entry is Unknown and callers stat to
// resolve the true type.
#[cfg(any(target_os = "solaris", target_os = "illumos", target_os = "aix"))]
unsafe fn entry_kind(_entry: *const libc::dirent) -> EntryKind {
    EntryKind::Unknown
}

//! Portable-to-native flag translation.
//!
//! Validation happens before any native call: unknown bits are rejected at
//! construction of the portable sets, and the access-mode field is checked
//! here. Values with no native equivalent on a given target are dropped
//! only when another mechanism supplies the semantics (close-on-exec on
//! pipes is applied through a descriptor-flag call where creation-time
//! support is missing).

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
use pal_core::FileAdvice;
use pal_core::{
    AccessChecks, FlockKind, LockKind, MemoryFlags, MemoryProtection, OpenAccessMode, OpenFlags,
    PollEvents, SeekWhence, SyncFlags,
};
use pal_core::PalResult;

pub(crate) fn open_flags_to_native(flags: OpenFlags) -> PalResult<libc::c_int> {
    let mut native = match flags.access_mode()? {
        OpenAccessMode::ReadOnly => libc::O_RDONLY,
        OpenAccessMode::WriteOnly => libc::O_WRONLY,
        OpenAccessMode::ReadWrite => libc::O_RDWR,
    };
    if flags.contains(OpenFlags::CLOEXEC) {
        native |= libc::O_CLOEXEC;
    }
    if flags.contains(OpenFlags::CREATE) {
        native |= libc::O_CREAT;
    }
    if flags.contains(OpenFlags::EXCLUSIVE) {
        native |= libc::O_EXCL;
    }
    if flags.contains(OpenFlags::TRUNCATE) {
        native |= libc::O_TRUNC;
    }
    if flags.contains(OpenFlags::SYNC) {
        native |= libc::O_SYNC;
    }
    Ok(native)
}

pub(crate) fn protection_to_native(protection: MemoryProtection) -> libc::c_int {
    if protection.is_empty() {
        return libc::PROT_NONE;
    }
    let mut native = 0;
    if protection.contains(MemoryProtection::READ) {
        native |= libc::PROT_READ;
    }
    if protection.contains(MemoryProtection::WRITE) {
        native |= libc::PROT_WRITE;
    }
    if protection.contains(MemoryProtection::EXEC) {
        native |= libc::PROT_EXEC;
    }
    native
}

pub(crate) fn map_flags_to_native(flags: MemoryFlags) -> libc::c_int {
    let mut native = 0;
    if flags.contains(MemoryFlags::SHARED) {
        native |= libc::MAP_SHARED;
    }
    if flags.contains(MemoryFlags::PRIVATE) {
        native |= libc::MAP_PRIVATE;
    }
    if flags.contains(MemoryFlags::ANONYMOUS) {
        native |= libc::MAP_ANON;
    }
    native
}

pub(crate) fn sync_flags_to_native(flags: SyncFlags) -> libc::c_int {
    let mut native = 0;
    if flags.contains(SyncFlags::SYNC) {
        native |= libc::MS_SYNC;
    }
    if flags.contains(SyncFlags::ASYNC) {
        native |= libc::MS_ASYNC;
    }
    if flags.contains(SyncFlags::INVALIDATE) {
        native |= libc::MS_INVALIDATE;
    }
    native
}

// Native lock-type values are not portable across OS families even though
// the concept is standard, hence the explicit switch.
pub(crate) fn lock_kind_to_native(kind: LockKind) -> libc::c_int {
    match kind {
        LockKind::Read => libc::F_RDLCK as libc::c_int,
        LockKind::Write => libc::F_WRLCK as libc::c_int,
        LockKind::Unlock => libc::F_UNLCK as libc::c_int,
    }
}

pub(crate) fn flock_operation_to_native(kind: FlockKind, nonblocking: bool) -> libc::c_int {
    let mut op = match kind {
        FlockKind::Shared => libc::LOCK_SH,
        FlockKind::Exclusive => libc::LOCK_EX,
        FlockKind::Unlock => libc::LOCK_UN,
    };
    if nonblocking {
        op |= libc::LOCK_NB;
    }
    op
}

pub(crate) fn whence_to_native(whence: SeekWhence) -> libc::c_int {
    match whence {
        SeekWhence::Set => libc::SEEK_SET,
        SeekWhence::Current => libc::SEEK_CUR,
        SeekWhence::End => libc::SEEK_END,
    }
}

pub(crate) fn access_checks_to_native(checks: AccessChecks) -> libc::c_int {
    let mut native = libc::F_OK;
    if checks.contains(AccessChecks::EXECUTE) {
        native |= libc::X_OK;
    }
    if checks.contains(AccessChecks::WRITE) {
        native |= libc::W_OK;
    }
    if checks.contains(AccessChecks::READ) {
        native |= libc::R_OK;
    }
    native
}

// The native advice constants differ per platform; hosts without the
// advise call report unsupported before translation is ever reached.
#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
pub(crate) fn advice_to_native(advice: FileAdvice) -> libc::c_int {
    match advice {
        FileAdvice::Normal => libc::POSIX_FADV_NORMAL,
        FileAdvice::Random => libc::POSIX_FADV_RANDOM,
        FileAdvice::Sequential => libc::POSIX_FADV_SEQUENTIAL,
        FileAdvice::WillNeed => libc::POSIX_FADV_WILLNEED,
        FileAdvice::DontNeed => libc::POSIX_FADV_DONTNEED,
        FileAdvice::NoReuse => libc::POSIX_FADV_NOREUSE,
    }
}

pub(crate) fn poll_events_to_native(events: PollEvents) -> libc::c_short {
    let mut native = 0;
    if events.contains(PollEvents::READABLE) {
        native |= libc::POLLIN;
    }
    if events.contains(PollEvents::PRIORITY) {
        native |= libc::POLLPRI;
    }
    if events.contains(PollEvents::WRITABLE) {
        native |= libc::POLLOUT;
    }
    if events.contains(PollEvents::ERROR) {
        native |= libc::POLLERR;
    }
    if events.contains(PollEvents::HANGUP) {
        native |= libc::POLLHUP;
    }
    if events.contains(PollEvents::INVALID) {
        native |= libc::POLLNVAL;
    }
    native
}

pub(crate) fn poll_events_from_native(revents: libc::c_short) -> PollEvents {
    let mut events = PollEvents::empty();
    if revents & libc::POLLIN != 0 {
        events |= PollEvents::READABLE;
    }
    if revents & libc::POLLPRI != 0 {
        events |= PollEvents::PRIORITY;
    }
    if revents & libc::POLLOUT != 0 {
        events |= PollEvents::WRITABLE;
    }
    if revents & libc::POLLERR != 0 {
        events |= PollEvents::ERROR;
    }
    if revents & libc::POLLHUP != 0 {
        events |= PollEvents::HANGUP;
    }
    if revents & libc::POLLNVAL != 0 {
        events |= PollEvents::INVALID;
    }
    events
}

//! Portable vocabulary for the host platform layer.
//!
//! This crate defines the platform-independent side of the contract: flag
//! sets with stable bit numbering, canonical status and directory-entry
//! records, the error type, and the canonical filesystem-type numeric
//! space. Nothing here touches the OS; `pal-unix` is the syscall-facing
//! side.

mod dirent;
mod error;
mod flags;
mod fstype;
mod status;

pub use dirent::EntryKind;
pub use error::{PalError, PalResult};
pub use flags::{
    AccessChecks, FdFlags, FileAdvice, FlockKind, LockKind, MemoryAdvice, MemoryFlags,
    MemoryProtection, OpenAccessMode, OpenFlags, PollEvents, SeekWhence, SyncFlags, SysConfName,
};
pub use fstype::{filesystem_type_from_name, UNKNOWN_FILESYSTEM_TYPE};
pub use status::{FileStatus, TimeSpec};

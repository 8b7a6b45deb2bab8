//! Unix syscall layer behind the portable platform contract.
//!
//! One fixed call surface over the POSIX family: mainstream Linux hosts,
//! the BSD-derived systems, the SysV descendants, and constrained targets.
//! Every blocking call runs under the interruption retry discipline, flag
//! vocabularies are validated and translated before any native call, and
//! structured results pass through the status normalizers. The portable
//! types live in `pal-core` and are re-exported here.
//!
//! Operations on distinct descriptors or cursors are safe to call from
//! multiple threads; per-descriptor serialization is the caller's job.
//! Every resource-acquiring operation has a paired explicit release
//! (`io::close`, `dir::Dir::close`, `mmap::munmap`); the `Drop` impls are
//! a last-resort backstop that cannot report errors.

mod errno;
mod flags;
mod retry;

pub mod copy;
pub mod dir;
pub mod fs;
pub mod fstype;
pub mod io;
pub mod mmap;
pub mod stat;
pub mod vectored;

pub use errno::error_is_unsupported;
pub use pal_core::*;

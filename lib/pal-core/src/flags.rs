//! Portable flag vocabulary with stable, platform-independent numbering.
//!
//! Raw bit values never change across hosts; the Unix side translates them
//! to whatever the local headers define. Constructing a set from raw bits
//! rejects unknown bits instead of silently ignoring them.

use bitflags::bitflags;

use crate::{PalError, PalResult};

bitflags! {
    /// Open-mode flags.
    ///
    /// The low nibble is a two-bit access-mode field (read-only is the
    /// zero value); the remaining bits are independent auxiliary flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const WRITE_ONLY = 0x0001;
        const READ_WRITE = 0x0002;
        const CLOEXEC = 0x0010;
        const CREATE = 0x0020;
        const EXCLUSIVE = 0x0040;
        const TRUNCATE = 0x0080;
        const SYNC = 0x0100;
    }
}

/// Access-mode field of [`OpenFlags`]; exactly one per open request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenAccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl OpenFlags {
    /// Read-only access is the absence of both write bits.
    pub const READ_ONLY: OpenFlags = OpenFlags::empty();

    /// Build a flag set from raw bits, rejecting unknown bits.
    pub fn from_raw(bits: u32) -> PalResult<Self> {
        Self::from_bits(bits).ok_or(PalError::InvalidArgument)
    }

    /// Extract the access-mode field. Setting both write bits is invalid.
    pub fn access_mode(self) -> PalResult<OpenAccessMode> {
        match (
            self.contains(OpenFlags::WRITE_ONLY),
            self.contains(OpenFlags::READ_WRITE),
        ) {
            (false, false) => Ok(OpenAccessMode::ReadOnly),
            (true, false) => Ok(OpenAccessMode::WriteOnly),
            (false, true) => Ok(OpenAccessMode::ReadWrite),
            (true, true) => Err(PalError::InvalidArgument),
        }
    }
}

bitflags! {
    /// Page protection for a mapped region. The empty set is "no access",
    /// a valid request in its own right.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MemoryProtection: u32 {
        const READ = 0x1;
        const WRITE = 0x2;
        const EXEC = 0x4;
    }
}

impl MemoryProtection {
    pub fn from_raw(bits: u32) -> PalResult<Self> {
        Self::from_bits(bits).ok_or(PalError::InvalidArgument)
    }
}

bitflags! {
    /// Visibility of a mapped region. `SHARED` and `PRIVATE` are mutually
    /// exclusive; the host rejects the combination.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MemoryFlags: u32 {
        const SHARED = 0x01;
        const PRIVATE = 0x02;
        const ANONYMOUS = 0x10;
    }
}

impl MemoryFlags {
    pub fn from_raw(bits: u32) -> PalResult<Self> {
        Self::from_bits(bits).ok_or(PalError::InvalidArgument)
    }
}

bitflags! {
    /// Flush mode for a mapped region.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SyncFlags: u32 {
        const SYNC = 0x1;
        const ASYNC = 0x2;
        const INVALIDATE = 0x4;
    }
}

impl SyncFlags {
    pub fn from_raw(bits: u32) -> PalResult<Self> {
        Self::from_bits(bits).ok_or(PalError::InvalidArgument)
    }
}

bitflags! {
    /// Checks performed by an access query. The empty set asks only for
    /// existence.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AccessChecks: u32 {
        const EXECUTE = 0x1;
        const WRITE = 0x2;
        const READ = 0x4;
    }
}

impl AccessChecks {
    pub const EXISTS: AccessChecks = AccessChecks::empty();
}

bitflags! {
    /// Per-descriptor flags (as opposed to per-open-file-description
    /// status flags).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FdFlags: u32 {
        const CLOEXEC = 0x1;
    }
}

bitflags! {
    /// Poll readiness events.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PollEvents: u16 {
        const READABLE = 0x01;
        const PRIORITY = 0x02;
        const WRITABLE = 0x04;
        const ERROR = 0x08;
        const HANGUP = 0x10;
        const INVALID = 0x20;
    }
}

/// Byte-range lock kind. Native lock-type constants differ across OS
/// families, so the kind is an enum translated with an explicit three-way
/// switch rather than a pass-through value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockKind {
    Read,
    Write,
    Unlock,
}

/// Whole-file advisory lock kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlockKind {
    Shared,
    Exclusive,
    Unlock,
}

/// Origin for a seek operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekWhence {
    Set,
    Current,
    End,
}

/// Access-pattern hint for file extents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileAdvice {
    Normal,
    Random,
    Sequential,
    WillNeed,
    DontNeed,
    NoReuse,
}

/// Hint for a mapped memory region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryAdvice {
    DontFork,
}

/// System configuration values the layer exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SysConfName {
    ClockTicksPerSecond,
    PageSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_open_bits_are_rejected() {
        assert_eq!(OpenFlags::from_raw(0x8000), Err(PalError::InvalidArgument));
        assert_eq!(OpenFlags::from_raw(0x0004), Err(PalError::InvalidArgument));
    }

    #[test]
    fn access_modes_are_mutually_exclusive() {
        assert_eq!(
            OpenFlags::READ_ONLY.access_mode(),
            Ok(OpenAccessMode::ReadOnly)
        );
        assert_eq!(
            OpenFlags::WRITE_ONLY.access_mode(),
            Ok(OpenAccessMode::WriteOnly)
        );
        assert_eq!(
            OpenFlags::READ_WRITE.access_mode(),
            Ok(OpenAccessMode::ReadWrite)
        );
        assert_eq!(
            (OpenFlags::WRITE_ONLY | OpenFlags::READ_WRITE).access_mode(),
            Err(PalError::InvalidArgument)
        );
    }

    #[test]
    fn auxiliary_bits_round_trip_through_raw() {
        let flags = OpenFlags::READ_WRITE | OpenFlags::CREATE | OpenFlags::CLOEXEC;
        assert_eq!(OpenFlags::from_raw(flags.bits()), Ok(flags));
    }

    #[test]
    fn no_access_protection_is_a_valid_empty_set() {
        assert_eq!(MemoryProtection::from_raw(0), Ok(MemoryProtection::empty()));
        assert_eq!(
            MemoryProtection::from_raw(0x8),
            Err(PalError::InvalidArgument)
        );
    }
}

//! Directory-entry type classification.

/// Inode type reported by directory enumeration.
///
/// Discriminants follow the mainstream `d_type` numbering. Hosts without a
/// typed entry field report [`Unknown`] for every entry; callers resolve
/// the true type with a separate status call.
///
/// [`Unknown`]: EntryKind::Unknown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryKind {
    Unknown = 0,
    Fifo = 1,
    CharacterDevice = 2,
    Directory = 4,
    BlockDevice = 6,
    RegularFile = 8,
    Symlink = 10,
    Socket = 12,
    Whiteout = 14,
}

impl EntryKind {
    /// Classify a native `d_type` value; anything unrecognized maps to
    /// [`EntryKind::Unknown`].
    pub fn from_native(value: u8) -> Self {
        match value {
            1 => EntryKind::Fifo,
            2 => EntryKind::CharacterDevice,
            4 => EntryKind::Directory,
            6 => EntryKind::BlockDevice,
            8 => EntryKind::RegularFile,
            10 => EntryKind::Symlink,
            12 => EntryKind::Socket,
            14 => EntryKind::Whiteout,
            _ => EntryKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_values_round_trip() {
        for kind in [
            EntryKind::Fifo,
            EntryKind::CharacterDevice,
            EntryKind::Directory,
            EntryKind::BlockDevice,
            EntryKind::RegularFile,
            EntryKind::Symlink,
            EntryKind::Socket,
            EntryKind::Whiteout,
        ] {
            assert_eq!(EntryKind::from_native(kind as u8), kind);
        }
    }

    #[test]
    fn unrecognized_values_classify_as_unknown() {
        assert_eq!(EntryKind::from_native(3), EntryKind::Unknown);
        assert_eq!(EntryKind::from_native(255), EntryKind::Unknown);
    }
}

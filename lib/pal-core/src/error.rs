//! Canonical error type for the platform layer.

use thiserror::Error;

pub type PalResult<T> = Result<T, PalError>;

/// Error reported by a platform-layer operation.
///
/// The host's native error-code space is carried unchanged in [`Os`];
/// [`NotSupported`] and [`InvalidArgument`] are the two
/// implementation-defined extensions. Signal interruption is absorbed by
/// the retry discipline and never appears here.
///
/// [`Os`]: PalError::Os
/// [`NotSupported`]: PalError::NotSupported
/// [`InvalidArgument`]: PalError::InvalidArgument
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PalError {
    /// The requested capability does not exist on this host. Advisory
    /// callers may ignore it.
    #[error("not supported on this platform")]
    NotSupported,
    /// Malformed arguments, rejected before any native call.
    #[error("invalid argument combination")]
    InvalidArgument,
    /// A native error code, propagated unchanged in value and meaning.
    #[error("{}", std::io::Error::from_raw_os_error(*.0))]
    Os(i32),
}

impl PalError {
    /// The native error code, if this error came from the host.
    pub fn os_code(self) -> Option<i32> {
        match self {
            PalError::Os(code) => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_code_only_for_native_errors() {
        assert_eq!(PalError::Os(2).os_code(), Some(2));
        assert_eq!(PalError::NotSupported.os_code(), None);
        assert_eq!(PalError::InvalidArgument.os_code(), None);
    }
}

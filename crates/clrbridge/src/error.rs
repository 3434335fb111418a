//! Error types for clrbridge.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("CLR hosting library is not available in this process")]
    HostingUnavailable,

    #[error("no runtime host could be derived for this runtime")]
    HostUnavailable,

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsError(#[from] windows::core::Error),

    /// Reserved for consumer implementations of
    /// [`RuntimeBinding`](crate::RuntimeBinding); the built-in bindings
    /// never produce it.
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Error types for batrix

use thiserror::Error;

/// Result type alias using batrix's Error
pub type Result<T> = std::result::Result<T, Error>;

/// LAPACK-style `info` code reported for a failed device allocation
pub const INFO_DEVICE_ALLOC: i64 = -113;

/// LAPACK-style `info` code reported for backend and internal failures
pub const INFO_BACKEND: i64 = -100;

/// Errors that can occur in batrix operations
#[derive(Error, Debug)]
pub enum Error {
    /// An argument of a public entry point failed validation
    ///
    /// Raised on the host before any device work is enqueued. `position` is
    /// the 1-based ordinal of the offending argument in the entry point's
    /// signature, matching the classic LAPACK `INFO = -i` convention.
    #[error("Invalid argument {position} ('{arg}'): {reason}")]
    InvalidArgument {
        /// 1-based ordinal of the argument
        position: usize,
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// A matrix container was built with an impossible layout
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(position: usize, arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            position,
            arg,
            reason: reason.into(),
        }
    }

    /// LAPACK-style `info` value for this error
    ///
    /// | Error | info |
    /// |-------|------|
    /// | `InvalidArgument` | `-position` |
    /// | `OutOfMemory` | [`INFO_DEVICE_ALLOC`] |
    /// | everything else | [`INFO_BACKEND`] |
    pub fn info(&self) -> i64 {
        match self {
            Self::InvalidArgument { position, .. } => -(*position as i64),
            Self::OutOfMemory { .. } => INFO_DEVICE_ALLOC,
            _ => INFO_BACKEND,
        }
    }

    /// Ordinal of the offending argument, if this is an argument error
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::InvalidArgument { position, .. } => Some(*position),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_codes() {
        let err = Error::invalid_argument(9, "a", "leading dimension too small");
        assert_eq!(err.info(), -9);
        assert_eq!(err.position(), Some(9));

        let err = Error::OutOfMemory { size: 64 };
        assert_eq!(err.info(), INFO_DEVICE_ALLOC);
        assert_eq!(err.position(), None);

        assert_eq!(Error::Internal("x".into()).info(), INFO_BACKEND);
    }

    #[test]
    fn test_display_names_argument() {
        let err = Error::invalid_argument(12, "workspace", "workspace too small");
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("workspace too small"));
    }
}

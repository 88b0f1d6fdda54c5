//! Error types for the NFIQ2 binding.

use std::path::PathBuf;

use thiserror::Error;

use crate::translate::RawCode;

/// Result type for quality computation.
pub type Result<T> = std::result::Result<T, QualityError>;

/// The native library or one of its symbols could not be brought up.
///
/// Load failures are sticky for the process, so this type is `Clone`: every
/// caller racing the first load receives an identical copy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Library file missing, or present but not mappable (architecture/ABI mismatch)
    #[error("failed to load native library {path}: {reason}")]
    NotFound { path: PathBuf, reason: String },

    /// A required entry point is absent from the loaded library
    #[error("native library is missing symbol `{symbol}`: {reason}")]
    MissingSymbol {
        symbol: &'static str,
        reason: String,
    },

    /// Binding configuration could not be read or is invalid
    #[error("invalid binding configuration: {0}")]
    Config(String),

    /// `nfiq2wrapper_create` returned NULL (model failed to initialize)
    #[error("native library failed to create an NFIQ2 context")]
    ContextInit,
}

impl From<ConfigError> for LoadError {
    fn from(err: ConfigError) -> Self {
        LoadError::Config(err.to_string())
    }
}

/// The caller's image does not satisfy the marshaling contract.
///
/// Nothing has crossed the boundary when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("image dimensions must be positive, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("image {width}x{height} exceeds the maximum of {max_width}x{max_height}")]
    TooLarge {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },

    #[error("unsupported pixel depth {0:?}; only 8-bit grayscale is accepted")]
    UnsupportedDepth(crate::types::PixelDepth),

    #[error("unsupported resolution {0} PPI; NFIQ2 requires 500 PPI")]
    UnsupportedResolution(u16),

    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
}

/// Error returned by [`compute_quality`](crate::compute_quality).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QualityError {
    /// Native library unavailable for this process
    #[error("NFIQ2 unavailable: {0}")]
    Unavailable(#[from] LoadError),

    /// Image rejected before the native call
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// No fingerprint / no minutiae found in the image
    #[error("no fingerprint detected")]
    NoFingerprint,

    /// NFIQ2 failed internally while computing the score
    #[error("native quality computation failed")]
    ComputationFailed,

    /// The native side refused arguments that passed validation
    #[error("native library rejected the marshaled arguments")]
    NativeRejected,

    /// Native measure output could not be read
    #[error("malformed native output: {0}")]
    MalformedOutput(String),

    /// Status/score pair outside the native contract
    #[error("unexpected native result: {0}")]
    Unexpected(RawCode),
}

/// Stable numeric error classes for the host C ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorKind {
    None = 0,
    Unavailable = 1,
    InvalidInput = 2,
    NoFingerprint = 3,
    ComputationFailed = 4,
    NativeRejected = 5,
    MalformedOutput = 6,
    Unexpected = 7,
}

impl QualityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QualityError::Unavailable(_) => ErrorKind::Unavailable,
            QualityError::InvalidInput(_) => ErrorKind::InvalidInput,
            QualityError::NoFingerprint => ErrorKind::NoFingerprint,
            QualityError::ComputationFailed => ErrorKind::ComputationFailed,
            QualityError::NativeRejected => ErrorKind::NativeRejected,
            QualityError::MalformedOutput(_) => ErrorKind::MalformedOutput,
            QualityError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        let err: QualityError = LoadError::ContextInit.into();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        let err: QualityError = ValidationError::UnsupportedResolution(1000).into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("1000 PPI"));
    }

    #[test]
    fn test_config_error_becomes_load_error() {
        let err: LoadError = ConfigError::Invalid("unknown concurrency policy 'x'".into()).into();
        assert_eq!(
            err,
            LoadError::Config("invalid configuration: unknown concurrency policy 'x'".into())
        );
        assert_eq!(QualityError::from(err).kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn test_load_error_display_names_symbol() {
        let err = LoadError::MissingSymbol {
            symbol: "nfiq2wrapper_compute",
            reason: "undefined symbol".into(),
        };
        assert!(err.to_string().contains("nfiq2wrapper_compute"));
    }
}

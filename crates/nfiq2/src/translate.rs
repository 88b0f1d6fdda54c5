//! Native status/score translation.
//!
//! The wrapper reports a status code and, on success, a unified score.
//! Every pair maps to exactly one outcome; pairs outside the pinned contract
//! surface as [`QualityError::Unexpected`] instead of being clamped.

use std::fmt;

use crate::error::QualityError;

/// `nfiq2wrapper_compute` completed.
pub const STATUS_OK: i32 = 0;
/// Null argument or `size != cols * rows`.
pub const STATUS_INVALID_ARGS: i32 = 1;
/// NFIQ2 threw during feature extraction or model evaluation.
pub const STATUS_INTERNAL: i32 = 2;

/// No minutiae found; NFIQ2 gives up on the image.
pub const SCORE_NO_FINGERPRINT: u32 = 0;
/// Lowest and highest real scores.
pub const SCORE_MIN: u32 = 1;
pub const SCORE_MAX: u32 = 100;
/// ISO/IEC 29794-1 "failure to compute".
pub const SCORE_FAILURE: u32 = 255;

/// Raw status and score as returned by the native call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCode {
    pub status: i32,
    pub score: u32,
}

impl RawCode {
    pub fn new(status: i32, score: u32) -> Self {
        Self { status, score }
    }
}

impl fmt::Display for RawCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status={} score={}", self.status, self.score)
    }
}

/// Map a raw native result to a validated score or a typed error.
pub fn translate(raw: RawCode) -> Result<u8, QualityError> {
    match (raw.status, raw.score) {
        (STATUS_OK, SCORE_MIN..=SCORE_MAX) => Ok(raw.score as u8),
        (STATUS_OK, SCORE_NO_FINGERPRINT) => Err(QualityError::NoFingerprint),
        (STATUS_OK, SCORE_FAILURE) => Err(QualityError::ComputationFailed),
        (STATUS_INVALID_ARGS, _) => Err(QualityError::NativeRejected),
        (STATUS_INTERNAL, _) => Err(QualityError::ComputationFailed),
        _ => Err(QualityError::Unexpected(raw)),
    }
}

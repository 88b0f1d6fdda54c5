//! C-compatible interface for non-Rust hosts.
//!
//! Wraps [`compute_quality`] so foreign callers never touch the native
//! wrapper's own symbols.
//!
//! # Memory Ownership Rules
//!
//! - `Nfiq2ResultC` and everything it points to is owned by the caller
//! - `nfiq2_result_free()` must be called exactly once per result
//! - Pixel data is borrowed for the duration of the call only
//!
//! # Safety
//!
//! Null pointers are rejected before any slice is built. The caller is
//! responsible for `pixels` pointing to at least `len` readable bytes.

use std::os::raw::c_char;
use std::ptr;
use std::slice;

use nfiq2_ffi_common::{
    cstring_new_or_empty, free_boxed_slice, free_cstring, vec_into_raw, FfiResult,
};

use crate::error::{ErrorKind, QualityError};
use crate::invoker::compute_quality;
use crate::types::{ImageDescriptor, NamedValue, QualityOptions, QualityResult};

/// C-compatible named value
#[repr(C)]
pub struct NamedValueC {
    /// Owned, freed with the result
    pub name: *mut c_char,
    pub value: f64,
}

/// C-compatible quality result
#[repr(C)]
pub struct Nfiq2ResultC {
    /// True if a score was produced
    pub success: bool,
    /// `ErrorKind` discriminant, 0 on success
    pub error_kind: i32,
    /// Error message if success is false (owned)
    pub error_msg: *mut c_char,
    /// Unified quality score 1..=100, 0 on failure
    pub score: u32,
    pub actionable: *mut NamedValueC,
    pub actionable_len: usize,
    pub features: *mut NamedValueC,
    pub features_len: usize,
}

impl Nfiq2ResultC {
    fn success(result: QualityResult) -> Self {
        let (actionable, features) = match result.measures {
            Some(m) => (to_c_values(m.actionable), to_c_values(m.features)),
            None => ((ptr::null_mut(), 0), (ptr::null_mut(), 0)),
        };

        Self {
            success: true,
            error_kind: ErrorKind::None as i32,
            error_msg: ptr::null_mut(),
            score: u32::from(result.score),
            actionable: actionable.0,
            actionable_len: actionable.1,
            features: features.0,
            features_len: features.1,
        }
    }

    fn failure(err: &QualityError) -> Self {
        Self::error(&err.to_string(), err.kind() as i32)
    }
}

impl FfiResult for Nfiq2ResultC {
    const ERROR_FALLBACK: &'static str = "quality computation failed";

    fn error_fields(error_msg: *mut c_char, error_kind: i32) -> Self {
        Self {
            success: false,
            error_kind,
            error_msg,
            score: 0,
            actionable: ptr::null_mut(),
            actionable_len: 0,
            features: ptr::null_mut(),
            features_len: 0,
        }
    }
}

fn to_c_values(values: Vec<NamedValue>) -> (*mut NamedValueC, usize) {
    vec_into_raw(
        values
            .into_iter()
            .map(|v| NamedValueC {
                name: cstring_new_or_empty(&v.name),
                value: v.value,
            })
            .collect(),
    )
}

unsafe fn free_c_values(values: *mut NamedValueC, len: usize) {
    if values.is_null() || len == 0 {
        return;
    }
    unsafe {
        for v in slice::from_raw_parts(values, len) {
            free_cstring(v.name);
        }
        free_boxed_slice(values, len);
    }
}

/// Score an 8-bit grayscale image.
///
/// # Arguments
/// - `pixels`: row-major pixel data, `len` bytes
/// - `width`, `height`: image dimensions in pixels
/// - `ppi`: capture resolution (NFIQ2 requires 500)
/// - `collect_measures`: also return actionable feedback and features
///
/// # Returns
/// `Nfiq2ResultC`; caller must call `nfiq2_result_free`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn nfiq2_compute_quality(
    pixels: *const u8,
    len: usize,
    width: u32,
    height: u32,
    ppi: u16,
    collect_measures: bool,
) -> Nfiq2ResultC {
    if pixels.is_null() {
        return Nfiq2ResultC::error("null pixel pointer", ErrorKind::InvalidInput as i32);
    }

    let pixels = unsafe { slice::from_raw_parts(pixels, len) };
    let image = ImageDescriptor::gray8(width, height, pixels);
    let options = QualityOptions {
        ppi,
        collect_measures,
    };

    match compute_quality(&image, &options) {
        Ok(result) => Nfiq2ResultC::success(result),
        Err(e) => Nfiq2ResultC::failure(&e),
    }
}

/// Free an `Nfiq2ResultC` and all contained data.
#[no_mangle]
pub extern "C" fn nfiq2_result_free(result: Nfiq2ResultC) {
    unsafe {
        free_cstring(result.error_msg);
        free_c_values(result.actionable, result.actionable_len);
        free_c_values(result.features, result.features_len);
    }
}

/// Clear a sticky library load failure. Returns true if one was cleared.
#[no_mangle]
pub extern "C" fn nfiq2_force_recheck() -> bool {
    crate::handle::force_recheck()
}

nfiq2_ffi_common::define_string_free!(nfiq2_string_free);

nfiq2_ffi_common::define_version_fn!(nfiq2_binding_version);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QualityMeasures;
    use std::ffi::CStr;

    #[test]
    fn test_null_pixels_rejected() {
        let result = nfiq2_compute_quality(ptr::null(), 0, 300, 400, 500, true);
        assert!(!result.success);
        assert_eq!(result.error_kind, ErrorKind::InvalidInput as i32);
        let msg = unsafe { CStr::from_ptr(result.error_msg) }.to_str().unwrap();
        assert_eq!(msg, "null pixel pointer");
        nfiq2_result_free(result);
    }

    #[test]
    fn test_success_conversion_and_free() {
        let result = Nfiq2ResultC::success(QualityResult {
            score: 61,
            measures: Some(QualityMeasures {
                actionable: vec![NamedValue::from(("UniformImage".to_string(), 0.0))],
                features: vec![
                    NamedValue::from(("MMB".to_string(), 120.0)),
                    NamedValue::from(("Mu".to_string(), 130.5)),
                ],
            }),
        });

        assert!(result.success);
        assert_eq!(result.score, 61);
        assert_eq!(result.actionable_len, 1);
        assert_eq!(result.features_len, 2);
        let second = unsafe { &*result.features.add(1) };
        assert_eq!(unsafe { CStr::from_ptr(second.name) }.to_str().unwrap(), "Mu");
        assert_eq!(second.value, 130.5);

        nfiq2_result_free(result);
    }

    #[test]
    fn test_failure_carries_kind() {
        let result = Nfiq2ResultC::failure(&QualityError::NoFingerprint);
        assert!(!result.success);
        assert_eq!(result.error_kind, ErrorKind::NoFingerprint as i32);
        assert!(result.features.is_null());
        nfiq2_result_free(result);
    }

    #[test]
    fn test_version_is_c_string() {
        let version = unsafe { CStr::from_ptr(nfiq2_binding_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}

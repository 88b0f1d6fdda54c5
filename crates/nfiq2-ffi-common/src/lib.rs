//! C string and array helpers for the NFIQ2 binding.
//!
//! Two directions cross the boundary:
//! - **Inbound**: the native wrapper hands back `const char**` / `double*`
//!   arrays that must be copied into owned Rust values before the wrapper's
//!   own free routine runs.
//! - **Outbound**: the host C ABI hands Rust-allocated strings and arrays to
//!   foreign callers, who give them back through the matching `free_*` calls.
//!
//! # Memory Ownership
//!
//! - Inbound readers only borrow; they never free native memory
//! - Outbound functions returning `*mut c_char` or `*mut T` transfer ownership
//! - NULL pointers are handled safely (no-op for free functions)

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::slice;

// ============================================================================
// Inbound: native -> Rust
// ============================================================================

/// Copy a native array of C strings into owned `String`s.
///
/// Returns an empty vector when `arr` is null or `len` is zero.
///
/// # Safety
/// - `arr` must point to `len` readable C string pointers, or be null
/// - Each string pointer must be valid and null-terminated
pub unsafe fn copy_string_array(
    arr: *const *const c_char,
    len: usize,
) -> Result<Vec<String>, String> {
    if arr.is_null() || len == 0 {
        return Ok(Vec::new());
    }

    let entries = unsafe { slice::from_raw_parts(arr, len) };
    let mut out = Vec::with_capacity(len);

    for (i, &entry) in entries.iter().enumerate() {
        if entry.is_null() {
            return Err(format!("null string at index {}", i));
        }
        match unsafe { CStr::from_ptr(entry) }.to_str() {
            Ok(s) => out.push(s.to_string()),
            Err(_) => return Err(format!("invalid UTF-8 at index {}", i)),
        }
    }

    Ok(out)
}

/// Copy parallel `names[i] -> values[i]` arrays into owned pairs.
///
/// A null `values` pointer with a non-zero `len` is reported as an error
/// rather than read.
///
/// # Safety
/// - `names` must satisfy the contract of [`copy_string_array`]
/// - `values` must point to `len` readable `f64`s, or be null when `len` is 0
pub unsafe fn copy_named_values(
    names: *const *const c_char,
    values: *const f64,
    len: usize,
) -> Result<Vec<(String, f64)>, String> {
    if len == 0 {
        return Ok(Vec::new());
    }
    if names.is_null() || values.is_null() {
        return Err(format!("null array for {} entries", len));
    }

    let names = unsafe { copy_string_array(names, len) }?;
    let values = unsafe { slice::from_raw_parts(values, len) };

    Ok(names.into_iter().zip(values.iter().copied()).collect())
}

// ============================================================================
// Outbound: Rust -> host
// ============================================================================

/// Convert a Rust string to an owned C string, with a fallback on failure.
///
/// If the input contains null bytes, the fallback is used instead.
/// The returned pointer is owned by the caller and must be freed.
///
/// # Example
/// ```
/// use nfiq2_ffi_common::{cstring_new_or_fallback, free_cstring};
///
/// let ptr = cstring_new_or_fallback("no fingerprint detected", "error");
/// unsafe { free_cstring(ptr) };
/// ```
#[inline]
pub fn cstring_new_or_fallback(s: &str, fallback: &'static str) -> *mut c_char {
    CString::new(s)
        .or_else(|_| CString::new(fallback))
        .unwrap_or_default()
        .into_raw()
}

/// Convert a Rust string to an owned C string, using empty string as fallback.
#[inline]
pub fn cstring_new_or_empty(s: &str) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Free a C string previously handed out by this crate.
///
/// # Safety
/// The pointer must have been allocated by `CString::into_raw()` or be null.
#[inline]
pub unsafe fn free_cstring(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

/// Free a boxed slice handed out by [`vec_into_raw`].
///
/// # Safety
/// The pointer must have been produced by [`vec_into_raw`] with the same `len`.
#[inline]
pub unsafe fn free_boxed_slice<T>(ptr: *mut T, len: usize) {
    if !ptr.is_null() && len > 0 {
        unsafe {
            let _ = Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len));
        }
    }
}

/// Leak a vector as a raw pointer and length for a foreign caller.
///
/// Empty vectors become `(NULL, 0)`.
#[inline]
pub fn vec_into_raw<T>(vec: Vec<T>) -> (*mut T, usize) {
    let len = vec.len();
    if len == 0 {
        (ptr::null_mut(), 0)
    } else {
        (Box::into_raw(vec.into_boxed_slice()) as *mut T, len)
    }
}

/// Result structs returned over the host C ABI.
///
/// Implementors describe how to build their error state from an
/// already-allocated message; `error()` handles the allocation.
pub trait FfiResult: Sized {
    /// Used when the error message contains null bytes.
    const ERROR_FALLBACK: &'static str;

    /// Construct the failed result around `error_msg`.
    fn error_fields(error_msg: *mut c_char, error_kind: i32) -> Self;

    /// Create a failed result carrying `msg` and a numeric error kind.
    #[inline]
    fn error(msg: &str, error_kind: i32) -> Self {
        let error_msg = cstring_new_or_fallback(msg, Self::ERROR_FALLBACK);
        Self::error_fields(error_msg, error_kind)
    }
}

/// Generate an exported function returning the crate version as a static C string.
#[macro_export]
macro_rules! define_version_fn {
    ($fn_name:ident) => {
        #[no_mangle]
        pub extern "C" fn $fn_name() -> *const std::os::raw::c_char {
            concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const std::os::raw::c_char
        }
    };
}

/// Generate an exported string free function.
#[macro_export]
macro_rules! define_string_free {
    ($fn_name:ident) => {
        #[no_mangle]
        #[allow(clippy::not_unsafe_ptr_arg_deref)]
        pub extern "C" fn $fn_name(s: *mut std::os::raw::c_char) {
            unsafe { $crate::free_cstring(s) };
        }
    };
}

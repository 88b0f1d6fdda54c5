//! Raw declarations for the NFIQ2 C wrapper (`nfiq_wrapper.h`, NFIQ2 2.3.0).
//!
//! Changing anything here changes the pinned ABI.

use std::os::raw::{c_char, c_int, c_uchar, c_uint, c_ushort};
use std::ptr;

use libloading::{Library, Symbol};

use crate::error::LoadError;

pub const SYM_CREATE: &str = "nfiq2wrapper_create";
pub const SYM_DESTROY: &str = "nfiq2wrapper_destroy";
pub const SYM_COMPUTE: &str = "nfiq2wrapper_compute";
pub const SYM_FREE_RESULTS: &str = "nfiq2wrapper_free_results";

/// Opaque `Nfiq2Wrapper` owned by the native side
#[repr(C)]
pub struct Nfiq2Wrapper {
    _private: [u8; 0],
}

/// `nfiq2_results_t`
#[repr(C)]
pub struct Nfiq2Results {
    pub score: c_uint,
    pub actionable_count: c_uint,
    pub actionable_ids: *const *const c_char,
    pub actionable_values: *mut f64,
    pub feature_count: c_uint,
    pub feature_ids: *const *const c_char,
    pub feature_values: *mut f64,
}

impl Default for Nfiq2Results {
    fn default() -> Self {
        Self {
            score: 0,
            actionable_count: 0,
            actionable_ids: ptr::null(),
            actionable_values: ptr::null_mut(),
            feature_count: 0,
            feature_ids: ptr::null(),
            feature_values: ptr::null_mut(),
        }
    }
}

pub type CreateFn = unsafe extern "C" fn() -> *mut Nfiq2Wrapper;
pub type DestroyFn = unsafe extern "C" fn(ctx: *mut Nfiq2Wrapper);
pub type ComputeFn = unsafe extern "C" fn(
    ctx: *mut Nfiq2Wrapper,
    data: *const c_uchar,
    size: c_uint,
    cols: c_uint,
    rows: c_uint,
    ppi: c_ushort,
    out: *mut Nfiq2Results,
) -> c_int;
pub type FreeResultsFn = unsafe extern "C" fn(out: *mut Nfiq2Results);

/// Entry points resolved from one loaded library.
///
/// The pointers are only valid while the `Library` they came from is alive.
#[derive(Clone, Copy)]
pub struct Api {
    pub create: CreateFn,
    pub destroy: DestroyFn,
    pub compute: ComputeFn,
    pub free_results: FreeResultsFn,
}

impl Api {
    /// Resolve every required symbol; the first missing one fails the load.
    ///
    /// # Safety
    /// `lib` must export these symbols with exactly the signatures above.
    pub unsafe fn resolve(lib: &Library) -> Result<Self, LoadError> {
        unsafe {
            Ok(Self {
                create: symbol(lib, SYM_CREATE)?,
                destroy: symbol(lib, SYM_DESTROY)?,
                compute: symbol(lib, SYM_COMPUTE)?,
                free_results: symbol(lib, SYM_FREE_RESULTS)?,
            })
        }
    }
}

unsafe fn symbol<T: Copy>(lib: &Library, name: &'static str) -> Result<T, LoadError> {
    let sym: Symbol<T> = unsafe { lib.get(name.as_bytes()) }.map_err(|e| {
        LoadError::MissingSymbol {
            symbol: name,
            reason: e.to_string(),
        }
    })?;
    Ok(*sym)
}

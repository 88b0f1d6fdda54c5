//! Loaded NFIQ2 wrapper library.
//!
//! # Memory Ownership Rules
//!
//! - The native context is created once at load and destroyed on drop
//! - `nfiq2_results_t` arrays are native-allocated; they are copied into owned
//!   Rust values and released with `nfiq2wrapper_free_results` before `score`
//!   returns, on every path
//! - Pixel data is only borrowed for the duration of the call
//!
//! # Known Risk
//!
//! A memory fault inside the native library terminates the process. Callers
//! needing isolation must score in a separate process.

mod sys;

use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use libloading::Library;
use tracing::{debug, info};

use nfiq2_ffi_common::copy_named_values;

use crate::config::BindingConfig;
use crate::error::{LoadError, QualityError};
use crate::invoker::{QualityBackend, RawOutcome};
use crate::marshal::NativeBuffer;
use crate::translate::{RawCode, STATUS_OK};
use crate::types::{NamedValue, QualityMeasures};

pub use sys::{SYM_COMPUTE, SYM_CREATE, SYM_DESTROY, SYM_FREE_RESULTS};

/// The native wrapper, fully loaded: library mapped, symbols resolved, and
/// model context created.
pub struct NativeLibrary {
    path: PathBuf,
    ctx: NonNull<sys::Nfiq2Wrapper>,
    api: sys::Api,
    // Dropped last; `api` and `ctx` point into it.
    _lib: Library,
}

// The context pointer is only used through `score`, whose concurrency is
// governed by the invoker's policy.
unsafe impl Send for NativeLibrary {}
unsafe impl Sync for NativeLibrary {}

impl NativeLibrary {
    /// Load the wrapper at `path` and create its NFIQ2 context.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading NFIQ2 wrapper");

        // SAFETY: loading runs the library's initializers; the wrapper has no
        // global constructors beyond the C++ runtime.
        let lib = unsafe { Library::new(path) }.map_err(|e| LoadError::NotFound {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // SAFETY: signatures in `sys` match nfiq_wrapper.h.
        let api = unsafe { sys::Api::resolve(&lib) }?;

        // Loads the embedded random forest model.
        let ctx = NonNull::new(unsafe { (api.create)() }).ok_or(LoadError::ContextInit)?;

        info!(path = %path.display(), "NFIQ2 wrapper loaded");

        Ok(Self {
            path: path.to_path_buf(),
            ctx,
            api,
            _lib: lib,
        })
    }

    /// Load the wrapper from the location described by `config`.
    pub fn open_with(config: &BindingConfig) -> Result<Self, LoadError> {
        Self::open(config.resolve_library_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QualityBackend for NativeLibrary {
    fn score(
        &self,
        buffer: &NativeBuffer<'_>,
        collect_measures: bool,
    ) -> Result<RawOutcome, QualityError> {
        let mut results = NativeResults::new(self.api.free_results);

        // SAFETY: ctx is live for self's lifetime; buffer borrows exactly
        // `size` readable bytes with size == cols * rows; `results` is a valid
        // zeroed out-struct.
        let status = unsafe {
            (self.api.compute)(
                self.ctx.as_ptr(),
                buffer.as_ptr(),
                buffer.size(),
                buffer.cols(),
                buffer.rows(),
                buffer.ppi(),
                &mut results.raw,
            )
        };

        let code = RawCode::new(status, results.raw.score);
        let measures = if status == STATUS_OK && collect_measures {
            Some(results.measures()?)
        } else {
            None
        };

        Ok(RawOutcome { code, measures })
    }
}

impl Drop for NativeLibrary {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "destroying NFIQ2 context");
        unsafe { (self.api.destroy)(self.ctx.as_ptr()) };
    }
}

/// Native result struct released on drop.
struct NativeResults {
    raw: sys::Nfiq2Results,
    free: sys::FreeResultsFn,
}

impl NativeResults {
    fn new(free: sys::FreeResultsFn) -> Self {
        Self {
            raw: sys::Nfiq2Results::default(),
            free,
        }
    }

    fn measures(&self) -> Result<QualityMeasures, QualityError> {
        let raw = &self.raw;
        // SAFETY: on success the wrapper fills each id/value array with
        // exactly `*_count` entries.
        let actionable = unsafe {
            copy_named_values(
                raw.actionable_ids,
                raw.actionable_values,
                raw.actionable_count as usize,
            )
        }
        .map_err(|e| QualityError::MalformedOutput(format!("actionable feedback: {}", e)))?;
        let features = unsafe {
            copy_named_values(
                raw.feature_ids,
                raw.feature_values,
                raw.feature_count as usize,
            )
        }
        .map_err(|e| QualityError::MalformedOutput(format!("quality features: {}", e)))?;

        Ok(QualityMeasures {
            actionable: actionable.into_iter().map(NamedValue::from).collect(),
            features: features.into_iter().map(NamedValue::from).collect(),
        })
    }
}

impl Drop for NativeResults {
    fn drop(&mut self) {
        // Frees partial allocations too; a zeroed struct is a no-op.
        unsafe { (self.free)(&mut self.raw) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_library_is_not_found() {
        let err = match NativeLibrary::open("/nonexistent/libnfiq2_ffi.so") {
            Err(e) => e,
            Ok(_) => panic!("library should not load"),
        };
        match err {
            LoadError::NotFound { path, reason } => {
                assert_eq!(path, PathBuf::from("/nonexistent/libnfiq2_ffi.so"));
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_library_file_fails_to_map() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a shared object").unwrap();

        assert!(matches!(
            NativeLibrary::open(file.path()),
            Err(LoadError::NotFound { .. })
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_library_without_wrapper_symbols() {
        let err = match NativeLibrary::open("libc.so.6") {
            Err(e) => e,
            Ok(_) => panic!("libc should not provide the wrapper"),
        };
        match err {
            LoadError::MissingSymbol { symbol, reason } => {
                assert_eq!(symbol, sys::SYM_CREATE);
                assert!(reason.contains("nfiq2wrapper_create"), "{}", reason);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

//! Process-wide native library handle.
//!
//! The handle is loaded lazily on the first [`acquire`] and kept for the life
//! of the process. Concurrent first callers trigger at most one load attempt
//! and all observe the same outcome. A failed load is sticky: it is returned
//! again on every call until [`force_recheck`] clears it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use tracing::debug;

use crate::config::BindingConfig;
use crate::error::LoadError;
use crate::invoker::QualityInvoker;
use crate::native::NativeLibrary;

/// Once-initialized slot holding either a loaded value or its load failure.
pub struct HandleCell<T> {
    slot: RwLock<Option<Result<Arc<T>, LoadError>>>,
    attempts: AtomicUsize,
}

impl<T> Default for HandleCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleCell<T> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Return the cached outcome, running `load` only if nothing is cached.
    ///
    /// `load` runs under the write lock, so racing callers wait for it rather
    /// than starting their own attempt.
    pub fn acquire_with<F>(&self, load: F) -> Result<Arc<T>, LoadError>
    where
        F: FnOnce() -> Result<T, LoadError>,
    {
        if let Some(outcome) = self.slot.read().as_ref() {
            return outcome.clone();
        }

        let mut slot = self.slot.write();
        if let Some(outcome) = slot.as_ref() {
            return outcome.clone();
        }

        self.attempts.fetch_add(1, Ordering::SeqCst);
        let outcome = load().map(Arc::new);
        *slot = Some(outcome.clone());
        outcome
    }

    /// Forget a cached failure so the next acquire tries again.
    ///
    /// A successful load is never discarded. Returns true if a failure was
    /// cleared.
    pub fn force_recheck(&self) -> bool {
        let mut slot = self.slot.write();
        if matches!(slot.as_ref(), Some(Err(_))) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// How many times the loader has run.
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Whether an outcome (success or failure) is cached.
    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }
}

/// Invoker bound to the real native library.
pub type NativeInvoker = QualityInvoker<NativeLibrary>;

lazy_static! {
    static ref NATIVE: HandleCell<NativeInvoker> = HandleCell::new();
}

/// Get the process-wide invoker, loading the native library on first use.
///
/// Configuration comes from [`BindingConfig::from_env`]; an unreadable
/// configuration fails the load with [`LoadError::Config`], and is sticky
/// like any other load failure.
pub fn acquire() -> Result<Arc<NativeInvoker>, LoadError> {
    NATIVE.acquire_with(|| {
        let config = BindingConfig::from_env()?;
        debug!(policy = ?config.concurrency, "initializing NFIQ2 binding");
        let library = NativeLibrary::open_with(&config)?;
        Ok(QualityInvoker::with_config(library, &config))
    })
}

/// Clear a sticky load failure so the next call re-attempts the load.
pub fn force_recheck() -> bool {
    NATIVE.force_recheck()
}

/// Number of times the process-wide library load has been attempted.
pub fn load_attempts() -> usize {
    NATIVE.load_attempts()
}

//! Quality invocation: validate, call the backend once, translate.
//!
//! The native call is the only blocking point and runs synchronously on the
//! calling thread. There is no timeout, cancellation or retry: the call is
//! not preemptible and a failed call on the same input is deterministic.

use parking_lot::Mutex;
use tracing::trace;

use crate::config::{BindingConfig, ConcurrencyPolicy, ImageLimits};
use crate::error::QualityError;
use crate::handle;
use crate::marshal::{marshal, NativeBuffer};
use crate::translate::{translate, RawCode};
use crate::types::{ImageDescriptor, QualityMeasures, QualityOptions, QualityResult};

/// Raw outcome of one backend call, before translation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawOutcome {
    pub code: RawCode,
    /// Filled only when the call succeeded and measures were requested
    pub measures: Option<QualityMeasures>,
}

/// Something that can score a marshaled image.
///
/// [`NativeLibrary`](crate::NativeLibrary) is the production backend; tests
/// substitute fakes to observe marshaling without the native library.
pub trait QualityBackend: Send + Sync {
    /// Run exactly one quality computation on `buffer`.
    fn score(
        &self,
        buffer: &NativeBuffer<'_>,
        collect_measures: bool,
    ) -> Result<RawOutcome, QualityError>;
}

/// A backend plus the policy it must be called under.
pub struct QualityInvoker<B> {
    backend: B,
    limits: ImageLimits,
    policy: ConcurrencyPolicy,
    gate: Mutex<()>,
}

impl<B: QualityBackend> QualityInvoker<B> {
    pub fn new(backend: B, policy: ConcurrencyPolicy, limits: ImageLimits) -> Self {
        Self {
            backend,
            limits,
            policy,
            gate: Mutex::new(()),
        }
    }

    pub fn with_config(backend: B, config: &BindingConfig) -> Self {
        Self::new(backend, config.concurrency, config.limits)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    pub fn limits(&self) -> ImageLimits {
        self.limits
    }

    /// Score `image`. Invalid input never reaches the backend.
    pub fn compute(
        &self,
        image: &ImageDescriptor<'_>,
        options: &QualityOptions,
    ) -> Result<QualityResult, QualityError> {
        let buffer = marshal(image, options, &self.limits)?;

        let outcome = match self.policy {
            ConcurrencyPolicy::Serialized => {
                let _guard = self.gate.lock();
                self.backend.score(&buffer, options.collect_measures)?
            }
            ConcurrencyPolicy::Reentrant => self.backend.score(&buffer, options.collect_measures)?,
        };
        trace!(code = %outcome.code, "native quality call returned");

        let score = translate(outcome.code)?;
        Ok(QualityResult {
            score,
            measures: outcome.measures,
        })
    }
}

/// Score a fingerprint image with the process-wide NFIQ2 library.
///
/// Loads the library on first use. A load failure is returned as
/// [`QualityError::Unavailable`] on this and every later call until
/// [`force_recheck`](crate::force_recheck) is used.
pub fn compute_quality(
    image: &ImageDescriptor<'_>,
    options: &QualityOptions,
) -> Result<QualityResult, QualityError> {
    let invoker = handle::acquire()?;
    invoker.compute(image, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::STATUS_OK;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBackend {
        code: RawCode,
        calls: AtomicUsize,
    }

    impl FixedBackend {
        fn new(status: i32, score: u32) -> Self {
            Self {
                code: RawCode::new(status, score),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl QualityBackend for FixedBackend {
        fn score(&self, _: &NativeBuffer<'_>, collect: bool) -> Result<RawOutcome, QualityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawOutcome {
                code: self.code,
                measures: collect.then(QualityMeasures::default),
            })
        }
    }

    fn invoker(backend: FixedBackend) -> QualityInvoker<FixedBackend> {
        QualityInvoker::new(backend, ConcurrencyPolicy::Serialized, ImageLimits::default())
    }

    #[test]
    fn test_compute_success() {
        let invoker = invoker(FixedBackend::new(STATUS_OK, 54));
        let pixels = vec![0u8; 20 * 20];

        let result = invoker
            .compute(&ImageDescriptor::gray8(20, 20, &pixels), &QualityOptions::default())
            .unwrap();

        assert_eq!(result.score, 54);
        assert_eq!(result.measures, Some(QualityMeasures::default()));
        assert_eq!(invoker.backend().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_measures_omitted_when_not_requested() {
        let invoker = invoker(FixedBackend::new(STATUS_OK, 54));
        let pixels = vec![0u8; 4];
        let options = QualityOptions {
            collect_measures: false,
            ..Default::default()
        };

        let result = invoker
            .compute(&ImageDescriptor::gray8(2, 2, &pixels), &options)
            .unwrap();
        assert_eq!(result.measures, None);
    }

    #[test]
    fn test_sentinel_becomes_error() {
        let invoker = invoker(FixedBackend::new(STATUS_OK, 0));
        let pixels = vec![128u8; 4];

        let err = invoker
            .compute(&ImageDescriptor::gray8(2, 2, &pixels), &QualityOptions::default())
            .unwrap_err();
        assert_eq!(err, QualityError::NoFingerprint);
    }

    #[test]
    fn test_invalid_input_skips_backend() {
        let invoker = invoker(FixedBackend::new(STATUS_OK, 54));
        let pixels = vec![0u8; 3];

        let err = invoker
            .compute(&ImageDescriptor::gray8(2, 2, &pixels), &QualityOptions::default())
            .unwrap_err();
        assert!(matches!(err, QualityError::InvalidInput(_)));
        assert_eq!(invoker.backend().calls.load(Ordering::SeqCst), 0);
    }
}

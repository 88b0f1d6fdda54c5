//! # NFIQ2 binding
//!
//! Fingerprint image quality scoring backed by the native NIST NFIQ2 library.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   ┌───────────┐   ┌───────────────┐   ┌─────────────┐
//! │ ImageDescriptor │──▶│ marshal   │──▶│ NativeLibrary │──▶│ translate   │
//! │ (borrowed)      │   │ (checks)  │   │ (libloading)  │   │ (RawCode)   │
//! └─────────────────┘   └───────────┘   └───────────────┘   └─────────────┘
//! ```
//!
//! The native wrapper is loaded once per process on first use. Only
//! [`compute_quality`] and the value types are meant for application code;
//! raw native calls stay inside the crate.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nfiq2::{compute_quality, ImageDescriptor, QualityError, QualityOptions};
//!
//! let pixels = vec![128u8; 300 * 400];
//! let image = ImageDescriptor::gray8(300, 400, &pixels);
//!
//! match compute_quality(&image, &QualityOptions::default()) {
//!     Ok(result) => println!("NFIQ2 score: {}", result.score),
//!     Err(QualityError::NoFingerprint) => println!("no fingerprint"),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```
//!
//! ## Configuration
//!
//! See [`BindingConfig`]: `NFIQ2_LIBRARY_PATH`, `NFIQ2_LIBRARY_DIR`,
//! `NFIQ2_CONCURRENCY` and `NFIQ2_CONFIG`.

pub mod config;
pub mod error;
pub mod ffi;
pub mod handle;
pub mod invoker;
pub mod marshal;
pub mod native;
pub mod tracing;
pub mod translate;
pub mod types;

pub use config::{BindingConfig, ConcurrencyPolicy, ImageLimits};
pub use error::{ConfigError, ErrorKind, LoadError, QualityError, Result, ValidationError};
pub use handle::{acquire, force_recheck, load_attempts, HandleCell};
pub use invoker::{compute_quality, QualityBackend, QualityInvoker, RawOutcome};
pub use marshal::{marshal, NativeBuffer};
pub use native::NativeLibrary;
pub use translate::{translate, RawCode};
pub use types::{
    ImageDescriptor, NamedValue, PixelDepth, QualityMeasures, QualityOptions, QualityResult,
};

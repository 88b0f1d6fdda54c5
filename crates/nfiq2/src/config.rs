//! Binding configuration.
//!
//! Resolution order: `NFIQ2_CONFIG` JSON file (if set), then individual
//! environment variables on top of it.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Explicit path to the wrapper shared object.
pub const ENV_LIBRARY_PATH: &str = "NFIQ2_LIBRARY_PATH";
/// Directory searched for the platform-named wrapper.
pub const ENV_LIBRARY_DIR: &str = "NFIQ2_LIBRARY_DIR";
/// `serialized` or `reentrant`.
pub const ENV_CONCURRENCY: &str = "NFIQ2_CONCURRENCY";
/// JSON config file.
pub const ENV_CONFIG: &str = "NFIQ2_CONFIG";

/// Base name of the native wrapper library (without platform decoration).
pub const LIBRARY_NAME: &str = "nfiq2_ffi";

const DEFAULT_MAX_DIMENSION: u32 = 4096;

/// How concurrent invocations reach the native entry point.
///
/// Must match the thread-safety guarantee of the loaded library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyPolicy {
    /// One native call at a time, process-wide
    #[default]
    Serialized,
    /// Native calls run concurrently without locking
    Reentrant,
}

impl ConcurrencyPolicy {
    fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serialized" => Ok(Self::Serialized),
            "reentrant" => Ok(Self::Reentrant),
            other => Err(ConfigError::Invalid(format!(
                "unknown concurrency policy '{}'",
                other
            ))),
        }
    }

    fn from_os_str(value: &OsStr) -> Result<Self, ConfigError> {
        let value = value.to_str().ok_or_else(|| {
            ConfigError::Invalid(format!("{} is not valid UTF-8", ENV_CONCURRENCY))
        })?;
        Self::parse(value)
    }
}

/// Largest image the marshaler lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageLimits {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_DIMENSION,
            max_height: DEFAULT_MAX_DIMENSION,
        }
    }
}

/// Configuration for loading and calling the native library.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Exact path of the shared object; wins over `library_dir`
    pub library_path: Option<PathBuf>,
    /// Directory holding the platform-named library
    pub library_dir: Option<PathBuf>,
    pub concurrency: ConcurrencyPolicy,
    pub limits: ImageLimits,
}

impl BindingConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match env::var_os(ENV_CONFIG) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(path) = env::var_os(ENV_LIBRARY_PATH) {
            config.library_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = env::var_os(ENV_LIBRARY_DIR) {
            config.library_dir = Some(PathBuf::from(dir));
        }
        if let Some(policy) = env::var_os(ENV_CONCURRENCY) {
            config.concurrency = ConcurrencyPolicy::from_os_str(&policy)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ImageLimits {
            max_width,
            max_height,
        } = self.limits;

        if max_width == 0 || max_height == 0 {
            return Err(ConfigError::Invalid(
                "image limits must be non-zero".to_string(),
            ));
        }
        // The native wrapper receives the pixel count as a u32.
        if u64::from(max_width) * u64::from(max_height) > u64::from(u32::MAX) {
            return Err(ConfigError::Invalid(format!(
                "image limits {}x{} overflow the native size argument",
                max_width, max_height
            )));
        }
        Ok(())
    }

    /// Path handed to the platform loader.
    ///
    /// A bare file name lets the system loader apply its own search path.
    pub fn resolve_library_path(&self) -> PathBuf {
        let file_name = libloading::library_filename(LIBRARY_NAME);
        match (&self.library_path, &self.library_dir) {
            (Some(path), _) => path.clone(),
            (None, Some(dir)) => dir.join(file_name),
            (None, None) => PathBuf::from(file_name),
        }
    }
}

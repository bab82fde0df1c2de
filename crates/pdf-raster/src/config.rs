//! Process-wide rendering configuration
//!
//! Set once at startup, before the first backend is created. Later calls to
//! [`configure`] are rejected so every backend in the process agrees on the
//! engine it binds to.

use crate::{RasterError, Result};
use log::info;
use std::path::PathBuf;
use std::sync::OnceLock;

static CONFIG: OnceLock<RasterConfig> = OnceLock::new();

/// Where to find the rendering engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RasterConfig {
    /// Path to the PDFium shared library; `None` binds the system library
    pub library_path: Option<PathBuf>,
}

impl RasterConfig {
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
        }
    }

    /// Reject settings the current target cannot honour
    ///
    /// A browser build has no filesystem to load a library from, so only the
    /// bundled module can be used there.
    pub fn validate(&self) -> Result<()> {
        match &self.library_path {
            Some(path) if !LIBRARY_PATHS_SUPPORTED => Err(RasterError::Backend(format!(
                "cannot load {} on this target; PDFium is bound from the bundled module",
                path.display()
            ))),
            _ => Ok(()),
        }
    }
}

const LIBRARY_PATHS_SUPPORTED: bool = cfg!(not(target_arch = "wasm32"));

/// Install the process-wide configuration
pub fn configure(config: RasterConfig) -> Result<()> {
    config.validate()?;
    info!("configuring raster backend: {config:?}");
    CONFIG
        .set(config)
        .map_err(|_| RasterError::AlreadyConfigured)
}

/// The installed configuration, or the default when none was installed
pub fn current_config() -> RasterConfig {
    CONFIG.get().cloned().unwrap_or_default()
}

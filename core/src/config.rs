#![deny(missing_docs)]

//! # Configuration
//!
//! Tunables shared by every call made through one `Codec`.
//! Loaded from YAML (or JSON, which YAML accepts) text or a file.

use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default maximum nesting depth of decoded keys.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default maximum body size accepted by `decode_request` (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Codec configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CodecConfig {
    /// Maximum number of key segments (`a.b.c`, `a[b][c]`) a decoder accepts.
    pub max_depth: usize,
    /// Bodies larger than this are rejected before parsing.
    pub max_body_bytes: usize,
    /// Leave RFC 3986 reserved characters unescaped when encoding.
    pub allow_reserved: bool,
    /// Prefix encoded query strings with `?`.
    pub query_prefix: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            allow_reserved: false,
            query_prefix: false,
        }
    }
}

impl CodecConfig {
    /// Parses configuration from YAML or JSON text.
    ///
    /// # Examples
    /// ```
    /// use oas_params_core::CodecConfig;
    ///
    /// let config = CodecConfig::from_yaml_str("maxDepth: 4\nallowReserved: true").unwrap();
    /// assert_eq!(config.max_depth, 4);
    /// assert!(config.allow_reserved);
    /// assert!(!config.query_prefix);
    /// ```
    pub fn from_yaml_str(text: &str) -> CodecResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| CodecError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> CodecResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    fn validate(&self) -> CodecResult<()> {
        if self.max_depth == 0 {
            return Err(CodecError::Config("maxDepth must be at least 1".into()));
        }
        Ok(())
    }
}

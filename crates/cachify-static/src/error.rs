//! Error types

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, CachifyError>;

/// Errors surfaced by setup helpers and tag generation.
///
/// Missing assets and fingerprint mismatches are not errors: they degrade to
/// unfingerprinted URLs or pass-through requests.
#[derive(Debug, Error)]
pub enum CachifyError {
	/// Reading a configuration or manifest file failed
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// Configuration file is not valid TOML for [`crate::CachifyConfig`]
	#[error("Invalid configuration: {0}")]
	Config(#[from] toml::de::Error),

	/// Manifest file is not a JSON object of string arrays
	#[error("Invalid asset manifest: {0}")]
	Manifest(#[from] serde_json::Error),

	/// A tag helper was called with an unusable resource identifier
	#[error("cachify expected a resource path, got {0:?}")]
	InvalidResource(String),

	/// A tag format does not contain exactly one URL placeholder
	#[error("cachify tag format must contain exactly one %s, got {0:?}")]
	InvalidFormat(String),
}

//! Configuration for fingerprinting and request rewriting

use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Engine configuration, fixed once [`crate::setup()`] has been called.
///
/// Deserializes from TOML with every field optional:
///
/// ```toml
/// production = false
/// debug = true
/// root = "public"
/// prefix = "/v/"
/// control_headers = true
///
/// [url_to_paths]
/// "/js/app.js" = "build/app.js"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CachifyConfig {
	/// Emit fingerprinted bundle URLs (`true`) or raw development sources (`false`)
	pub production: bool,

	/// Fingerprint development sources too
	pub debug: bool,

	/// Directory logical URLs are resolved against
	pub root: PathBuf,

	/// Leading URL segment placed before the fingerprint.
	///
	/// Normalized to no leading `/` and a trailing `/` when non-empty. May be a
	/// fully-qualified URL such as `https://cdn.example.com/v/`.
	pub prefix: String,

	/// Logical URL to filesystem path overrides
	pub url_to_paths: HashMap<String, PathBuf>,

	/// Strip `ETag` and `Last-Modified` from responses to fingerprinted requests
	pub control_headers: bool,

	/// Fingerprint used for every resource instead of content hashes
	pub global_hash: Option<String>,

	/// Upper bound on memoized file entries; `None` keeps every entry
	pub max_cache_entries: Option<usize>,
}

impl Default for CachifyConfig {
	fn default() -> Self {
		Self {
			production: true,
			debug: false,
			root: PathBuf::from("."),
			prefix: String::new(),
			url_to_paths: HashMap::new(),
			control_headers: false,
			global_hash: None,
			max_cache_entries: None,
		}
	}
}

impl CachifyConfig {
	/// Creates the default configuration (production mode, current directory)
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a TOML document and normalizes it
	///
	/// # Examples
	///
	/// ```rust
	/// use cachify_static::CachifyConfig;
	///
	/// let config = CachifyConfig::from_toml_str(r#"
	///     production = false
	///     prefix = "/cdn"
	/// "#).unwrap();
	/// assert!(!config.production);
	/// assert_eq!(config.prefix, "cdn/");
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self> {
		let config: Self = toml::from_str(source)?;
		Ok(config.normalized())
	}

	/// Reads and parses a TOML configuration file
	///
	/// # Errors
	///
	/// Returns error if the file cannot be read or parsed
	pub fn from_file(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}

	/// Applies prefix and global hash normalization
	pub fn normalized(mut self) -> Self {
		self.prefix = normalize_prefix(&self.prefix);
		self.global_hash = self
			.global_hash
			.map(|hash| hash.trim().to_ascii_lowercase())
			.filter(|hash| !hash.is_empty());
		self
	}

	/// Sets production mode
	pub fn with_production(mut self, production: bool) -> Self {
		self.production = production;
		self
	}

	/// Sets debug mode
	pub fn with_debug(mut self, debug: bool) -> Self {
		self.debug = debug;
		self
	}

	/// Sets the asset root directory
	pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
		self.root = root.into();
		self
	}

	/// Sets the URL prefix
	///
	/// # Examples
	///
	/// ```rust
	/// use cachify_static::CachifyConfig;
	///
	/// let config = CachifyConfig::new().with_prefix("/assets");
	/// assert_eq!(config.prefix, "assets/");
	/// ```
	pub fn with_prefix(mut self, prefix: &str) -> Self {
		self.prefix = normalize_prefix(prefix);
		self
	}

	/// Maps a logical URL to a specific file
	pub fn with_url_to_path(mut self, url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
		self.url_to_paths.insert(url.into(), path.into());
		self
	}

	/// Enables removal of competing validators on fingerprinted responses
	pub fn with_control_headers(mut self, control_headers: bool) -> Self {
		self.control_headers = control_headers;
		self
	}

	/// Uses one fingerprint for every resource
	pub fn with_global_hash(mut self, hash: impl Into<String>) -> Self {
		self.global_hash = Some(hash.into().trim().to_ascii_lowercase());
		self
	}

	/// Bounds the hash store with least-recently-used eviction
	pub fn with_max_cache_entries(mut self, max_entries: usize) -> Self {
		self.max_cache_entries = Some(max_entries);
		self
	}

	/// Whether URLs get fingerprints at all
	pub fn fingerprinting_enabled(&self) -> bool {
		self.production || self.debug
	}
}

/// Normalizes a URL prefix: no leading `/`, trailing `/` iff non-empty.
///
/// # Examples
///
/// ```rust
/// use cachify_static::config::normalize_prefix;
///
/// assert_eq!(normalize_prefix(""), "");
/// assert_eq!(normalize_prefix("/"), "");
/// assert_eq!(normalize_prefix("/cdn"), "cdn/");
/// assert_eq!(normalize_prefix("cdn/"), "cdn/");
/// assert_eq!(normalize_prefix("http://example.com/v"), "http://example.com/v/");
/// ```
pub fn normalize_prefix(prefix: &str) -> String {
	let trimmed = prefix.trim_start_matches('/');
	if trimmed.is_empty() {
		String::new()
	} else if trimmed.ends_with('/') {
		trimmed.to_string()
	} else {
		format!("{}/", trimmed)
	}
}

//! Production bundle to development source mapping

use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Maps a production (bundled) asset URL to its development sources.
///
/// Source order is tag emission order in development mode, so libraries can be
/// listed before the scripts that depend on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest {
	assets: HashMap<String, Vec<String>>,
}

impl AssetManifest {
	/// Creates an empty manifest
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a bundle and its ordered sources
	///
	/// # Example
	///
	/// ```rust
	/// use cachify_static::AssetManifest;
	///
	/// let manifest = AssetManifest::new()
	///     .with_asset("/js/main.min.js", ["/js/lib/jquery.js", "/js/main.js"]);
	/// assert_eq!(manifest.sources("/js/main.min.js").unwrap().len(), 2);
	/// ```
	pub fn with_asset<I, S>(mut self, bundle: impl Into<String>, sources: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.assets
			.insert(bundle.into(), sources.into_iter().map(Into::into).collect());
		self
	}

	/// Parses a JSON object of string arrays
	///
	/// # Errors
	///
	/// Returns error if the document is not an object of string arrays
	pub fn from_json_str(source: &str) -> Result<Self> {
		Ok(serde_json::from_str(source)?)
	}

	/// Loads a manifest from a JSON file
	///
	/// # Errors
	///
	/// Returns error if file cannot be read or parsed
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)?;
		Self::from_json_str(&content)
	}

	/// Development sources for a bundle, in declaration order
	pub fn sources(&self, bundle: &str) -> Option<&[String]> {
		self.assets.get(bundle).map(Vec::as_slice)
	}

	/// Whether `bundle` is declared
	pub fn contains(&self, bundle: &str) -> bool {
		self.assets.contains_key(bundle)
	}

	/// Number of declared bundles
	pub fn len(&self) -> usize {
		self.assets.len()
	}

	/// Whether no bundle is declared
	pub fn is_empty(&self) -> bool {
		self.assets.is_empty()
	}
}

impl<K, V, S> FromIterator<(K, V)> for AssetManifest
where
	K: Into<String>,
	V: IntoIterator<Item = S>,
	S: Into<String>,
{
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		iter.into_iter()
			.fold(Self::new(), |manifest, (bundle, sources)| {
				manifest.with_asset(bundle, sources)
			})
	}
}

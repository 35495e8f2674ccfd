//! Engine construction

use crate::codec::FingerprintCodec;
use crate::config::CachifyConfig;
use crate::manifest::AssetManifest;
use crate::middleware::CachifyMiddleware;
use crate::reader::{AssetReader, FsReader};
use crate::store::{Fingerprint, HashStore};
use crate::tags::TagGenerator;
use std::sync::Arc;

/// Builds an engine that reads assets from the filesystem.
///
/// # Examples
///
/// ```rust,no_run
/// use cachify_static::{AssetManifest, CachifyConfig, setup};
///
/// let manifest = AssetManifest::new()
///     .with_asset("/js/main.min.js", ["/js/lib/jquery.js", "/js/main.js"]);
/// let cachify = setup(manifest, CachifyConfig::new().with_root("public"));
///
/// let middleware = cachify.middleware();
/// let tags = cachify.tags();
/// ```
pub fn setup(manifest: AssetManifest, config: CachifyConfig) -> Cachify {
	Cachify::new(manifest, config)
}

/// A configured engine: one hash store shared by the request interceptor and
/// the tag helpers.
///
/// Cloning is cheap and yields a handle to the same engine.
#[derive(Clone)]
pub struct Cachify {
	config: Arc<CachifyConfig>,
	store: Arc<HashStore>,
	middleware: Arc<CachifyMiddleware>,
	tags: TagGenerator,
}

impl Cachify {
	/// Builds an engine backed by [`FsReader`]
	pub fn new(manifest: AssetManifest, config: CachifyConfig) -> Self {
		Self::with_reader(manifest, config, Arc::new(FsReader))
	}

	/// Builds an engine that reads asset bytes through `reader`
	pub fn with_reader(
		manifest: AssetManifest,
		config: CachifyConfig,
		reader: Arc<dyn AssetReader>,
	) -> Self {
		let config = config.normalized();
		if let Some(hash) = &config.global_hash
			&& Fingerprint::parse(hash).is_none()
		{
			tracing::warn!(
				"cachify global hash {} is not 10 lowercase hex characters; requests carrying it will not be recognized",
				hash
			);
		}
		tracing::debug!(
			"cachify setup: production={} debug={} prefix={:?} bundles={}",
			config.production,
			config.debug,
			config.prefix,
			manifest.len()
		);

		let store = Arc::new(HashStore::with_capacity(config.max_cache_entries));
		let codec = Arc::new(FingerprintCodec::new(&config, store.clone(), reader));
		let manifest = Arc::new(manifest);
		let tags = TagGenerator::new(codec.clone(), manifest.clone(), config.production);
		let middleware = Arc::new(CachifyMiddleware::new(
			codec,
			manifest,
			tags.clone(),
			config.control_headers,
		));

		Self {
			config: Arc::new(config),
			store,
			middleware,
			tags,
		}
	}

	/// Request interceptor to install in the host pipeline
	pub fn middleware(&self) -> Arc<CachifyMiddleware> {
		self.middleware.clone()
	}

	/// Template helpers
	pub fn tags(&self) -> TagGenerator {
		self.tags.clone()
	}

	/// Shared fingerprint cache
	pub fn store(&self) -> &HashStore {
		&self.store
	}

	/// Normalized configuration in effect
	pub fn config(&self) -> &CachifyConfig {
		&self.config
	}

	/// Resources whose fingerprint could not be determined so far
	pub fn uncached_resources(&self) -> Vec<String> {
		self.tags.uncached_resources()
	}
}

impl Default for Cachify {
	/// Empty manifest, default configuration
	fn default() -> Self {
		Self::new(AssetManifest::new(), CachifyConfig::default())
	}
}

impl std::fmt::Debug for Cachify {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Cachify")
			.field("config", &self.config)
			.field("store", &self.store)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::reader::MemoryReader;
	use crate::tags::TagOptions;
	use rstest::rstest;

	#[rstest]
	fn test_default_engine() {
		let cachify = Cachify::default();
		assert!(cachify.config().production);
		assert_eq!(cachify.config().prefix, "");
		assert!(cachify.store().is_empty());
		assert!(cachify.uncached_resources().is_empty());
	}

	#[rstest]
	fn test_setup_normalizes_config() {
		let config = CachifyConfig {
			prefix: "/cdn".to_string(),
			global_hash: Some(" ABCDEF0123 ".to_string()),
			..CachifyConfig::default()
		};
		let cachify = setup(AssetManifest::new(), config);
		assert_eq!(cachify.config().prefix, "cdn/");
		assert_eq!(cachify.config().global_hash.as_deref(), Some("abcdef0123"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_clones_share_store_and_uncached_list() {
		let reader = MemoryReader::new();
		reader.insert("/srv/a.js", "");
		let cachify = Cachify::with_reader(
			AssetManifest::new(),
			CachifyConfig::new().with_root("/srv"),
			Arc::new(reader),
		);
		let handle = cachify.clone();

		assert_eq!(
			handle.tags().url("/a.js", &TagOptions::new()).await.unwrap(),
			"/d41d8cd98f/a.js"
		);
		handle.tags().url("/missing.js", &TagOptions::new()).await.unwrap();

		assert_eq!(cachify.store().len(), 2);
		assert_eq!(cachify.uncached_resources(), ["/missing.js"]);
	}
}

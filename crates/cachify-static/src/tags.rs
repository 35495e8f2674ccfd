//! HTML tag generation for templates
//!
//! [`TagGenerator`] turns a logical asset URL into markup. In production the
//! bundle URL is fingerprinted; in development each source listed in the
//! [`AssetManifest`] gets its own tag, fingerprinted only in debug mode.

use crate::codec::{Cachified, FingerprintCodec, join_url, split_url};
use crate::error::{CachifyError, Result};
use crate::manifest::AssetManifest;
use parking_lot::Mutex;
use std::sync::Arc;

/// Placeholder replaced by the URL in tag formats
pub const URL_PLACEHOLDER: &str = "%s";

const STYLE_TEMPLATE: &str = r#"<link href="%s" rel="stylesheet" type="text/css">"#;
const PREFETCH_TEMPLATE: &str = r#"<link rel="prefetch" href="%s">"#;

/// Options for [`TagGenerator::script_tag`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOptions {
	/// Add the `defer` attribute (production only)
	pub defer: bool,
	/// Add the `async` attribute (production only)
	pub r#async: bool,
	/// Fingerprint to use instead of the computed one
	pub hash: Option<String>,
}

impl ScriptOptions {
	/// No attributes, computed fingerprint
	pub fn new() -> Self {
		Self::default()
	}

	/// Requests the `defer` attribute
	pub fn with_defer(mut self) -> Self {
		self.defer = true;
		self
	}

	/// Requests the `async` attribute
	pub fn with_async(mut self) -> Self {
		self.r#async = true;
		self
	}

	/// Overrides the fingerprint
	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = Some(hash.into());
		self
	}
}

/// Options for stylesheet, prefetch and URL helpers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOptions {
	/// Fingerprint to use instead of the computed one
	pub hash: Option<String>,
}

impl TagOptions {
	/// Computed fingerprint
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides the fingerprint
	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = Some(hash.into());
		self
	}
}

/// Options for [`TagGenerator::generic`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericOptions {
	/// Format with one [`URL_PLACEHOLDER`]; the URL is substituted unescaped
	pub tag_format: String,
	/// Fingerprint to use instead of the computed one
	pub hash: Option<String>,
}

impl Default for GenericOptions {
	fn default() -> Self {
		Self {
			tag_format: URL_PLACEHOLDER.to_string(),
			hash: None,
		}
	}
}

impl GenericOptions {
	/// Bare URL output
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the tag format
	pub fn with_tag_format(mut self, tag_format: impl Into<String>) -> Self {
		self.tag_format = tag_format.into();
		self
	}

	/// Overrides the fingerprint
	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = Some(hash.into());
		self
	}
}

/// Template-facing helpers, cheap to clone.
///
/// Inserted into request extensions by [`crate::CachifyMiddleware`] so handlers
/// can render markup for the current request.
#[derive(Clone)]
pub struct TagGenerator {
	codec: Arc<FingerprintCodec>,
	manifest: Arc<AssetManifest>,
	production: bool,
	uncached: Arc<Mutex<Vec<String>>>,
}

impl TagGenerator {
	pub(crate) fn new(
		codec: Arc<FingerprintCodec>,
		manifest: Arc<AssetManifest>,
		production: bool,
	) -> Self {
		Self {
			codec,
			manifest,
			production,
			uncached: Arc::new(Mutex::new(Vec::new())),
		}
	}

	/// `<script>` tags for `logical_url`
	///
	/// # Errors
	///
	/// Returns [`CachifyError::InvalidResource`] if `logical_url` is empty
	pub async fn script_tag(&self, logical_url: &str, options: &ScriptOptions) -> Result<String> {
		let mut template = String::from(r#"<script src="%s""#);
		if self.production {
			if options.defer {
				template.push_str(" defer");
			}
			if options.r#async {
				template.push_str(" async");
			}
		}
		template.push_str("></script>");

		self.generate(logical_url, &template, options.hash.as_deref())
			.await
	}

	/// `<link rel="stylesheet">` tags for `logical_url`
	///
	/// # Errors
	///
	/// Returns [`CachifyError::InvalidResource`] if `logical_url` is empty
	pub async fn style_tag(&self, logical_url: &str, options: &TagOptions) -> Result<String> {
		self.generate(logical_url, STYLE_TEMPLATE, options.hash.as_deref())
			.await
	}

	/// `<link rel="prefetch">` tags for `logical_url`
	///
	/// # Errors
	///
	/// Returns [`CachifyError::InvalidResource`] if `logical_url` is empty
	pub async fn prefetch_tag(&self, logical_url: &str, options: &TagOptions) -> Result<String> {
		self.generate(logical_url, PREFETCH_TEMPLATE, options.hash.as_deref())
			.await
	}

	/// Arbitrary markup for `logical_url`; with default options, just the URL
	///
	/// # Errors
	///
	/// Returns [`CachifyError::InvalidResource`] if `logical_url` is empty and
	/// [`CachifyError::InvalidFormat`] unless `tag_format` holds exactly one
	/// [`URL_PLACEHOLDER`]
	pub async fn generic(&self, logical_url: &str, options: &GenericOptions) -> Result<String> {
		self.render(
			logical_url,
			options.hash.as_deref(),
			&options.tag_format,
			false,
		)
		.await
	}

	/// Single fingerprinted URL for `resource`, without manifest expansion.
	///
	/// Falls back to `resource` unchanged when no fingerprint can be found.
	///
	/// # Errors
	///
	/// Returns [`CachifyError::InvalidResource`] if `resource` is empty
	pub async fn url(&self, resource: &str, options: &TagOptions) -> Result<String> {
		check_resource(resource)?;
		Ok(self.cachify(resource, options.hash.as_deref()).await)
	}

	/// Resources whose fingerprint could not be determined, in the order they
	/// were requested; a resource requested twice appears twice
	pub fn uncached_resources(&self) -> Vec<String> {
		self.uncached.lock().clone()
	}

	/// URLs to emit for `logical_url`, in order
	///
	/// # Errors
	///
	/// Returns [`CachifyError::InvalidResource`] if `logical_url` is empty
	pub async fn urls(&self, logical_url: &str, hash: Option<&str>) -> Result<Vec<String>> {
		check_resource(logical_url)?;

		let (path, query, fragment) = split_url(logical_url);
		let Some(sources) = self
			.manifest
			.sources(path)
			.filter(|_| !self.production)
		else {
			return Ok(vec![self.cachify(logical_url, hash).await]);
		};

		let mut urls = Vec::with_capacity(sources.len());
		for source in sources {
			let (source_path, source_query, source_fragment) = split_url(source);
			let resource = join_url(
				source_path,
				query.or(source_query),
				source_fragment.or(fragment),
			);
			urls.push(self.cachify(&resource, hash).await);
		}
		Ok(urls)
	}

	/// Fills `template` once per URL from [`TagGenerator::urls`], escaping each
	/// URL for an HTML attribute, and joins the renderings with `\n`
	///
	/// # Errors
	///
	/// Returns [`CachifyError::InvalidResource`] if `logical_url` is empty
	pub async fn generate(
		&self,
		logical_url: &str,
		template: &str,
		explicit_hash: Option<&str>,
	) -> Result<String> {
		self.render(logical_url, explicit_hash, template, true).await
	}

	async fn render(
		&self,
		logical_url: &str,
		hash: Option<&str>,
		template: &str,
		escape: bool,
	) -> Result<String> {
		if template.matches(URL_PLACEHOLDER).count() != 1 {
			return Err(CachifyError::InvalidFormat(template.to_string()));
		}

		let urls = self.urls(logical_url, hash).await?;
		Ok(urls
			.iter()
			.map(|url| {
				if escape {
					fill(template, &escape_html_attr(url))
				} else {
					fill(template, url)
				}
			})
			.collect::<Vec<_>>()
			.join("\n"))
	}

	async fn cachify(&self, resource: &str, hash: Option<&str>) -> String {
		match self.codec.cachify(resource, hash).await {
			Cachified::Unresolved(url) => {
				tracing::error!("cachify could not fingerprint {}, emitting it unchanged", url);
				self.uncached.lock().push(url.clone());
				url
			}
			other => other.into_url(),
		}
	}
}

impl std::fmt::Debug for TagGenerator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TagGenerator")
			.field("prefix", &self.codec.prefix())
			.field("production", &self.production)
			.field("bundles", &self.manifest.len())
			.finish()
	}
}

fn check_resource(resource: &str) -> Result<()> {
	if resource.is_empty() {
		return Err(CachifyError::InvalidResource(resource.to_string()));
	}
	Ok(())
}

fn fill(template: &str, url: &str) -> String {
	template.replacen(URL_PLACEHOLDER, url, 1)
}

/// Escapes a value for use inside a double- or single-quoted HTML attribute
pub fn escape_html_attr(input: &str) -> String {
	input
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#x27;")
		.replace('\n', "&#10;")
		.replace('\r', "&#13;")
}

//! Fingerprint placement in URLs and recognition of fingerprinted requests

use crate::config::{CachifyConfig, normalize_prefix};
use crate::reader::AssetReader;
use crate::store::{self, FINGERPRINT_LEN, Fingerprint, HashStore};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Characters escaped when a logical path is placed in a URL; `/` is kept
const PATH_ESCAPE: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'%')
	.add(b'<')
	.add(b'>')
	.add(b'?')
	.add(b'`')
	.add(b'{')
	.add(b'}');

/// Percent-encodes a logical path for use in a URL.
///
/// # Examples
///
/// ```rust
/// use cachify_static::codec::encode_path;
///
/// assert_eq!(encode_path("/fonts/my font.css"), "/fonts/my%20font.css");
/// assert_eq!(encode_path("/js/app.js"), "/js/app.js");
/// ```
pub fn encode_path(path: &str) -> Cow<'_, str> {
	utf8_percent_encode(path, PATH_ESCAPE).into()
}

/// Decodes a request path back to the logical path it names.
///
/// # Examples
///
/// ```rust
/// use cachify_static::codec::decode_path;
///
/// assert_eq!(decode_path("/fonts/my%20font.css"), "/fonts/my font.css");
/// assert_eq!(decode_path("/caf%C3%A9.css"), "/café.css");
/// ```
pub fn decode_path(path: &str) -> Cow<'_, str> {
	percent_decode_str(path).decode_utf8_lossy()
}

/// True iff `url` carries a scheme separator (`://`).
///
/// Fully-qualified URLs are never fingerprinted or intercepted.
pub fn is_fully_qualified(url: &str) -> bool {
	url.contains("://")
}

/// Drops everything from the first `#` onward.
///
/// # Examples
///
/// ```rust
/// use cachify_static::codec::strip_fragment;
///
/// assert_eq!(strip_fragment("/js/font-loader.js#with_fragment_id"), "/js/font-loader.js");
/// assert_eq!(strip_fragment("/js/a.js"), "/js/a.js");
/// ```
pub fn strip_fragment(url: &str) -> &str {
	url.split_once('#').map_or(url, |(before, _)| before)
}

/// Splits a URL into path, query (without `?`) and fragment (without `#`).
///
/// # Examples
///
/// ```rust
/// use cachify_static::codec::split_url;
///
/// assert_eq!(split_url("/a.js?v=1#top"), ("/a.js", Some("v=1"), Some("top")));
/// assert_eq!(split_url("/a.js#x?y"), ("/a.js", None, Some("x?y")));
/// assert_eq!(split_url("/a.js"), ("/a.js", None, None));
/// ```
pub fn split_url(url: &str) -> (&str, Option<&str>, Option<&str>) {
	let (rest, fragment) = match url.split_once('#') {
		Some((rest, fragment)) => (rest, Some(fragment)),
		None => (url, None),
	};
	match rest.split_once('?') {
		Some((path, query)) => (path, Some(query), fragment),
		None => (rest, None, fragment),
	}
}

/// Reassembles the pieces produced by [`split_url`].
pub fn join_url(path: &str, query: Option<&str>, fragment: Option<&str>) -> String {
	let mut url = path.to_string();
	if let Some(query) = query {
		url.push('?');
		url.push_str(query);
	}
	if let Some(fragment) = fragment {
		url.push('#');
		url.push_str(fragment);
	}
	url
}

/// A request path that structurally carries a fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
	/// The embedded hex string, not yet verified
	pub fingerprint: &'a str,
	/// The request path with prefix and fingerprint removed
	pub true_path: &'a str,
}

/// Outcome of fingerprinting one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cachified {
	/// The URL now embeds a fingerprint
	Fingerprinted(String),
	/// Fingerprinting does not apply (fully-qualified URL, or development mode
	/// without debug); the resource is returned as given
	Unchanged(String),
	/// No fingerprint could be determined; the resource is returned as given
	Unresolved(String),
}

impl Cachified {
	/// The URL to emit
	pub fn into_url(self) -> String {
		match self {
			Self::Fingerprinted(url) | Self::Unchanged(url) | Self::Unresolved(url) => url,
		}
	}
}

/// Encodes fingerprints into URLs and recognizes them in request paths.
///
/// Owns the resolution settings so it can ask the [`HashStore`] for the
/// fingerprint a logical URL should carry.
pub struct FingerprintCodec {
	prefix: String,
	pattern: Option<Regex>,
	enabled: bool,
	global_hash: Option<String>,
	root: PathBuf,
	overrides: HashMap<String, PathBuf>,
	store: Arc<HashStore>,
	reader: Arc<dyn AssetReader>,
}

impl FingerprintCodec {
	/// Builds a codec for `config`, sharing `store` and `reader`
	pub fn new(config: &CachifyConfig, store: Arc<HashStore>, reader: Arc<dyn AssetReader>) -> Self {
		let prefix = normalize_prefix(&config.prefix);
		let pattern = candidate_pattern(&prefix);
		Self {
			prefix,
			pattern,
			enabled: config.fingerprinting_enabled(),
			global_hash: config.global_hash.clone(),
			root: config.root.clone(),
			overrides: config.url_to_paths.clone(),
			store,
			reader,
		}
	}

	/// Normalized prefix placed before fingerprints
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// Configured global fingerprint, if any
	pub fn global_hash(&self) -> Option<&str> {
		self.global_hash.as_deref()
	}

	/// Places `fingerprint` in front of `resource`.
	///
	/// A resource starting with `/` yields `/` + prefix + fingerprint +
	/// resource; otherwise prefix + fingerprint + `/` + resource. A
	/// fully-qualified prefix always leads verbatim. `resource` is a logical
	/// path and is percent-encoded on the way in.
	pub fn encode(&self, resource: &str, fingerprint: &str) -> String {
		let resource = encode_path(resource);
		if !is_fully_qualified(&self.prefix) && resource.starts_with('/') {
			format!("/{}{}{}", self.prefix, fingerprint, resource)
		} else {
			format!(
				"{}{}/{}",
				self.prefix,
				fingerprint,
				resource.trim_start_matches('/')
			)
		}
	}

	/// Recognizes `/` + prefix + 10 lowercase hex characters + `/…`.
	pub fn match_candidate<'a>(&self, request_path: &'a str) -> Option<Candidate<'a>> {
		let captures = self.pattern.as_ref()?.captures(request_path)?;
		Some(Candidate {
			fingerprint: captures.get(1)?.as_str(),
			true_path: captures.get(2)?.as_str(),
		})
	}

	/// Whether `request_path` sits under a custom, non-URL prefix.
	///
	/// Such requests may name virtual assets that have no backing file.
	pub fn is_prefix_passthrough(&self, request_path: &str) -> bool {
		!self.prefix.is_empty()
			&& !is_fully_qualified(&self.prefix)
			&& request_path
				.strip_prefix('/')
				.is_some_and(|rest| rest.starts_with(self.prefix.as_str()))
	}

	/// Filesystem path backing `logical_url`
	pub fn resolve(&self, logical_url: &str) -> Option<PathBuf> {
		store::resolve(logical_url, &self.overrides, &self.root)
	}

	/// Memoized content fingerprint of the file at `path`
	pub async fn file_fingerprint(&self, path: &Path) -> Option<Fingerprint> {
		self.store.fingerprint(path, self.reader.as_ref()).await
	}

	/// Memoized existence of the file at `path`
	pub async fn file_exists(&self, path: &Path) -> bool {
		self.store.exists(path, self.reader.as_ref()).await
	}

	/// Content fingerprint for a logical URL
	pub async fn content_fingerprint(&self, logical_url: &str) -> Option<Fingerprint> {
		let path = self.resolve(logical_url)?;
		self.file_fingerprint(&path).await
	}

	/// Rewrites `resource` to carry its fingerprint.
	///
	/// Fingerprint precedence: `explicit_hash`, then the global hash, then the
	/// content hash. Query string and fragment are kept after the path.
	pub async fn cachify(&self, resource: &str, explicit_hash: Option<&str>) -> Cachified {
		if is_fully_qualified(resource) || !self.enabled {
			return Cachified::Unchanged(resource.to_string());
		}

		let (path, query, fragment) = split_url(resource);
		let fingerprint = match explicit_hash.or(self.global_hash.as_deref()) {
			Some(hash) => hash.to_string(),
			None => match self.content_fingerprint(path).await {
				Some(fingerprint) => fingerprint.to_string(),
				None => return Cachified::Unresolved(resource.to_string()),
			},
		};

		Cachified::Fingerprinted(join_url(
			&self.encode(path, &fingerprint),
			query,
			fragment,
		))
	}
}

/// Path part of the prefix as it appears in request paths.
///
/// For a fully-qualified prefix this is its URL path without the leading `/`.
fn prefix_path(prefix: &str) -> String {
	if !is_fully_qualified(prefix) {
		return prefix.to_string();
	}
	match url::Url::parse(prefix) {
		Ok(parsed) => parsed.path().trim_start_matches('/').to_string(),
		Err(e) => {
			tracing::warn!("cachify could not parse prefix {}: {}", prefix, e);
			prefix.to_string()
		}
	}
}

fn candidate_pattern(prefix: &str) -> Option<Regex> {
	let pattern = format!(
		"^/{}([a-f0-9]{{{}}})(/.*)$",
		regex::escape(&prefix_path(prefix)),
		FINGERPRINT_LEN
	);
	match Regex::new(&pattern) {
		Ok(regex) => Some(regex),
		Err(e) => {
			tracing::error!("cachify disabled request matching for prefix {}: {}", prefix, e);
			None
		}
	}
}
